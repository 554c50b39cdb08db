use chrono::NaiveDate;
use tracing::{info, warn};

use crate::{
    models::{request_params::BarsRequestParams, symbol::Symbol, time_series::TimeSeries},
    providers::{DataProvider, DataSourceError, ProviderInitError, ProviderSettings, build_provider},
};

/// What a successful fetch produced.
///
/// `Empty` is a normal answer ("unknown symbol or no sessions in range") and
/// must not be confused with a [`DataSourceError`].
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// A non-empty series.
    Data(TimeSeries),
    /// The provider had no bars for the symbol.
    Empty(Symbol),
}

/// Fetches daily history for one symbol at a time. No retries, no caching.
pub struct MarketDataClient {
    provider: Box<dyn DataProvider>,
}

impl MarketDataClient {
    pub fn new(provider: Box<dyn DataProvider>) -> Self {
        Self { provider }
    }

    /// Builds the client around the provider described by `settings`.
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, ProviderInitError> {
        Ok(Self::new(build_provider(settings)?))
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Fetches daily bars for `symbol` from `start` up to the latest session.
    pub async fn fetch(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
    ) -> Result<FetchOutcome, DataSourceError> {
        let params = BarsRequestParams::new(symbol.clone(), start);
        info!(%symbol, %start, provider = self.provider.name(), "fetching daily bars");

        match self.provider.fetch_bars(&params).await {
            Ok(series) if series.is_empty() => {
                info!(%symbol, "provider returned no bars");
                Ok(FetchOutcome::Empty(symbol.clone()))
            }
            Ok(series) => {
                info!(%symbol, bars = series.len(), "fetched daily bars");
                Ok(FetchOutcome::Data(series))
            }
            Err(e) => {
                warn!(%symbol, error = %e, "fetch failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::{models::bar::Bar, providers::ApiSnafu};

    use super::*;

    struct Recording {
        seen: Arc<Mutex<Vec<BarsRequestParams>>>,
        bars: Vec<Bar>,
    }

    #[async_trait]
    impl DataProvider for Recording {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn fetch_bars(
            &self,
            params: &BarsRequestParams,
        ) -> Result<TimeSeries, DataSourceError> {
            self.seen.lock().unwrap().push(params.clone());
            Ok(TimeSeries::new(params.symbol.clone(), self.bars.clone()).unwrap())
        }
    }

    struct Down;

    #[async_trait]
    impl DataProvider for Down {
        fn name(&self) -> &'static str {
            "down"
        }

        async fn fetch_bars(
            &self,
            _params: &BarsRequestParams,
        ) -> Result<TimeSeries, DataSourceError> {
            ApiSnafu {
                status: 503u16,
                message: "service unavailable",
            }
            .fail()
        }
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
    }

    #[tokio::test]
    async fn empty_series_is_not_an_error() {
        let client = MarketDataClient::new(Box::new(Recording {
            seen: Arc::default(),
            bars: vec![],
        }));
        let symbol = Symbol::parse("nope").unwrap();
        let outcome = client.fetch(&symbol, start()).await.unwrap();
        assert_eq!(outcome, FetchOutcome::Empty(symbol));
    }

    #[tokio::test]
    async fn data_is_passed_through_with_open_end() {
        let bar = Bar::new(start(), 1.0, 1.0, 1.0, 1.0, 10);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let client = MarketDataClient::new(Box::new(Recording {
            seen: Arc::clone(&seen),
            bars: vec![bar],
        }));
        let symbol = Symbol::parse("aapl").unwrap();

        let FetchOutcome::Data(series) = client.fetch(&symbol, start()).await.unwrap() else {
            panic!("expected data");
        };
        assert_eq!(series.len(), 1);
        assert_eq!(client.provider_name(), "recording");

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].symbol.as_str(), "AAPL");
        assert_eq!(seen[0].start, start());
        assert_eq!(seen[0].end, None);
    }

    #[tokio::test]
    async fn provider_failure_is_propagated() {
        let client = MarketDataClient::new(Box::new(Down));
        let err = client
            .fetch(&Symbol::parse("aapl").unwrap(), start())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "API error (HTTP 503): service unavailable");
    }
}
