//! Provider abstraction for market data sources.
//!
//! This module defines the [`DataProvider`] trait, which serves as a unified interface
//! for fetching daily bars from any market data vendor (e.g., Yahoo Finance, Alpaca).
//!
//! Each concrete provider implementation converts the vendor payload into the canonical
//! [`Bar`](crate::models::bar::Bar) at the API boundary and hands back a validated
//! [`TimeSeries`]. An empty series means the vendor knows nothing about the symbol in the
//! requested range; it is not an error.
//!
//! The trait is designed for async usage and supports dynamic dispatch (`dyn DataProvider`)
//! for runtime selection of providers.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use market_data_client::models::{request_params::BarsRequestParams, time_series::TimeSeries};
//! use market_data_client::providers::{DataProvider, DataSourceError};
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl DataProvider for MyProvider {
//!     fn name(&self) -> &'static str {
//!         "mine"
//!     }
//!
//!     async fn fetch_bars(
//!         &self,
//!         params: &BarsRequestParams,
//!     ) -> Result<TimeSeries, DataSourceError> {
//!         Ok(TimeSeries::empty(params.symbol.clone()))
//!     }
//! }
//! ```

pub mod alpaca_rest;
pub mod yahoo;

use std::{fmt, str::FromStr, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_utils::env::MissingEnvVarError;
use snafu::{Backtrace, IntoError, Snafu};

use crate::models::{
    request_params::BarsRequestParams,
    time_series::{TimeSeries, TimeSeriesError},
};

/// Trait for fetching daily bars from a market data provider.
///
/// Implement this trait for each concrete data vendor.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Short identifier used in logs (e.g. `"yahoo"`).
    fn name(&self) -> &'static str;

    /// Fetches daily bars for the given request parameters.
    ///
    /// # Returns
    ///
    /// * `Ok(TimeSeries)` - The bars in ascending date order. Empty when the provider
    ///   has no data for the symbol in range.
    /// * `Err(DataSourceError)` - Network failure, timeout, or a response that could not
    ///   be turned into a valid series.
    async fn fetch_bars(&self, params: &BarsRequestParams) -> Result<TimeSeries, DataSourceError>;
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// missed environment variable.
    #[snafu(display("Missing environment variable: {source}"))]
    MissingEnvVar {
        source: MissingEnvVarError,
        backtrace: Backtrace,
    },

    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// API key contains invalid characters.
    #[snafu(display("Invalid API key format: {source}"))]
    InvalidApiKey {
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },

    /// The configured endpoint is not a usable base URL.
    #[snafu(display("Invalid base URL '{url}'"))]
    InvalidBaseUrl { url: String, backtrace: Backtrace },
}

/// Errors that can occur within a `DataProvider` implementation.
///
/// Every variant renders a message suitable for showing to the user verbatim.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DataSourceError {
    /// An error during an API request (e.g., connection refused, TLS failure).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider did not answer within the configured timeout.
    #[snafu(display("API request timed out: {source}"))]
    Timeout {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider's API returned a non-success status.
    #[snafu(display("API error (HTTP {status}): {message}"))]
    Api {
        status: u16,
        message: String,
        backtrace: Backtrace,
    },

    /// The response body was not valid JSON for the expected schema.
    #[snafu(display("Failed to decode provider response: {source}"))]
    Decode {
        source: serde_json::Error,
        backtrace: Backtrace,
    },

    /// The response decoded but its content is inconsistent (e.g. misaligned columns).
    #[snafu(display("Malformed provider response: {message}"))]
    MalformedResponse {
        message: String,
        backtrace: Backtrace,
    },

    /// The bars could not form a valid series (duplicate or unordered dates).
    #[snafu(display("Provider returned an invalid series: {source}"))]
    InvalidSeries {
        source: TimeSeriesError,
        backtrace: Backtrace,
    },

    /// An error during provider configuration or initialization.
    #[snafu(display("Provider initialization error: {source}"))]
    Init {
        #[snafu(backtrace)]
        source: ProviderInitError,
    },
}

impl DataSourceError {
    /// Wraps a transport error, separating timeouts from other failures.
    pub fn from_request(source: reqwest::Error) -> Self {
        if source.is_timeout() {
            TimeoutSnafu.into_error(source)
        } else {
            ReqwestSnafu.into_error(source)
        }
    }
}

/// Which vendor backs the [`MarketDataClient`](crate::client::MarketDataClient).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Yahoo Finance chart API. Needs no credentials.
    #[default]
    Yahoo,
    /// Alpaca market data v2. Reads `APCA_API_KEY_ID` / `APCA_API_SECRET_KEY`.
    Alpaca,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Yahoo => f.write_str("yahoo"),
            ProviderKind::Alpaca => f.write_str("alpaca"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yahoo" => Ok(ProviderKind::Yahoo),
            "alpaca" => Ok(ProviderKind::Alpaca),
            other => Err(format!("unknown provider '{other}' (expected 'yahoo' or 'alpaca')")),
        }
    }
}

/// Everything needed to construct a provider.
#[derive(Clone, Debug)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    /// Upper bound on each HTTP request, connect through body.
    pub timeout: Duration,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Builds the provider selected by `settings`.
pub fn build_provider(
    settings: &ProviderSettings,
) -> Result<Box<dyn DataProvider>, ProviderInitError> {
    let provider: Box<dyn DataProvider> = match settings.kind {
        ProviderKind::Yahoo => Box::new(yahoo::provider::YahooProvider::new(settings.timeout)?),
        ProviderKind::Alpaca => Box::new(alpaca_rest::provider::AlpacaProvider::new(
            settings.timeout,
        )?),
    };
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::models::symbol::Symbol;

    use super::*;

    struct StaticProvider;
    struct FailingProvider;

    #[async_trait]
    impl DataProvider for StaticProvider {
        fn name(&self) -> &'static str {
            "static"
        }

        async fn fetch_bars(
            &self,
            params: &BarsRequestParams,
        ) -> Result<TimeSeries, DataSourceError> {
            Ok(TimeSeries::empty(params.symbol.clone()))
        }
    }

    #[async_trait]
    impl DataProvider for FailingProvider {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn fetch_bars(
            &self,
            _params: &BarsRequestParams,
        ) -> Result<TimeSeries, DataSourceError> {
            MalformedResponseSnafu {
                message: "no quote block",
            }
            .fail()
        }
    }

    // Chosen at runtime, hence the boxed trait object.
    fn get_provider(name: &str) -> Box<dyn DataProvider> {
        if name == "static" {
            Box::new(StaticProvider)
        } else {
            Box::new(FailingProvider)
        }
    }

    fn params() -> BarsRequestParams {
        BarsRequestParams::new(
            Symbol::parse("AAPL").unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_dynamic_provider() {
        let provider = get_provider("static");
        let series = provider.fetch_bars(&params()).await.unwrap();
        assert!(series.is_empty());
        assert_eq!(series.symbol().as_str(), "AAPL");
    }

    #[tokio::test]
    async fn failure_message_is_human_readable() {
        let provider = get_provider("failing");
        let err = provider.fetch_bars(&params()).await.unwrap_err();
        assert_eq!(err.to_string(), "Malformed provider response: no quote block");
    }

    #[test]
    fn provider_kind_parses_case_insensitively() {
        assert_eq!("Yahoo".parse::<ProviderKind>(), Ok(ProviderKind::Yahoo));
        assert_eq!(" ALPACA ".parse::<ProviderKind>(), Ok(ProviderKind::Alpaca));
        assert!("polygon".parse::<ProviderKind>().is_err());
        assert_eq!(ProviderKind::Alpaca.to_string(), "alpaca");
    }
}
