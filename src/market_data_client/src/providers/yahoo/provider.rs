use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::{Client, StatusCode, Url};
use snafu::ResultExt;
use tracing::{debug, info};

use crate::{
    models::{request_params::BarsRequestParams, time_series::TimeSeries},
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, DataSourceError, DecodeSnafu,
        InvalidBaseUrlSnafu, InvalidSeriesSnafu, ProviderInitError,
        yahoo::response::{self, ChartEnvelope},
    },
};

const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

// The chart endpoint rejects requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko)";

pub struct YahooProvider {
    client: Client,
    base_url: Url,
}

impl YahooProvider {
    /// Creates a provider pointed at the public Yahoo endpoint.
    pub fn new(timeout: Duration) -> Result<Self, ProviderInitError> {
        Self::with_base_url(BASE_URL, timeout)
    }

    /// Creates a provider against an alternative endpoint with the same schema.
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, ProviderInitError> {
        let base_url = Url::parse(base_url)
            .ok()
            .filter(|u| !u.cannot_be_a_base())
            .ok_or_else(|| InvalidBaseUrlSnafu { url: base_url }.build())?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self { client, base_url })
    }

    fn chart_url(&self, symbol: &str) -> Url {
        let mut url = self.base_url.clone();
        // Checked in the constructor, so the segments are always available.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(symbol);
        }
        url
    }
}

/// Query parameters for a daily chart request covering `[start, end]`.
pub fn construct_params(params: &BarsRequestParams) -> Vec<(String, String)> {
    let period1 = midnight_utc(params.start);
    let period2 = params
        .end
        .and_then(|end| end.succ_opt())
        .map(midnight_utc)
        .unwrap_or_else(|| Utc::now().timestamp());

    vec![
        ("period1".to_string(), period1.to_string()),
        ("period2".to_string(), period2.to_string()),
        ("interval".to_string(), "1d".to_string()),
        ("events".to_string(), "history".to_string()),
        ("includePrePost".to_string(), "false".to_string()),
    ]
}

fn midnight_utc(date: NaiveDate) -> i64 {
    date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp()
}

/// Turns a decoded chart envelope into a series, mapping "Not Found" to empty.
pub fn envelope_to_series(
    envelope: ChartEnvelope,
    params: &BarsRequestParams,
    status: StatusCode,
) -> Result<TimeSeries, DataSourceError> {
    if let Some(error) = envelope.chart.error {
        if error.is_not_found() {
            return Ok(TimeSeries::empty(params.symbol.clone()));
        }
        return ApiSnafu {
            status: status.as_u16(),
            message: error.message(),
        }
        .fail();
    }

    let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(TimeSeries::empty(params.symbol.clone()));
    };

    let bars = response::into_bars(result)?;
    let bars = match params.end {
        Some(end) => bars.into_iter().filter(|b| b.date >= params.start && b.date <= end).collect(),
        None => bars.into_iter().filter(|b| b.date >= params.start).collect(),
    };
    TimeSeries::new(params.symbol.clone(), bars).context(InvalidSeriesSnafu)
}

#[async_trait]
impl DataProvider for YahooProvider {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_bars(&self, params: &BarsRequestParams) -> Result<TimeSeries, DataSourceError> {
        let url = self.chart_url(params.symbol.as_str());
        debug!(%url, "requesting Yahoo chart");

        let response = self
            .client
            .get(url)
            .query(&construct_params(params))
            .send()
            .await
            .map_err(DataSourceError::from_request)?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(DataSourceError::from_request)?;

        // Unknown symbols answer 404 with a JSON chart error; anything else
        // unsuccessful is a provider failure.
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            let message = serde_json::from_slice::<ChartEnvelope>(&body)
                .ok()
                .and_then(|env| env.chart.error.map(|e| e.message()))
                .unwrap_or_else(|| String::from_utf8_lossy(&body).trim().to_string());
            return ApiSnafu {
                status: status.as_u16(),
                message,
            }
            .fail();
        }

        let envelope = match serde_json::from_slice::<ChartEnvelope>(&body) {
            Ok(envelope) => envelope,
            Err(_) if status == StatusCode::NOT_FOUND => {
                info!(symbol = %params.symbol, "Yahoo returned 404 without a chart body");
                return Ok(TimeSeries::empty(params.symbol.clone()));
            }
            Err(e) => return Err(e).context(DecodeSnafu),
        };

        let series = envelope_to_series(envelope, params, status)?;
        info!(symbol = %params.symbol, bars = series.len(), "fetched Yahoo chart");
        Ok(series)
    }
}
