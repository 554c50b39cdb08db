use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::{
    models::bar::Bar,
    providers::{DataSourceError, MalformedResponseSnafu},
};

#[derive(Deserialize, Debug)]
pub struct AlpacaBar {
    #[serde(rename = "t")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "o")]
    pub open: f64,
    #[serde(rename = "h")]
    pub high: f64,
    #[serde(rename = "l")]
    pub low: f64,
    #[serde(rename = "c")]
    pub close: f64,
    #[serde(rename = "v")]
    pub volume: f64,
}

#[derive(Deserialize, Debug)]
pub struct AlpacaResponse {
    /// Symbols without data in range are omitted; the whole map may be `null`.
    #[serde(default)]
    pub bars: Option<IndexMap<String, Vec<AlpacaBar>>>,
    pub next_page_token: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct AlpacaErrorBody {
    pub message: String,
}

impl AlpacaBar {
    /// Daily bars are stamped at midnight New York time, which is still the
    /// same calendar day in UTC.
    pub fn into_bar(self) -> Result<Bar, DataSourceError> {
        if !self.volume.is_finite() || self.volume < 0.0 {
            return MalformedResponseSnafu {
                message: format!("invalid volume {} at {}", self.volume, self.timestamp),
            }
            .fail();
        }
        let bar = Bar::new(
            self.timestamp.date_naive(),
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume.round() as u64,
        );
        if !bar.has_finite_prices() {
            return MalformedResponseSnafu {
                message: format!("non-finite price at {}", self.timestamp),
            }
            .fail();
        }
        Ok(bar)
    }
}
