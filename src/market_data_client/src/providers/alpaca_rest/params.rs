use serde::{Deserialize, Serialize};

use crate::models::request_params::BarsRequestParams;

/// Specifies the corporate action adjustment for stock data.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    Raw,
    Split,
    Dividend,
    #[default]
    All,
}

/// Specifies the source feed for stock data.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    Sip,
    #[default]
    Iex,
    Otc,
}

/// Specifies the sort order for the bars.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sort {
    #[default]
    Asc,
    Desc,
}

impl Adjustment {
    fn as_str(self) -> &'static str {
        match self {
            Adjustment::Raw => "raw",
            Adjustment::Split => "split",
            Adjustment::Dividend => "dividend",
            Adjustment::All => "all",
        }
    }
}

impl Feed {
    fn as_str(self) -> &'static str {
        match self {
            Feed::Sip => "sip",
            Feed::Iex => "iex",
            Feed::Otc => "otc",
        }
    }
}

impl Sort {
    fn as_str(self) -> &'static str {
        match self {
            Sort::Asc => "asc",
            Sort::Desc => "desc",
        }
    }
}

/// Alpaca-specific parameters for a bars request.
///
/// Free accounts only see the IEX feed, hence the default.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AlpacaBarsParams {
    pub adjustment: Adjustment,
    pub feed: Feed,
    /// Page size; Alpaca caps it at 10 000.
    pub limit: u32,
}

impl Default for AlpacaBarsParams {
    fn default() -> Self {
        Self {
            adjustment: Adjustment::default(),
            feed: Feed::default(),
            limit: 10_000,
        }
    }
}

/// Builds the query string for one page of a daily bars request.
///
/// The series must come back oldest first, so the sort order is fixed.
pub fn construct_params(
    params: &BarsRequestParams,
    alpaca: &AlpacaBarsParams,
) -> Vec<(String, String)> {
    let mut query = vec![
        ("symbols".to_string(), params.symbol.to_string()),
        ("timeframe".to_string(), "1Day".to_string()),
        ("start".to_string(), params.start.format("%Y-%m-%d").to_string()),
        ("adjustment".to_string(), alpaca.adjustment.as_str().to_string()),
        ("feed".to_string(), alpaca.feed.as_str().to_string()),
        ("sort".to_string(), Sort::Asc.as_str().to_string()),
        ("limit".to_string(), alpaca.limit.to_string()),
    ];
    if let Some(end) = params.end {
        query.push(("end".to_string(), end.format("%Y-%m-%d").to_string()));
    }
    query
}
