use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use tracing::debug;

use crate::{
    models::bar::Bar,
    providers::{DataSourceError, MalformedResponseSnafu},
};

/// The code Yahoo puts in `chart.error` for unknown or delisted symbols.
pub const NOT_FOUND_CODE: &str = "Not Found";

#[derive(Deserialize, Debug)]
pub struct ChartEnvelope {
    pub chart: ChartBody,
}

#[derive(Deserialize, Debug)]
pub struct ChartBody {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
pub struct ChartError {
    pub code: String,
    pub description: Option<String>,
}

impl ChartError {
    pub fn is_not_found(&self) -> bool {
        self.code == NOT_FOUND_CODE
    }

    pub fn message(&self) -> String {
        match &self.description {
            Some(desc) if !desc.is_empty() => format!("{}: {}", self.code, desc),
            _ => self.code.clone(),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct ChartResult {
    pub meta: Option<ChartMeta>,
    /// Session timestamps in epoch seconds. Absent when the range holds no sessions.
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
pub struct ChartMeta {
    /// Exchange offset from UTC in seconds.
    #[serde(rename = "gmtoffset", default)]
    pub gmt_offset: i64,
}

#[derive(Deserialize, Debug)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<Quote>,
}

/// Column-oriented OHLCV arrays. Yahoo emits `null` for placeholder sessions.
#[derive(Deserialize, Debug, Default)]
pub struct Quote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<u64>>,
}

/// Converts one chart result into canonical bars.
///
/// Rows with any null field are dropped. When the same trading date shows up
/// twice (Yahoo appends a live bar for the current session), the later row wins.
pub fn into_bars(result: ChartResult) -> Result<Vec<Bar>, DataSourceError> {
    let offset = result.meta.as_ref().map_or(0, |m| m.gmt_offset);
    let ChartResult {
        timestamp,
        indicators,
        ..
    } = result;

    if timestamp.is_empty() {
        return Ok(Vec::new());
    }

    let quote = indicators
        .and_then(|i| i.quote.into_iter().next())
        .ok_or_else(|| {
            MalformedResponseSnafu {
                message: "timestamps present but indicators.quote is missing",
            }
            .build()
        })?;

    let rows = timestamp.len();
    for (column, len) in [
        ("open", quote.open.len()),
        ("high", quote.high.len()),
        ("low", quote.low.len()),
        ("close", quote.close.len()),
        ("volume", quote.volume.len()),
    ] {
        if len != rows {
            return MalformedResponseSnafu {
                message: format!("column '{column}' has {len} values for {rows} timestamps"),
            }
            .fail();
        }
    }

    let mut bars: Vec<Bar> = Vec::with_capacity(rows);
    let mut dropped = 0usize;
    for (i, ts) in timestamp.iter().enumerate() {
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
            quote.open[i],
            quote.high[i],
            quote.low[i],
            quote.close[i],
            quote.volume[i],
        ) else {
            dropped += 1;
            continue;
        };

        let bar = Bar::new(session_date(*ts, offset)?, open, high, low, close, volume);
        if !bar.has_finite_prices() {
            return MalformedResponseSnafu {
                message: format!("non-finite price in session {}", bar.date),
            }
            .fail();
        }
        match bars.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => bars.push(bar),
        }
    }

    if dropped > 0 {
        debug!(dropped, "skipped Yahoo rows with null fields");
    }
    Ok(bars)
}

/// Trading date of a session timestamp in the exchange's local time.
fn session_date(ts: i64, gmt_offset: i64) -> Result<NaiveDate, DataSourceError> {
    ts.checked_add(gmt_offset)
        .and_then(|local| DateTime::from_timestamp(local, 0))
        .map(|dt| dt.date_naive())
        .ok_or_else(|| {
            MalformedResponseSnafu {
                message: format!("timestamp {ts} with offset {gmt_offset} is out of range"),
            }
            .build()
        })
}
