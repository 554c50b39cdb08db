//! Maps a series and its metrics into chart-ready data and display strings.
//!
//! Nothing in here can fail: inconsistent lengths between a series and its
//! metrics are a programming error upstream, and the zips simply stop at the
//! shorter input.

use chrono::NaiveDate;
use market_data_client::{Symbol, TimeSeries};

use crate::metrics::{DerivedMetrics, Direction};

/// Rows shown in the recent-data table unless configured otherwise.
pub const DEFAULT_RECENT_ROWS: usize = 20;

/// Color tag for a volume bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeColor {
    Green,
    Red,
}

impl From<Direction> for VolumeColor {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => VolumeColor::Green,
            Direction::Down => VolumeColor::Red,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VolumeBar {
    pub date: NaiveDate,
    pub volume: u64,
    pub color: VolumeColor,
}

/// Close, MA20 and MA50 on one shared date axis. Undefined averages stay `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct MovingAverageOverlay {
    pub close: Vec<(NaiveDate, f64)>,
    pub ma20: Vec<(NaiveDate, Option<f64>)>,
    pub ma50: Vec<(NaiveDate, Option<f64>)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryCard {
    pub label: &'static str,
    pub value: String,
    pub delta: Option<String>,
}

/// One row of the raw-data table, already formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub date: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
}

impl TableRow {
    pub const HEADERS: [&'static str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];

    pub fn cells(&self) -> [&str; 6] {
        [
            self.date.as_str(),
            self.open.as_str(),
            self.high.as_str(),
            self.low.as_str(),
            self.close.as_str(),
            self.volume.as_str(),
        ]
    }
}

/// Everything a renderer needs to draw the full dashboard for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub symbol: Symbol,
    pub cards: Vec<SummaryCard>,
    pub trend: Vec<(NaiveDate, f64)>,
    pub volume: Vec<VolumeBar>,
    pub overlay: MovingAverageOverlay,
    pub recent: Vec<TableRow>,
}

pub fn to_trend_series(series: &TimeSeries) -> Vec<(NaiveDate, f64)> {
    series.bars().iter().map(|b| (b.date, b.close)).collect()
}

pub fn to_volume_bars(series: &TimeSeries, directions: &[Direction]) -> Vec<VolumeBar> {
    series
        .bars()
        .iter()
        .zip(directions)
        .map(|(bar, &direction)| VolumeBar {
            date: bar.date,
            volume: bar.volume,
            color: direction.into(),
        })
        .collect()
}

pub fn to_moving_average_overlay(
    series: &TimeSeries,
    ma20: &[Option<f64>],
    ma50: &[Option<f64>],
) -> MovingAverageOverlay {
    let align = |values: &[Option<f64>]| -> Vec<(NaiveDate, Option<f64>)> {
        series.dates().zip(values.iter().copied()).collect()
    };
    MovingAverageOverlay {
        close: to_trend_series(series),
        ma20: align(ma20),
        ma50: align(ma50),
    }
}

pub fn to_summary_cards(metrics: &DerivedMetrics) -> Vec<SummaryCard> {
    vec![
        SummaryCard {
            label: "Latest Close",
            value: format_price(metrics.latest_close),
            delta: metrics.latest_delta().map(format_signed),
        },
        SummaryCard {
            label: "Period High",
            value: format_price(metrics.period_high),
            delta: None,
        },
        SummaryCard {
            label: "Period Low",
            value: format_price(metrics.period_low),
            delta: None,
        },
        SummaryCard {
            label: "Change Since Start",
            value: metrics
                .percent_change_from_start
                .map_or_else(|| "N/A".to_string(), format_percent),
            delta: None,
        },
    ]
}

/// The last `rows` bars, oldest first.
pub fn to_recent_table(series: &TimeSeries, rows: usize) -> Vec<TableRow> {
    series
        .tail(rows)
        .iter()
        .map(|b| TableRow {
            date: b.date.format("%Y-%m-%d").to_string(),
            open: format_price(b.open),
            high: format_price(b.high),
            low: format_price(b.low),
            close: format_price(b.close),
            volume: b.volume.to_string(),
        })
        .collect()
}

pub fn build_view(series: &TimeSeries, metrics: &DerivedMetrics, recent_rows: usize) -> DashboardView {
    DashboardView {
        symbol: series.symbol().clone(),
        cards: to_summary_cards(metrics),
        trend: to_trend_series(series),
        volume: to_volume_bars(series, &metrics.directions),
        overlay: to_moving_average_overlay(
            series,
            &metrics.moving_average_20,
            &metrics.moving_average_50,
        ),
        recent: to_recent_table(series, recent_rows),
    }
}

pub fn format_price(value: f64) -> String {
    format!("{value:.2}")
}

pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}

fn format_signed(value: f64) -> String {
    format!("{value:+.2}")
}
