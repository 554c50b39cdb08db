//! Derived metrics over a daily series.
//!
//! Everything here is pure arithmetic on closing prices. Moving averages are
//! causal: the value at index `i` only looks at bars `0..=i`.

use market_data_client::TimeSeries;
use thiserror::Error;

/// Short moving-average window, in sessions.
pub const SHORT_WINDOW: usize = 20;
/// Long moving-average window, in sessions.
pub const LONG_WINDOW: usize = 50;
/// How far back `prior_close` looks, counting the latest bar as the first.
pub const PRIOR_CLOSE_LOOKBACK: usize = 5;

/// Metrics were requested for a series with no bars.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot compute metrics for {symbol}: the series has no bars")]
pub struct InsufficientDataError {
    pub symbol: String,
}

/// Day-over-day move of a bar's close relative to the previous bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedMetrics {
    pub latest_close: f64,
    /// Fifth-from-last close; `None` with fewer than five bars.
    pub prior_close: Option<f64>,
    /// Highest close in the series.
    pub period_high: f64,
    /// Lowest close in the series.
    pub period_low: f64,
    /// `None` when the first close is zero.
    pub percent_change_from_start: Option<f64>,
    /// One entry per bar; `None` until the window fills.
    pub moving_average_20: Vec<Option<f64>>,
    pub moving_average_50: Vec<Option<f64>>,
    /// One entry per bar.
    pub directions: Vec<Direction>,
}

impl DerivedMetrics {
    /// Latest close minus prior close, when both exist.
    pub fn latest_delta(&self) -> Option<f64> {
        self.prior_close.map(|prior| self.latest_close - prior)
    }
}

/// Computes every derived metric for `series`.
pub fn compute(series: &TimeSeries) -> Result<DerivedMetrics, InsufficientDataError> {
    let closes = series.closes();
    let (Some(&first), Some(&latest)) = (closes.first(), closes.last()) else {
        return Err(InsufficientDataError {
            symbol: series.symbol().to_string(),
        });
    };

    let period_high = closes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let period_low = closes.iter().copied().fold(f64::INFINITY, f64::min);

    let prior_close = closes
        .len()
        .checked_sub(PRIOR_CLOSE_LOOKBACK)
        .map(|i| closes[i]);

    Ok(DerivedMetrics {
        latest_close: latest,
        prior_close,
        period_high,
        period_low,
        percent_change_from_start: percent_change(first, latest),
        moving_average_20: moving_average(&closes, SHORT_WINDOW),
        moving_average_50: moving_average(&closes, LONG_WINDOW),
        directions: directions(&closes),
    })
}

/// `(to - from) / from * 100`, or `None` when `from` is exactly zero.
pub fn percent_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 {
        return None;
    }
    Some((to - from) / from * 100.0)
}

/// Trailing simple moving average.
///
/// Entry `i` is the mean of `values[i + 1 - window..=i]` and is `None` for
/// `i < window - 1`. A zero window yields all `None`.
pub fn moving_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    for (i, w) in values.windows(window).enumerate() {
        out[i + window - 1] = Some(w.iter().sum::<f64>() / window as f64);
    }
    out
}

/// Up when a close is at or above the previous one. The first bar has no
/// predecessor and counts as Up.
pub fn directions(closes: &[f64]) -> Vec<Direction> {
    let mut out = Vec::with_capacity(closes.len());
    if !closes.is_empty() {
        out.push(Direction::Up);
    }
    out.extend(closes.windows(2).map(|w| {
        if w[1] >= w[0] {
            Direction::Up
        } else {
            Direction::Down
        }
    }));
    out
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};
    use market_data_client::{Bar, Symbol};
    use proptest::prelude::*;

    use super::*;

    fn series_from(closes: &[f64]) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(start + Duration::days(i as i64), c, c, c, c, 1_000))
            .collect();
        TimeSeries::new(Symbol::parse("TEST").unwrap(), bars).unwrap()
    }

    #[test]
    fn five_bar_scenario() {
        let m = compute(&series_from(&[10.0, 12.0, 9.0, 15.0, 20.0])).unwrap();
        assert_eq!(m.latest_close, 20.0);
        assert_eq!(m.prior_close, Some(10.0));
        assert_eq!(m.period_high, 20.0);
        assert_eq!(m.period_low, 9.0);
        assert_eq!(m.percent_change_from_start, Some(100.0));
        assert_eq!(m.latest_delta(), Some(10.0));
        assert_eq!(
            m.directions,
            vec![
                Direction::Up,
                Direction::Up,
                Direction::Down,
                Direction::Up,
                Direction::Up
            ]
        );
    }

    #[test]
    fn single_bar_has_no_optional_metrics() {
        let m = compute(&series_from(&[42.0])).unwrap();
        assert_eq!(m.prior_close, None);
        assert_eq!(m.percent_change_from_start, Some(0.0));
        assert_eq!(m.moving_average_20, vec![None]);
        assert_eq!(m.moving_average_50, vec![None]);
        assert_eq!(m.directions, vec![Direction::Up]);
    }

    #[test]
    fn four_bars_have_no_prior_close() {
        let m = compute(&series_from(&[1.0, 2.0, 3.0, 4.0])).unwrap();
        assert_eq!(m.prior_close, None);
        assert_eq!(m.latest_delta(), None);
    }

    #[test]
    fn empty_series_is_an_error() {
        let empty = TimeSeries::empty(Symbol::parse("void").unwrap());
        assert_eq!(
            compute(&empty).unwrap_err(),
            InsufficientDataError {
                symbol: "VOID".into()
            }
        );
    }

    #[test]
    fn zero_first_close_has_undefined_change() {
        let m = compute(&series_from(&[0.0, 5.0])).unwrap();
        assert_eq!(m.percent_change_from_start, None);
    }

    #[test]
    fn equal_close_counts_as_up() {
        assert_eq!(
            directions(&[3.0, 3.0, 2.0]),
            vec![Direction::Up, Direction::Up, Direction::Down]
        );
        assert!(directions(&[]).is_empty());
    }

    #[test]
    fn moving_average_is_trailing() {
        let ma = moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(ma, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
        assert_eq!(moving_average(&[1.0, 2.0], 3), vec![None, None]);
        assert_eq!(moving_average(&[1.0], 0), vec![None]);
    }

    #[test]
    fn moving_average_matches_window_mean_over_long_series() {
        let closes: Vec<f64> = (0..1_700)
            .map(|i| 1e6 + (i as f64 * 0.37).sin() * 1e5 + 0.01 * i as f64)
            .collect();
        let ma = moving_average(&closes, LONG_WINDOW);
        for i in LONG_WINDOW - 1..closes.len() {
            let window = &closes[i + 1 - LONG_WINDOW..=i];
            let expected = window.iter().sum::<f64>() / LONG_WINDOW as f64;
            assert_eq!(ma[i], Some(expected), "index {i}");
        }
    }

    proptest! {
        #[test]
        fn extremes_bound_every_close(closes in proptest::collection::vec(0.01f64..10_000.0, 1..200)) {
            let m = compute(&series_from(&closes)).unwrap();
            for c in &closes {
                prop_assert!(m.period_low <= *c && *c <= m.period_high);
            }
        }

        #[test]
        fn moving_averages_defined_once_window_fills(closes in proptest::collection::vec(1.0f64..500.0, 50..120)) {
            let m = compute(&series_from(&closes)).unwrap();
            for (i, v) in m.moving_average_20.iter().enumerate() {
                prop_assert_eq!(v.is_some(), i >= SHORT_WINDOW - 1);
            }
            for (i, v) in m.moving_average_50.iter().enumerate() {
                prop_assert_eq!(v.is_some(), i >= LONG_WINDOW - 1);
            }
        }

        #[test]
        fn constant_series_is_flat(c in 0.5f64..1_000.0, n in 1usize..120) {
            let m = compute(&series_from(&vec![c; n])).unwrap();
            prop_assert_eq!(m.percent_change_from_start, Some(0.0));
            for v in m.moving_average_20.iter().chain(m.moving_average_50.iter()).flatten() {
                prop_assert!((v - c).abs() <= c * 1e-12);
            }
        }

        #[test]
        fn moving_average_never_looks_ahead(
            closes in proptest::collection::vec(1.0f64..500.0, 25..60),
            bump in 1.0f64..100.0,
        ) {
            let base = moving_average(&closes, SHORT_WINDOW);
            let mut changed = closes.clone();
            let last = changed.len() - 1;
            changed[last] += bump;
            let shifted = moving_average(&changed, SHORT_WINDOW);
            prop_assert_eq!(&base[..last], &shifted[..last]);
        }
    }
}
