//! Canonical in-memory representation of a daily bar (OHLCV).
//!
//! This struct is the standard output for all [`DataProvider`](crate::providers::DataProvider)
//! implementations, regardless of which vendor produced it.

use chrono::NaiveDate;

/// One trading day's open/high/low/close/volume record.
///
/// Vendor payloads are converted into this type at the API boundary, so
/// downstream code never sees optional or loosely typed fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// The trading date this bar covers.
    pub date: NaiveDate,

    /// Opening price.
    pub open: f64,

    /// Highest price during the session.
    pub high: f64,

    /// Lowest price during the session.
    pub low: f64,

    /// Closing price.
    pub close: f64,

    /// Shares traded during the session.
    pub volume: u64,
}

impl Bar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Returns true when every price field is a finite number.
    pub fn has_finite_prices(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|p| p.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_price_is_not_finite() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert!(Bar::new(date, 1.0, 2.0, 0.5, 1.5, 100).has_finite_prices());
        assert!(!Bar::new(date, 1.0, f64::NAN, 0.5, 1.5, 100).has_finite_prices());
        assert!(!Bar::new(date, 1.0, 2.0, 0.5, f64::INFINITY, 100).has_finite_prices());
    }
}
