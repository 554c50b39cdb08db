//! An ordered collection of daily bars for a single symbol.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{bar::Bar, symbol::Symbol};

/// Raised when bars handed to [`TimeSeries::new`] break the date ordering.
#[derive(Debug, Error, PartialEq)]
pub enum TimeSeriesError {
    #[error("duplicate bar for {date} at index {index}")]
    DuplicateDate { date: NaiveDate, index: usize },

    #[error("bar dated {date} at index {index} precedes {previous}")]
    OutOfOrder {
        date: NaiveDate,
        previous: NaiveDate,
        index: usize,
    },
}

/// Represents a complete set of daily bars for a single symbol.
///
/// Dates are unique and strictly increasing; [`TimeSeries::new`] enforces
/// that. A series may be empty, which providers use to signal that the
/// symbol has no data in the requested range.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    symbol: Symbol,
    bars: Vec<Bar>,
}

impl TimeSeries {
    pub fn new(symbol: Symbol, bars: Vec<Bar>) -> Result<Self, TimeSeriesError> {
        for (index, pair) in bars.windows(2).enumerate() {
            let (previous, current) = (&pair[0], &pair[1]);
            if current.date == previous.date {
                return Err(TimeSeriesError::DuplicateDate {
                    date: current.date,
                    index: index + 1,
                });
            }
            if current.date < previous.date {
                return Err(TimeSeriesError::OutOfOrder {
                    date: current.date,
                    previous: previous.date,
                    index: index + 1,
                });
            }
        }
        Ok(Self { symbol, bars })
    }

    pub fn empty(symbol: Symbol) -> Self {
        Self {
            symbol,
            bars: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    /// Closing prices in date order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.bars.iter().map(|b| b.date)
    }

    /// The most recent `n` bars, oldest first.
    pub fn tail(&self, n: usize) -> &[Bar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn bar(d: u32, close: f64) -> Bar {
        Bar::new(day(d), close, close, close, close, 1_000)
    }

    fn sym() -> Symbol {
        Symbol::parse("msft").unwrap()
    }

    #[test]
    fn accepts_increasing_dates() {
        let series = TimeSeries::new(sym(), vec![bar(1, 1.0), bar(4, 2.0), bar(5, 3.0)]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.symbol().as_str(), "MSFT");
    }

    #[test]
    fn rejects_duplicate_dates() {
        let err = TimeSeries::new(sym(), vec![bar(1, 1.0), bar(1, 2.0)]).unwrap_err();
        assert_eq!(
            err,
            TimeSeriesError::DuplicateDate {
                date: day(1),
                index: 1
            }
        );
    }

    #[test]
    fn rejects_out_of_order_dates() {
        let err = TimeSeries::new(sym(), vec![bar(2, 1.0), bar(3, 1.0), bar(1, 1.0)]).unwrap_err();
        assert!(matches!(err, TimeSeriesError::OutOfOrder { index: 2, .. }));
    }

    #[test]
    fn tail_is_clamped_to_length() {
        let series = TimeSeries::new(sym(), vec![bar(1, 1.0), bar(2, 2.0), bar(3, 3.0)]).unwrap();
        assert_eq!(series.tail(2).len(), 2);
        assert_eq!(series.tail(2)[0].date, day(2));
        assert_eq!(series.tail(20).len(), 3);
        assert!(TimeSeries::empty(sym()).tail(20).is_empty());
    }

    proptest! {
        #[test]
        fn sorted_unique_dates_always_build(
            offsets in proptest::collection::btree_set(0i64..3_000, 0..80),
            n in 0usize..100,
        ) {
            let start = day(1);
            let bars: Vec<Bar> = offsets
                .iter()
                .map(|&o| Bar::new(start + chrono::Duration::days(o), 1.0, 1.0, 1.0, 1.0, 1))
                .collect();
            let len = bars.len();
            let series = TimeSeries::new(sym(), bars).unwrap();
            prop_assert_eq!(series.len(), len);
            prop_assert_eq!(series.tail(n).len(), n.min(len));
        }
    }
}
