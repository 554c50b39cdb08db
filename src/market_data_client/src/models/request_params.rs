use chrono::NaiveDate;

use crate::models::symbol::Symbol;

/// Universal parameters for requesting daily bars from any market data provider.
///
/// This struct is vendor-agnostic and is the standard input for all
/// [`DataProvider`](crate::providers::DataProvider) implementations.
#[derive(Clone, Debug, PartialEq)]
pub struct BarsRequestParams {
    /// The symbol to request (e.g. `AAPL`, `TCS.NS`).
    pub symbol: Symbol,

    /// First trading date to include (inclusive).
    ///
    /// Providers return bars dated on or after this day.
    pub start: NaiveDate,

    /// Last trading date to include (inclusive).
    ///
    /// `None` means "up to the most recent session".
    pub end: Option<NaiveDate>,
}

impl BarsRequestParams {
    pub fn new(symbol: Symbol, start: NaiveDate) -> Self {
        Self {
            symbol,
            start,
            end: None,
        }
    }
}
