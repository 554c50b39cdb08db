//! Alpaca market data v2 (`/v2/stocks/bars`), daily timeframe.

pub mod params;
pub mod provider;
pub mod response;

pub use params::{Adjustment, AlpacaBarsParams, Feed, Sort};
