//! Historical daily bars from remote market data providers.
//!
//! [`client::MarketDataClient`] is the entry point: it wraps a boxed
//! [`providers::DataProvider`] and reports whether a request produced data,
//! produced nothing, or failed.

pub mod client;
pub mod models;
pub mod providers;

pub use client::{FetchOutcome, MarketDataClient};
pub use models::{bar::Bar, symbol::Symbol, time_series::TimeSeries};
pub use providers::{DataSourceError, ProviderInitError, ProviderKind, ProviderSettings};
