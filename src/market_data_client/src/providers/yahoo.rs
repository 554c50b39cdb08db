//! Yahoo Finance chart API (`/v8/finance/chart/{symbol}`).
//!
//! Keyless, daily interval only. Unknown symbols come back as HTTP 404 with a
//! `"Not Found"` chart error, which is reported as an empty series.

pub mod provider;
pub mod response;
