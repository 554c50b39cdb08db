//! Interactive stock price dashboard.
//!
//! A submitted ticker goes through one request cycle in [`dashboard`]: fetch
//! the daily history with `market_data_client`, derive [`metrics`], map them
//! into a [`presentation::DashboardView`], and hand that to a
//! [`render::DashboardRenderer`].

pub mod config;
pub mod dashboard;
pub mod errors;
pub mod metrics;
pub mod presentation;
pub mod render;
