//! Output side of the dashboard.
//!
//! The dashboard only talks to [`DashboardRenderer`]; the terminal renderer
//! and the PNG chart writer are the implementations shipped with the binary.

pub mod charts;
pub mod table;
pub mod terminal;

use market_data_client::Symbol;

use crate::{errors::RenderError, presentation::DashboardView};

/// Surface the dashboard draws on.
///
/// Each call renders one complete outcome of a request; implementations must
/// not leave half a dashboard behind when they fail.
pub trait DashboardRenderer {
    fn render_dashboard(&mut self, view: &DashboardView) -> Result<(), RenderError>;

    fn render_not_found(&mut self, symbol: &Symbol) -> Result<(), RenderError>;

    fn render_error(&mut self, message: &str) -> Result<(), RenderError>;
}

/// Destination for the three chart panels of a dashboard.
pub trait ChartSink {
    /// What a successful write produces, e.g. the paths of the written files.
    type Output;

    fn write(&self, view: &DashboardView) -> Result<Self::Output, RenderError>;
}
