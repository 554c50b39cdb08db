//! The request cycle: symbol in, rendered dashboard (or a message) out.

use chrono::NaiveDate;
use market_data_client::{FetchOutcome, MarketDataClient, Symbol};
use tracing::{error, info, warn};

use crate::{errors::RenderError, metrics, presentation::build_view, render::DashboardRenderer};

const GENERIC_ERROR: &str = "Something went wrong while preparing the dashboard. Please try again.";

/// What is currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardState {
    AwaitingInput,
    Displaying { symbol: Symbol },
}

/// Everything one request cycle needs, passed explicitly from fetch to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub symbol: Symbol,
    pub start_date: NaiveDate,
}

/// How a submitted line was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Blank input; nothing happened.
    Ignored,
    Rendered,
    NotFound,
    /// An error message was shown instead of the dashboard.
    Failed,
}

pub struct Dashboard<R: DashboardRenderer> {
    client: MarketDataClient,
    renderer: R,
    start_date: NaiveDate,
    recent_rows: usize,
    state: DashboardState,
}

impl<R: DashboardRenderer> Dashboard<R> {
    pub fn new(client: MarketDataClient, renderer: R, start_date: NaiveDate, recent_rows: usize) -> Self {
        Self {
            client,
            renderer,
            start_date,
            recent_rows,
            state: DashboardState::AwaitingInput,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Runs one request cycle for a line of user input.
    ///
    /// Only a failure to write an error or not-found message escapes; every
    /// data or drawing problem is reported on the renderer and the dashboard
    /// returns to [`DashboardState::AwaitingInput`].
    pub async fn submit(&mut self, input: &str) -> Result<RequestOutcome, RenderError> {
        let Some(symbol) = Symbol::parse(input) else {
            return Ok(RequestOutcome::Ignored);
        };
        let ctx = RequestContext {
            symbol,
            start_date: self.start_date,
        };
        self.run(&ctx).await
    }

    async fn run(&mut self, ctx: &RequestContext) -> Result<RequestOutcome, RenderError> {
        let series = match self.client.fetch(&ctx.symbol, ctx.start_date).await {
            Ok(FetchOutcome::Data(series)) => series,
            Ok(FetchOutcome::Empty(symbol)) => {
                self.state = DashboardState::AwaitingInput;
                self.renderer.render_not_found(&symbol)?;
                return Ok(RequestOutcome::NotFound);
            }
            Err(e) => {
                return self.fail(&format!("could not load data for {}: {e}", ctx.symbol));
            }
        };

        let metrics = match metrics::compute(&series) {
            Ok(m) => m,
            Err(e) => {
                error!(symbol = %ctx.symbol, error = %e, "metrics computed on an empty series");
                return self.fail(GENERIC_ERROR);
            }
        };

        let view = build_view(&series, &metrics, self.recent_rows);
        if let Err(e) = self.renderer.render_dashboard(&view) {
            error!(symbol = %ctx.symbol, error = %e, "dashboard rendering failed");
            return self.fail(&e.to_string());
        }

        info!(symbol = %ctx.symbol, bars = series.len(), "dashboard rendered");
        self.state = DashboardState::Displaying {
            symbol: ctx.symbol.clone(),
        };
        Ok(RequestOutcome::Rendered)
    }

    fn fail(&mut self, message: &str) -> Result<RequestOutcome, RenderError> {
        warn!(message, "request failed");
        self.state = DashboardState::AwaitingInput;
        self.renderer.render_error(message)?;
        Ok(RequestOutcome::Failed)
    }
}
