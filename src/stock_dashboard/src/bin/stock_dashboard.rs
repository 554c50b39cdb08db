use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use market_data_client::{MarketDataClient, ProviderKind};
use stock_dashboard::{
    config::{ConfigOverrides, DashboardConfig},
    dashboard::Dashboard,
    render::{charts::PngChartWriter, terminal::TerminalRenderer},
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "stock_dashboard=info,market_data_client=info";

#[derive(Parser)]
#[command(version, about = "Stock price dashboard")]
struct Cli {
    /// TOML config file; defaults to $STOCK_DASHBOARD_CONFIG when set.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Render one symbol and exit instead of prompting.
    #[arg(long)]
    symbol: Option<String>,

    /// Data provider: yahoo or alpaca.
    #[arg(long)]
    provider: Option<ProviderKind>,

    /// First date of the history, YYYY-MM-DD.
    #[arg(long, value_name = "DATE")]
    start: Option<NaiveDate>,

    /// Directory the chart images are written to.
    #[arg(long, value_name = "DIR")]
    chart_dir: Option<PathBuf>,

    /// Skip writing chart images.
    #[arg(long)]
    no_charts: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = DashboardConfig::resolve(cli.config.as_deref()).context("loading configuration")?;
    config.apply_overrides(ConfigOverrides {
        provider: cli.provider,
        start_date: cli.start,
        chart_dir: cli.chart_dir,
        no_charts: cli.no_charts,
    });
    config.validate()?;

    let client = MarketDataClient::from_settings(&config.provider_settings())
        .with_context(|| format!("initializing {} provider", config.data.provider))?;
    info!(
        provider = client.provider_name(),
        start = %config.data.start_date,
        charts = config.display.charts,
        "dashboard ready"
    );

    let mut renderer = TerminalRenderer::new(io::stdout()).show_table(config.display.show_table);
    if config.display.charts {
        renderer = renderer.with_charts(Box::new(PngChartWriter::new(
            config.display.chart_dir.clone(),
            config.display.chart_width,
            config.display.chart_height,
        )));
    }
    let mut dashboard = Dashboard::new(
        client,
        renderer,
        config.data.start_date,
        config.display.recent_rows,
    );

    if let Some(symbol) = cli.symbol {
        dashboard.submit(&symbol).await?;
        return Ok(());
    }

    dashboard.renderer_mut().render_banner()?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        dashboard.renderer_mut().render_prompt()?;
        let Some(line) = lines.next_line().await.context("reading from stdin")? else {
            break;
        };
        let input = line.trim();
        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            break;
        }
        dashboard.submit(input).await?;
    }

    info!("dashboard closed");
    Ok(())
}
