use std::{io::Write, path::PathBuf};

use market_data_client::Symbol;
use tracing::debug;

use crate::{
    errors::RenderError,
    presentation::{DashboardView, TableRow, VolumeColor, format_price},
    render::{ChartSink, DashboardRenderer, table::Table},
};

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const SPARK_WIDTH: usize = 60;

pub type BoxedChartSink = Box<dyn ChartSink<Output = Vec<PathBuf>>>;

/// Draws the dashboard as text on any writer, optionally saving chart images.
pub struct TerminalRenderer<W: Write> {
    out: W,
    charts: Option<BoxedChartSink>,
    show_table: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            charts: None,
            show_table: true,
        }
    }

    pub fn with_charts(mut self, charts: BoxedChartSink) -> Self {
        self.charts = Some(charts);
        self
    }

    pub fn show_table(mut self, show: bool) -> Self {
        self.show_table = show;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Title banner and usage hint shown before the first prompt.
    pub fn render_banner(&mut self) -> Result<(), RenderError> {
        writeln!(self.out, "Stock Price Dashboard")?;
        writeln!(self.out, "=====================")?;
        writeln!(
            self.out,
            "Enter a stock symbol (examples: AAPL, TSLA, TCS.NS). Type 'quit' to exit."
        )?;
        self.out.flush()?;
        Ok(())
    }

    pub fn render_prompt(&mut self) -> Result<(), RenderError> {
        write!(self.out, "\nStock Symbol> ")?;
        self.out.flush()?;
        Ok(())
    }

    fn compose(&self, view: &DashboardView, chart_paths: &[PathBuf]) -> String {
        let mut text = String::new();
        text.push_str(&format!("\n=== {} ===\n\n", view.symbol));

        let label_width = view.cards.iter().map(|c| c.label.len()).max().unwrap_or(0);
        for card in &view.cards {
            let delta = card
                .delta
                .as_ref()
                .map(|d| format!("  ({d})"))
                .unwrap_or_default();
            text.push_str(&format!(
                "  {:<label_width$}  {:>12}{delta}\n",
                card.label, card.value
            ));
        }

        let closes: Vec<f64> = view.trend.iter().map(|(_, c)| *c).collect();
        if let (Some((first, _)), Some((last, _))) = (view.trend.first(), view.trend.last()) {
            text.push_str(&format!("\nClosing price ({first} to {last})\n  {}\n", sparkline(&closes)));
        }

        let volumes: Vec<f64> = view.volume.iter().map(|v| v.volume as f64).collect();
        let up_days = view
            .volume
            .iter()
            .filter(|v| v.color == VolumeColor::Green)
            .count();
        text.push_str(&format!(
            "\nVolume ({} up days, {} down days)\n  {}\n",
            up_days,
            view.volume.len() - up_days,
            sparkline(&volumes)
        ));

        let latest = |points: &[(chrono::NaiveDate, Option<f64>)]| {
            points
                .last()
                .and_then(|(_, v)| *v)
                .map_or_else(|| "n/a".to_string(), format_price)
        };
        text.push_str(&format!(
            "\nMoving averages: MA20 {}  MA50 {}\n",
            latest(&view.overlay.ma20),
            latest(&view.overlay.ma50)
        ));

        if !chart_paths.is_empty() {
            text.push_str("\nCharts:\n");
            for path in chart_paths {
                text.push_str(&format!("  {}\n", path.display()));
            }
        }

        if self.show_table {
            text.push_str(&format!("\nRecent data (last {} rows)\n", view.recent.len()));
            let mut table = Table::new(&TableRow::HEADERS).right_align(&[1, 2, 3, 4, 5]);
            for row in &view.recent {
                table.add_row(&row.cells());
            }
            text.push_str(&table.render());
        } else {
            text.push_str(&format!(
                "\nRecent data: {} rows hidden (display.show_table = false)\n",
                view.recent.len()
            ));
        }
        text
    }
}

impl<W: Write> DashboardRenderer for TerminalRenderer<W> {
    fn render_dashboard(&mut self, view: &DashboardView) -> Result<(), RenderError> {
        // Charts first, so a drawing failure leaves the terminal untouched.
        let chart_paths = match &self.charts {
            Some(sink) => sink.write(view)?,
            None => Vec::new(),
        };
        debug!(symbol = %view.symbol, charts = chart_paths.len(), "rendering dashboard");

        let text = self.compose(view, &chart_paths);
        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    fn render_not_found(&mut self, symbol: &Symbol) -> Result<(), RenderError> {
        writeln!(
            self.out,
            "No data found for '{symbol}'. Check the symbol and try again."
        )?;
        self.out.flush()?;
        Ok(())
    }

    fn render_error(&mut self, message: &str) -> Result<(), RenderError> {
        writeln!(self.out, "Error: {message}")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Compresses `values` into at most [`SPARK_WIDTH`] block characters.
///
/// Each character averages one bucket of consecutive values. A flat series
/// renders at mid height.
pub fn sparkline(values: &[f64]) -> String {
    if values.is_empty() {
        return String::new();
    }

    let buckets = values.len().min(SPARK_WIDTH);
    let averaged: Vec<f64> = (0..buckets)
        .map(|b| {
            let start = b * values.len() / buckets;
            let end = ((b + 1) * values.len() / buckets).max(start + 1);
            let slice = &values[start..end];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect();

    let min = averaged.iter().copied().fold(f64::INFINITY, f64::min);
    let max = averaged.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let top = SPARK_LEVELS.len() - 1;

    averaged
        .iter()
        .map(|v| {
            if max - min <= f64::EPSILON {
                SPARK_LEVELS[top / 2]
            } else {
                let level = ((v - min) / (max - min) * top as f64).round() as usize;
                SPARK_LEVELS[level.min(top)]
            }
        })
        .collect()
}
