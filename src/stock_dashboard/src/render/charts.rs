//! PNG rendering of the trend, volume and moving-average panels.
//!
//! The x axis is the bar index rather than the calendar date, so weekends and
//! holidays do not leave gaps; tick labels map indices back to dates.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use plotters::prelude::*;
use tracing::debug;

use crate::{
    errors::RenderError,
    presentation::{DashboardView, VolumeColor},
    render::ChartSink,
};

const MA20_COLOR: RGBColor = RGBColor(255, 140, 0);
const MA50_COLOR: RGBColor = MAGENTA;

/// Writes `<SYMBOL>_trend.png`, `<SYMBOL>_volume.png` and
/// `<SYMBOL>_moving_averages.png` into `dir`, replacing older files.
#[derive(Debug, Clone)]
pub struct PngChartWriter {
    dir: PathBuf,
    width: u32,
    height: u32,
}

impl PngChartWriter {
    pub fn new(dir: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            dir: dir.into(),
            width,
            height,
        }
    }

    fn draw_trend(&self, view: &DashboardView, path: &Path) -> Result<(), RenderError> {
        let err = chart_error("trend");
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(&err)?;

        let dates: Vec<NaiveDate> = view.trend.iter().map(|(d, _)| *d).collect();
        let (y_min, y_max) = padded_range(view.trend.iter().map(|(_, c)| *c));
        let label = |x: &f64| date_label(&dates, *x);

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("{} Closing Price", view.symbol), ("sans-serif", 28.0).into_font())
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range(dates.len()), y_min..y_max)
            .map_err(&err)?;

        chart
            .configure_mesh()
            .x_labels(8)
            .x_label_formatter(&label)
            .y_desc("Close")
            .draw()
            .map_err(&err)?;

        chart
            .draw_series(
                AreaSeries::new(
                    view.trend.iter().enumerate().map(|(i, (_, c))| (i as f64, *c)),
                    y_min,
                    &BLUE.mix(0.2),
                )
                .border_style(&BLUE),
            )
            .map_err(&err)?;

        root.present().map_err(&err)?;
        Ok(())
    }

    fn draw_volume(&self, view: &DashboardView, path: &Path) -> Result<(), RenderError> {
        let err = chart_error("volume");
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(&err)?;

        let dates: Vec<NaiveDate> = view.volume.iter().map(|v| v.date).collect();
        let max_volume = view.volume.iter().map(|v| v.volume).max().unwrap_or(0) as f64;
        let y_max = (max_volume * 1.1).max(1.0);
        let label = |x: &f64| date_label(&dates, *x);

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("{} Trading Volume", view.symbol), ("sans-serif", 28.0).into_font())
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(80)
            .build_cartesian_2d(x_range(dates.len()), 0f64..y_max)
            .map_err(&err)?;

        chart
            .configure_mesh()
            .x_labels(8)
            .x_label_formatter(&label)
            .y_desc("Volume")
            .draw()
            .map_err(&err)?;

        chart
            .draw_series(view.volume.iter().enumerate().map(|(i, bar)| {
                let x = i as f64;
                let color = match bar.color {
                    VolumeColor::Green => GREEN,
                    VolumeColor::Red => RED,
                };
                Rectangle::new([(x - 0.4, 0.0), (x + 0.4, bar.volume as f64)], color.filled())
            }))
            .map_err(&err)?;

        root.present().map_err(&err)?;
        Ok(())
    }

    fn draw_moving_averages(&self, view: &DashboardView, path: &Path) -> Result<(), RenderError> {
        let err = chart_error("moving averages");
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(&err)?;

        let overlay = &view.overlay;
        let dates: Vec<NaiveDate> = overlay.close.iter().map(|(d, _)| *d).collect();
        let ma20: Vec<Option<f64>> = overlay.ma20.iter().map(|(_, v)| *v).collect();
        let ma50: Vec<Option<f64>> = overlay.ma50.iter().map(|(_, v)| *v).collect();
        let (y_min, y_max) = padded_range(
            overlay
                .close
                .iter()
                .map(|(_, c)| *c)
                .chain(ma20.iter().chain(&ma50).flatten().copied()),
        );
        let label = |x: &f64| date_label(&dates, *x);

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("{} Moving Averages", view.symbol), ("sans-serif", 28.0).into_font())
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range(dates.len()), y_min..y_max)
            .map_err(&err)?;

        chart
            .configure_mesh()
            .x_labels(8)
            .x_label_formatter(&label)
            .y_desc("Price")
            .draw()
            .map_err(&err)?;

        chart
            .draw_series(LineSeries::new(
                overlay.close.iter().enumerate().map(|(i, (_, c))| (i as f64, *c)),
                &BLUE,
            ))
            .map_err(&err)?
            .label("Close")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

        for (name, values, color) in [("MA20", &ma20, MA20_COLOR), ("MA50", &ma50, MA50_COLOR)] {
            // Undefined stretches break the line instead of dropping to zero.
            for (n, segment) in defined_segments(values).into_iter().enumerate() {
                let anno = chart
                    .draw_series(LineSeries::new(segment, &color))
                    .map_err(&err)?;
                if n == 0 {
                    anno.label(name)
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
                }
            }
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(&err)?;

        root.present().map_err(&err)?;
        Ok(())
    }
}

impl ChartSink for PngChartWriter {
    type Output = Vec<PathBuf>;

    fn write(&self, view: &DashboardView) -> Result<Self::Output, RenderError> {
        if view.trend.is_empty() {
            return Ok(Vec::new());
        }
        fs::create_dir_all(&self.dir)?;

        let symbol = view.symbol.as_str();
        let panels = ["trend", "volume", "moving_averages"].map(|panel| {
            let target = self.dir.join(chart_file_name(symbol, panel));
            (target, staging_path(&self.dir, symbol, panel))
        });

        let drawn = self
            .draw_trend(view, &panels[0].1)
            .and_then(|()| self.draw_volume(view, &panels[1].1))
            .and_then(|()| self.draw_moving_averages(view, &panels[2].1));
        if let Err(e) = drawn {
            discard(panels.iter().map(|(_, staging)| staging.as_path()));
            return Err(e);
        }

        publish(&panels)?;
        debug!(symbol = %view.symbol, dir = %self.dir.display(), "charts written");
        Ok(panels.into_iter().map(|(target, _)| target).collect())
    }
}

/// Moves every staged file onto its target, so readers only ever see a
/// complete set from one run.
fn publish(panels: &[(PathBuf, PathBuf)]) -> Result<(), RenderError> {
    for (target, staging) in panels {
        if let Err(e) = fs::rename(staging, target) {
            discard(panels.iter().map(|(_, staging)| staging.as_path()));
            return Err(e.into());
        }
    }
    Ok(())
}

/// Hidden sibling of the final file; keeps the `.png` suffix the backend
/// uses to pick the encoder.
fn staging_path(dir: &Path, symbol: &str, panel: &str) -> PathBuf {
    dir.join(format!(".{}.tmp.png", chart_file_name(symbol, panel)))
}

fn discard<'a>(paths: impl Iterator<Item = &'a Path>) {
    for path in paths {
        // Missing files are expected for panels never drawn.
        let _ = fs::remove_file(path);
    }
}

fn chart_error<E: std::fmt::Display>(chart: &'static str) -> impl Fn(E) -> RenderError {
    move |e| RenderError::Chart {
        chart,
        message: e.to_string(),
    }
}

/// `<SYMBOL>_<panel>.png`, with anything outside `[A-Za-z0-9._-]` replaced by `_`.
pub fn chart_file_name(symbol: &str, panel: &str) -> String {
    let safe: String = symbol
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{safe}_{panel}.png")
}

/// Splits a series with gaps into runs of consecutive defined points, keyed
/// by index.
pub fn defined_segments(values: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for (i, value) in values.iter().enumerate() {
        match value {
            Some(v) => current.push((i as f64, *v)),
            None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Half a bar of padding on each side keeps single-bar charts non-degenerate.
fn x_range(len: usize) -> std::ops::Range<f64> {
    -0.5..(len.max(1) as f64 - 0.5)
}

/// Min and max with ten percent headroom; a flat series gets one unit.
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let pad = if max > min { (max - min) * 0.1 } else { 1.0 };
    (min - pad, max + pad)
}

fn date_label(dates: &[NaiveDate], x: f64) -> String {
    let rounded = x.round();
    if rounded < 0.0 {
        return String::new();
    }
    dates
        .get(rounded as usize)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
