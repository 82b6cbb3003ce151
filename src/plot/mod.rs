//! Diagnostic rendering of the imported acceleration tables.
//!
//! Two charts are stacked on one canvas sharing the time range: linear
//! acceleration on top, rotational acceleration below. The figure is written
//! once as SVG and once as PNG. All styling lives in [`PlotOptions`] and the
//! constants below; nothing is configured process-wide.

use std::fmt::Display;
use std::ops::Range;
use std::path::PathBuf;

use plotters::backend::{BitMapBackend, DrawingBackend, SVGBackend};
use plotters::chart::{ChartBuilder, SeriesLabelPosition};
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::element::PathElement;
use plotters::series::LineSeries;
use plotters::style::colors::{BLACK, WHITE};
use plotters::style::{Color, RGBColor};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::{Result, ToolError};
use crate::model::{ChannelGroup, TimeSeriesTable};

/// forestgreen, steelblue, darkorchid.
pub const LINEAR_PALETTE: [RGBColor; 3] = [
    RGBColor(34, 139, 34),
    RGBColor(70, 130, 180),
    RGBColor(153, 50, 204),
];
/// firebrick, darkorange, gold.
pub const ROTATIONAL_PALETTE: [RGBColor; 3] = [
    RGBColor(178, 34, 34),
    RGBColor(255, 140, 0),
    RGBColor(255, 215, 0),
];

const TIME_LABEL: &str = "Time (ms)";
const LINEAR_LABEL: &str = "Linear Acceleration (mm/ms^2)";
const ROTATIONAL_LABEL: &str = "Rotational Acceleration (rad/ms^2)";

// Sizes below are in points at 100 dpi and get scaled with the output dpi.
const FONT_SIZE: f64 = 10.0;
const MARGIN: f64 = 8.0;
const X_LABEL_AREA: f64 = 35.0;
const Y_LABEL_AREA: f64 = 55.0;
const LEGEND_LINE: f64 = 20.0;
const LINE_WIDTH: f64 = 1.0;

/// Output settings for the diagnostic figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotOptions {
    pub enabled: bool,
    /// Directory receiving the image files.
    pub directory: PathBuf,
    /// File name without extension.
    pub stem: String,
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: PathBuf::from("."),
            stem: "acc".to_string(),
            width_in: 5.0,
            height_in: 5.0,
            dpi: 600,
        }
    }
}

impl PlotOptions {
    /// Canvas size in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        let dpi = f64::from(self.dpi);
        (
            (self.width_in * dpi).round().max(1.0) as u32,
            (self.height_in * dpi).round().max(1.0) as u32,
        )
    }

    /// Paths of the SVG and PNG outputs, in that order.
    pub fn output_paths(&self) -> (PathBuf, PathBuf) {
        (
            self.directory.join(format!("{}.svg", self.stem)),
            self.directory.join(format!("{}.png", self.stem)),
        )
    }

    fn scale(&self) -> f64 {
        f64::from(self.dpi) / 100.0
    }

    fn scaled(&self, size: f64) -> i32 {
        (size * self.scale()).round().max(1.0) as i32
    }
}

/// Renders both tables into `<stem>.svg` and `<stem>.png`.
#[instrument(level = "info", skip_all, fields(directory = %options.directory.display()))]
pub fn render_plots(
    linear: &TimeSeriesTable,
    rotational: &TimeSeriesTable,
    options: &PlotOptions,
) -> Result<Vec<PathBuf>> {
    let (svg_path, png_path) = options.output_paths();
    let size = options.pixel_size();
    debug!(width = size.0, height = size.1, "canvas size");

    let root = SVGBackend::new(&svg_path, size).into_drawing_area();
    draw_figure(root, linear, rotational, options)?;

    let root = BitMapBackend::new(&png_path, size).into_drawing_area();
    draw_figure(root, linear, rotational, options)?;

    info!(svg = %svg_path.display(), png = %png_path.display(), "plots saved");
    Ok(vec![svg_path, png_path])
}

fn draw_figure<DB>(
    root: DrawingArea<DB, Shift>,
    linear: &TimeSeriesTable,
    rotational: &TimeSeriesTable,
    options: &PlotOptions,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(plot_error)?;

    let time_range = time_range(linear, rotational);
    let panels = root.split_evenly((2, 1));
    let last = panels.len().saturating_sub(1);
    for (idx, (area, table)) in panels.iter().zip([linear, rotational]).enumerate() {
        draw_panel(area, table, time_range.clone(), idx == last, options)?;
    }

    root.present().map_err(plot_error)?;
    Ok(())
}

fn draw_panel<DB>(
    area: &DrawingArea<DB, Shift>,
    table: &TimeSeriesTable,
    time_range: Range<f64>,
    label_time_axis: bool,
    options: &PlotOptions,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (palette, y_label) = match table.group {
        ChannelGroup::Linear => (LINEAR_PALETTE, LINEAR_LABEL),
        ChannelGroup::Rotational => (ROTATIONAL_PALETTE, ROTATIONAL_LABEL),
    };
    let (low, high) = table.value_bounds().unwrap_or((-1.0, 1.0));
    let (low, high) = padded_range(low, high);
    let font = ("sans-serif", options.scaled(FONT_SIZE));
    let line_width = options.scaled(LINE_WIDTH) as u32;
    let legend_line = options.scaled(LEGEND_LINE);

    let mut chart = ChartBuilder::on(area)
        .margin(options.scaled(MARGIN))
        .x_label_area_size(options.scaled(X_LABEL_AREA))
        .y_label_area_size(options.scaled(Y_LABEL_AREA))
        .build_cartesian_2d(time_range, low..high)
        .map_err(plot_error)?;

    let x_desc = if label_time_axis { TIME_LABEL } else { "" };
    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_label)
        .label_style(font)
        .axis_desc_style(font)
        .draw()
        .map_err(plot_error)?;

    for (idx, channel) in table.channels.iter().enumerate() {
        let color = palette[idx % palette.len()];
        let points: Vec<(f64, f64)> = table
            .points(idx)
            .filter(|(time, value)| time.is_finite() && value.is_finite())
            .collect();
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(line_width)))
            .map_err(plot_error)?
            .label(channel.name.as_str())
            .legend(move |(x, y)| {
                PathElement::new(
                    vec![(x, y), (x + legend_line, y)],
                    color.stroke_width(line_width),
                )
            });
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(font)
        .position(SeriesLabelPosition::UpperRight)
        .draw()
        .map_err(plot_error)?;

    Ok(())
}

/// Time span covered by both tables.
pub fn time_range(linear: &TimeSeriesTable, rotational: &TimeSeriesTable) -> Range<f64> {
    let bounds = linear
        .time
        .iter()
        .chain(&rotational.time)
        .copied()
        .filter(|t| t.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, t| match acc {
            None => Some((t, t)),
            Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
        });
    match bounds {
        Some((lo, hi)) if hi > lo => lo..hi,
        Some((lo, _)) => lo - 0.5..lo + 0.5,
        None => 0.0..1.0,
    }
}

/// Adds 5% headroom on both sides, or a fixed pad for flat signals.
pub fn padded_range(min_val: f64, max_val: f64) -> (f64, f64) {
    let (min, max) = if min_val <= max_val {
        (min_val, max_val)
    } else {
        (max_val, min_val)
    };
    let span = max - min;
    let padding = if span < 1e-9 { 0.5 } else { span * 0.05 };
    (min - padding, max + padding)
}

fn plot_error(error: impl Display) -> ToolError {
    ToolError::Plot(error.to_string())
}
