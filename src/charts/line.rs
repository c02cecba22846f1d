use std::ops::Range;
use std::path::Path;

use plotters::prelude::*;

use crate::error::{AppError, AppResult, ReportError, ValidationError};

use super::format::format_offset;

const CHART_SIZE: (u32, u32) = (1200, 800);
const MARKER_RADIUS: u32 = 4;
const LINE_WIDTH: u32 = 2;
/// Headroom above the highest point when the y range is not pinned.
const Y_HEADROOM: f64 = 1.1;
/// Fraction of the x span added on each side when the x range is not pinned.
const X_MARGIN: f64 = 0.05;

/// Series colors in draw order.
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// Resolves a `--color` name.
///
/// # Errors
///
/// Returns an error for names outside the supported set.
pub fn parse_color(name: &str) -> Result<RGBColor, ValidationError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "red" => Ok(RED),
        "blue" => Ok(BLUE),
        "green" => Ok(RGBColor(0, 128, 0)),
        "orange" => Ok(RGBColor(255, 165, 0)),
        "black" => Ok(BLACK),
        "purple" => Ok(RGBColor(128, 0, 128)),
        "cyan" => Ok(CYAN),
        "magenta" => Ok(MAGENTA),
        _ => Err(ValidationError::UnknownColor {
            value: name.to_owned(),
        }),
    }
}

/// Color for the series at `index`, cycling through [`PALETTE`].
#[must_use]
pub fn palette_color(index: usize) -> RGBColor {
    PALETTE
        .get(index % PALETTE.len())
        .copied()
        .unwrap_or(BLACK)
}

#[derive(Debug, Clone)]
pub struct ChartSeries {
    /// Legend entry; the legend is drawn only when some series has one.
    pub label: Option<String>,
    pub points: Vec<(f64, f64)>,
    pub color: RGBColor,
}

/// Optional zoom; unset sides follow the data.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisBounds {
    pub xmin: Option<f64>,
    pub xmax: Option<f64>,
    pub ymin: Option<f64>,
    pub ymax: Option<f64>,
}

pub struct LineChart<'chart> {
    pub title: &'chart str,
    pub y_desc: &'chart str,
    pub y_format: fn(f64) -> String,
    pub series: &'chart [ChartSeries],
    pub bounds: AxisBounds,
}

fn data_extent<I>(values: I) -> Option<(f64, f64)>
where
    I: Iterator<Item = f64>,
{
    values.fold(None, |extent, value| match extent {
        None => Some((value, value)),
        Some((lo, hi)) => Some((lo.min(value), hi.max(value))),
    })
}

/// Never returns an empty range; a flat extent is widened by one unit.
fn widen(lo: f64, hi: f64) -> Range<f64> {
    if hi > lo { lo..hi } else { lo..lo + 1.0 }
}

fn x_range(series: &[ChartSeries], bounds: &AxisBounds) -> Option<Range<f64>> {
    let (lo, hi) = data_extent(series.iter().flat_map(|s| s.points.iter().map(|p| p.0)))?;
    let margin = (hi - lo).max(1.0) * X_MARGIN;
    Some(widen(
        bounds.xmin.unwrap_or(lo - margin),
        bounds.xmax.unwrap_or(hi + margin),
    ))
}

fn y_range(series: &[ChartSeries], bounds: &AxisBounds) -> Option<Range<f64>> {
    let (lo, hi) = data_extent(series.iter().flat_map(|s| s.points.iter().map(|p| p.1)))?;
    Some(widen(
        bounds.ymin.unwrap_or_else(|| lo.min(0.0)),
        bounds.ymax.unwrap_or(hi * Y_HEADROOM),
    ))
}

/// Draws `chart` as a PNG at `path`: one line with point markers per
/// series, offsets on the x axis.
///
/// # Errors
///
/// Returns an error when there is nothing to draw or the backend fails.
pub fn draw_line_chart(path: &Path, chart: &LineChart<'_>) -> AppResult<()> {
    let no_points = || {
        AppError::report(ReportError::Draw {
            path: path.to_path_buf(),
            message: "no data points".to_owned(),
        })
    };
    let x_range = x_range(chart.series, &chart.bounds).ok_or_else(no_points)?;
    let y_range = y_range(chart.series, &chart.bounds).ok_or_else(no_points)?;

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut context = ChartBuilder::on(&root)
        .caption(chart.title, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(x_range.clone(), y_range.clone())?;

    let y_format = chart.y_format;
    context
        .configure_mesh()
        .x_desc("OFFSET")
        .y_desc(chart.y_desc)
        .x_label_formatter(&|x| format_offset(*x))
        .y_label_formatter(&|y| y_format(*y))
        .draw()?;

    for series in chart.series {
        let color = series.color;
        let visible: Vec<(f64, f64)> = series
            .points
            .iter()
            .copied()
            .filter(|(x, y)| {
                (x_range.start..=x_range.end).contains(x)
                    && (y_range.start..=y_range.end).contains(y)
            })
            .collect();

        let line = context.draw_series(LineSeries::new(
            visible.iter().copied(),
            color.stroke_width(LINE_WIDTH),
        ))?;
        if let Some(label) = series.label.as_deref() {
            line.label(label).legend(move |(x, y)| {
                PathElement::new(
                    vec![(x, y), (x.saturating_add(20), y)],
                    color.stroke_width(LINE_WIDTH),
                )
            });
        }
        context.draw_series(
            visible
                .iter()
                .map(|point| Circle::new(*point, MARKER_RADIUS, color.filled())),
        )?;
    }

    if chart.series.iter().any(|series| series.label.is_some()) {
        context
            .configure_series_labels()
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()?;
    }

    root.present()?;
    Ok(())
}
