use std::path::{Path, PathBuf};

use tracing::info;

use crate::args::{CompareArgs, PlotArgs, ReportArgs};
use crate::charts::{
    AxisBounds, ChartSeries, LineChart, draw_line_chart, format_ms_as_s, format_plain,
    palette_color, parse_color,
};
use crate::error::{AppError, AppResult, ReportError};

use super::offset_csv::{read_offset_ms_csv, write_medians_csv};
use super::samples::{OffsetMedians, group_medians, load_samples};

/// `_<tag>` for output filenames, empty without a tag.
#[must_use]
pub fn tag_suffix(tag: &str) -> String {
    let tag = tag.trim();
    if tag.is_empty() {
        String::new()
    } else {
        format!("_{}", tag)
    }
}

/// ` - <tag>` for chart titles, empty without a tag.
#[must_use]
pub fn title_suffix(tag: &str) -> String {
    let tag = tag.trim();
    if tag.is_empty() {
        String::new()
    } else {
        format!(" - {}", tag)
    }
}

fn create_output_dir(dir: &Path) -> AppResult<()> {
    std::fs::create_dir_all(dir)?;
    Ok(())
}

fn offset_points(rows: &[OffsetMedians], pick: fn(&OffsetMedians) -> f64) -> Vec<(f64, f64)> {
    rows.iter()
        .map(|row| (row.offset as f64, pick(row)))
        .collect()
}

fn print_generated(paths: &[PathBuf]) {
    println!("Generated:");
    for path in paths {
        println!("{}", path.display());
    }
}

/// `report`: medians per offset from a directory of run summaries.
///
/// # Errors
///
/// Returns an error when the summaries cannot be loaded or an output cannot
/// be written.
pub fn run_report(args: &ReportArgs) -> AppResult<()> {
    let samples = load_samples(Path::new(&args.input_dir))?;
    let rows = group_medians(&samples);
    for row in &rows {
        info!(
            "offset={} runs={} p50={:.3}ms p95={:.3}ms tps={:.3}",
            row.offset, row.runs, row.p50_ms, row.p95_ms, row.tps
        );
    }

    let output_dir = Path::new(&args.output_dir);
    create_output_dir(output_dir)?;
    let suffix = tag_suffix(&args.tag);
    let title_tag = title_suffix(&args.tag);

    let charts = [
        (
            format!("offset_vs_p50{}.png", suffix),
            format!("OFFSET vs latency (p50, median of runs){}", title_tag),
            "Latency (ms)",
            offset_points(&rows, |row| row.p50_ms),
        ),
        (
            format!("offset_vs_p95{}.png", suffix),
            format!("OFFSET vs latency (p95, median of runs){}", title_tag),
            "Latency (ms)",
            offset_points(&rows, |row| row.p95_ms),
        ),
        (
            format!("offset_vs_tps{}.png", suffix),
            format!("OFFSET vs TPS (http_reqs.rate, median of runs){}", title_tag),
            "TPS (req/s)",
            offset_points(&rows, |row| row.tps),
        ),
    ];

    let mut generated = Vec::with_capacity(charts.len().saturating_add(1));
    for (file_name, title, y_desc, points) in charts {
        let path = output_dir.join(file_name);
        let series = [ChartSeries {
            label: None,
            points,
            color: palette_color(0),
        }];
        draw_line_chart(
            &path,
            &LineChart {
                title: &title,
                y_desc,
                y_format: format_plain,
                series: &series,
                bounds: AxisBounds::default(),
            },
        )?;
        generated.push(path);
    }

    let csv_path = output_dir.join(format!("offset_medians{}.csv", suffix));
    write_medians_csv(&csv_path, &rows)?;
    generated.push(csv_path);

    print_generated(&generated);
    Ok(())
}

/// `compare`: p50/p95 medians of several summary directories on one chart.
///
/// # Errors
///
/// Returns an error when any series cannot be loaded or a chart cannot be
/// drawn.
pub fn run_compare(args: &CompareArgs) -> AppResult<()> {
    let mut p50_series = Vec::with_capacity(args.series.len());
    let mut p95_series = Vec::with_capacity(args.series.len());
    for (index, spec) in args.series.iter().enumerate() {
        let rows = group_medians(&load_samples(&spec.path)?);
        let label = spec.display_label();
        info!(
            "series '{}': {} offset(s) from {}",
            label,
            rows.len(),
            spec.path.display()
        );
        p50_series.push(ChartSeries {
            label: Some(label.clone()),
            points: offset_points(&rows, |row| row.p50_ms),
            color: palette_color(index),
        });
        p95_series.push(ChartSeries {
            label: Some(label),
            points: offset_points(&rows, |row| row.p95_ms),
            color: palette_color(index),
        });
    }

    let output_dir = Path::new(&args.output_dir);
    create_output_dir(output_dir)?;
    let suffix = tag_suffix(&args.tag);

    let mut generated = Vec::with_capacity(2);
    for (name, title, series) in [
        ("p50", "OFFSET vs latency (p50, median of runs)", &p50_series),
        ("p95", "OFFSET vs latency (p95, median of runs)", &p95_series),
    ] {
        let path = output_dir.join(format!("offset_vs_{}_compare{}.png", name, suffix));
        draw_line_chart(
            &path,
            &LineChart {
                title,
                y_desc: "Latency",
                y_format: format_ms_as_s,
                series,
                bounds: AxisBounds::default(),
            },
        )?;
        generated.push(path);
    }

    print_generated(&generated);
    Ok(())
}

/// `plot`: one chart from one or more `offset,ms` CSV files.
///
/// # Errors
///
/// Returns an error for an unknown color, an unreadable CSV, or a drawing
/// failure.
pub fn run_plot(args: &PlotArgs) -> AppResult<()> {
    let first_color = args.color.as_deref().map(parse_color).transpose()?;
    let labelled = args.series.len() > 1;

    let mut series = Vec::with_capacity(args.series.len());
    for (index, spec) in args.series.iter().enumerate() {
        let points = read_offset_ms_csv(&spec.path)?;
        let color = first_color
            .filter(|_| index == 0)
            .unwrap_or_else(|| palette_color(index));
        series.push(ChartSeries {
            label: (labelled || spec.label.is_some()).then(|| spec.display_label()),
            points,
            color,
        });
    }

    let output = PathBuf::from(&args.output);
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        create_output_dir(parent)?;
    }

    if let (Some(min), Some(max)) = (args.xmin, args.xmax)
        && min >= max
    {
        return Err(AppError::report(ReportError::Draw {
            path: output,
            message: format!("xmin {} must be below xmax {}", min, max),
        }));
    }
    if let (Some(min), Some(max)) = (args.ymin, args.ymax)
        && min >= max
    {
        return Err(AppError::report(ReportError::Draw {
            path: output,
            message: format!("ymin {} must be below ymax {}", min, max),
        }));
    }

    draw_line_chart(
        &output,
        &LineChart {
            title: &args.title,
            y_desc: "Elapsed time",
            y_format: format_ms_as_s,
            series: &series,
            bounds: AxisBounds {
                xmin: args.xmin,
                xmax: args.xmax,
                ymin: args.ymin,
                ymax: args.ymax,
            },
        },
    )?;

    print_generated(&[output]);
    Ok(())
}
