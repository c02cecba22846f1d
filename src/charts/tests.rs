use tempfile::tempdir;

use super::*;
use crate::error::{AppError, AppResult, ReportError};

#[test]
fn offsets_format_as_k_and_m() -> Result<(), String> {
    let cases = [
        (0.0, "0"),
        (999.0, "999"),
        (1_000.0, "1k"),
        (50_000.0, "50k"),
        (1_000_000.0, "1M"),
        (1_500_000.0, "1.5M"),
        (9_000_000.0, "9M"),
    ];
    for (value, expected) in cases {
        let formatted = format_offset(value);
        if formatted != expected {
            return Err(format!("{} -> {}, expected {}", value, formatted, expected));
        }
    }
    Ok(())
}

#[test]
fn milliseconds_switch_to_seconds() -> Result<(), String> {
    let cases = [
        (500.0, "500ms"),
        (999.9, "999ms"),
        (1_000.0, "1s"),
        (1_500.0, "1.5s"),
        (10_000.0, "10s"),
        (42_000.0, "42s"),
    ];
    for (value, expected) in cases {
        let formatted = format_ms_as_s(value);
        if formatted != expected {
            return Err(format!("{} -> {}, expected {}", value, formatted, expected));
        }
    }
    Ok(())
}

#[test]
fn named_colors_resolve() -> Result<(), String> {
    for name in ["red", "Orange", "purple", "cyan"] {
        parse_color(name)?;
    }
    if parse_color("chartreuse").is_ok() {
        return Err("Expected unknown color to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn draw_line_chart_writes_png() -> AppResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("chart.png");
    let series = [
        ChartSeries {
            label: Some("no_index".to_owned()),
            points: vec![(0.0, 12.0), (10_000.0, 40.0), (1_000_000.0, 2_400.0)],
            color: palette_color(0),
        },
        ChartSeries {
            label: Some("idx".to_owned()),
            points: vec![(0.0, 10.0), (10_000.0, 11.0), (1_000_000.0, 13.0)],
            color: palette_color(1),
        },
    ];
    draw_line_chart(
        &path,
        &LineChart {
            title: "OFFSET vs latency",
            y_desc: "Latency",
            y_format: format_ms_as_s,
            series: &series,
            bounds: AxisBounds {
                xmax: Some(100_000.0),
                ..AxisBounds::default()
            },
        },
    )?;
    if !path.exists() {
        return Err(AppError::report(ReportError::from("Chart file was not written")));
    }
    Ok(())
}

#[test]
fn draw_line_chart_rejects_empty_series() -> AppResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("empty.png");
    let series = [ChartSeries {
        label: None,
        points: Vec::new(),
        color: palette_color(0),
    }];
    let result = draw_line_chart(
        &path,
        &LineChart {
            title: "empty",
            y_desc: "ms",
            y_format: format_plain,
            series: &series,
            bounds: AxisBounds::default(),
        },
    );
    match result {
        Err(AppError::Report(ReportError::Draw { .. })) => Ok(()),
        Err(err) => Err(err),
        Ok(()) => Err(AppError::report(ReportError::from(
            "Expected an error for a chart without points",
        ))),
    }
}
