use std::path::{Path, PathBuf};

use tempfile::tempdir;

use super::*;
use crate::args::{CompareArgs, PlotArgs, ReportArgs, SeriesSpec};
use crate::error::{AppError, AppResult, ReportError};

fn write(path: &Path, content: &str) -> Result<(), String> {
    std::fs::write(path, content).map_err(|err| format!("write {}: {}", path.display(), err))
}

fn summary_json(med: f64, p95: f64, rate: f64) -> String {
    format!(
        r#"{{"metrics":{{"http_req_duration":{{"avg":1,"med":{},"p(95)":{}}},"http_reqs":{{"count":10,"rate":{}}}}}}}"#,
        med, p95, rate
    )
}

fn write_summaries(dir: &Path) -> Result<(), String> {
    write(&dir.join("offset_0_run1.json"), &summary_json(10.0, 20.0, 100.0))?;
    write(&dir.join("offset_0_run2.json"), &summary_json(14.0, 30.0, 90.0))?;
    write(&dir.join("offset_0_run3.json"), &summary_json(12.0, 25.0, 95.0))?;
    write(&dir.join("offset_10000_run1.json"), &summary_json(40.0, 80.0, 50.0))?;
    write(&dir.join("offset_10000_run2.json"), &summary_json(60.0, 90.0, 40.0))?;
    write(&dir.join("notes.txt"), "ignored")
}

#[test]
fn summary_file_names_parse() -> Result<(), String> {
    if parse_summary_file_name("offset_10000_run2.json")? != Some((10_000, 2)) {
        return Err("Expected offset 10000 run 2".to_owned());
    }
    if parse_summary_file_name("summary.json")?.is_some() {
        return Err("Expected unrelated file to be skipped".to_owned());
    }
    match parse_summary_file_name("offset_abc_run1.json") {
        Err(ReportError::UnexpectedFileName { name }) if name == "offset_abc_run1.json" => Ok(()),
        other => Err(format!("Expected UnexpectedFileName, got {:?}", other)),
    }
}

#[test]
fn median_handles_odd_and_even_counts() -> Result<(), String> {
    if (median(&[3.0, 1.0, 2.0]) - 2.0).abs() > f64::EPSILON {
        return Err("odd median".to_owned());
    }
    if (median(&[4.0, 1.0, 3.0, 2.0]) - 2.5).abs() > f64::EPSILON {
        return Err("even median".to_owned());
    }
    if median(&[]) != 0.0 {
        return Err("empty median".to_owned());
    }
    Ok(())
}

#[test]
fn load_samples_groups_medians_by_offset() -> Result<(), String> {
    let dir = tempdir().map_err(|err| err.to_string())?;
    write_summaries(dir.path())?;

    let samples = load_samples(dir.path())?;
    if samples.len() != 5 {
        return Err(format!("Expected 5 samples, got {}", samples.len()));
    }
    let rows = group_medians(&samples);
    let expected = [
        OffsetMedians {
            offset: 0,
            runs: 3,
            p50_ms: 12.0,
            p95_ms: 25.0,
            tps: 95.0,
        },
        OffsetMedians {
            offset: 10_000,
            runs: 2,
            p50_ms: 50.0,
            p95_ms: 85.0,
            tps: 45.0,
        },
    ];
    if rows != expected {
        return Err(format!("Unexpected medians: {:?}", rows));
    }

    let csv_path = dir.path().join("medians.csv");
    write_medians_csv(&csv_path, &rows)?;
    let csv = std::fs::read_to_string(&csv_path).map_err(|err| err.to_string())?;
    let mut lines = csv.lines();
    if lines.next() != Some(MEDIANS_HEADER.join(",").as_str())
        || !lines.any(|line| line == "10000,2,50.000,85.000,45.000")
    {
        return Err(format!("Unexpected CSV: {}", csv));
    }
    Ok(())
}

#[test]
fn load_samples_requires_matching_files() -> Result<(), String> {
    let dir = tempdir().map_err(|err| err.to_string())?;
    write(&dir.path().join("other.json"), "{}")?;
    match load_samples(dir.path()) {
        Err(ReportError::NoInputFiles { pattern }) if pattern.ends_with("offset_*_run*.json") => {
            Ok(())
        }
        other => Err(format!("Expected NoInputFiles, got {:?}", other)),
    }
}

#[test]
fn read_sample_reports_missing_metric() -> Result<(), String> {
    let dir = tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("offset_0_run1.json");
    write(&path, r#"{"metrics":{"http_req_duration":{"med":5}}}"#)?;
    match read_sample(&path, 0, 1) {
        Err(ReportError::MissingMetric { metric, .. }) if metric == "http_req_duration.p(95)" => {
            Ok(())
        }
        other => Err(format!("Expected MissingMetric, got {:?}", other)),
    }
}

#[test]
fn offset_ms_csv_reads_and_rejects() -> Result<(), String> {
    let dir = tempdir().map_err(|err| err.to_string())?;
    let good = dir.path().join("good.csv");
    write(&good, "offset,ms\n0,12.5\n1000000, 2400\n")?;
    if read_offset_ms_csv(&good)? != vec![(0.0, 12.5), (1_000_000.0, 2_400.0)] {
        return Err("Unexpected CSV points".to_owned());
    }

    let reordered = dir.path().join("reordered.csv");
    write(&reordered, "ms,offset\n7,50000\n")?;
    if read_offset_ms_csv(&reordered)? != vec![(50_000.0, 7.0)] {
        return Err("Column order should not matter".to_owned());
    }

    let quoted = dir.path().join("quoted.csv");
    write(&quoted, "\"offset\",\"ms\"\n1000,\"12.5\"\n")?;
    if read_offset_ms_csv(&quoted)? != vec![(1_000.0, 12.5)] {
        return Err("Quoted fields should be unquoted".to_owned());
    }

    let empty = dir.path().join("empty.csv");
    write(&empty, "offset,ms\n")?;
    if !matches!(read_offset_ms_csv(&empty), Err(ReportError::EmptyCsv { .. })) {
        return Err("Expected EmptyCsv".to_owned());
    }

    let bad = dir.path().join("bad.csv");
    write(&bad, "offset,ms\n10,fast\n")?;
    match read_offset_ms_csv(&bad) {
        Err(ReportError::InvalidCsvRow { line: 2, .. }) => Ok(()),
        other => Err(format!("Expected InvalidCsvRow on line 2, got {:?}", other)),
    }
}

#[test]
fn tag_suffixes() -> Result<(), String> {
    if !tag_suffix("").is_empty() || tag_suffix("no_index") != "_no_index" {
        return Err("Unexpected filename suffix".to_owned());
    }
    if title_suffix(" idx ") != " - idx" {
        return Err("Unexpected title suffix".to_owned());
    }
    Ok(())
}

#[test]
fn report_writes_charts_and_medians() -> AppResult<()> {
    let input = tempdir()?;
    let output = tempdir()?;
    write_summaries(input.path())?;

    run_report(&ReportArgs {
        input_dir: input.path().display().to_string(),
        output_dir: output.path().display().to_string(),
        tag: "no_index".to_owned(),
    })?;

    for name in [
        "offset_vs_p50_no_index.png",
        "offset_vs_p95_no_index.png",
        "offset_vs_tps_no_index.png",
        "offset_medians_no_index.csv",
    ] {
        if !output.path().join(name).exists() {
            return Err(AppError::report(ReportError::from(format!(
                "Missing report output {}",
                name
            ))));
        }
    }
    Ok(())
}

#[test]
fn compare_writes_one_chart_per_percentile() -> AppResult<()> {
    let first = tempdir()?;
    let second = tempdir()?;
    let output = tempdir()?;
    write_summaries(first.path())?;
    write_summaries(second.path())?;

    run_compare(&CompareArgs {
        series: vec![
            SeriesSpec {
                label: Some("two_step".to_owned()),
                path: first.path().to_path_buf(),
            },
            SeriesSpec {
                label: Some("keyset".to_owned()),
                path: second.path().to_path_buf(),
            },
        ],
        output_dir: output.path().display().to_string(),
        tag: String::new(),
    })?;

    for name in ["offset_vs_p50_compare.png", "offset_vs_p95_compare.png"] {
        if !output.path().join(name).exists() {
            return Err(AppError::report(ReportError::from(format!(
                "Missing compare output {}",
                name
            ))));
        }
    }
    Ok(())
}

fn plot_args(series: Vec<SeriesSpec>, output: PathBuf) -> PlotArgs {
    PlotArgs {
        series,
        output: output.display().to_string(),
        title: "OFFSET vs elapsed time".to_owned(),
        color: Some("orange".to_owned()),
        xmin: None,
        xmax: Some(2_000_000.0),
        ymin: Some(0.0),
        ymax: None,
    }
}

#[test]
fn plot_draws_csv_series() -> AppResult<()> {
    let dir = tempdir()?;
    let csv = dir.path().join("manual.csv");
    write(&csv, "offset,ms\n0,20\n1000000,1500\n2000000,9000\n")?;
    let output = dir.path().join("charts").join("manual.png");

    run_plot(&plot_args(
        vec![SeriesSpec {
            label: None,
            path: csv,
        }],
        output.clone(),
    ))?;
    if !output.exists() {
        return Err(AppError::report(ReportError::from("Plot was not written")));
    }
    Ok(())
}

#[test]
fn plot_rejects_unknown_color() -> AppResult<()> {
    let dir = tempdir()?;
    let csv = dir.path().join("manual.csv");
    write(&csv, "offset,ms\n0,20\n")?;
    let mut args = plot_args(
        vec![SeriesSpec {
            label: None,
            path: csv,
        }],
        dir.path().join("out.png"),
    );
    args.color = Some("chartreuse".to_owned());

    match run_plot(&args) {
        Err(AppError::Validation(_)) => Ok(()),
        Err(err) => Err(err),
        Ok(()) => Err(AppError::report(ReportError::from(
            "Expected unknown color to fail",
        ))),
    }
}
