use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::ReportError;

/// Measurements read from one exported run summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSample {
    pub offset: u64,
    pub run: u64,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub tps: f64,
}

/// Medians over every run of one offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetMedians {
    pub offset: u64,
    pub runs: usize,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub tps: f64,
}

/// Parses `offset_<offset>_run<run>.json`.
///
/// Returns `Ok(None)` for names outside the `offset_*_run*.json` pattern.
///
/// # Errors
///
/// Returns an error when a name matches the pattern but its numbers do not
/// parse.
pub fn parse_summary_file_name(name: &str) -> Result<Option<(u64, u64)>, ReportError> {
    let Some(stem) = name
        .strip_prefix("offset_")
        .and_then(|rest| rest.strip_suffix(".json"))
    else {
        return Ok(None);
    };
    let Some((offset, run)) = stem.split_once("_run") else {
        return Ok(None);
    };
    let unexpected = || ReportError::UnexpectedFileName {
        name: name.to_owned(),
    };
    let offset = offset.parse::<u64>().map_err(|_err| unexpected())?;
    let run = run.parse::<u64>().map_err(|_err| unexpected())?;
    Ok(Some((offset, run)))
}

fn metric(
    document: &Value,
    pointer: &str,
    name: &'static str,
    path: &Path,
) -> Result<f64, ReportError> {
    document
        .pointer(pointer)
        .and_then(Value::as_f64)
        .ok_or_else(|| ReportError::MissingMetric {
            metric: name,
            path: path.to_path_buf(),
        })
}

/// Reads p50, p95 and TPS from a summary export.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed, or a metric is
/// missing.
pub fn read_sample(path: &Path, offset: u64, run: u64) -> Result<RunSample, ReportError> {
    let content = std::fs::read_to_string(path).map_err(|err| ReportError::Read {
        path: path.to_path_buf(),
        source: err,
    })?;
    let document: Value = serde_json::from_str(&content).map_err(|err| ReportError::Parse {
        path: path.to_path_buf(),
        source: err,
    })?;

    Ok(RunSample {
        offset,
        run,
        p50_ms: metric(
            &document,
            "/metrics/http_req_duration/med",
            "http_req_duration.med",
            path,
        )?,
        p95_ms: metric(
            &document,
            "/metrics/http_req_duration/p(95)",
            "http_req_duration.p(95)",
            path,
        )?,
        tps: metric(&document, "/metrics/http_reqs/rate", "http_reqs.rate", path)?,
    })
}

/// Loads every `offset_<N>_run<M>.json` in `dir`, sorted by offset then run.
///
/// # Errors
///
/// Returns an error when the directory cannot be read, no file matches, or a
/// matching file is unusable.
pub fn load_samples(dir: &Path) -> Result<Vec<RunSample>, ReportError> {
    let read_error = |source: std::io::Error| ReportError::Read {
        path: dir.to_path_buf(),
        source,
    };
    let mut files: Vec<(u64, u64, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if let Some((offset, run)) = parse_summary_file_name(name)? {
            files.push((offset, run, entry.path()));
        }
    }
    if files.is_empty() {
        return Err(ReportError::NoInputFiles {
            pattern: dir.join("offset_*_run*.json").display().to_string(),
        });
    }
    files.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

    files
        .iter()
        .map(|(offset, run, path)| read_sample(path, *offset, *run))
        .collect()
}

/// Median of `values`; the mean of the two middle values for an even count.
#[must_use]
pub fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        return sorted.get(mid).copied().unwrap_or(0.0);
    }
    match (sorted.get(mid.wrapping_sub(1)), sorted.get(mid)) {
        (Some(lower), Some(upper)) => (lower + upper) / 2.0,
        _ => 0.0,
    }
}

/// Groups samples by offset and takes per-offset medians, ascending by offset.
#[must_use]
pub fn group_medians(samples: &[RunSample]) -> Vec<OffsetMedians> {
    let mut by_offset: BTreeMap<u64, Vec<&RunSample>> = BTreeMap::new();
    for sample in samples {
        by_offset.entry(sample.offset).or_default().push(sample);
    }
    by_offset
        .into_iter()
        .map(|(offset, runs)| {
            let collect = |pick: fn(&RunSample) -> f64| -> Vec<f64> {
                runs.iter().map(|sample| pick(sample)).collect()
            };
            OffsetMedians {
                offset,
                runs: runs.len(),
                p50_ms: median(&collect(|sample| sample.p50_ms)),
                p95_ms: median(&collect(|sample| sample.p95_ms)),
                tps: median(&collect(|sample| sample.tps)),
            }
        })
        .collect()
}
