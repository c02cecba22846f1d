use std::fs::File;
use std::path::Path;

use serde::Deserialize;

use crate::error::ReportError;

use super::samples::OffsetMedians;

pub const MEDIANS_HEADER: [&str; 5] = ["offset", "runs", "p50_ms", "p95_ms", "tps"];

#[derive(Debug, Deserialize)]
struct OffsetMsRow {
    offset: f64,
    ms: f64,
}

fn csv_error(path: &Path, err: csv::Error) -> ReportError {
    ReportError::Csv {
        path: path.to_path_buf(),
        source: err,
    }
}

/// Writes per-offset medians as CSV with a header row.
///
/// # Errors
///
/// Returns an error when the file cannot be created or written.
pub fn write_medians_csv(path: &Path, rows: &[OffsetMedians]) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path).map_err(|err| csv_error(path, err))?;
    writer
        .write_record(MEDIANS_HEADER)
        .map_err(|err| csv_error(path, err))?;
    for row in rows {
        writer
            .write_record([
                row.offset.to_string(),
                row.runs.to_string(),
                format!("{:.3}", row.p50_ms),
                format!("{:.3}", row.p95_ms),
                format!("{:.3}", row.tps),
            ])
            .map_err(|err| csv_error(path, err))?;
    }
    writer
        .flush()
        .map_err(|err| csv_error(path, csv::Error::from(err)))
}

/// Reads an `offset,ms` CSV (header required, column order free, quoting allowed).
///
/// # Errors
///
/// Returns an error when the file cannot be read, has no data rows, lacks a
/// column, or holds a value that does not parse.
pub fn read_offset_ms_csv(path: &Path) -> Result<Vec<(f64, f64)>, ReportError> {
    let file = File::open(path).map_err(|err| ReportError::Read {
        path: path.to_path_buf(),
        source: err,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut points = Vec::new();
    for (index, row) in reader.deserialize::<OffsetMsRow>().enumerate() {
        let row = row.map_err(|err| ReportError::InvalidCsvRow {
            path: path.to_path_buf(),
            // Header is line 1.
            line: err
                .position()
                .and_then(|position| usize::try_from(position.line()).ok())
                .unwrap_or_else(|| index.saturating_add(2)),
            message: err.to_string(),
        })?;
        points.push((row.offset, row.ms));
    }

    if points.is_empty() {
        return Err(ReportError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }
    Ok(points)
}
