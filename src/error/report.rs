use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("No files matched: {pattern}")]
    NoInputFiles { pattern: String },
    #[error("Unexpected filename: {name}")]
    UnexpectedFileName { name: String },
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Missing {metric} in {path}")]
    MissingMetric { metric: &'static str, path: PathBuf },
    #[error("Invalid CSV row {line} in '{path}': {message}")]
    InvalidCsvRow {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("CSV is empty: {path}")]
    EmptyCsv { path: PathBuf },
    #[error("Failed to draw chart '{path}': {message}")]
    Draw { path: PathBuf, message: String },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
