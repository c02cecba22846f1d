//! Offline reports over exported run summaries and CSV files.
mod commands;
mod offset_csv;
mod samples;

#[cfg(test)]
mod tests;

pub use commands::{run_compare, run_plot, run_report, tag_suffix, title_suffix};
pub use offset_csv::{MEDIANS_HEADER, read_offset_ms_csv, write_medians_csv};
pub use samples::{
    OffsetMedians, RunSample, group_medians, load_samples, median, parse_summary_file_name,
    read_sample,
};
