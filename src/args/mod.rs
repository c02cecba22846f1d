//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;


pub use cli::{Command, CompareArgs, PlotArgs, ReportArgs, SweepArgs, TesterArgs};
pub use types::{OffsetList, PositiveU64, PositiveUsize, SeriesSpec};

pub(crate) use defaults::{DEFAULT_CONFIG_FILES, DEFAULT_USER_AGENT};
pub(crate) use parsers::{parse_duration_value, parse_header};
