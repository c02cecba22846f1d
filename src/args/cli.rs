use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use crate::thresholds::Threshold;

use super::defaults::DEFAULT_BASE_URL;
use super::parsers::{
    parse_duration_arg, parse_header, parse_labelled_series, parse_offset, parse_offset_list,
    parse_positive_u64, parse_positive_usize, parse_series, parse_sleep_arg, parse_threshold,
};
use super::types::{OffsetList, PositiveU64, PositiveUsize, SeriesSpec};

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the test once per offset (and per repeat), exporting one summary per run
    Sweep(SweepArgs),
    /// Turn a directory of run summaries into OFFSET vs p50/p95/TPS charts
    Report(ReportArgs),
    /// Compare p50/p95 medians of several summary directories on one chart
    Compare(CompareArgs),
    /// Plot `offset,ms` CSV files
    Plot(PlotArgs),
}

#[derive(Debug, Args, Clone)]
pub struct SweepArgs {
    /// Offsets to test, comma-separated (e.g. 0,1000,100000)
    #[arg(long = "offsets", value_parser = parse_offset_list)]
    pub offsets: OffsetList,

    /// Runs per offset
    #[arg(long = "runs", default_value = "3", value_parser = parse_positive_u64)]
    pub runs: PositiveU64,

    /// Directory for offset_<offset>_run<n>.json summaries
    #[arg(long = "out-dir", default_value = "out/raw")]
    pub out_dir: String,

    /// Pause between runs (supports ms/s/m/h)
    #[arg(long = "cooldown", value_parser = parse_duration_arg)]
    pub cooldown: Option<Duration>,
}

#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    /// Directory containing summary JSON files
    #[arg(long = "input-dir", default_value = "out/raw")]
    pub input_dir: String,

    /// Directory to write report PNGs and the medians CSV
    #[arg(long = "output-dir", default_value = "out/report")]
    pub output_dir: String,

    /// Optional tag suffix for output filenames (e.g. no_index, idx_created_at_id)
    #[arg(long = "tag", default_value = "")]
    pub tag: String,
}

#[derive(Debug, Args, Clone)]
pub struct CompareArgs {
    /// Series as label=dir (repeatable)
    #[arg(long = "series", required = true, value_parser = parse_labelled_series)]
    pub series: Vec<SeriesSpec>,

    /// Directory to write comparison PNGs
    #[arg(long = "output-dir", default_value = "out/report/compare")]
    pub output_dir: String,

    /// Optional tag suffix for output filenames
    #[arg(long = "tag", default_value = "")]
    pub tag: String,
}

#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// CSV input as [label=]path, columns offset,ms (repeatable)
    #[arg(long = "series", alias = "input", required = true, value_parser = parse_series)]
    pub series: Vec<SeriesSpec>,

    /// Output PNG path
    #[arg(long = "output")]
    pub output: String,

    /// Chart title
    #[arg(long = "title", default_value = "OFFSET vs elapsed time")]
    pub title: String,

    /// Line color of the first series (e.g. orange)
    #[arg(long = "color")]
    pub color: Option<String>,

    #[arg(long = "xmin", allow_negative_numbers = true)]
    pub xmin: Option<f64>,

    #[arg(long = "xmax", allow_negative_numbers = true)]
    pub xmax: Option<f64>,

    #[arg(long = "ymin", allow_negative_numbers = true)]
    pub ymin: Option<f64>,

    #[arg(long = "ymax", allow_negative_numbers = true)]
    pub ymax: Option<f64>,
}

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Async load tester for offset-paginated REST list endpoints - virtual users, k6-style thresholds and summaries, offset sweeps and latency/TPS charts."
)]
pub struct TesterArgs {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Base URL of the service under test
    #[arg(long = "base-url", env = "BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Page size (sent as `size`)
    #[arg(long = "limit", env = "LIMIT", default_value = "20", value_parser = parse_positive_u64)]
    pub limit: PositiveU64,

    /// Row offset; the requested page is floor(offset / limit) + 1
    #[arg(long = "offset", env = "OFFSET", default_value = "0", value_parser = parse_offset)]
    pub offset: u64,

    /// Number of concurrent virtual users
    #[arg(long = "vus", env = "VUS", default_value = "1", value_parser = parse_positive_usize)]
    pub vus: PositiveUsize,

    /// Test duration (e.g. 20s, 1m30s)
    #[arg(long = "duration", env = "DURATION", default_value = "20s", value_parser = parse_duration_arg)]
    pub duration: Duration,

    /// Think time after each iteration (0 disables)
    #[arg(long = "sleep", env = "SLEEP", default_value = "200ms", value_parser = parse_sleep_arg)]
    pub sleep: Duration,

    /// Per-request timeout
    #[arg(long = "timeout", env = "TIMEOUT", default_value = "60s", value_parser = parse_duration_arg)]
    pub request_timeout: Duration,

    /// Time in-flight iterations get to finish once the test stops
    #[arg(long = "graceful-stop", env = "GRACEFUL_STOP", default_value = "30s", value_parser = parse_duration_arg)]
    pub graceful_stop: Duration,

    /// Status the `status is N` check expects
    #[arg(long = "expected-status", default_value = "200")]
    pub expected_status_code: u16,

    /// Threshold as '<metric>: <aggregation><op><value>' (repeatable; default 'http_req_failed: rate<0.01')
    #[arg(long = "threshold", value_parser = parse_threshold)]
    pub thresholds: Vec<Threshold>,

    /// HTTP headers in 'Key: Value' format (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Write the end-of-test summary as JSON to this path
    #[arg(long = "summary-export", env = "SUMMARY_EXPORT")]
    pub summary_export: Option<String>,

    /// Config file (TOML or JSON); defaults to ./pagestress.toml or ./pagestress.json
    #[arg(long = "config", env = "PAGESTRESS_CONFIG")]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,
}
