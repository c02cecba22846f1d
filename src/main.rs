mod app;
mod args;
mod charts;
mod config;
mod entry;
mod error;
mod http;
mod logger;
mod metrics;
mod report;
mod shutdown;
mod thresholds;

use error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
