use std::time::Duration;

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::{info, warn};

use crate::error::MetricsError;

use super::{Aggregates, Sample};

const PROGRESS_INTERVAL: Duration = Duration::from_secs(5);

/// Spawns the task that folds VU samples into [`Aggregates`].
///
/// The task finishes once every sender has been dropped.
#[must_use]
pub fn setup_metrics_collector(
    mut metrics_rx: mpsc::Receiver<Sample>,
    run_start: Instant,
    target_duration: Duration,
) -> JoinHandle<Result<Aggregates, MetricsError>> {
    tokio::spawn(async move {
        let mut totals = Aggregates::new()?;
        let mut progress_interval =
            tokio::time::interval_at(run_start + PROGRESS_INTERVAL, PROGRESS_INTERVAL);
        progress_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                sample = metrics_rx.recv() => {
                    let Some(sample) = sample else {
                        break;
                    };
                    if let Err(err) = totals.record(&sample) {
                        warn!("Failed to record sample: {}", err);
                    }
                }
                _ = progress_interval.tick() => {
                    let elapsed = run_start.elapsed().min(target_duration);
                    info!(
                        "running ({}s/{}s): {} requests, {} failed, {} iterations",
                        elapsed.as_secs(),
                        target_duration.as_secs(),
                        totals.http_reqs,
                        totals.http_req_failed,
                        totals.iterations
                    );
                }
            }
        }

        Ok(totals)
    })
}
