use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Url};
use tokio::sync::{broadcast, mpsc};
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::metrics::{RequestMetrics, RunReport, Sample, setup_metrics_collector};
use crate::shutdown::{ShutdownReceiver, ShutdownSender, shutdown_channel};

use super::check::{check_status, is_failed_request};
use super::client::execute_get;
use super::target::Target;

/// Capacity of the VU -> collector sample channel.
const METRICS_CHANNEL_CAPACITY: usize = 10_000;

/// Everything one run needs besides the client.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub target: Target,
    pub vus: usize,
    pub duration: Duration,
    pub sleep: Duration,
    pub graceful_stop: Duration,
    pub expected_status: u16,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub report: RunReport,
    /// The run was cut short by Ctrl+C/SIGTERM.
    pub interrupted: bool,
}

#[derive(Clone)]
struct VuContext {
    client: Client,
    url: Arc<Url>,
    tag: Arc<str>,
    sleep: Duration,
    expected_status: u16,
    metrics_tx: mpsc::Sender<Sample>,
}

/// Drives `settings.vus` virtual users until the duration elapses or
/// `interrupt_tx` fires, then collects the run's metrics.
///
/// # Errors
///
/// Returns an error when the collector task fails.
pub async fn run_test(
    client: Client,
    settings: &RunSettings,
    interrupt_tx: &ShutdownSender,
) -> AppResult<RunOutcome> {
    let run_start = Instant::now();
    let (stop_tx, _) = shutdown_channel();
    let (metrics_tx, metrics_rx) = mpsc::channel::<Sample>(METRICS_CHANNEL_CAPACITY);
    let collector = setup_metrics_collector(metrics_rx, run_start, settings.duration);

    info!(
        "Starting {} VU(s) for {}s: GET {} (tag name={})",
        settings.vus,
        settings.duration.as_secs(),
        settings.target.url,
        settings.target.tag()
    );

    let context = VuContext {
        client,
        url: Arc::new(settings.target.url.clone()),
        tag: Arc::from(settings.target.tag()),
        sleep: settings.sleep,
        expected_status: settings.expected_status,
        metrics_tx,
    };

    let mut handles = Vec::with_capacity(settings.vus);
    for _ in 0..settings.vus {
        let stop_rx = stop_tx.subscribe();
        handles.push(tokio::spawn(run_vu(context.clone(), stop_rx)));
    }
    drop(context);

    let mut interrupt_rx = interrupt_tx.subscribe();
    let interrupted = tokio::select! {
        () = sleep(settings.duration) => false,
        _ = interrupt_rx.recv() => true,
    };
    if interrupted {
        info!("Interrupted, stopping VUs.");
    } else {
        debug!("Test duration reached, stopping VUs.");
    }
    drop(stop_tx.send(()));

    let drain = async {
        for handle in &mut handles {
            if let Err(err) = handle.await {
                warn!("VU task failed: {}", err);
            }
        }
    };
    if timeout(settings.graceful_stop, drain).await.is_err() {
        warn!(
            "Graceful stop of {}s elapsed, aborting remaining iterations.",
            settings.graceful_stop.as_secs()
        );
        for handle in &handles {
            handle.abort();
        }
    }

    let duration = run_start.elapsed();
    let totals = collector.await?.map_err(AppError::from)?;

    Ok(RunOutcome {
        report: RunReport::new(duration, settings.vus, totals),
        interrupted,
    })
}

async fn run_vu(vu: VuContext, mut stop_rx: ShutdownReceiver) {
    loop {
        match stop_rx.try_recv() {
            Err(broadcast::error::TryRecvError::Empty) => {}
            Ok(())
            | Err(broadcast::error::TryRecvError::Closed | broadcast::error::TryRecvError::Lagged(_)) => {
                break;
            }
        }

        let iteration_start = Instant::now();
        let outcome = execute_get(&vu.client, &vu.url).await;
        let sample = RequestMetrics {
            tag: Arc::clone(&vu.tag),
            response_time: iteration_start.elapsed(),
            failed: is_failed_request(outcome.status, outcome.transport_error),
            check_passed: !outcome.transport_error
                && check_status(outcome.status, vu.expected_status),
            bytes: outcome.bytes,
        };
        if vu.metrics_tx.send(Sample::Request(sample)).await.is_err() {
            break;
        }

        let mut stopped = false;
        if !vu.sleep.is_zero() {
            tokio::select! {
                () = sleep(vu.sleep) => {}
                _ = stop_rx.recv() => stopped = true,
            }
        }

        let iteration = Sample::Iteration {
            duration: iteration_start.elapsed(),
        };
        if vu.metrics_tx.send(iteration).await.is_err() || stopped {
            break;
        }
    }
}
