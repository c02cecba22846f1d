use std::path::Path;

use chrono::Utc;
use tracing::{info, warn};

use crate::args::TesterArgs;
use crate::error::{AppError, AppResult};
use crate::http::{RunSettings, build_client, build_target, run_test};
use crate::shutdown::{ShutdownSender, setup_signal_shutdown_handler, shutdown_channel};
use crate::thresholds::{evaluate_thresholds, resolve_thresholds};

use super::export::{summary_document, write_summary};
use super::summary::{print_summary, summary_lines};

/// What a single run left behind for its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RunResult {
    pub failed_thresholds: usize,
    pub interrupted: bool,
}

/// One complete run against `offset`: drive the VUs, print the summary,
/// optionally export it, and evaluate thresholds.
///
/// # Errors
///
/// Returns an error when the target, client, collector or export fails.
/// Crossed thresholds are reported through [`RunResult`], not as an error.
pub(crate) async fn execute_run(
    args: &TesterArgs,
    offset: u64,
    summary_path: Option<&Path>,
    interrupt_tx: &ShutdownSender,
) -> AppResult<RunResult> {
    let target = build_target(&args.base_url, offset, args.limit)?;
    let thresholds = resolve_thresholds(&args.thresholds)?;
    let client = build_client(args.request_timeout, &args.headers)?;

    let settings = RunSettings {
        target,
        vus: args.vus.get(),
        duration: args.duration,
        sleep: args.sleep,
        graceful_stop: args.graceful_stop,
        expected_status: args.expected_status_code,
    };

    let started_at = Utc::now();
    let outcome = run_test(client, &settings, interrupt_tx).await?;
    let outcomes = evaluate_thresholds(&thresholds, &outcome.report);

    print_summary(&summary_lines(
        &outcome.report,
        &settings.target,
        &outcomes,
        settings.expected_status,
    ));

    if let Some(path) = summary_path {
        let document = summary_document(
            &outcome.report,
            &settings.target,
            &outcomes,
            settings.expected_status,
            started_at,
        );
        write_summary(path, &document).await?;
        info!("Summary exported to {}", path.display());
    }

    let failed_thresholds = outcomes.iter().filter(|outcome| !outcome.passed).count();
    for failed in outcomes.iter().filter(|outcome| !outcome.passed) {
        warn!(
            "Threshold crossed: {} (observed {:.4})",
            failed.threshold, failed.observed
        );
    }

    Ok(RunResult {
        failed_thresholds,
        interrupted: outcome.interrupted,
    })
}

/// Single run from the top-level options.
///
/// # Errors
///
/// Returns [`AppError::ThresholdsCrossed`] when any threshold fails, or
/// the underlying error when the run itself cannot complete.
pub(crate) async fn run_local(args: &TesterArgs) -> AppResult<()> {
    let (interrupt_tx, _) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&interrupt_tx);

    let summary_path = args.summary_export.as_deref().map(Path::new);
    let result = execute_run(args, args.offset, summary_path, &interrupt_tx).await;
    signal_handle.abort();

    let result = result?;
    if result.failed_thresholds > 0 {
        return Err(AppError::ThresholdsCrossed {
            failed: result.failed_thresholds,
        });
    }
    Ok(())
}
