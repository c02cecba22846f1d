use std::path::{Path, PathBuf};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::args::{SweepArgs, TesterArgs};
use crate::error::AppResult;
use crate::shutdown::{setup_signal_shutdown_handler, shutdown_channel};

use super::runner::execute_run;

/// `<out_dir>/offset_<offset>_run<run>.json`
#[must_use]
pub(crate) fn sweep_summary_path(out_dir: &Path, offset: u64, run: u64) -> PathBuf {
    out_dir.join(format!("offset_{}_run{}.json", offset, run))
}

/// Runs every offset `runs` times, exporting one summary per run.
///
/// Crossed thresholds are logged and the sweep continues; an interrupt
/// stops it after the current run.
///
/// # Errors
///
/// Returns the first error that prevents a run from completing.
pub(crate) async fn run_sweep(args: &TesterArgs, sweep: &SweepArgs) -> AppResult<()> {
    let (interrupt_tx, _) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&interrupt_tx);
    let out_dir = Path::new(&sweep.out_dir);
    let runs = sweep.runs.get();

    let mut completed: u64 = 0;
    let mut crossed: u64 = 0;
    let mut interrupted = false;

    'offsets: for &offset in &sweep.offsets.0 {
        for run in 1..=runs {
            let path = sweep_summary_path(out_dir, offset, run);
            info!(
                "Sweep run offset={} run={}/{} -> {}",
                offset,
                run,
                runs,
                path.display()
            );
            let result = match execute_run(args, offset, Some(&path), &interrupt_tx).await {
                Ok(result) => result,
                Err(err) => {
                    signal_handle.abort();
                    return Err(err);
                }
            };
            completed = completed.saturating_add(1);
            if result.failed_thresholds > 0 {
                crossed = crossed.saturating_add(1);
                warn!(
                    "offset={} run={} crossed {} threshold(s); continuing sweep.",
                    offset, run, result.failed_thresholds
                );
            }
            if result.interrupted {
                interrupted = true;
                break 'offsets;
            }

            if let Some(cooldown) = sweep.cooldown {
                let mut interrupt_rx = interrupt_tx.subscribe();
                let stopped = tokio::select! {
                    () = sleep(cooldown) => false,
                    _ = interrupt_rx.recv() => true,
                };
                if stopped {
                    interrupted = true;
                    break 'offsets;
                }
            }
        }
    }
    signal_handle.abort();

    if interrupted {
        warn!("Sweep interrupted after {} run(s).", completed);
    }
    info!(
        "Sweep finished: {} run(s), {} crossed thresholds.",
        completed, crossed
    );
    Ok(())
}
