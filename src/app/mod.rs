//! Run orchestration: single runs, sweeps, and their summaries.
mod export;
mod runner;
mod summary;
mod sweep;


pub(crate) use runner::run_local;
pub(crate) use sweep::run_sweep;
