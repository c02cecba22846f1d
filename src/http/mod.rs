//! Target resolution, the HTTP client, and the virtual-user runner.
mod check;
mod client;
mod runner;
mod target;

#[cfg(test)]
mod tests;

pub use check::{check_name, check_status, is_failed_request};
pub use client::{RequestOutcome, build_client, execute_get};
pub use runner::{RunOutcome, RunSettings, run_test};
pub use target::{POSTS_PATH, PageQuery, Target, build_target, page_for_offset};
