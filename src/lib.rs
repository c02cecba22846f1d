//! Core library for the `pagestress` CLI.
//!
//! This crate provides the building blocks used by the binary: CLI argument
//! types, configuration loading, the paginated target and virtual-user
//! runner, metric aggregation, thresholds, and the offline report charts.
//! The primary user-facing interface is the `pagestress` command-line
//! application; library APIs may evolve as the CLI grows.
pub mod args;
pub mod charts;
pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod report;
pub mod shutdown;
pub mod thresholds;
