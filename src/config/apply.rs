use std::time::Duration;

use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{PositiveU64, PositiveUsize, TesterArgs, parse_duration_value, parse_header};
use crate::error::{ConfigError, ValidationError};
use crate::thresholds::Threshold;

use super::types::ConfigFile;

/// Applies configuration values to CLI arguments.
///
/// # Errors
///
/// Returns an error when config values are invalid.
pub fn apply_config(
    args: &mut TesterArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> Result<(), ConfigError> {
    if !is_explicit(matches, "base_url")
        && let Some(base_url) = config.base_url.clone()
    {
        args.base_url = base_url;
    }

    if !is_explicit(matches, "limit")
        && let Some(limit) = config.limit
    {
        args.limit = PositiveU64::try_from(limit)
            .map_err(|err| ConfigError::FieldMustBePositive {
                field: "limit",
                source: err,
            })?;
    }

    if !is_explicit(matches, "offset")
        && let Some(offset) = config.offset
    {
        args.offset = offset;
    }

    if !is_explicit(matches, "vus")
        && let Some(vus) = config.vus
    {
        args.vus = PositiveUsize::try_from(vus).map_err(|err| {
            ConfigError::FieldMustBePositive {
                field: "vus",
                source: err,
            }
        })?;
    }

    if !is_explicit(matches, "duration")
        && let Some(duration) = config.duration.as_deref()
    {
        args.duration = positive_duration(duration, "duration")?;
    }

    if !is_explicit(matches, "sleep")
        && let Some(sleep) = config.sleep.as_deref()
    {
        args.sleep = parse_duration_value(sleep).map_err(|err| ConfigError::InvalidDuration {
            field: "sleep",
            source: err,
        })?;
    }

    if !is_explicit(matches, "request_timeout")
        && let Some(timeout) = config.timeout.as_deref()
    {
        args.request_timeout = positive_duration(timeout, "timeout")?;
    }

    if !is_explicit(matches, "graceful_stop")
        && let Some(graceful_stop) = config.graceful_stop.as_deref()
    {
        args.graceful_stop = positive_duration(graceful_stop, "graceful_stop")?;
    }

    if !is_explicit(matches, "expected_status_code")
        && let Some(status) = config.expected_status
    {
        args.expected_status_code = status;
    }

    if !is_explicit(matches, "thresholds")
        && let Some(thresholds) = config.thresholds.as_ref()
    {
        let mut parsed = Vec::with_capacity(thresholds.len());
        for threshold in thresholds {
            parsed.push(
                threshold
                    .parse::<Threshold>()
                    .map_err(|err| ConfigError::InvalidThreshold { source: err })?,
            );
        }
        args.thresholds = parsed;
    }

    if !is_explicit(matches, "headers")
        && let Some(headers) = config.headers.as_ref()
    {
        let mut parsed = Vec::with_capacity(headers.len());
        for header in headers {
            parsed.push(
                parse_header(header).map_err(|err| ConfigError::InvalidHeader { source: err })?,
            );
        }
        args.headers = parsed;
    }

    if !is_explicit(matches, "summary_export")
        && let Some(path) = config.summary_export.clone()
    {
        args.summary_export = Some(path);
    }

    Ok(())
}

/// Set on the command line or through its environment variable.
fn is_explicit(matches: &ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    )
}

fn positive_duration(value: &str, field: &'static str) -> Result<Duration, ConfigError> {
    let duration =
        parse_duration_value(value).map_err(|err| ConfigError::InvalidDuration { field, source: err })?;
    if duration.is_zero() {
        return Err(ConfigError::InvalidDuration {
            field,
            source: ValidationError::DurationZero,
        });
    }
    Ok(duration)
}
