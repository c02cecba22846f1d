use std::path::PathBuf;
use std::time::Duration;

use super::types::{OffsetList, PositiveU64, PositiveUsize, SeriesSpec};
use crate::error::{AppError, AppResult, ValidationError};
use crate::thresholds::Threshold;

/// Milliseconds per second.
const MS_PER_SEC: u64 = 1_000;
/// Seconds per minute.
const SECS_PER_MIN: u64 = 60;
/// Seconds per hour.
const SECS_PER_HOUR: u64 = 3_600;

pub(crate) fn parse_header(s: &str) -> Result<(String, String), ValidationError> {
    match s.split_once(':') {
        Some((key, value)) => Ok((key.trim().to_owned(), value.trim().to_owned())),
        None => Err(ValidationError::InvalidHeaderFormat {
            value: s.to_owned(),
        }),
    }
}

pub(super) fn parse_positive_u64(s: &str) -> AppResult<PositiveU64> {
    s.trim().parse::<PositiveU64>().map_err(AppError::from)
}

pub(super) fn parse_positive_usize(s: &str) -> AppResult<PositiveUsize> {
    s.trim().parse::<PositiveUsize>().map_err(AppError::from)
}

pub(super) fn parse_offset(s: &str) -> Result<u64, ValidationError> {
    s.trim()
        .parse::<u64>()
        .map_err(|err| ValidationError::InvalidNumber { source: err })
}

pub(super) fn parse_threshold(s: &str) -> AppResult<Threshold> {
    s.parse::<Threshold>().map_err(AppError::from)
}

pub(super) fn parse_offset_list(s: &str) -> Result<OffsetList, ValidationError> {
    let mut offsets = Vec::new();
    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let offset = part
            .parse::<u64>()
            .map_err(|err| ValidationError::InvalidOffsetList {
                value: s.to_owned(),
                source: err,
            })?;
        offsets.push(offset);
    }
    if offsets.is_empty() {
        return Err(ValidationError::EmptyOffsetList);
    }
    Ok(OffsetList(offsets))
}

/// `label=dir`, label required.
pub(super) fn parse_labelled_series(s: &str) -> Result<SeriesSpec, ValidationError> {
    let Some((label, path)) = s.split_once('=') else {
        return Err(ValidationError::InvalidSeries {
            value: s.to_owned(),
        });
    };
    let label = label.trim();
    let path = path.trim();
    if label.is_empty() || path.is_empty() {
        return Err(ValidationError::InvalidSeries {
            value: s.to_owned(),
        });
    }
    Ok(SeriesSpec {
        label: Some(label.to_owned()),
        path: PathBuf::from(path),
    })
}

/// `[label=]path`.
pub(super) fn parse_series(s: &str) -> Result<SeriesSpec, ValidationError> {
    if s.contains('=') {
        return parse_labelled_series(s);
    }
    let path = s.trim();
    if path.is_empty() {
        return Err(ValidationError::InvalidSeries {
            value: s.to_owned(),
        });
    }
    Ok(SeriesSpec {
        label: None,
        path: PathBuf::from(path),
    })
}

pub(crate) fn parse_duration_arg(s: &str) -> AppResult<Duration> {
    let duration = parse_duration_value(s)?;
    if duration.is_zero() {
        return Err(AppError::validation(ValidationError::DurationZero));
    }
    Ok(duration)
}

/// Like [`parse_duration_arg`] but accepts `0` (used for think time).
pub(crate) fn parse_sleep_arg(s: &str) -> AppResult<Duration> {
    parse_duration_value(s).map_err(AppError::from)
}

/// Parses k6-style durations: `250ms`, `20s`, `1m30s`, `2h`. A bare number is seconds.
pub(crate) fn parse_duration_value(s: &str) -> Result<Duration, ValidationError> {
    let value = s.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let mut total_ms: u64 = 0;
    let mut rest = value;
    while !rest.is_empty() {
        let digits_len = rest.chars().take_while(char::is_ascii_digit).count();
        if digits_len == 0 {
            return Err(ValidationError::InvalidDurationFormat {
                value: value.to_owned(),
            });
        }
        let (num_part, tail) = rest.split_at(digits_len);
        let unit_len = tail
            .chars()
            .take_while(|ch| ch.is_ascii_alphabetic())
            .count();
        let (unit, remainder) = tail.split_at(unit_len);
        let number: u64 =
            num_part
                .parse()
                .map_err(|err| ValidationError::InvalidDurationNumber {
                    value: value.to_owned(),
                    source: err,
                })?;

        let unit = if unit.is_empty() {
            if !remainder.is_empty() {
                return Err(ValidationError::InvalidDurationFormat {
                    value: value.to_owned(),
                });
            }
            "s"
        } else {
            unit
        };
        let scale = match unit {
            "ms" => 1,
            "s" => MS_PER_SEC,
            "m" => SECS_PER_MIN.saturating_mul(MS_PER_SEC),
            "h" => SECS_PER_HOUR.saturating_mul(MS_PER_SEC),
            _ => {
                return Err(ValidationError::InvalidDurationUnit {
                    unit: unit.to_owned(),
                });
            }
        };
        let part_ms = number
            .checked_mul(scale)
            .ok_or(ValidationError::DurationOverflow)?;
        total_ms = total_ms
            .checked_add(part_ms)
            .ok_or(ValidationError::DurationOverflow)?;
        rest = remainder;
    }

    Ok(Duration::from_millis(total_ms))
}
