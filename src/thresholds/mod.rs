//! k6-style pass/fail thresholds over a finished run.
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::metrics::RunReport;


/// Threshold applied when none is configured.
pub const DEFAULT_THRESHOLD: &str = "http_req_failed: rate<0.01";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdMetric {
    HttpReqFailed,
    Checks,
    HttpReqDuration,
    IterationDuration,
}

impl ThresholdMetric {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ThresholdMetric::HttpReqFailed => "http_req_failed",
            ThresholdMetric::Checks => "checks",
            ThresholdMetric::HttpReqDuration => "http_req_duration",
            ThresholdMetric::IterationDuration => "iteration_duration",
        }
    }

    const fn is_rate(self) -> bool {
        matches!(
            self,
            ThresholdMetric::HttpReqFailed | ThresholdMetric::Checks
        )
    }
}

impl FromStr for ThresholdMetric {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "http_req_failed" => Ok(ThresholdMetric::HttpReqFailed),
            "checks" => Ok(ThresholdMetric::Checks),
            "http_req_duration" => Ok(ThresholdMetric::HttpReqDuration),
            "iteration_duration" => Ok(ThresholdMetric::IterationDuration),
            other => Err(ValidationError::UnknownThresholdMetric {
                metric: other.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aggregation {
    Rate,
    Avg,
    Min,
    Med,
    Max,
    /// `p(N)`, N in (0, 100].
    Percentile(f64),
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregation::Rate => f.write_str("rate"),
            Aggregation::Avg => f.write_str("avg"),
            Aggregation::Min => f.write_str("min"),
            Aggregation::Med => f.write_str("med"),
            Aggregation::Max => f.write_str("max"),
            Aggregation::Percentile(value) => write!(f, "p({})", value),
        }
    }
}

fn parse_aggregation(metric: ThresholdMetric, s: &str) -> Result<Aggregation, ValidationError> {
    match s {
        "rate" => return Ok(Aggregation::Rate),
        "avg" => return Ok(Aggregation::Avg),
        "min" => return Ok(Aggregation::Min),
        "med" => return Ok(Aggregation::Med),
        "max" => return Ok(Aggregation::Max),
        _ => {}
    }
    let invalid = || ValidationError::InvalidPercentile {
        value: s.to_owned(),
    };
    let inner = s
        .strip_prefix("p(")
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| ValidationError::InvalidThresholdAggregation {
            metric: metric.as_str().to_owned(),
            aggregation: s.to_owned(),
        })?;
    let value: f64 = inner.trim().parse().map_err(|_err| invalid())?;
    if !(value > 0.0 && value <= 100.0) {
        return Err(invalid());
    }
    Ok(Aggregation::Percentile(value))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl Comparison {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
            Comparison::Eq => "==",
            Comparison::Ne => "!=",
        }
    }

    #[must_use]
    pub fn holds(self, observed: f64, limit: f64) -> bool {
        match self {
            Comparison::Lt => observed < limit,
            Comparison::Le => observed <= limit,
            Comparison::Gt => observed > limit,
            Comparison::Ge => observed >= limit,
            Comparison::Eq => (observed - limit).abs() < f64::EPSILON,
            Comparison::Ne => (observed - limit).abs() >= f64::EPSILON,
        }
    }
}

/// Operators, two-character forms first so `<=` is not read as `<`.
const OPERATORS: [(&str, Comparison); 6] = [
    ("<=", Comparison::Le),
    (">=", Comparison::Ge),
    ("==", Comparison::Eq),
    ("!=", Comparison::Ne),
    ("<", Comparison::Lt),
    (">", Comparison::Gt),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Threshold {
    pub metric: ThresholdMetric,
    pub aggregation: Aggregation,
    pub comparison: Comparison,
    pub value: f64,
}

impl Threshold {
    /// Expression part as k6 prints it, e.g. `rate<0.01`.
    #[must_use]
    pub fn expression(&self) -> String {
        format!(
            "{}{}{}",
            self.aggregation,
            self.comparison.as_str(),
            self.value
        )
    }

    #[must_use]
    pub fn observe(&self, report: &RunReport) -> f64 {
        let trend = match self.metric {
            ThresholdMetric::HttpReqFailed => return report.http_req_failed_rate(),
            ThresholdMetric::Checks => return report.checks_rate(),
            ThresholdMetric::HttpReqDuration => &report.totals.http_req_duration,
            ThresholdMetric::IterationDuration => &report.totals.iteration_duration,
        };
        match self.aggregation {
            Aggregation::Rate | Aggregation::Avg => trend.avg_ms(),
            Aggregation::Min => trend.min_ms(),
            Aggregation::Med => trend.med_ms(),
            Aggregation::Max => trend.max_ms(),
            Aggregation::Percentile(percentile) => trend.percentile_ms(percentile),
        }
    }

    #[must_use]
    pub fn evaluate(&self, report: &RunReport) -> ThresholdOutcome {
        let observed = self.observe(report);
        ThresholdOutcome {
            threshold: self.clone(),
            observed,
            passed: self.comparison.holds(observed, self.value),
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.metric.as_str(), self.expression())
    }
}

impl FromStr for Threshold {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidThresholdFormat {
            value: s.to_owned(),
        };
        let (metric_part, expression) = s.split_once(':').ok_or_else(invalid)?;
        let metric: ThresholdMetric = metric_part.parse()?;
        let expression: String = expression.chars().filter(|ch| !ch.is_whitespace()).collect();

        let (index, operator, comparison) = OPERATORS
            .iter()
            .filter_map(|(operator, comparison)| {
                expression
                    .find(operator)
                    .map(|index| (index, *operator, *comparison))
            })
            .min_by_key(|(index, operator, _)| (*index, std::cmp::Reverse(operator.len())))
            .ok_or_else(invalid)?;

        let aggregation_part = expression.get(..index).ok_or_else(invalid)?;
        let value_part = expression
            .get(index.saturating_add(operator.len())..)
            .ok_or_else(invalid)?;
        if aggregation_part.is_empty() || value_part.is_empty() {
            return Err(invalid());
        }

        let aggregation = parse_aggregation(metric, aggregation_part)?;
        if metric.is_rate() != matches!(aggregation, Aggregation::Rate) {
            return Err(ValidationError::InvalidThresholdAggregation {
                metric: metric.as_str().to_owned(),
                aggregation: aggregation.to_string(),
            });
        }

        let value: f64 =
            value_part
                .parse()
                .map_err(|err| ValidationError::InvalidThresholdValue {
                    value: value_part.to_owned(),
                    source: err,
                })?;

        Ok(Threshold {
            metric,
            aggregation,
            comparison,
            value,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdOutcome {
    pub threshold: Threshold,
    pub observed: f64,
    pub passed: bool,
}

/// The configured thresholds, or the default failure-rate gate when empty.
///
/// # Errors
///
/// Returns an error only if the built-in default fails to parse.
pub fn resolve_thresholds(configured: &[Threshold]) -> Result<Vec<Threshold>, ValidationError> {
    if configured.is_empty() {
        return Ok(vec![DEFAULT_THRESHOLD.parse()?]);
    }
    Ok(configured.to_vec())
}

#[must_use]
pub fn evaluate_thresholds(thresholds: &[Threshold], report: &RunReport) -> Vec<ThresholdOutcome> {
    thresholds
        .iter()
        .map(|threshold| threshold.evaluate(report))
        .collect()
}
