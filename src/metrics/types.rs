use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::error::MetricsError;

use super::LatencyHistogram;

/// Microseconds per millisecond.
const US_PER_MS: f64 = 1_000.0;

/// Outcome of one GET, as sent from a VU to the collector.
#[derive(Clone, Debug)]
pub struct RequestMetrics {
    /// Value of the `name` tag, e.g. `page_3`.
    pub tag: Arc<str>,
    pub response_time: Duration,
    pub failed: bool,
    pub check_passed: bool,
    pub bytes: u64,
}

#[derive(Clone, Debug)]
pub enum Sample {
    Request(RequestMetrics),
    Iteration { duration: Duration },
}

/// Histogram plus exact sum, reported in milliseconds.
#[derive(Debug, Clone)]
pub struct Trend {
    hist: LatencyHistogram,
    sum_us: u128,
}

impl Trend {
    /// Create an empty trend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing histogram cannot be created.
    pub fn new() -> Result<Self, MetricsError> {
        Ok(Self {
            hist: LatencyHistogram::new()?,
            sum_us: 0,
        })
    }

    /// Record one duration.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram rejects the value.
    pub fn record(&mut self, value: Duration) -> Result<(), MetricsError> {
        let micros = u64::try_from(value.as_micros()).unwrap_or(u64::MAX);
        self.hist.record(micros)?;
        self.sum_us = self.sum_us.saturating_add(u128::from(micros));
        Ok(())
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.hist.count()
    }

    #[must_use]
    pub fn avg_ms(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            return 0.0;
        }
        self.sum_us as f64 / count as f64 / US_PER_MS
    }

    #[must_use]
    pub fn min_ms(&self) -> f64 {
        self.hist.min() as f64 / US_PER_MS
    }

    #[must_use]
    pub fn max_ms(&self) -> f64 {
        self.hist.max() as f64 / US_PER_MS
    }

    #[must_use]
    pub fn med_ms(&self) -> f64 {
        self.percentile_ms(50.0)
    }

    /// `p(percentile)` in milliseconds, `percentile` in 0..=100.
    #[must_use]
    pub fn percentile_ms(&self, percentile: f64) -> f64 {
        self.hist.value_at_quantile(percentile / 100.0) as f64 / US_PER_MS
    }

    #[must_use]
    pub fn stats(&self) -> TrendStats {
        TrendStats {
            avg: self.avg_ms(),
            min: self.min_ms(),
            med: self.med_ms(),
            max: self.max_ms(),
            p90: self.percentile_ms(90.0),
            p95: self.percentile_ms(95.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendStats {
    pub avg: f64,
    pub min: f64,
    pub med: f64,
    pub max: f64,
    pub p90: f64,
    pub p95: f64,
}

#[derive(Debug, Clone)]
pub struct TagReport {
    pub http_reqs: u64,
    pub failed: u64,
    pub http_req_duration: Trend,
}

/// Counters and trends accumulated by the collector.
#[derive(Debug, Clone)]
pub struct Aggregates {
    pub http_reqs: u64,
    pub http_req_failed: u64,
    pub checks_passed: u64,
    pub checks_failed: u64,
    pub iterations: u64,
    pub data_received: u64,
    pub http_req_duration: Trend,
    pub iteration_duration: Trend,
    pub by_tag: BTreeMap<String, TagReport>,
}

impl Aggregates {
    /// Create empty aggregates.
    ///
    /// # Errors
    ///
    /// Returns an error if a histogram cannot be created.
    pub fn new() -> Result<Self, MetricsError> {
        Ok(Self {
            http_reqs: 0,
            http_req_failed: 0,
            checks_passed: 0,
            checks_failed: 0,
            iterations: 0,
            data_received: 0,
            http_req_duration: Trend::new()?,
            iteration_duration: Trend::new()?,
            by_tag: BTreeMap::new(),
        })
    }

    /// Fold one sample into the totals.
    ///
    /// # Errors
    ///
    /// Returns an error if a histogram rejects the value.
    pub fn record(&mut self, sample: &Sample) -> Result<(), MetricsError> {
        match sample {
            Sample::Request(request) => self.record_request(request),
            Sample::Iteration { duration } => {
                self.iterations = self.iterations.saturating_add(1);
                self.iteration_duration.record(*duration)
            }
        }
    }

    fn record_request(&mut self, request: &RequestMetrics) -> Result<(), MetricsError> {
        self.http_reqs = self.http_reqs.saturating_add(1);
        if request.failed {
            self.http_req_failed = self.http_req_failed.saturating_add(1);
        }
        if request.check_passed {
            self.checks_passed = self.checks_passed.saturating_add(1);
        } else {
            self.checks_failed = self.checks_failed.saturating_add(1);
        }
        self.data_received = self.data_received.saturating_add(request.bytes);
        self.http_req_duration.record(request.response_time)?;

        if !self.by_tag.contains_key(request.tag.as_ref()) {
            self.by_tag.insert(
                request.tag.to_string(),
                TagReport {
                    http_reqs: 0,
                    failed: 0,
                    http_req_duration: Trend::new()?,
                },
            );
        }
        let Some(tag) = self.by_tag.get_mut(request.tag.as_ref()) else {
            return Ok(());
        };
        tag.http_reqs = tag.http_reqs.saturating_add(1);
        if request.failed {
            tag.failed = tag.failed.saturating_add(1);
        }
        tag.http_req_duration.record(request.response_time)
    }
}

/// Final metrics for one test run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub duration: Duration,
    pub vus: usize,
    pub totals: Aggregates,
}

impl RunReport {
    #[must_use]
    pub const fn new(duration: Duration, vus: usize, totals: Aggregates) -> Self {
        Self {
            duration,
            vus,
            totals,
        }
    }

    #[must_use]
    pub fn per_second(&self, count: u64) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        count as f64 / secs
    }

    #[must_use]
    pub fn http_reqs_rate(&self) -> f64 {
        self.per_second(self.totals.http_reqs)
    }

    #[must_use]
    pub fn http_req_failed_rate(&self) -> f64 {
        ratio(self.totals.http_req_failed, self.totals.http_reqs)
    }

    #[must_use]
    pub fn checks_rate(&self) -> f64 {
        let total = self
            .totals
            .checks_passed
            .saturating_add(self.totals.checks_failed);
        ratio(self.totals.checks_passed, total)
    }
}

#[must_use]
pub fn ratio(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64
}
