use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};

use crate::error::{AppResult, MetricsError};
use crate::http::Target;
use crate::metrics::{RunReport, TrendStats};
use crate::thresholds::{ThresholdMetric, ThresholdOutcome};

fn trend_value(stats: &TrendStats) -> Value {
    json!({
        "avg": stats.avg,
        "min": stats.min,
        "med": stats.med,
        "max": stats.max,
        "p(90)": stats.p90,
        "p(95)": stats.p95,
    })
}

/// `{ "<expr>": { "ok": bool } }` for every threshold on `metric`.
fn thresholds_value(outcomes: &[ThresholdOutcome], metric: ThresholdMetric) -> Option<Value> {
    let mut entries = Map::new();
    for outcome in outcomes
        .iter()
        .filter(|outcome| outcome.threshold.metric == metric)
    {
        entries.insert(
            outcome.threshold.expression(),
            json!({ "ok": outcome.passed }),
        );
    }
    if entries.is_empty() {
        None
    } else {
        Some(Value::Object(entries))
    }
}

fn with_thresholds(
    mut metric_value: Value,
    outcomes: &[ThresholdOutcome],
    metric: ThresholdMetric,
) -> Value {
    if let (Value::Object(fields), Some(thresholds)) =
        (&mut metric_value, thresholds_value(outcomes, metric))
    {
        fields.insert("thresholds".to_owned(), thresholds);
    }
    metric_value
}

/// Builds the JSON summary document for one run.
#[must_use]
pub(crate) fn summary_document(
    report: &RunReport,
    target: &Target,
    outcomes: &[ThresholdOutcome],
    expected_status: u16,
    started_at: DateTime<Utc>,
) -> Value {
    let totals = &report.totals;
    let mut metrics = Map::new();

    metrics.insert(
        "http_req_duration".to_owned(),
        with_thresholds(
            trend_value(&totals.http_req_duration.stats()),
            outcomes,
            ThresholdMetric::HttpReqDuration,
        ),
    );
    metrics.insert(
        "iteration_duration".to_owned(),
        with_thresholds(
            trend_value(&totals.iteration_duration.stats()),
            outcomes,
            ThresholdMetric::IterationDuration,
        ),
    );
    metrics.insert(
        "http_reqs".to_owned(),
        json!({ "count": totals.http_reqs, "rate": report.http_reqs_rate() }),
    );
    // k6 counts a "pass" of http_req_failed as a request that failed.
    metrics.insert(
        "http_req_failed".to_owned(),
        with_thresholds(
            json!({
                "passes": totals.http_req_failed,
                "fails": totals.http_reqs.saturating_sub(totals.http_req_failed),
                "value": report.http_req_failed_rate(),
            }),
            outcomes,
            ThresholdMetric::HttpReqFailed,
        ),
    );
    metrics.insert(
        "checks".to_owned(),
        with_thresholds(
            json!({
                "passes": totals.checks_passed,
                "fails": totals.checks_failed,
                "value": report.checks_rate(),
            }),
            outcomes,
            ThresholdMetric::Checks,
        ),
    );
    metrics.insert(
        "iterations".to_owned(),
        json!({
            "count": totals.iterations,
            "rate": report.per_second(totals.iterations),
        }),
    );
    metrics.insert(
        "data_received".to_owned(),
        json!({
            "count": totals.data_received,
            "rate": report.per_second(totals.data_received),
        }),
    );
    metrics.insert(
        "vus".to_owned(),
        json!({ "value": report.vus, "min": report.vus, "max": report.vus }),
    );
    metrics.insert(
        "vus_max".to_owned(),
        json!({ "value": report.vus, "min": report.vus, "max": report.vus }),
    );

    for (tag, tag_report) in &totals.by_tag {
        metrics.insert(
            format!("http_req_duration{{name:{}}}", tag),
            trend_value(&tag_report.http_req_duration.stats()),
        );
        metrics.insert(
            format!("http_reqs{{name:{}}}", tag),
            json!({
                "count": tag_report.http_reqs,
                "rate": report.per_second(tag_report.http_reqs),
            }),
        );
    }

    let check_name = crate::http::check_name(expected_status);
    json!({
        "root_group": {
            "name": "",
            "path": "",
            "groups": [],
            "checks": {
                check_name.clone(): {
                    "name": check_name,
                    "path": format!("::{}", check_name),
                    "passes": totals.checks_passed,
                    "fails": totals.checks_failed,
                }
            }
        },
        "metrics": Value::Object(metrics),
        "state": {
            "isStdOutTTY": false,
            "isStdErrTTY": false,
            "testRunDurationMs": report.duration.as_secs_f64() * 1_000.0,
            "startedAt": started_at.to_rfc3339(),
        },
        "target": {
            "url": target.url.as_str(),
            "page": target.query.page,
            "size": target.query.size,
            "offset": target.offset,
        },
    })
}

/// Writes `document` as pretty JSON, creating missing parent directories.
///
/// # Errors
///
/// Returns an error when serialization or any filesystem step fails.
pub(crate) async fn write_summary(path: &Path, document: &Value) -> AppResult<()> {
    let write_error = |source: std::io::Error| MetricsError::WriteSummary {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(write_error)?;
    }
    let body = serde_json::to_vec_pretty(document)?;
    tokio::fs::write(path, body).await.map_err(write_error)?;
    Ok(())
}
