use crate::http::{Target, check_name};
use crate::metrics::{RunReport, TrendStats, ratio};
use crate::thresholds::{ThresholdMetric, ThresholdOutcome};

/// Width metric names are padded to with dots.
const NAME_WIDTH: usize = 32;
/// Milliseconds per second.
const MS_PER_SEC: f64 = 1_000.0;
/// Microseconds per millisecond.
const US_PER_MS: f64 = 1_000.0;

/// k6-style duration: `850.00µs`, `12.34ms`, `1.50s`.
pub(crate) fn format_duration_ms(ms: f64) -> String {
    if ms >= MS_PER_SEC {
        format!("{:.2}s", ms / MS_PER_SEC)
    } else if ms > 0.0 && ms < 1.0 {
        format!("{:.2}µs", ms * US_PER_MS)
    } else {
        format!("{:.2}ms", ms)
    }
}

fn format_trend(stats: &TrendStats) -> String {
    format!(
        "avg={} min={} med={} max={} p(90)={} p(95)={}",
        format_duration_ms(stats.avg),
        format_duration_ms(stats.min),
        format_duration_ms(stats.med),
        format_duration_ms(stats.max),
        format_duration_ms(stats.p90),
        format_duration_ms(stats.p95)
    )
}

fn percent(rate: f64) -> String {
    format!("{:.2}%", rate * 100.0)
}

/// Threshold mark for a metric line: `✓`/`✗`, or blank when unguarded.
fn mark(outcomes: &[ThresholdOutcome], metric: ThresholdMetric) -> &'static str {
    let mut guarded = outcomes
        .iter()
        .filter(|outcome| outcome.threshold.metric == metric)
        .peekable();
    if guarded.peek().is_none() {
        return " ";
    }
    if guarded.all(|outcome| outcome.passed) {
        "✓"
    } else {
        "✗"
    }
}

fn metric_line(marker: &str, name: &str, value: &str) -> String {
    let dots = NAME_WIDTH.saturating_sub(name.chars().count());
    let mut label = name.to_owned();
    label.extend(std::iter::repeat_n('.', dots));
    format!("   {} {}: {}", marker, label, value)
}

pub(crate) fn summary_lines(
    report: &RunReport,
    target: &Target,
    outcomes: &[ThresholdOutcome],
    expected_status: u16,
) -> Vec<String> {
    let totals = &report.totals;
    let mut lines = Vec::new();

    lines.push(format!(
        "  target: GET {} (offset={}, page={}, size={})",
        target.url, target.offset, target.query.page, target.query.size
    ));
    lines.push(format!(
        "  run: {} VU(s), {:.1}s",
        report.vus,
        report.duration.as_secs_f64()
    ));
    lines.push(String::new());

    let check_total = totals.checks_passed.saturating_add(totals.checks_failed);
    let check_mark = if totals.checks_failed == 0 { "✓" } else { "✗" };
    lines.push(format!("     {} {}", check_mark, check_name(expected_status)));
    if totals.checks_failed > 0 {
        lines.push(format!(
            "      ↳  {:.0}% - ✓ {} / ✗ {}",
            ratio(totals.checks_passed, check_total) * 100.0,
            totals.checks_passed,
            totals.checks_failed
        ));
    }
    lines.push(String::new());

    lines.push(metric_line(
        mark(outcomes, ThresholdMetric::Checks),
        "checks",
        &format!(
            "{} ✓ {} ✗ {}",
            percent(report.checks_rate()),
            totals.checks_passed,
            totals.checks_failed
        ),
    ));
    lines.push(metric_line(
        " ",
        "data_received",
        &format!(
            "{} B {:.1} B/s",
            totals.data_received,
            report.per_second(totals.data_received)
        ),
    ));
    lines.push(metric_line(
        mark(outcomes, ThresholdMetric::HttpReqDuration),
        "http_req_duration",
        &format_trend(&totals.http_req_duration.stats()),
    ));
    for (tag, tag_report) in &totals.by_tag {
        lines.push(metric_line(
            " ",
            &format!("  {{ name:{} }}", tag),
            &format_trend(&tag_report.http_req_duration.stats()),
        ));
    }
    lines.push(metric_line(
        mark(outcomes, ThresholdMetric::HttpReqFailed),
        "http_req_failed",
        &format!(
            "{} ✓ {} ✗ {}",
            percent(report.http_req_failed_rate()),
            totals.http_req_failed,
            totals.http_reqs.saturating_sub(totals.http_req_failed)
        ),
    ));
    lines.push(metric_line(
        " ",
        "http_reqs",
        &format!("{} {:.2}/s", totals.http_reqs, report.http_reqs_rate()),
    ));
    lines.push(metric_line(
        mark(outcomes, ThresholdMetric::IterationDuration),
        "iteration_duration",
        &format_trend(&totals.iteration_duration.stats()),
    ));
    lines.push(metric_line(
        " ",
        "iterations",
        &format!(
            "{} {:.2}/s",
            totals.iterations,
            report.per_second(totals.iterations)
        ),
    ));
    lines.push(metric_line(" ", "vus", &report.vus.to_string()));

    if !outcomes.is_empty() {
        lines.push(String::new());
        lines.push("  thresholds:".to_owned());
        for outcome in outcomes {
            let observed = match outcome.threshold.metric {
                ThresholdMetric::HttpReqDuration | ThresholdMetric::IterationDuration => {
                    format_duration_ms(outcome.observed)
                }
                ThresholdMetric::HttpReqFailed | ThresholdMetric::Checks => {
                    format!("{:.4}", outcome.observed)
                }
            };
            lines.push(format!(
                "   {} {} (observed {})",
                if outcome.passed { "✓" } else { "✗" },
                outcome.threshold,
                observed
            ));
        }
    }

    lines
}

pub(crate) fn print_summary(lines: &[String]) {
    println!();
    for line in lines {
        println!("{}", line);
    }
    println!();
}
