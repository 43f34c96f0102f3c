use std::time::Duration;

use crate::metrics::SeriesSnapshot;

use super::RunSummary;
use super::format::{format_measurement, format_micros, format_ppm};

const PASS_MARK: &str = "✓";
const FAIL_MARK: &str = "✗";
const KEY_WIDTH: usize = 40;

fn duration_micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

const fn mark(passed: bool) -> &'static str {
    if passed { PASS_MARK } else { FAIL_MARK }
}

fn series_line(snapshot: &SeriesSnapshot) -> String {
    let mut parts = Vec::new();
    if let Some(rate) = snapshot.rate {
        parts.push(format!(
            "rate={} {} {} {} {}",
            format_ppm(rate.rate_ppm()),
            PASS_MARK,
            rate.trues,
            FAIL_MARK,
            rate.falses()
        ));
    }
    if let Some(trend) = snapshot.trend.as_ref() {
        parts.extend(
            trend
                .values
                .iter()
                .map(|value| format!("{}={}", value.stat, format_micros(value.micros))),
        );
    }
    if parts.is_empty() {
        parts.push(format!("count={}", snapshot.count));
    }
    format!(
        "  {:<width$} {}",
        snapshot.key.to_string(),
        parts.join(" "),
        width = KEY_WIDTH
    )
}

/// Text report, one entry per line.
#[must_use]
pub fn summary_lines(summary: &RunSummary<'_>) -> Vec<String> {
    let mut lines = Vec::new();
    let run = summary.run;

    lines.push(format!(
        "Mode: {} ({}) against {}",
        summary.mode,
        summary.plan.kind(),
        summary.base_url
    ));
    lines.push(format!(
        "Duration: {}",
        format_micros(duration_micros(run.elapsed))
    ));
    lines.push(format!(
        "Iterations: {} completed / {} started ({} interrupted)",
        run.iterations_completed,
        run.iterations_started,
        run.interrupted_iterations()
    ));
    lines.push(format!(
        "Workers: {} spawned, {} hard stopped, max {}",
        run.workers_spawned,
        run.hard_stopped,
        summary.plan.max_vus()
    ));
    if let Some(reason) = run.aborted_by {
        lines.push(format!("Stopped early: {}", reason));
    }
    if run.max_duration_reached {
        lines.push("Stopped early: max duration reached".to_owned());
    }
    if !run.phases.is_empty() {
        let phases: Vec<String> = run
            .phases
            .iter()
            .map(|change| format!("{}@{}", change.phase, format_micros(duration_micros(change.at))))
            .collect();
        lines.push(format!("Phases: {}", phases.join(" -> ")));
    }

    lines.push(String::new());
    lines.push("Checks:".to_owned());
    if summary.checks.is_empty() {
        lines.push("  (none recorded)".to_owned());
    }
    for tally in &summary.checks {
        lines.push(format!(
            "  {} {} / {}: {} {} {} {}",
            mark(tally.fails == 0),
            tally.group,
            tally.name,
            PASS_MARK,
            tally.passes,
            FAIL_MARK,
            tally.fails
        ));
    }

    lines.push(String::new());
    lines.push("Metrics:".to_owned());
    lines.extend(summary.metrics.iter().map(series_line));

    lines.push(String::new());
    lines.push("Thresholds:".to_owned());
    if summary.thresholds.results.is_empty() {
        lines.push("  (none configured)".to_owned());
    }
    for result in &summary.thresholds.results {
        lines.push(format!(
            "  {} {} {} (observed {})",
            mark(result.passed),
            result.key,
            result.expression,
            format_measurement(&result.observed)
        ));
    }

    lines.push(String::new());
    if summary.passed {
        lines.push("Result: PASSED".to_owned());
    } else {
        lines.push(format!(
            "Result: FAILED ({} of {} thresholds breached)",
            summary.thresholds.failed(),
            summary.thresholds.total()
        ));
    }
    lines
}

pub fn print_summary(summary: &RunSummary<'_>) {
    for line in summary_lines(summary) {
        println!("{}", line);
    }
}
