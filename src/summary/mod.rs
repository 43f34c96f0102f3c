//! End-of-run report: a text summary for stdout and a JSON export.
mod export;
mod format;
mod lines;


use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::config::ModePlan;
use crate::metrics::{CheckTally, MetricsAggregator, SeriesSnapshot};
use crate::scheduler::{Plan, RunStats};
use crate::thresholds::Verdict;

pub use export::export_json;
pub use format::{format_measurement, format_micros, format_ppm};
pub use lines::{print_summary, summary_lines};

/// Everything reported once a run has ended.
#[derive(Debug, Serialize)]
pub struct RunSummary<'run> {
    pub generated_at: String,
    pub mode: &'run str,
    pub base_url: &'run str,
    pub plan: &'run Plan,
    pub run: &'run RunStats,
    pub metrics: Vec<SeriesSnapshot>,
    pub checks: Vec<CheckTally>,
    pub thresholds: &'run Verdict,
    pub passed: bool,
}

impl<'run> RunSummary<'run> {
    /// Snapshots the aggregator and stamps the report with the current time.
    #[must_use]
    pub fn collect(
        mode: &'run ModePlan,
        base_url: &'run str,
        run: &'run RunStats,
        verdict: &'run Verdict,
        metrics: &MetricsAggregator,
    ) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            mode: &mode.name,
            base_url,
            plan: &mode.plan,
            run,
            metrics: metrics.snapshot_all(),
            checks: metrics.check_tallies(),
            thresholds: verdict,
            passed: verdict.passed,
        }
    }
}
