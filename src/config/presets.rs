use std::collections::BTreeMap;

use super::types::{DurationValue, PlanConfig, StageConfig, ThresholdEntry};

/// Mode used when neither the CLI, the environment nor the config file
/// names one.
pub const DEFAULT_MODE: &str = "load";

/// Names of the built-in modes.
pub const BUILTIN_MODES: [&str; 4] = ["load", "stress", "spike", "volume"];

fn stages(spec: &[(&str, u64)]) -> Vec<StageConfig> {
    spec.iter()
        .map(|(duration, target)| StageConfig {
            duration: DurationValue::text(duration),
            target: *target,
        })
        .collect()
}

/// Request thresholds shared by every mode, differing only in their bounds:
/// failure rate, overall p95, per-group p95 (login, search, detail), and
/// check pass rate.
fn thresholds(
    failed: &str,
    overall: &str,
    groups: [&str; 3],
    checks: &str,
) -> BTreeMap<String, Vec<ThresholdEntry>> {
    let [login, search, detail] = groups;
    let entries = [
        ("http_req_failed", format!("rate<{}", failed)),
        ("http_req_duration", format!("p(95)<{}", overall)),
        ("http_req_duration{group:::login}", format!("p(95)<{}", login)),
        ("http_req_duration{group:::search}", format!("p(95)<{}", search)),
        ("http_req_duration{group:::detail}", format!("p(95)<{}", detail)),
        ("checks", format!("rate>{}", checks)),
    ];
    entries
        .into_iter()
        .map(|(metric, expression)| {
            (
                metric.to_owned(),
                vec![ThresholdEntry::Expression(expression)],
            )
        })
        .collect()
}

fn ramping(
    spec: &[(&str, u64)],
    graceful: &str,
    thresholds: BTreeMap<String, Vec<ThresholdEntry>>,
) -> PlanConfig {
    PlanConfig {
        executor: Some("ramping-vus".to_owned()),
        start_vus: Some(0),
        stages: Some(stages(spec)),
        graceful_ramp_down: Some(DurationValue::text(graceful)),
        graceful_stop: Some(DurationValue::text(graceful)),
        thresholds: Some(thresholds),
        ..PlanConfig::default()
    }
}

/// Built-in plan for `mode`, if there is one.
#[must_use]
pub fn builtin_plan(mode: &str) -> Option<PlanConfig> {
    match mode {
        "load" => Some(ramping(
            &[("15s", 15), ("30s", 30), ("15s", 0)],
            "15s",
            thresholds("0.03", "1000", ["900", "1200", "900"], "0.97"),
        )),
        "stress" => Some(ramping(
            &[
                ("20s", 10),
                ("10s", 25),
                ("10s", 35),
                ("30s", 35),
                ("20s", 20),
                ("20s", 0),
            ],
            "30s",
            thresholds("0.05", "1300", ["1200", "1500", "1200"], "0.95"),
        )),
        "spike" => Some(ramping(
            &[("30s", 100), ("30s", 0)],
            "10s",
            thresholds("0.10", "1800", ["1500", "2000", "1500"], "0.90"),
        )),
        "volume" => {
            let mut volume_thresholds =
                thresholds("0.05", "1600", ["1500", "1800", "1500"], "0.95");
            volume_thresholds.insert(
                "iteration_duration".to_owned(),
                vec![ThresholdEntry::Expression("p(95)<3500".to_owned())],
            );
            Some(PlanConfig {
                executor: Some("shared-iterations".to_owned()),
                vus: Some(30),
                iterations: Some(3000),
                max_duration: Some(DurationValue::text("5m")),
                graceful_stop: Some(DurationValue::text("30s")),
                thresholds: Some(volume_thresholds),
                ..PlanConfig::default()
            })
        }
        _ => None,
    }
}
