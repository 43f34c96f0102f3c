use std::time::Duration;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tempfile::tempdir;

use super::types::{ConfigFile, PlanConfig, StageConfig, ThresholdEntry};
use super::*;
use crate::args::VuloadArgs;
use crate::error::{ConfigError, ThresholdError};
use crate::metrics::Stat;
use crate::scheduler::Plan;

fn parse_args(argv: &[&str]) -> Result<(VuloadArgs, ArgMatches), String> {
    let matches = VuloadArgs::command()
        .try_get_matches_from(argv)
        .map_err(|err| err.to_string())?;
    let args = VuloadArgs::from_arg_matches(&matches).map_err(|err| err.to_string())?;
    Ok((args, matches))
}

fn toml_config(content: &str) -> Result<ConfigFile, String> {
    toml::from_str(content).map_err(|err| err.to_string())
}

#[test]
fn parse_toml_config_with_plans() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("vuload.toml");
    let content = r#"
base_url = "http://shop.internal:9000"
mode = "smoke"
pacing = "500ms"

[plans.smoke]
executor = "ramping-vus"
startVUs = 1
gracefulRampDown = "5s"
stages = [
    { duration = "10s", target = 3 },
    { duration = 5, target = 0 },
]

[plans.smoke.thresholds]
http_req_failed = [{ threshold = "rate<0.01", abortOnFail = true }]
"http_req_duration{group:::login}" = ["p(95)<400", "avg<200"]
"#;
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;

    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    if config.base_url.as_deref() != Some("http://shop.internal:9000") {
        return Err(format!("Unexpected base_url {:?}", config.base_url));
    }
    let mode = resolve_mode("smoke", Some(&config)).map_err(|err| err.to_string())?;
    let Plan::RampingVus(plan) = &mode.plan else {
        return Err(format!("Expected ramping plan, got {:?}", mode.plan));
    };
    if plan.start_vus != 1
        || plan.stages.len() != 2
        || plan.graceful_ramp_down != Duration::from_secs(5)
        || plan.graceful_stop != Duration::from_secs(30)
    {
        return Err(format!("Unexpected plan {:?}", plan));
    }
    if mode.thresholds.len() != 3 {
        return Err(format!("Expected 3 thresholds, got {}", mode.thresholds.len()));
    }
    let abortable: Vec<bool> = mode
        .thresholds
        .iter()
        .map(|threshold| threshold.abort_on_fail)
        .collect();
    if abortable != [false, false, true] {
        return Err(format!("Unexpected abort flags {:?}", abortable));
    }
    Ok(())
}

#[test]
fn parse_json_config_with_shared_plan() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("vuload.json");
    let content = r#"{
  "mode": "soak",
  "plans": {
    "soak": {
      "executor": "shared-iterations",
      "vus": 4,
      "iterations": 40,
      "maxDuration": "2m",
      "thresholds": { "checks": ["rate>0.99"] }
    }
  }
}"#;
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;

    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    let mode = resolve_mode("soak", Some(&config)).map_err(|err| err.to_string())?;
    match mode.plan {
        Plan::SharedIterations(plan)
            if plan.vus == 4
                && plan.iterations == 40
                && plan.max_duration == Duration::from_secs(120) =>
        {
            Ok(())
        }
        other => Err(format!("Unexpected plan {:?}", other)),
    }
}

#[test]
fn config_extension_is_required() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let yaml = dir.path().join("vuload.yaml");
    let bare = dir.path().join("vuload");
    for path in [&yaml, &bare] {
        std::fs::write(path, "mode: load").map_err(|err| format!("write failed: {}", err))?;
    }
    match load_config_file(&yaml) {
        Err(ConfigError::UnsupportedExtension { ext }) if ext == "yaml" => {}
        other => return Err(format!("Expected UnsupportedExtension, got {:?}", other)),
    }
    match load_config_file(&bare) {
        Err(ConfigError::MissingExtension) => Ok(()),
        other => Err(format!("Expected MissingExtension, got {:?}", other)),
    }
}

#[test]
fn builtin_modes_match_their_presets() -> Result<(), String> {
    let expectations = [
        ("load", 3, 60, 15, 6),
        ("stress", 6, 110, 30, 6),
        ("spike", 2, 60, 10, 6),
    ];
    for (name, stage_count, total_secs, graceful_secs, threshold_count) in expectations {
        let mode = resolve_mode(name, None).map_err(|err| err.to_string())?;
        let Plan::RampingVus(plan) = &mode.plan else {
            return Err(format!("{} should be a ramping plan", name));
        };
        let total: Duration = plan.stages.iter().map(|stage| stage.duration).sum();
        if plan.stages.len() != stage_count
            || total != Duration::from_secs(total_secs)
            || plan.graceful_ramp_down != Duration::from_secs(graceful_secs)
            || plan.graceful_stop != Duration::from_secs(graceful_secs)
            || plan.start_vus != 0
        {
            return Err(format!("{} has unexpected plan {:?}", name, plan));
        }
        if mode.thresholds.len() != threshold_count {
            return Err(format!("{} has {} thresholds", name, mode.thresholds.len()));
        }
    }
    if resolve_mode("spike", None)
        .map_err(|err| err.to_string())?
        .plan
        .max_vus()
        != 100
    {
        return Err("spike should peak at 100 workers".to_owned());
    }

    let volume = resolve_mode("volume", None).map_err(|err| err.to_string())?;
    match &volume.plan {
        Plan::SharedIterations(plan)
            if plan.vus == 30
                && plan.iterations == 3000
                && plan.max_duration == Duration::from_secs(300)
                && plan.graceful_stop == Duration::from_secs(30) => {}
        other => return Err(format!("volume has unexpected plan {:?}", other)),
    }
    let has_iteration_threshold = volume
        .thresholds
        .iter()
        .any(|threshold| threshold.key.to_string() == "iteration_duration");
    if volume.thresholds.len() != 7 || !has_iteration_threshold {
        return Err("volume should add an iteration_duration threshold".to_owned());
    }
    Ok(())
}

#[test]
fn unknown_mode_lists_available_modes() -> Result<(), String> {
    let config = toml_config("[plans.smoke]\nexecutor = \"shared-iterations\"\n")?;
    match resolve_mode("soak", Some(&config)) {
        Err(ConfigError::UnknownMode { mode, available }) => {
            if mode != "soak" || available != "load, smoke, spike, stress, volume" {
                return Err(format!("Unexpected error fields {} / {}", mode, available));
            }
            Ok(())
        }
        other => Err(format!("Expected UnknownMode, got {:?}", other)),
    }
}

#[test]
fn invalid_plans_are_rejected() -> Result<(), String> {
    let ramping = |stages: Vec<StageConfig>| PlanConfig {
        executor: Some("ramping-vus".to_owned()),
        stages: Some(stages),
        ..PlanConfig::default()
    };
    let stage = |duration: &str, target: u64| StageConfig {
        duration: types::DurationValue::Text(duration.to_owned()),
        target,
    };

    match build_mode_plan("empty", ramping(Vec::new())) {
        Err(ConfigError::PlanMissingStages { plan }) if plan == "empty" => {}
        other => return Err(format!("Expected PlanMissingStages, got {:?}", other)),
    }
    match build_mode_plan("idle", ramping(vec![stage("10s", 0)])) {
        Err(ConfigError::FieldMustBePositive { field: "target", .. }) => {}
        other => return Err(format!("Expected FieldMustBePositive, got {:?}", other)),
    }
    match build_mode_plan("bad-stage", ramping(vec![stage("10s", 2), stage("ten", 0)])) {
        Err(ConfigError::InvalidStage { index: 1, .. }) => {}
        other => return Err(format!("Expected InvalidStage, got {:?}", other)),
    }

    let shared = PlanConfig {
        executor: Some("shared-iterations".to_owned()),
        vus: Some(0),
        ..PlanConfig::default()
    };
    match build_mode_plan("nobody", shared) {
        Err(ConfigError::FieldMustBePositive { field: "vus", .. }) => {}
        other => return Err(format!("Expected FieldMustBePositive, got {:?}", other)),
    }

    let unknown = PlanConfig {
        executor: Some("constant-arrival-rate".to_owned()),
        ..PlanConfig::default()
    };
    match build_mode_plan("arrival", unknown) {
        Err(ConfigError::UnknownExecutor { value, .. }) if value == "constant-arrival-rate" => {}
        other => return Err(format!("Expected UnknownExecutor, got {:?}", other)),
    }
    match build_mode_plan("bare", PlanConfig::default()) {
        Err(ConfigError::MissingField {
            field: "executor", ..
        }) => {}
        other => return Err(format!("Expected MissingField, got {:?}", other)),
    }

    let mut bad_threshold = ramping(vec![stage("10s", 2)]);
    bad_threshold.thresholds = Some(
        [(
            "http_req_duration".to_owned(),
            vec![ThresholdEntry::Expression("p(95)<fast".to_owned())],
        )]
        .into_iter()
        .collect(),
    );
    match build_mode_plan("strict", bad_threshold) {
        Err(ConfigError::InvalidThreshold { metric, .. }) if metric == "http_req_duration" => {}
        other => return Err(format!("Expected InvalidThreshold, got {:?}", other)),
    }

    let mut untagged_step = ramping(vec![stage("10s", 2)]);
    untagged_step.thresholds = Some(
        [(
            "group_duration".to_owned(),
            vec![ThresholdEntry::Expression("p(95)<1000".to_owned())],
        )]
        .into_iter()
        .collect(),
    );
    match build_mode_plan("steps", untagged_step) {
        Err(ConfigError::InvalidThreshold {
            metric,
            source: ThresholdError::UnrecordedSeries { .. },
        }) if metric == "group_duration" => Ok(()),
        other => Err(format!("Expected UnrecordedSeries, got {:?}", other)),
    }
}

#[test]
fn config_plan_overrides_builtin_fields() -> Result<(), String> {
    let config = toml_config(
        r#"
[plans.load]
stages = [{ duration = "2s", target = 2 }]
gracefulStop = "1s"
"#,
    )?;
    let mode = resolve_mode("load", Some(&config)).map_err(|err| err.to_string())?;
    let Plan::RampingVus(plan) = &mode.plan else {
        return Err("load should stay a ramping plan".to_owned());
    };
    if plan.stages.len() != 1
        || plan.graceful_stop != Duration::from_secs(1)
        || plan.graceful_ramp_down != Duration::from_secs(15)
    {
        return Err(format!("Unexpected merged plan {:?}", plan));
    }
    if mode.thresholds.len() != 6 {
        return Err("built-in thresholds should be kept".to_owned());
    }
    Ok(())
}

#[test]
fn cli_flags_beat_config_file_values() -> Result<(), String> {
    let config = toml_config(
        r#"
base_url = "http://from-config:1"
mode = "spike"
pacing = "0"
summary_trend_stats = ["avg", "p(99.9)"]
"#,
    )?;

    let (args, matches) = parse_args(&["vuload"])?;
    let run = resolve_run_config(&args, &matches, Some(&config)).map_err(|err| err.to_string())?;
    if run.base_url != "http://from-config:1" || run.mode.name != "spike" {
        return Err(format!("Config values not applied: {:?}", run));
    }
    if run.pacing != Duration::ZERO {
        return Err(format!("Expected pacing 0, got {:?}", run.pacing));
    }
    let rendered: Vec<String> = run.trend_stats.iter().map(Stat::to_string).collect();
    if rendered != ["avg", "p(99.9)"] {
        return Err(format!("Unexpected trend stats {:?}", rendered));
    }

    let (args, matches) = parse_args(&[
        "vuload",
        "--base-url",
        "http://from-cli:2",
        "--mode",
        "volume",
        "--pacing",
        "250ms",
    ])?;
    let run = resolve_run_config(&args, &matches, Some(&config)).map_err(|err| err.to_string())?;
    if run.base_url != "http://from-cli:2"
        || run.mode.name != "volume"
        || run.pacing != Duration::from_millis(250)
    {
        return Err(format!("CLI values not preferred: {:?}", run));
    }
    Ok(())
}

#[test]
fn defaults_apply_without_config() -> Result<(), String> {
    let (args, matches) = parse_args(&["vuload", "--abort-on-breach"])?;
    let run = resolve_run_config(&args, &matches, None).map_err(|err| err.to_string())?;
    if run.mode.name != DEFAULT_MODE
        || run.base_url != "http://localhost:8091"
        || run.pacing != Duration::from_secs(1)
        || run.evaluation_interval != Duration::from_secs(1)
        || !run.abort_on_breach
    {
        return Err(format!("Unexpected defaults {:?}", run));
    }
    if run.trend_stats.len() != 7 || run.summary_export.is_some() {
        return Err(format!("Unexpected summary settings {:?}", run));
    }
    Ok(())
}

#[test]
fn invalid_config_values_are_reported() -> Result<(), String> {
    let (args, matches) = parse_args(&["vuload"])?;

    let bad_url = toml_config("base_url = \"not a url\"")?;
    match resolve_run_config(&args, &matches, Some(&bad_url)) {
        Err(ConfigError::InvalidBaseUrl { .. }) => {}
        other => return Err(format!("Expected InvalidBaseUrl, got {:?}", other)),
    }
    let bad_stat = toml_config("summary_trend_stats = [\"rate\"]")?;
    match resolve_run_config(&args, &matches, Some(&bad_stat)) {
        Err(ConfigError::InvalidTrendStat { value }) if value == "rate" => {}
        other => return Err(format!("Expected InvalidTrendStat, got {:?}", other)),
    }
    let bad_timeout = toml_config("request_timeout = \"0s\"")?;
    match resolve_run_config(&args, &matches, Some(&bad_timeout)) {
        Err(ConfigError::InvalidDuration { field, .. }) if field == "request_timeout" => Ok(()),
        other => Err(format!("Expected InvalidDuration, got {:?}", other)),
    }
}

#[test]
fn duration_values_parse_units() -> Result<(), String> {
    let cases = [
        ("250ms", Duration::from_millis(250)),
        ("20s", Duration::from_secs(20)),
        ("15", Duration::from_secs(15)),
        ("5m", Duration::from_secs(300)),
        ("1h", Duration::from_secs(3600)),
    ];
    for (text, expected) in cases {
        let parsed = parse_duration_value(text)?;
        if parsed != expected {
            return Err(format!("{} parsed as {:?}", text, parsed));
        }
    }
    for bad in ["", "s", "10d", "0s", "1.5s"] {
        if parse_duration_value(bad).is_ok() {
            return Err(format!("{} should be rejected", bad));
        }
    }
    if parse_pause_value("0")? != Duration::ZERO {
        return Err("pauses may be zero".to_owned());
    }
    Ok(())
}
