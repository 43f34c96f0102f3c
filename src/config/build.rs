use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::ConfigError;
use crate::metrics::Stat;
use crate::scheduler::{Plan, RampingVusPlan, SharedIterationsPlan, Stage};
use crate::thresholds::{Threshold, ThresholdSet};

use super::types::{DurationValue, PlanConfig, StageConfig, ThresholdEntry};

const DEFAULT_GRACEFUL: Duration = Duration::from_secs(30);
const DEFAULT_MAX_DURATION: Duration = Duration::from_secs(600);

/// A validated mode: its concurrency plan and the thresholds judged
/// against the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModePlan {
    pub name: String,
    pub plan: Plan,
    pub thresholds: ThresholdSet,
}

/// Validates a raw plan definition.
///
/// # Errors
///
/// Returns an error for an unknown executor, a ramp without stages, zero
/// workers or iterations, unparseable durations, or invalid thresholds.
pub fn build_mode_plan(name: &str, config: PlanConfig) -> Result<ModePlan, ConfigError> {
    let executor = config
        .executor
        .as_deref()
        .map(str::trim)
        .ok_or_else(|| ConfigError::MissingField {
            plan: name.to_owned(),
            field: "executor",
        })?;
    let plan = match executor {
        "ramping-vus" => Plan::RampingVus(ramping_plan(name, &config)?),
        "shared-iterations" => Plan::SharedIterations(shared_plan(name, &config)?),
        other => {
            return Err(ConfigError::UnknownExecutor {
                plan: name.to_owned(),
                value: other.to_owned(),
            });
        }
    };
    let thresholds = config
        .thresholds
        .as_ref()
        .map(build_thresholds)
        .transpose()?
        .unwrap_or_default();
    Ok(ModePlan {
        name: name.to_owned(),
        plan,
        thresholds,
    })
}

fn duration_field(
    plan: &str,
    field: &str,
    value: Option<&DurationValue>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    value.map_or(Ok(default), |value| {
        value.to_pause().map_err(|message| ConfigError::InvalidDuration {
            field: format!("plans.{}.{}", plan, field),
            message,
        })
    })
}

fn build_stage(plan: &str, index: usize, stage: &StageConfig) -> Result<Stage, ConfigError> {
    let duration = stage
        .duration
        .to_pause()
        .map_err(|message| ConfigError::InvalidStage {
            plan: plan.to_owned(),
            index,
            message,
        })?;
    Ok(Stage {
        duration,
        target: stage.target,
    })
}

fn ramping_plan(name: &str, config: &PlanConfig) -> Result<RampingVusPlan, ConfigError> {
    let stage_configs = config
        .stages
        .as_deref()
        .filter(|stages| !stages.is_empty())
        .ok_or_else(|| ConfigError::PlanMissingStages {
            plan: name.to_owned(),
        })?;
    let stages = stage_configs
        .iter()
        .enumerate()
        .map(|(index, stage)| build_stage(name, index, stage))
        .collect::<Result<Vec<_>, _>>()?;

    if stages.iter().all(|stage| stage.duration.is_zero()) {
        return Err(ConfigError::InvalidStage {
            plan: name.to_owned(),
            index: 0,
            message: "stages must last longer than zero in total.".to_owned(),
        });
    }
    let start_vus = config.start_vus.unwrap_or(0);
    if stages.iter().all(|stage| stage.target == 0) && start_vus == 0 {
        return Err(ConfigError::FieldMustBePositive {
            plan: name.to_owned(),
            field: "target",
        });
    }

    Ok(RampingVusPlan {
        start_vus,
        stages,
        graceful_ramp_down: duration_field(
            name,
            "graceful_ramp_down",
            config.graceful_ramp_down.as_ref(),
            DEFAULT_GRACEFUL,
        )?,
        graceful_stop: duration_field(
            name,
            "graceful_stop",
            config.graceful_stop.as_ref(),
            DEFAULT_GRACEFUL,
        )?,
    })
}

fn shared_plan(name: &str, config: &PlanConfig) -> Result<SharedIterationsPlan, ConfigError> {
    let positive = |value: Option<u64>, field: &'static str| match value.unwrap_or(1) {
        0 => Err(ConfigError::FieldMustBePositive {
            plan: name.to_owned(),
            field,
        }),
        count => Ok(count),
    };
    let max_duration = duration_field(
        name,
        "max_duration",
        config.max_duration.as_ref(),
        DEFAULT_MAX_DURATION,
    )?;
    if max_duration.is_zero() {
        return Err(ConfigError::InvalidDuration {
            field: format!("plans.{}.max_duration", name),
            message: "Duration must be > 0.".to_owned(),
        });
    }
    Ok(SharedIterationsPlan {
        vus: positive(config.vus, "vus")?,
        iterations: positive(config.iterations, "iterations")?,
        max_duration,
        graceful_stop: duration_field(
            name,
            "graceful_stop",
            config.graceful_stop.as_ref(),
            DEFAULT_GRACEFUL,
        )?,
    })
}

fn build_thresholds(
    entries: &BTreeMap<String, Vec<ThresholdEntry>>,
) -> Result<ThresholdSet, ConfigError> {
    let mut set = ThresholdSet::default();
    for (metric, conditions) in entries {
        for entry in conditions {
            let threshold = Threshold::parse(metric, entry.expression(), entry.abort_on_fail())
                .map_err(|err| ConfigError::InvalidThreshold {
                    metric: metric.clone(),
                    source: err,
                })?;
            set.push(threshold);
        }
    }
    Ok(set)
}

/// Parses summary trend columns such as `avg`, `p(95)`.
///
/// # Errors
///
/// Returns an error for anything that is not a duration statistic.
pub fn parse_trend_stats(values: &[String]) -> Result<Vec<Stat>, ConfigError> {
    values
        .iter()
        .map(|value| {
            value
                .parse::<Stat>()
                .ok()
                .filter(|stat| stat.is_trend())
                .ok_or_else(|| ConfigError::InvalidTrendStat {
                    value: value.clone(),
                })
        })
        .collect()
}
