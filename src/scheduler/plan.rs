use std::time::Duration;

use serde::Serialize;

use super::PlanKind;

/// One ramp segment: move linearly to `target` workers over `duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stage {
    #[serde(with = "millis")]
    pub duration: Duration,
    pub target: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RampingVusPlan {
    pub start_vus: u64,
    pub stages: Vec<Stage>,
    #[serde(with = "millis")]
    pub graceful_ramp_down: Duration,
    #[serde(with = "millis")]
    pub graceful_stop: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharedIterationsPlan {
    pub vus: u64,
    pub iterations: u64,
    #[serde(with = "millis")]
    pub max_duration: Duration,
    #[serde(with = "millis")]
    pub graceful_stop: Duration,
}

/// Concurrency plan of a run. Chosen once and never changed while running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "executor", rename_all = "kebab-case")]
pub enum Plan {
    RampingVus(RampingVusPlan),
    SharedIterations(SharedIterationsPlan),
}

impl Plan {
    #[must_use]
    pub const fn kind(&self) -> PlanKind {
        match self {
            Plan::RampingVus(_) => PlanKind::RampingVus,
            Plan::SharedIterations(_) => PlanKind::SharedIterations,
        }
    }

    /// Highest worker count the plan can reach.
    #[must_use]
    pub fn max_vus(&self) -> u64 {
        match self {
            Plan::RampingVus(plan) => plan
                .stages
                .iter()
                .map(|stage| stage.target)
                .fold(plan.start_vus, u64::max),
            Plan::SharedIterations(plan) => plan.vus,
        }
    }

    /// Longest wall-clock time the plan may take, drain included.
    #[must_use]
    pub fn max_duration(&self) -> Duration {
        match self {
            Plan::RampingVus(plan) => plan
                .stages
                .iter()
                .fold(Duration::ZERO, |total, stage| {
                    total.saturating_add(stage.duration)
                })
                .saturating_add(plan.graceful_stop),
            Plan::SharedIterations(plan) => plan.max_duration.saturating_add(plan.graceful_stop),
        }
    }
}

/// Durations are exported as whole milliseconds.
pub(super) mod millis {
    use std::time::Duration;

    use serde::Serializer;

    pub(crate) fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u128(value.as_millis())
    }
}
