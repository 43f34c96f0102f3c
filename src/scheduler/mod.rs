//! Drives worker concurrency according to a [`Plan`].
mod phase;
mod plan;
mod ramp;
mod ramping;
mod shared;
mod worker;


use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use serde::Serialize;

use crate::pipeline::PipelineContext;
use crate::shutdown::{ShutdownReceiver, StopReason};

pub use phase::{Phase, PhaseChange, PhaseTracker, PlanKind};
pub use plan::{Plan, RampingVusPlan, SharedIterationsPlan, Stage};
pub use ramp::RampController;

use worker::IterationCounters;

/// How often the controller re-evaluates the worker target.
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

/// What happened during a run, independent of the metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub iterations_started: u64,
    pub iterations_completed: u64,
    pub workers_spawned: u64,
    pub hard_stopped: u64,
    #[serde(rename = "elapsed_ms", with = "plan::millis")]
    pub elapsed: Duration,
    pub aborted_by: Option<StopReason>,
    pub max_duration_reached: bool,
    pub phases: Vec<PhaseChange>,
}

impl RunStats {
    fn finish(&mut self, counters: &IterationCounters, elapsed: Duration, phases: PhaseTracker) {
        self.iterations_started = counters.started.load(Ordering::Relaxed);
        self.iterations_completed = counters.completed.load(Ordering::Relaxed);
        self.elapsed = elapsed;
        self.phases = phases.into_history();
    }

    /// Iterations cut off by a hard stop.
    #[must_use]
    pub const fn interrupted_iterations(&self) -> u64 {
        self.iterations_started
            .saturating_sub(self.iterations_completed)
    }
}

/// Runs `plan` to completion (or until a stop arrives on `shutdown_rx`)
/// and returns the run statistics once every worker has ended.
pub async fn run_plan(
    plan: &Plan,
    context: Arc<PipelineContext>,
    shutdown_rx: ShutdownReceiver,
    tick: Duration,
) -> RunStats {
    match plan {
        Plan::RampingVus(plan) => ramping::run_ramping(plan, context, shutdown_rx, tick).await,
        Plan::SharedIterations(plan) => shared::run_shared(plan, context, shutdown_rx, tick).await,
    }
}
