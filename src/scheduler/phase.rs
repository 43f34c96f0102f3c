use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Idle,
    RampingUp,
    Steady,
    RampingDown,
    Running,
    Draining,
    Terminated,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::RampingUp => "ramping-up",
            Phase::Steady => "steady",
            Phase::RampingDown => "ramping-down",
            Phase::Running => "running",
            Phase::Draining => "draining",
            Phase::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanKind {
    RampingVus,
    SharedIterations,
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanKind::RampingVus => f.write_str("ramping-vus"),
            PlanKind::SharedIterations => f.write_str("shared-iterations"),
        }
    }
}

const RAMPING_PHASES: [Phase; 6] = [
    Phase::Idle,
    Phase::RampingUp,
    Phase::Steady,
    Phase::RampingDown,
    Phase::Draining,
    Phase::Terminated,
];

const SHARED_PHASES: [Phase; 4] = [
    Phase::Idle,
    Phase::Running,
    Phase::Draining,
    Phase::Terminated,
];

impl PlanKind {
    /// Phases of this plan kind in the only order they may be entered.
    #[must_use]
    pub const fn phases(self) -> &'static [Phase] {
        match self {
            PlanKind::RampingVus => &RAMPING_PHASES,
            PlanKind::SharedIterations => &SHARED_PHASES,
        }
    }

    fn position(self, phase: Phase) -> Option<usize> {
        self.phases().iter().position(|candidate| *candidate == phase)
    }

    /// Transitions move strictly forward; skipping phases is allowed.
    #[must_use]
    pub fn allows(self, from: Phase, to: Phase) -> bool {
        match (self.position(from), self.position(to)) {
            (Some(from), Some(to)) => to > from,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseChange {
    pub phase: Phase,
    #[serde(rename = "at_ms", with = "super::plan::millis")]
    pub at: Duration,
}

/// Forward-only phase state of one run.
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    kind: PlanKind,
    current: Phase,
    history: Vec<PhaseChange>,
}

impl PhaseTracker {
    #[must_use]
    pub const fn new(kind: PlanKind) -> Self {
        Self {
            kind,
            current: Phase::Idle,
            history: Vec::new(),
        }
    }

    #[must_use]
    pub const fn current(&self) -> Phase {
        self.current
    }

    /// Moves to `next` if the plan allows it. Backward or repeated moves are
    /// ignored and return `false`.
    pub fn advance(&mut self, next: Phase, at: Duration) -> bool {
        if !self.kind.allows(self.current, next) {
            return false;
        }
        info!("Phase {} -> {} at {:?}", self.current, next, at);
        self.current = next;
        self.history.push(PhaseChange { phase: next, at });
        true
    }

    #[must_use]
    pub fn history(&self) -> &[PhaseChange] {
        &self.history
    }

    #[must_use]
    pub fn into_history(self) -> Vec<PhaseChange> {
        self.history
    }
}
