use std::time::Duration;

use super::{Phase, Stage};

/// Target worker count over time for a staged ramp.
///
/// Each stage interpolates linearly from the previous target (or the start
/// count) to its own target; the target is reached exactly at stage end.
#[derive(Debug, Clone)]
pub struct RampController {
    start_vus: u64,
    stages: Vec<Stage>,
}

impl RampController {
    #[must_use]
    pub const fn new(start_vus: u64, stages: Vec<Stage>) -> Self {
        Self { start_vus, stages }
    }

    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.stages.iter().fold(Duration::ZERO, |total, stage| {
            total.saturating_add(stage.duration)
        })
    }

    /// Stage active at `elapsed` with its start count and offset into it.
    fn locate(&self, elapsed: Duration) -> Option<(u64, &Stage, Duration)> {
        let mut stage_start = Duration::ZERO;
        let mut from = self.start_vus;
        for stage in &self.stages {
            let stage_end = stage_start.saturating_add(stage.duration);
            if elapsed < stage_end {
                return Some((from, stage, elapsed.saturating_sub(stage_start)));
            }
            stage_start = stage_end;
            from = stage.target;
        }
        None
    }

    fn final_target(&self) -> u64 {
        self.stages
            .last()
            .map_or(self.start_vus, |stage| stage.target)
    }

    #[must_use]
    pub fn target_at(&self, elapsed: Duration) -> u64 {
        let Some((from, stage, offset)) = self.locate(elapsed) else {
            return self.final_target();
        };

        let stage_micros = i128::try_from(stage.duration.as_micros()).unwrap_or(i128::MAX);
        let offset_micros = i128::try_from(offset.as_micros()).unwrap_or(i128::MAX);
        let start = i128::from(from);
        let target = i128::from(stage.target);

        let delta = target.saturating_sub(start);
        let step = delta
            .saturating_mul(offset_micros)
            .checked_div(stage_micros)
            .unwrap_or(delta);
        let vus = start.saturating_add(step);
        if vus < 0 {
            0
        } else {
            u64::try_from(vus).unwrap_or(u64::MAX)
        }
    }

    /// Ramp phase implied by the stage active at `elapsed`.
    #[must_use]
    pub fn phase_at(&self, elapsed: Duration) -> Phase {
        match self.locate(elapsed) {
            Some((from, stage, _)) if stage.target > from => Phase::RampingUp,
            Some((from, stage, _)) if stage.target < from => Phase::RampingDown,
            Some(_) => Phase::Steady,
            None => Phase::Draining,
        }
    }
}
