use std::time::Duration;

use super::Group;

/// A single sample handed to [`super::MetricsAggregator::record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    Duration(Duration),
    Rate(bool),
    Timed { elapsed: Duration, passed: bool },
    Count,
}

/// Result of one executed pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub group: Group,
    pub check: &'static str,
    pub passed: bool,
    pub elapsed: Duration,
}
