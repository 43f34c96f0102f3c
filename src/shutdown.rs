use std::fmt;

use serde::Serialize;
use tokio::sync::broadcast;

/// Why a run was stopped before its plan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    Interrupted,
    ThresholdBreached,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Interrupted => f.write_str("interrupted"),
            StopReason::ThresholdBreached => f.write_str("threshold breached"),
        }
    }
}

pub type ShutdownSender = broadcast::Sender<StopReason>;
pub type ShutdownReceiver = broadcast::Receiver<StopReason>;
