use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

/// On-disk configuration (`vuload.toml` / `vuload.json`). Every field is
/// optional; explicit CLI flags and environment variables win.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ConfigFile {
    #[serde(alias = "BASE_URL")]
    pub base_url: Option<String>,
    #[serde(alias = "MODE")]
    pub mode: Option<String>,
    pub users: Option<String>,
    pub products: Option<String>,
    pub pacing: Option<DurationValue>,
    #[serde(alias = "timeout")]
    pub request_timeout: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
    pub no_ua: Option<bool>,
    pub insecure: Option<bool>,
    pub abort_on_breach: Option<bool>,
    pub evaluation_interval: Option<DurationValue>,
    pub summary_export: Option<String>,
    #[serde(alias = "summaryTrendStats")]
    pub summary_trend_stats: Option<Vec<String>>,
    pub no_color: Option<bool>,
    pub plans: Option<BTreeMap<String, PlanConfig>>,
}

/// One named plan. Fields set here override the built-in mode of the same
/// name field by field; `thresholds` replaces the built-in map as a whole.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PlanConfig {
    pub executor: Option<String>,
    #[serde(alias = "startVUs")]
    pub start_vus: Option<u64>,
    pub stages: Option<Vec<StageConfig>>,
    #[serde(alias = "gracefulRampDown")]
    pub graceful_ramp_down: Option<DurationValue>,
    #[serde(alias = "gracefulStop")]
    pub graceful_stop: Option<DurationValue>,
    pub vus: Option<u64>,
    pub iterations: Option<u64>,
    #[serde(alias = "maxDuration")]
    pub max_duration: Option<DurationValue>,
    pub thresholds: Option<BTreeMap<String, Vec<ThresholdEntry>>>,
}

impl PlanConfig {
    /// Overlays `self` on `base`.
    #[must_use]
    pub fn merged_over(self, base: Self) -> Self {
        Self {
            executor: self.executor.or(base.executor),
            start_vus: self.start_vus.or(base.start_vus),
            stages: self.stages.or(base.stages),
            graceful_ramp_down: self.graceful_ramp_down.or(base.graceful_ramp_down),
            graceful_stop: self.graceful_stop.or(base.graceful_stop),
            vus: self.vus.or(base.vus),
            iterations: self.iterations.or(base.iterations),
            max_duration: self.max_duration.or(base.max_duration),
            thresholds: self.thresholds.or(base.thresholds),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StageConfig {
    pub duration: DurationValue,
    pub target: u64,
}

/// A threshold is either a bare expression or an expression with an
/// abort flag.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ThresholdEntry {
    Expression(String),
    Detailed {
        threshold: String,
        #[serde(default, alias = "abortOnFail")]
        abort_on_fail: bool,
    },
}

impl ThresholdEntry {
    #[must_use]
    pub fn expression(&self) -> &str {
        match self {
            ThresholdEntry::Expression(expression)
            | ThresholdEntry::Detailed {
                threshold: expression,
                ..
            } => expression,
        }
    }

    #[must_use]
    pub const fn abort_on_fail(&self) -> bool {
        match self {
            ThresholdEntry::Expression(_) => false,
            ThresholdEntry::Detailed { abort_on_fail, .. } => *abort_on_fail,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn text(value: &str) -> Self {
        DurationValue::Text(value.to_owned())
    }

    pub(crate) fn to_duration(&self) -> Result<Duration, String> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 {
                    Err("Duration must be > 0.".to_owned())
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => super::parse_duration_value(text),
        }
    }

    pub(crate) fn to_pause(&self) -> Result<Duration, String> {
        match self {
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => super::parse_pause_value(text),
        }
    }
}
