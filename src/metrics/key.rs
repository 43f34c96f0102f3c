use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ThresholdError;

/// Named phase of the per-iteration pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    Login,
    Search,
    Detail,
}

impl Group {
    pub const ALL: [Group; 3] = [Group::Login, Group::Search, Group::Detail];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Group::Login => "login",
            Group::Search => "search",
            Group::Detail => "detail",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Group {
    type Err = ThresholdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches(':').to_ascii_lowercase().as_str() {
            "login" => Ok(Group::Login),
            "search" => Ok(Group::Search),
            "detail" => Ok(Group::Detail),
            _ => Err(ThresholdError::InvalidSelector {
                value: s.to_owned(),
            }),
        }
    }
}

/// How samples of a metric are aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Durations only.
    Trend,
    /// True/false samples only.
    Rate,
    /// Plain occurrence counter.
    Counter,
    /// Durations that also carry a pass/fail flag.
    Step,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum MetricName {
    #[serde(rename = "http_req_duration")]
    HttpReqDuration,
    #[serde(rename = "http_req_failed")]
    HttpReqFailed,
    #[serde(rename = "http_reqs")]
    HttpReqs,
    #[serde(rename = "checks")]
    Checks,
    #[serde(rename = "group_duration")]
    GroupDuration,
    #[serde(rename = "iteration_duration")]
    IterationDuration,
    #[serde(rename = "iterations")]
    Iterations,
}

impl MetricName {
    pub const ALL: [MetricName; 7] = [
        MetricName::HttpReqDuration,
        MetricName::HttpReqFailed,
        MetricName::HttpReqs,
        MetricName::Checks,
        MetricName::GroupDuration,
        MetricName::IterationDuration,
        MetricName::Iterations,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            MetricName::HttpReqDuration => "http_req_duration",
            MetricName::HttpReqFailed => "http_req_failed",
            MetricName::HttpReqs => "http_reqs",
            MetricName::Checks => "checks",
            MetricName::GroupDuration => "group_duration",
            MetricName::IterationDuration => "iteration_duration",
            MetricName::Iterations => "iterations",
        }
    }

    #[must_use]
    pub const fn kind(self) -> MetricKind {
        match self {
            MetricName::HttpReqDuration | MetricName::IterationDuration => MetricKind::Trend,
            MetricName::HttpReqFailed | MetricName::Checks => MetricKind::Rate,
            MetricName::HttpReqs | MetricName::Iterations => MetricKind::Counter,
            MetricName::GroupDuration => MetricKind::Step,
        }
    }

    /// Whether the aggregator writes an untagged series, per-group series,
    /// or both for this metric.
    #[must_use]
    pub const fn tagging(self) -> Tagging {
        match self {
            MetricName::HttpReqDuration
            | MetricName::HttpReqFailed
            | MetricName::HttpReqs
            | MetricName::Checks => Tagging::Both,
            MetricName::GroupDuration => Tagging::GroupedOnly,
            MetricName::IterationDuration | MetricName::Iterations => Tagging::UntaggedOnly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tagging {
    Both,
    GroupedOnly,
    UntaggedOnly,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricName {
    type Err = ThresholdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        MetricName::ALL
            .into_iter()
            .find(|metric| metric.as_str() == name)
            .ok_or_else(|| ThresholdError::UnknownMetric {
                value: name.to_owned(),
            })
    }
}

/// A metric name plus an optional group tag, written as
/// `http_req_duration{group:::login}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeriesKey {
    pub metric: MetricName,
    pub group: Option<Group>,
}

impl SeriesKey {
    #[must_use]
    pub const fn metric(metric: MetricName) -> Self {
        Self {
            metric,
            group: None,
        }
    }

    #[must_use]
    pub const fn grouped(metric: MetricName, group: Group) -> Self {
        Self {
            metric,
            group: Some(group),
        }
    }

    /// False for selectors the aggregator never writes, such as an untagged
    /// `group_duration` or a grouped `iterations`.
    #[must_use]
    pub const fn is_recorded(self) -> bool {
        match (self.metric.tagging(), self.group) {
            (Tagging::Both, _)
            | (Tagging::GroupedOnly, Some(_))
            | (Tagging::UntaggedOnly, None) => true,
            (Tagging::GroupedOnly, None) | (Tagging::UntaggedOnly, Some(_)) => false,
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.group {
            Some(group) => write!(f, "{}{{group:::{}}}", self.metric, group),
            None => write!(f, "{}", self.metric),
        }
    }
}

impl Serialize for SeriesKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl FromStr for SeriesKey {
    type Err = ThresholdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        let Some((name, rest)) = value.split_once('{') else {
            return Ok(SeriesKey::metric(value.parse()?));
        };
        let selector = rest
            .strip_suffix('}')
            .ok_or_else(|| ThresholdError::InvalidSelector {
                value: value.to_owned(),
            })?;
        let (tag, tag_value) =
            selector
                .split_once(':')
                .ok_or_else(|| ThresholdError::InvalidSelector {
                    value: value.to_owned(),
                })?;
        if tag.trim() != "group" {
            return Err(ThresholdError::InvalidSelector {
                value: value.to_owned(),
            });
        }
        Ok(SeriesKey::grouped(name.parse()?, tag_value.parse()?))
    }
}
