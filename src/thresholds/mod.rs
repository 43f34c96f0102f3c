//! Pass/fail conditions over aggregated series.
//!
//! A threshold pairs a series selector such as
//! `http_req_duration{group:::login}` with a condition such as `p(95)<1200`.
//! Conditions are parsed and checked against the metric kind when the
//! configuration loads, so evaluation itself cannot fail.
mod monitor;
mod parse;


use std::cmp::Ordering;

use serde::Serialize;

use crate::error::ThresholdError;
use crate::metrics::{Measurement, MetricKind, MetricsAggregator, SeriesKey, Stat};

pub use monitor::spawn_breach_monitor;
pub use parse::{Bound, Comparison, Condition, parse_condition};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Threshold {
    pub key: SeriesKey,
    pub condition: Condition,
    pub abort_on_fail: bool,
}

const fn applies_to(kind: MetricKind, stat: Stat) -> bool {
    match stat {
        Stat::Count => true,
        Stat::Rate => matches!(kind, MetricKind::Rate | MetricKind::Step),
        Stat::Avg | Stat::Min | Stat::Med | Stat::Max | Stat::Percentile(_) => {
            matches!(kind, MetricKind::Trend | MetricKind::Step)
        }
    }
}

impl Threshold {
    /// Parses `expression` for the series named by `selector`.
    ///
    /// # Errors
    ///
    /// Returns an error when the selector or expression does not parse, or
    /// the aggregation does not exist for that metric (`rate` on a duration
    /// trend, `p(95)` on a rate), or the selector names a series that is
    /// never recorded.
    pub fn parse(
        selector: &str,
        expression: &str,
        abort_on_fail: bool,
    ) -> Result<Self, ThresholdError> {
        let key: SeriesKey = selector.parse()?;
        if !key.is_recorded() {
            return Err(ThresholdError::UnrecordedSeries {
                selector: key.to_string(),
            });
        }
        let condition = parse_condition(expression)?;
        if !applies_to(key.metric.kind(), condition.stat) {
            return Err(ThresholdError::AggregationMismatch {
                expression: expression.trim().to_owned(),
                aggregation: condition.stat.to_string(),
                metric: key.metric.as_str().to_owned(),
            });
        }
        Ok(Self {
            key,
            condition,
            abort_on_fail,
        })
    }

    /// Evaluates against the current state of `aggregator`. A series
    /// without samples passes.
    #[must_use]
    pub fn check(&self, aggregator: &MetricsAggregator) -> ThresholdResult {
        let observed = aggregator.measure(self.key, self.condition.stat);
        let passed = compare(observed, self.condition.bound)
            .is_none_or(|ordering| self.condition.comparison.holds(ordering));
        ThresholdResult {
            key: self.key,
            expression: self.condition.to_string(),
            abort_on_fail: self.abort_on_fail,
            observed,
            passed,
        }
    }
}

/// Orders an observed value against a bound of the same unit. Rates are
/// compared exactly as `trues * 10^6` against `bound_ppm * total`.
fn compare(observed: Measurement, bound: Bound) -> Option<Ordering> {
    match (observed, bound) {
        (Measurement::Micros(value), Bound::Micros(limit))
        | (Measurement::Count(value), Bound::Count(limit)) => Some(value.cmp(&limit)),
        (Measurement::Rate(rate), Bound::Ppm(limit)) if rate.total > 0 => {
            let scaled_trues = u128::from(rate.trues).saturating_mul(1_000_000);
            let scaled_limit = u128::from(limit).saturating_mul(u128::from(rate.total));
            Some(scaled_trues.cmp(&scaled_limit))
        }
        (
            Measurement::NoData
            | Measurement::Micros(_)
            | Measurement::Rate(_)
            | Measurement::Count(_),
            Bound::Micros(_) | Bound::Ppm(_) | Bound::Count(_),
        ) => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThresholdResult {
    pub key: SeriesKey,
    pub expression: String,
    pub abort_on_fail: bool,
    pub observed: Measurement,
    pub passed: bool,
}

/// Outcome of evaluating a whole [`ThresholdSet`]. `passed` is the AND of
/// every result, so an empty set passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub results: Vec<ThresholdResult>,
    pub passed: bool,
}

impl Verdict {
    #[must_use]
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|result| !result.passed).count()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// First failing result that may stop the run.
    #[must_use]
    pub fn abortable_breach(&self, abort_all: bool) -> Option<&ThresholdResult> {
        self.results
            .iter()
            .find(|result| !result.passed && (abort_all || result.abort_on_fail))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThresholdSet {
    thresholds: Vec<Threshold>,
}

impl ThresholdSet {
    #[must_use]
    pub const fn new(thresholds: Vec<Threshold>) -> Self {
        Self { thresholds }
    }

    pub fn push(&mut self, threshold: Threshold) {
        self.thresholds.push(threshold);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Threshold> {
        self.thresholds.iter()
    }

    #[must_use]
    pub fn any_abortable(&self) -> bool {
        self.thresholds.iter().any(|threshold| threshold.abort_on_fail)
    }

    #[must_use]
    pub fn evaluate(&self, aggregator: &MetricsAggregator) -> Verdict {
        evaluate(self, aggregator)
    }
}

#[must_use]
pub fn evaluate(set: &ThresholdSet, aggregator: &MetricsAggregator) -> Verdict {
    let results: Vec<ThresholdResult> = set
        .iter()
        .map(|threshold| threshold.check(aggregator))
        .collect();
    let passed = results.iter().all(|result| result.passed);
    Verdict { results, passed }
}
