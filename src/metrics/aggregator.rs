use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::warn;

use super::{
    CheckTally, Group, LatencyHistogram, Measurement, MetricKind, MetricName, Observation,
    RateStats, SeriesKey, SeriesSnapshot, Stat, StatValue, StepOutcome, TrendStats,
    default_trend_stats,
};

/// Percentile rank reported as `med`.
const MEDIAN_PERCENTILE: f64 = 50.0;

#[derive(Debug)]
struct Series {
    histogram: Option<LatencyHistogram>,
    count: u64,
    durations: u64,
    sum_us: u128,
    min_us: u64,
    max_us: u64,
    trues: u64,
    falses: u64,
}

impl Series {
    fn new() -> Self {
        let histogram = match LatencyHistogram::new() {
            Ok(histogram) => Some(histogram),
            Err(err) => {
                warn!("Failed to initialize trend histogram: {}", err);
                None
            }
        };
        Self {
            histogram,
            count: 0,
            durations: 0,
            sum_us: 0,
            min_us: u64::MAX,
            max_us: 0,
            trues: 0,
            falses: 0,
        }
    }

    fn record(&mut self, observation: Observation) {
        self.count = self.count.saturating_add(1);
        match observation {
            Observation::Duration(elapsed) => self.record_duration(elapsed),
            Observation::Rate(value) => self.record_flag(value),
            Observation::Timed { elapsed, passed } => {
                self.record_duration(elapsed);
                self.record_flag(passed);
            }
            Observation::Count => {}
        }
    }

    fn record_duration(&mut self, elapsed: Duration) {
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.durations = self.durations.saturating_add(1);
        self.sum_us = self.sum_us.saturating_add(u128::from(micros));
        self.min_us = self.min_us.min(micros);
        self.max_us = self.max_us.max(micros);
        if let Some(histogram) = self.histogram.as_mut()
            && let Err(err) = histogram.record(micros)
        {
            warn!("Failed to record trend sample: {}", err);
        }
    }

    const fn record_flag(&mut self, value: bool) {
        if value {
            self.trues = self.trues.saturating_add(1);
        } else {
            self.falses = self.falses.saturating_add(1);
        }
    }

    fn rate(&self) -> Option<RateStats> {
        let total = self.trues.saturating_add(self.falses);
        (total > 0).then_some(RateStats {
            trues: self.trues,
            total,
        })
    }

    fn trend_value(&self, stat: Stat) -> Option<u64> {
        if self.durations == 0 {
            return None;
        }
        let value = match stat {
            Stat::Avg => {
                let avg = self
                    .sum_us
                    .checked_div(u128::from(self.durations))
                    .unwrap_or(0);
                u64::try_from(avg).unwrap_or(u64::MAX)
            }
            Stat::Min => self.min_us,
            Stat::Max => self.max_us,
            Stat::Med => self.percentile(MEDIAN_PERCENTILE),
            Stat::Percentile(percentile) => self.percentile(percentile.as_f64()),
            Stat::Rate | Stat::Count => return None,
        };
        Some(value)
    }

    fn percentile(&self, percentile: f64) -> u64 {
        let raw = self
            .histogram
            .as_ref()
            .map_or(self.max_us, |histogram| {
                histogram.value_at_percentile(percentile)
            });
        raw.clamp(self.min_us, self.max_us)
    }

    fn measure(&self, stat: Stat) -> Measurement {
        match stat {
            Stat::Count => Measurement::Count(self.count),
            Stat::Rate => self.rate().map_or(Measurement::NoData, Measurement::Rate),
            Stat::Avg | Stat::Min | Stat::Med | Stat::Max | Stat::Percentile(_) => self
                .trend_value(stat)
                .map_or(Measurement::NoData, Measurement::Micros),
        }
    }

    fn snapshot(&self, key: SeriesKey, trend_stats: &[Stat]) -> SeriesSnapshot {
        let kind = key.metric.kind();
        let rate = match kind {
            MetricKind::Rate | MetricKind::Step => self.rate(),
            MetricKind::Trend | MetricKind::Counter => None,
        };
        let trend = match kind {
            MetricKind::Trend | MetricKind::Step if self.durations > 0 => Some(TrendStats {
                values: trend_stats
                    .iter()
                    .filter_map(|stat| {
                        self.trend_value(*stat).map(|micros| StatValue {
                            stat: *stat,
                            micros,
                        })
                    })
                    .collect(),
            }),
            MetricKind::Trend | MetricKind::Step | MetricKind::Rate | MetricKind::Counter => None,
        };
        SeriesSnapshot {
            key,
            count: self.count,
            rate,
            trend,
        }
    }
}

#[derive(Debug, Default)]
struct AggregatorState {
    series: BTreeMap<SeriesKey, Series>,
    checks: BTreeMap<(Group, &'static str), (u64, u64)>,
}

impl AggregatorState {
    fn record(&mut self, key: SeriesKey, observation: Observation) {
        self.series
            .entry(key)
            .or_insert_with(Series::new)
            .record(observation);
    }

    fn record_both(&mut self, metric: MetricName, group: Group, observation: Observation) {
        self.record(SeriesKey::metric(metric), observation);
        self.record(SeriesKey::grouped(metric, group), observation);
    }

    fn record_check(&mut self, group: Group, name: &'static str, passed: bool) {
        self.record_both(MetricName::Checks, group, Observation::Rate(passed));
        let tally = self.checks.entry((group, name)).or_insert((0, 0));
        if passed {
            tally.0 = tally.0.saturating_add(1);
        } else {
            tally.1 = tally.1.saturating_add(1);
        }
    }
}

/// Shared, append-only store of every metric series of a run.
///
/// All recording goes through one short critical section, so concurrent
/// writers never lose a sample.
#[derive(Debug)]
pub struct MetricsAggregator {
    state: Mutex<AggregatorState>,
    trend_stats: Vec<Stat>,
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new(default_trend_stats())
    }
}

impl MetricsAggregator {
    #[must_use]
    pub fn new(trend_stats: Vec<Stat>) -> Self {
        Self {
            state: Mutex::new(AggregatorState::default()),
            trend_stats: trend_stats
                .into_iter()
                .filter(|stat| stat.is_trend())
                .collect(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AggregatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn trend_stats(&self) -> &[Stat] {
        &self.trend_stats
    }

    pub fn record(&self, key: SeriesKey, observation: Observation) {
        self.lock().record(key, observation);
    }

    /// Records one HTTP call: duration, failure flag (non-2xx), and count,
    /// both untagged and tagged with `group`.
    pub fn record_request(&self, group: Group, status: u16, elapsed: Duration) {
        let failed = !(200..300).contains(&status);
        let mut state = self.lock();
        state.record_both(
            MetricName::HttpReqDuration,
            group,
            Observation::Duration(elapsed),
        );
        state.record_both(MetricName::HttpReqFailed, group, Observation::Rate(failed));
        state.record_both(MetricName::HttpReqs, group, Observation::Count);
    }

    pub fn record_check(&self, group: Group, name: &'static str, passed: bool) {
        self.lock().record_check(group, name, passed);
    }

    /// Records a finished pipeline step under `group_duration{group}` and its
    /// check under `checks`.
    pub fn record_step(&self, outcome: &StepOutcome) {
        let mut state = self.lock();
        state.record(
            SeriesKey::grouped(MetricName::GroupDuration, outcome.group),
            Observation::Timed {
                elapsed: outcome.elapsed,
                passed: outcome.passed,
            },
        );
        state.record_check(outcome.group, outcome.check, outcome.passed);
    }

    pub fn record_iteration(&self, elapsed: Duration) {
        let mut state = self.lock();
        state.record(
            SeriesKey::metric(MetricName::IterationDuration),
            Observation::Duration(elapsed),
        );
        state.record(SeriesKey::metric(MetricName::Iterations), Observation::Count);
    }

    #[must_use]
    pub fn snapshot(&self, key: SeriesKey) -> SeriesSnapshot {
        self.lock().series.get(&key).map_or_else(
            || SeriesSnapshot::empty(key),
            |series| series.snapshot(key, &self.trend_stats),
        )
    }

    /// Snapshots of every series with at least one sample, ordered by key.
    #[must_use]
    pub fn snapshot_all(&self) -> Vec<SeriesSnapshot> {
        self.lock()
            .series
            .iter()
            .map(|(key, series)| series.snapshot(*key, &self.trend_stats))
            .collect()
    }

    #[must_use]
    pub fn measure(&self, key: SeriesKey, stat: Stat) -> Measurement {
        self.lock()
            .series
            .get(&key)
            .map_or(Measurement::NoData, |series| series.measure(stat))
    }

    #[must_use]
    pub fn check_tallies(&self) -> Vec<CheckTally> {
        self.lock()
            .checks
            .iter()
            .map(|((group, name), (passes, fails))| CheckTally {
                group: *group,
                name: *name,
                passes: *passes,
                fails: *fails,
            })
            .collect()
    }
}
