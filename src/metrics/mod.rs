//! Tag-keyed metric series, HDR-histogram trends, and snapshots.
mod aggregator;
mod fixed;
mod histogram;
mod key;
mod snapshot;
mod stat;
mod types;

#[cfg(test)]
mod tests;

pub use aggregator::MetricsAggregator;
pub(crate) use fixed::parse_scaled;
pub use histogram::LatencyHistogram;
pub use key::{Group, MetricKind, MetricName, SeriesKey, Tagging};
pub use snapshot::{CheckTally, Measurement, RateStats, SeriesSnapshot, StatValue, TrendStats};
pub use stat::{Percentile, Stat, default_trend_stats};
pub use types::{Observation, StepOutcome};
