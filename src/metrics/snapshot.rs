use serde::Serialize;

use super::{Group, SeriesKey, Stat};

/// Parts-per-million scale used for exact rate comparisons.
pub(crate) const PPM: u64 = 1_000_000;

/// True/false tallies of a rate series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateStats {
    pub trues: u64,
    pub total: u64,
}

impl RateStats {
    #[must_use]
    pub const fn falses(&self) -> u64 {
        self.total.saturating_sub(self.trues)
    }

    /// Fraction of true samples in parts per million (rounded down).
    #[must_use]
    pub fn rate_ppm(&self) -> u64 {
        let scaled = u128::from(self.trues)
            .saturating_mul(u128::from(PPM))
            .checked_div(u128::from(self.total))
            .unwrap_or(0);
        u64::try_from(scaled).unwrap_or(u64::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatValue {
    pub stat: Stat,
    pub micros: u64,
}

impl Serialize for Stat {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendStats {
    pub values: Vec<StatValue>,
}

impl TrendStats {
    #[must_use]
    pub fn get(&self, stat: Stat) -> Option<u64> {
        self.values
            .iter()
            .find(|value| value.stat == stat)
            .map(|value| value.micros)
    }
}

/// Point-in-time view of one series. A key without samples yields an empty
/// snapshot: `count == 0` and no rate or trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesSnapshot {
    pub key: SeriesKey,
    pub count: u64,
    pub rate: Option<RateStats>,
    pub trend: Option<TrendStats>,
}

impl SeriesSnapshot {
    #[must_use]
    pub const fn empty(key: SeriesKey) -> Self {
        Self {
            key,
            count: 0,
            rate: None,
            trend: None,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Value of a single statistic, as consumed by threshold evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Measurement {
    NoData,
    Micros(u64),
    Rate(RateStats),
    Count(u64),
}

/// Pass/fail tally of one named check inside a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckTally {
    pub group: Group,
    pub name: &'static str,
    pub passes: u64,
    pub fails: u64,
}
