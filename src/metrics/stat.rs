use std::fmt;
use std::str::FromStr;

use super::parse_scaled;

/// Fraction digits kept for percentile ranks (`p(99.9)` is `99_900`).
const PERCENTILE_DECIMALS: u32 = 3;
const PERCENTILE_SCALE: u64 = 1_000;
const PERCENTILE_MAX: u64 = 100_000;

/// Percentile rank stored in thousandths of a percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percentile(u32);

impl Percentile {
    /// Builds a percentile from a rank in thousandths (`95_000` is p95).
    #[must_use]
    pub const fn from_thousandths(value: u32) -> Option<Self> {
        if value as u64 > PERCENTILE_MAX {
            None
        } else {
            Some(Self(value))
        }
    }

    #[must_use]
    pub const fn thousandths(self) -> u32 {
        self.0
    }

    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "hdrhistogram takes percentile ranks as f64"
    )]
    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 1_000.0
    }
}

impl fmt::Display for Percentile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = u64::from(self.0);
        let whole = value.checked_div(PERCENTILE_SCALE).unwrap_or(0);
        let fraction = value.checked_rem(PERCENTILE_SCALE).unwrap_or(0);
        if fraction == 0 {
            write!(f, "p({})", whole)
        } else {
            let digits = format!("{:03}", fraction);
            write!(f, "p({}.{})", whole, digits.trim_end_matches('0'))
        }
    }
}

impl FromStr for Percentile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rank = parse_scaled(s, PERCENTILE_DECIMALS)
            .filter(|value| *value <= PERCENTILE_MAX)
            .ok_or_else(|| format!("Invalid percentile '{}'.", s))?;
        let rank = u32::try_from(rank).map_err(|err| err.to_string())?;
        Ok(Self(rank))
    }
}

/// Statistic computed over a series, shared by summaries and thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    Avg,
    Min,
    Med,
    Max,
    Percentile(Percentile),
    Rate,
    Count,
}

impl Stat {
    #[must_use]
    pub const fn is_trend(self) -> bool {
        matches!(
            self,
            Stat::Avg | Stat::Min | Stat::Med | Stat::Max | Stat::Percentile(_)
        )
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stat::Avg => f.write_str("avg"),
            Stat::Min => f.write_str("min"),
            Stat::Med => f.write_str("med"),
            Stat::Max => f.write_str("max"),
            Stat::Percentile(percentile) => percentile.fmt(f),
            Stat::Rate => f.write_str("rate"),
            Stat::Count => f.write_str("count"),
        }
    }
}

impl FromStr for Stat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        match value {
            "avg" => Ok(Stat::Avg),
            "min" => Ok(Stat::Min),
            "med" => Ok(Stat::Med),
            "max" => Ok(Stat::Max),
            "rate" => Ok(Stat::Rate),
            "count" => Ok(Stat::Count),
            _ => {
                let inner = value
                    .strip_prefix("p(")
                    .and_then(|rest| rest.strip_suffix(')'))
                    .ok_or_else(|| format!("Unknown statistic '{}'.", value))?;
                Ok(Stat::Percentile(inner.parse()?))
            }
        }
    }
}

/// Trend columns shown when nothing else is configured.
#[must_use]
pub fn default_trend_stats() -> Vec<Stat> {
    let mut stats = vec![Stat::Avg, Stat::Min, Stat::Med, Stat::Max];
    for rank in [90_000, 95_000, 99_000] {
        if let Some(percentile) = Percentile::from_thousandths(rank) {
            stats.push(Stat::Percentile(percentile));
        }
    }
    stats
}
