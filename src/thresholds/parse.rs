use std::fmt;

use serde::Serialize;

use crate::error::ThresholdError;
use crate::metrics::{Stat, parse_scaled};

/// Duration bounds are written in milliseconds and kept in microseconds.
const MILLIS_DECIMALS: u32 = 3;
/// Rate bounds are fractions kept in parts per million.
const RATE_DECIMALS: u32 = 6;
const RATE_MAX_PPM: u64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Comparison {
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
}

/// Longest symbols first so `<=` is never read as `<`.
const OPERATORS: [(&str, Comparison); 6] = [
    ("<=", Comparison::Le),
    (">=", Comparison::Ge),
    ("==", Comparison::Eq),
    ("!=", Comparison::Ne),
    ("<", Comparison::Lt),
    (">", Comparison::Gt),
];

impl Comparison {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
            Comparison::Eq => "==",
            Comparison::Ne => "!=",
        }
    }

    /// Whether `observed <op> bound` holds, given their ordering.
    #[must_use]
    pub const fn holds(self, ordering: std::cmp::Ordering) -> bool {
        match self {
            Comparison::Lt => ordering.is_lt(),
            Comparison::Le => ordering.is_le(),
            Comparison::Gt => ordering.is_gt(),
            Comparison::Ge => ordering.is_ge(),
            Comparison::Eq => ordering.is_eq(),
            Comparison::Ne => ordering.is_ne(),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Right-hand side of a condition in the unit of its aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
pub enum Bound {
    Micros(u64),
    Ppm(u64),
    Count(u64),
}

/// A parsed `<aggregation> <operator> <value>` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub stat: Stat,
    pub comparison: Comparison,
    pub bound: Bound,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.stat, self.comparison)?;
        match self.bound {
            Bound::Micros(micros) => write_scaled(f, micros, 1_000),
            Bound::Ppm(ppm) => write_scaled(f, ppm, RATE_MAX_PPM),
            Bound::Count(count) => write!(f, "{}", count),
        }
    }
}

fn write_scaled(f: &mut fmt::Formatter<'_>, value: u64, scale: u64) -> fmt::Result {
    let whole = value.checked_div(scale).unwrap_or(0);
    let fraction = value.checked_rem(scale).unwrap_or(0);
    if fraction == 0 {
        return write!(f, "{}", whole);
    }
    let width = scale.ilog10() as usize;
    let digits = format!("{:0width$}", fraction, width = width);
    write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
}

/// Parses an expression such as `p(95)<1300`, `rate < 0.05` or
/// `count>=10`.
///
/// # Errors
///
/// Returns an error for a missing operator, an unknown aggregation, or a
/// bound that is not a valid number for that aggregation.
pub fn parse_condition(expression: &str) -> Result<Condition, ThresholdError> {
    let text = expression.trim();
    if text.is_empty() {
        return Err(ThresholdError::Empty);
    }

    let (position, symbol, comparison) = OPERATORS
        .iter()
        .filter_map(|(symbol, comparison)| {
            text.find(symbol)
                .map(|position| (position, *symbol, *comparison))
        })
        .min_by_key(|(position, symbol, _)| (*position, std::cmp::Reverse(symbol.len())))
        .ok_or_else(|| ThresholdError::MissingOperator {
            expression: text.to_owned(),
        })?;

    let aggregation = text.get(..position).unwrap_or_default().trim();
    let value = text
        .get(position.saturating_add(symbol.len())..)
        .unwrap_or_default()
        .trim();

    let stat: Stat = aggregation.parse().map_err(|_| {
        if aggregation.starts_with("p(") {
            ThresholdError::InvalidPercentile {
                expression: text.to_owned(),
                value: aggregation.to_owned(),
            }
        } else {
            ThresholdError::UnknownAggregation {
                expression: text.to_owned(),
                aggregation: aggregation.to_owned(),
            }
        }
    })?;

    let invalid_bound = || ThresholdError::InvalidBound {
        expression: text.to_owned(),
        value: value.to_owned(),
    };
    let bound = match stat {
        Stat::Rate => parse_scaled(value, RATE_DECIMALS)
            .filter(|ppm| *ppm <= RATE_MAX_PPM)
            .map(Bound::Ppm),
        Stat::Count => value.parse::<u64>().ok().map(Bound::Count),
        Stat::Avg | Stat::Min | Stat::Med | Stat::Max | Stat::Percentile(_) => {
            parse_scaled(value, MILLIS_DECIMALS).map(Bound::Micros)
        }
    }
    .ok_or_else(invalid_bound)?;

    Ok(Condition {
        stat,
        comparison,
        bound,
    })
}
