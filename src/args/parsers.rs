use std::time::Duration;

use crate::config::{parse_duration_value, parse_pause_value};
use crate::metrics::Stat;

pub(crate) fn parse_duration_arg(s: &str) -> Result<Duration, String> {
    parse_duration_value(s)
}

pub(crate) fn parse_pause_arg(s: &str) -> Result<Duration, String> {
    parse_pause_value(s)
}

pub(crate) fn parse_trend_stat(s: &str) -> Result<Stat, String> {
    let stat: Stat = s.parse()?;
    if stat.is_trend() {
        Ok(stat)
    } else {
        Err(format!("'{}' is not a duration statistic.", s.trim()))
    }
}
