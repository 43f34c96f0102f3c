use super::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn key(text: &str) -> Result<SeriesKey, String> {
    text.parse::<SeriesKey>().map_err(|err| err.to_string())
}

#[test]
fn concurrent_records_are_never_lost() -> Result<(), String> {
    let aggregator = Arc::new(MetricsAggregator::default());
    let mut handles = Vec::new();
    for worker in 0..8u64 {
        let aggregator = Arc::clone(&aggregator);
        handles.push(thread::spawn(move || {
            for sample in 0..1_000u64 {
                let group = match sample.wrapping_add(worker) % 3 {
                    0 => Group::Login,
                    1 => Group::Search,
                    _ => Group::Detail,
                };
                aggregator.record_request(group, 200, Duration::from_millis(sample % 50));
            }
        }));
    }
    for handle in handles {
        handle
            .join()
            .map_err(|_| "writer thread panicked".to_owned())?;
    }

    let total = aggregator.snapshot(SeriesKey::metric(MetricName::HttpReqDuration));
    if total.count != 8_000 {
        return Err(format!("expected 8000 samples, got {}", total.count));
    }
    let per_group: u64 = Group::ALL
        .into_iter()
        .map(|group| {
            aggregator
                .snapshot(SeriesKey::grouped(MetricName::HttpReqDuration, group))
                .count
        })
        .sum();
    if per_group != 8_000 {
        return Err(format!("expected 8000 grouped samples, got {}", per_group));
    }
    Ok(())
}

#[test]
fn missing_series_yields_empty_snapshot() -> Result<(), String> {
    let aggregator = MetricsAggregator::default();
    let snapshot = aggregator.snapshot(key("group_duration{group:::detail}")?);
    if !snapshot.is_empty() || snapshot.rate.is_some() || snapshot.trend.is_some() {
        return Err(format!("expected empty snapshot, got {:?}", snapshot));
    }
    if aggregator.measure(snapshot.key, Stat::Avg) != Measurement::NoData {
        return Err("expected no data for empty series".to_owned());
    }
    Ok(())
}

#[test]
fn trend_snapshot_reports_configured_stats() -> Result<(), String> {
    let aggregator = MetricsAggregator::default();
    for millis in 1..=100u64 {
        aggregator.record(
            SeriesKey::metric(MetricName::IterationDuration),
            Observation::Duration(Duration::from_millis(millis)),
        );
    }
    let snapshot = aggregator.snapshot(SeriesKey::metric(MetricName::IterationDuration));
    let trend = snapshot.trend.ok_or("missing trend")?;

    if trend.get(Stat::Min) != Some(1_000) {
        return Err(format!("unexpected min {:?}", trend.get(Stat::Min)));
    }
    if trend.get(Stat::Max) != Some(100_000) {
        return Err(format!("unexpected max {:?}", trend.get(Stat::Max)));
    }
    if trend.get(Stat::Avg) != Some(50_500) {
        return Err(format!("unexpected avg {:?}", trend.get(Stat::Avg)));
    }
    let p95 = trend
        .values
        .iter()
        .find(|value| value.stat.to_string() == "p(95)")
        .map(|value| value.micros)
        .ok_or("missing p(95)")?;
    if !(94_900..=95_100).contains(&p95) {
        return Err(format!("unexpected p95 {}", p95));
    }
    if snapshot.rate.is_some() {
        return Err("trend metric must not carry a rate".to_owned());
    }
    Ok(())
}

#[test]
fn request_failures_feed_rate_series() -> Result<(), String> {
    let aggregator = MetricsAggregator::default();
    aggregator.record_request(Group::Search, 200, Duration::from_millis(5));
    aggregator.record_request(Group::Search, 500, Duration::from_millis(5));
    aggregator.record_request(Group::Detail, 0, Duration::from_millis(5));
    aggregator.record_request(Group::Detail, 204, Duration::from_millis(5));

    let failed = aggregator
        .snapshot(SeriesKey::metric(MetricName::HttpReqFailed))
        .rate
        .ok_or("missing rate")?;
    if failed.trues != 2 || failed.total != 4 || failed.rate_ppm() != 500_000 {
        return Err(format!("unexpected failure rate {:?}", failed));
    }
    let search = aggregator
        .snapshot(key("http_req_failed{group:::search}")?)
        .rate
        .ok_or("missing search rate")?;
    if search.trues != 1 || search.total != 2 {
        return Err(format!("unexpected search failure rate {:?}", search));
    }
    let reqs = aggregator.snapshot(SeriesKey::metric(MetricName::HttpReqs));
    if reqs.count != 4 || reqs.trend.is_some() {
        return Err(format!("unexpected http_reqs snapshot {:?}", reqs));
    }
    Ok(())
}

#[test]
fn step_outcomes_record_duration_and_check() -> Result<(), String> {
    let aggregator = MetricsAggregator::default();
    let outcome = StepOutcome {
        group: Group::Login,
        check: "token cached",
        passed: false,
        elapsed: Duration::from_millis(12),
    };
    aggregator.record_step(&outcome);
    aggregator.record_step(&StepOutcome {
        passed: true,
        ..outcome
    });

    let step = aggregator.snapshot(SeriesKey::grouped(MetricName::GroupDuration, Group::Login));
    let rate = step.rate.ok_or("missing step rate")?;
    if step.count != 2 || rate.trues != 1 || step.trend.is_none() {
        return Err(format!("unexpected step snapshot {:?}", step));
    }
    let tallies = aggregator.check_tallies();
    let tally = tallies
        .iter()
        .find(|tally| tally.name == "token cached")
        .ok_or("missing tally")?;
    if tally.passes != 1 || tally.fails != 1 || tally.group != Group::Login {
        return Err(format!("unexpected tally {:?}", tally));
    }
    Ok(())
}

#[test]
fn series_keys_round_trip_through_display() -> Result<(), String> {
    for text in [
        "http_req_duration",
        "http_req_duration{group:::login}",
        "checks{group:::search}",
        "group_duration{group:::detail}",
    ] {
        let parsed = key(text)?;
        if parsed.to_string() != text {
            return Err(format!("expected {}, got {}", text, parsed));
        }
    }
    if key("http_req_duration{status:200}").is_ok() {
        return Err("non-group selectors must be rejected".to_owned());
    }
    if key("vus").is_ok() {
        return Err("unknown metrics must be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn stats_parse_percentiles_with_fractions() -> Result<(), String> {
    let stat: Stat = "p(99.9)".parse()?;
    if stat.to_string() != "p(99.9)" {
        return Err(format!("unexpected display {}", stat));
    }
    if "p(101)".parse::<Stat>().is_ok() {
        return Err("percentile above 100 must fail".to_owned());
    }
    if "mean".parse::<Stat>().is_ok() {
        return Err("unknown stat must fail".to_owned());
    }
    Ok(())
}

#[test]
fn parse_scaled_handles_fractions() -> Result<(), String> {
    let cases = [
        ("0.05", 6, Some(50_000)),
        ("1300", 3, Some(1_300_000)),
        ("1300.5", 3, Some(1_300_500)),
        (".5", 1, Some(5)),
        ("1.2345", 3, None),
        ("-1", 3, None),
        ("", 3, None),
        (".", 3, None),
    ];
    for (text, decimals, expected) in cases {
        let actual = parse_scaled(text, decimals);
        if actual != expected {
            return Err(format!("{}: expected {:?}, got {:?}", text, expected, actual));
        }
    }
    Ok(())
}
