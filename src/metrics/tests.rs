use std::time::Duration;

use super::*;
use crate::domain::{RequestKind, RequestReport};

fn ms(values: &[u64]) -> Vec<Duration> {
    values.iter().map(|value| Duration::from_millis(*value)).collect()
}

fn set(values: &[u64]) -> Result<PercentileSet, String> {
    PercentileSet::new(values.iter().copied()).map_err(|err| err.to_string())
}

fn report(bytes_sent: u64, bytes_received: u64, latency_ms: u64) -> RequestReport {
    RequestReport {
        bytes_sent,
        bytes_received,
        latency: Duration::from_millis(latency_ms),
    }
}

#[test]
fn nearest_rank_percentiles_match_sorted_index() -> Result<(), String> {
    let table = PercentileTable::compute(ms(&[40, 10, 50, 30, 20]), &set(&[50, 90])?)
        .map_err(|err| err.to_string())?;

    if table.get(50) != Some(Duration::from_millis(30)) {
        return Err(format!("p50 was {:?}", table.get(50)));
    }
    if table.get(90) != Some(Duration::from_millis(50)) {
        return Err(format!("p90 was {:?}", table.get(90)));
    }
    if table.samples() != 5 {
        return Err(format!("Expected 5 samples, got {}", table.samples()));
    }
    Ok(())
}

#[test]
fn percentile_index_clamps_at_one_hundred() -> Result<(), String> {
    for len in 1..50usize {
        let index = percentile_index(len, 100).ok_or("Expected an index")?;
        if index != len.saturating_sub(1) {
            return Err(format!("len {} produced index {}", len, index));
        }
    }
    let table = PercentileTable::compute(ms(&[1, 2, 3]), &set(&[0, 100])?)
        .map_err(|err| err.to_string())?;
    if table.get(0) != Some(Duration::from_millis(1)) {
        return Err(format!("p0 was {:?}", table.get(0)));
    }
    if table.get(100) != Some(Duration::from_millis(3)) {
        return Err(format!("p100 was {:?}", table.get(100)));
    }
    Ok(())
}

#[test]
fn percentile_index_is_none_for_empty_input() -> Result<(), String> {
    if percentile_index(0, 50).is_some() {
        return Err("Expected no index for empty input".to_owned());
    }
    Ok(())
}

#[test]
fn empty_latencies_report_no_data() -> Result<(), String> {
    match PercentileTable::compute(Vec::new(), &PercentileSet::default()) {
        Err(crate::error::MetricsError::EmptyLatencyData) => {}
        other => return Err(format!("Expected EmptyLatencyData, got {:?}", other)),
    }

    let mut stats = Stats::default();
    for _ in 0..3 {
        stats.record_error();
    }
    let summary = RunSummary::build(
        stats,
        Duration::from_secs(1),
        3,
        1,
        &PercentileSet::default(),
        false,
    );
    if summary.percentiles.table().is_some() {
        return Err("Expected no percentile table".to_owned());
    }
    let entries = summary.percentiles.entries();
    if entries.len() != DEFAULT_PERCENTILES.len() || entries.iter().any(|(_, v)| v.is_some()) {
        return Err(format!("Unexpected entries {:?}", entries));
    }
    if summary.errors != 3 || summary.successes() != 0 {
        return Err(format!("Unexpected counters {:?}", summary));
    }
    Ok(())
}

#[test]
fn percentile_set_parses_and_normalizes() -> Result<(), String> {
    let parsed: PercentileSet = "99, 50,90,50".parse().map_err(|err| format!("{}", err))?;
    if parsed.as_slice() != [50, 90, 99] {
        return Err(format!("Unexpected set {:?}", parsed));
    }
    if "101".parse::<PercentileSet>().is_ok() {
        return Err("Expected 101 to be rejected".to_owned());
    }
    if "".parse::<PercentileSet>().is_ok() {
        return Err("Expected empty list to be rejected".to_owned());
    }
    if "p50".parse::<PercentileSet>().is_ok() {
        return Err("Expected non-numeric percentile to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn merged_totals_are_exact_sums_for_any_partition() -> Result<(), String> {
    const TOTAL: u64 = 100;
    let mut reference: Option<Stats> = None;

    for workers in [1u64, 4, 37] {
        let mut reports: Vec<Stats> = (0..workers).map(|_| Stats::default()).collect();
        for request in 0..TOTAL {
            let slot = usize::try_from(request % workers).map_err(|err| err.to_string())?;
            let stats = reports.get_mut(slot).ok_or("missing worker slot")?;
            match request % 3 {
                0 => stats.record_success(RequestKind::Get, &report(0, 10, request)),
                1 => stats.record_success(RequestKind::Post, &report(7, 0, request)),
                _ => stats.record_error(),
            }
        }

        let expected_sent: u64 = reports.iter().map(|stats| stats.bytes_sent).sum();
        let expected_errors: u64 = reports.iter().map(|stats| stats.errors).sum();
        let mut merged = merge_stats(reports);
        if merged.completed() != TOTAL {
            return Err(format!("{} workers completed {}", workers, merged.completed()));
        }
        if merged.bytes_sent != expected_sent || merged.errors != expected_errors {
            return Err(format!("{} workers merged to {:?}", workers, merged));
        }
        merged.latencies.sort_unstable();

        if let Some(previous) = reference.as_ref() {
            if previous != &merged {
                return Err(format!("Partition over {} workers changed the totals", workers));
            }
        } else {
            reference = Some(merged);
        }
    }
    Ok(())
}

#[test]
fn merge_is_independent_of_arrival_order() -> Result<(), String> {
    let mut first = Stats::default();
    first.record_success(RequestKind::Get, &report(0, 100, 30));
    let mut second = Stats::default();
    second.record_success(RequestKind::Post, &report(50, 0, 10));
    second.record_error();

    let forward = RunSummary::build(
        merge_stats([first.clone(), second.clone()]),
        Duration::from_secs(1),
        3,
        2,
        &set(&[50])?,
        false,
    );
    let backward = RunSummary::build(
        merge_stats([second, first]),
        Duration::from_secs(1),
        3,
        2,
        &set(&[50])?,
        false,
    );
    if forward != backward {
        return Err(format!("{:?} != {:?}", forward, backward));
    }
    Ok(())
}

#[test]
fn requests_per_second_uses_configured_total() -> Result<(), String> {
    let summary = RunSummary::build(
        Stats::default(),
        Duration::from_millis(1_600),
        1_000,
        10,
        &PercentileSet::default(),
        false,
    );
    if summary.requests_per_second() != "625.00" {
        return Err(format!("Unexpected rps {}", summary.requests_per_second()));
    }

    let mut stats = Stats::default();
    stats.record_error();
    let interrupted = RunSummary::build(
        stats,
        Duration::from_secs(2),
        1_000,
        10,
        &PercentileSet::default(),
        true,
    );
    if interrupted.requests_per_second() != "0.50" {
        return Err(format!(
            "Unexpected interrupted rps {}",
            interrupted.requests_per_second()
        ));
    }
    Ok(())
}
