use std::time::Duration;

use super::percentiles::{PercentileSet, PercentileTable};
use super::stats::Stats;
use crate::error::MetricsError;

/// Scale applied to requests-per-second so it can be carried as an integer
/// with two decimal places.
const RPS_SCALE: u128 = 100;
const MICROS_PER_SECOND: u128 = 1_000_000;

/// Percentile latencies, or the reason they are missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PercentileReport {
    Table(PercentileTable),
    NoData { requested: PercentileSet },
}

impl PercentileReport {
    #[must_use]
    pub fn from_latencies(latencies: Vec<Duration>, set: &PercentileSet) -> Self {
        match PercentileTable::compute(latencies, set) {
            Ok(table) => PercentileReport::Table(table),
            Err(MetricsError::EmptyLatencyData) => PercentileReport::NoData {
                requested: set.clone(),
            },
            Err(err) => {
                tracing::warn!("Percentile computation failed: {}", err);
                PercentileReport::NoData {
                    requested: set.clone(),
                }
            }
        }
    }

    #[must_use]
    pub const fn table(&self) -> Option<&PercentileTable> {
        match self {
            PercentileReport::Table(table) => Some(table),
            PercentileReport::NoData { .. } => None,
        }
    }

    /// Requested percentiles paired with their latency, `None` meaning no data.
    #[must_use]
    pub fn entries(&self) -> Vec<(u8, Option<Duration>)> {
        match self {
            PercentileReport::Table(table) => table
                .iter()
                .map(|(percentile, value)| (percentile, Some(value)))
                .collect(),
            PercentileReport::NoData { requested } => requested
                .as_slice()
                .iter()
                .map(|percentile| (*percentile, None))
                .collect(),
        }
    }
}

/// Terminal artifact of a load-test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub elapsed: Duration,
    pub total_requests: u64,
    pub workers: usize,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub successful_get: u64,
    pub successful_post: u64,
    pub errors: u64,
    pub percentiles: PercentileReport,
    pub requests_per_second_x100: u64,
    pub interrupted: bool,
}

impl RunSummary {
    /// Build the summary from the merged stats of every worker.
    ///
    /// Throughput uses the configured request count, or the completed
    /// iterations when the run was interrupted.
    #[must_use]
    pub fn build(
        stats: Stats,
        elapsed: Duration,
        total_requests: u64,
        workers: usize,
        set: &PercentileSet,
        interrupted: bool,
    ) -> Self {
        let counted = if interrupted {
            stats.completed()
        } else {
            total_requests
        };
        let requests_per_second_x100 = requests_per_second_x100(counted, elapsed);
        let Stats {
            successful_get,
            successful_post,
            bytes_sent,
            bytes_received,
            errors,
            latencies,
        } = stats;

        Self {
            elapsed,
            total_requests,
            workers,
            bytes_sent,
            bytes_received,
            successful_get,
            successful_post,
            errors,
            percentiles: PercentileReport::from_latencies(latencies, set),
            requests_per_second_x100,
            interrupted,
        }
    }

    #[must_use]
    pub const fn successes(&self) -> u64 {
        self.successful_get.saturating_add(self.successful_post)
    }

    /// Requests per second rendered with two decimals.
    #[must_use]
    pub fn requests_per_second(&self) -> String {
        format!(
            "{}.{:02}",
            self.requests_per_second_x100 / 100,
            self.requests_per_second_x100 % 100
        )
    }
}

fn requests_per_second_x100(requests: u64, elapsed: Duration) -> u64 {
    let elapsed_us = elapsed.as_micros().max(1);
    let scaled = u128::from(requests)
        .saturating_mul(RPS_SCALE)
        .saturating_mul(MICROS_PER_SECOND)
        .checked_div(elapsed_us)
        .unwrap_or(0);
    u64::try_from(scaled).unwrap_or(u64::MAX)
}
