//! Per-worker statistics, merging, and percentile latencies.
mod percentiles;
mod stats;
mod types;

#[cfg(test)]
mod tests;

pub use percentiles::{DEFAULT_PERCENTILES, PercentileSet, PercentileTable, percentile_index};
pub use stats::{Stats, merge_stats};
pub use types::{PercentileReport, RunSummary};
