use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::{MetricsError, ValidationError};

/// Percentiles reported when none are configured.
pub const DEFAULT_PERCENTILES: [u8; 4] = [50, 90, 95, 99];
const PERCENT_DIVISOR: usize = 100;
const MAX_PERCENTILE: u64 = 100;

/// Validated, ascending, de-duplicated list of percentiles in `0..=100`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PercentileSet(Vec<u8>);

impl PercentileSet {
    /// Build a set from raw values.
    ///
    /// # Errors
    ///
    /// Returns an error when the list is empty or a value exceeds 100.
    pub fn new<I>(values: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = u64>,
    {
        let mut percentiles = Vec::new();
        for value in values {
            let percentile = match u8::try_from(value) {
                Ok(percentile) if value <= MAX_PERCENTILE => percentile,
                Ok(_) | Err(_) => return Err(ValidationError::PercentileOutOfRange { value }),
            };
            percentiles.push(percentile);
        }
        if percentiles.is_empty() {
            return Err(ValidationError::PercentilesEmpty);
        }
        percentiles.sort_unstable();
        percentiles.dedup();
        Ok(Self(percentiles))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl Default for PercentileSet {
    fn default() -> Self {
        Self(DEFAULT_PERCENTILES.to_vec())
    }
}

impl std::str::FromStr for PercentileSet {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut values = Vec::new();
        for part in s.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let value: u64 =
                trimmed
                    .parse()
                    .map_err(|err| ValidationError::InvalidPercentile {
                        value: trimmed.to_owned(),
                        source: err,
                    })?;
            values.push(value);
        }
        PercentileSet::new(values)
    }
}

/// Nearest-rank index of `percentile` in a sorted sequence of `len` items:
/// `floor(len * p / 100)`, clamped to the last element.
#[must_use]
pub fn percentile_index(len: usize, percentile: u8) -> Option<usize> {
    let last = len.checked_sub(1)?;
    let index = len
        .saturating_mul(usize::from(percentile))
        .checked_div(PERCENT_DIVISOR)
        .unwrap_or(0);
    Some(index.min(last))
}

/// Latency at each requested percentile, computed once over the full run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PercentileTable {
    samples: usize,
    values: BTreeMap<u8, Duration>,
}

impl PercentileTable {
    /// Sort `latencies` and look up every percentile in `set`.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::EmptyLatencyData` when there are no samples.
    pub fn compute(
        mut latencies: Vec<Duration>,
        set: &PercentileSet,
    ) -> Result<Self, MetricsError> {
        latencies.sort_unstable();
        Self::from_sorted(&latencies, set)
    }

    /// Build the table from an already ascending slice.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::EmptyLatencyData` when `sorted` is empty.
    pub fn from_sorted(sorted: &[Duration], set: &PercentileSet) -> Result<Self, MetricsError> {
        if sorted.is_empty() {
            return Err(MetricsError::EmptyLatencyData);
        }
        let mut values = BTreeMap::new();
        for &percentile in set.as_slice() {
            let value = percentile_index(sorted.len(), percentile)
                .and_then(|index| sorted.get(index))
                .copied()
                .ok_or(MetricsError::EmptyLatencyData)?;
            values.insert(percentile, value);
        }
        Ok(Self {
            samples: sorted.len(),
            values,
        })
    }

    #[must_use]
    pub fn get(&self, percentile: u8) -> Option<Duration> {
        self.values.get(&percentile).copied()
    }

    #[must_use]
    pub const fn samples(&self) -> usize {
        self.samples
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, Duration)> + '_ {
        self.values.iter().map(|(percentile, value)| (*percentile, *value))
    }
}
