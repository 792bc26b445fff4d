use std::time::Duration;

use crate::domain::{RequestKind, RequestReport};

/// Counters and latency samples collected by one worker, or merged across
/// all workers once the run completes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    pub successful_get: u64,
    pub successful_post: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub errors: u64,
    pub latencies: Vec<Duration>,
}

impl Stats {
    #[must_use]
    pub fn with_capacity(iterations: usize) -> Self {
        Self {
            latencies: Vec::with_capacity(iterations),
            ..Self::default()
        }
    }

    pub fn record_success(&mut self, kind: RequestKind, report: &RequestReport) {
        match kind {
            RequestKind::Get => self.successful_get = self.successful_get.saturating_add(1),
            RequestKind::Post => self.successful_post = self.successful_post.saturating_add(1),
        }
        self.bytes_sent = self.bytes_sent.saturating_add(report.bytes_sent);
        self.bytes_received = self.bytes_received.saturating_add(report.bytes_received);
        self.latencies.push(report.latency);
    }

    pub const fn record_error(&mut self) {
        self.errors = self.errors.saturating_add(1);
    }

    #[must_use]
    pub const fn successes(&self) -> u64 {
        self.successful_get.saturating_add(self.successful_post)
    }

    /// Iterations that finished, whether they succeeded or not.
    #[must_use]
    pub const fn completed(&self) -> u64 {
        self.successes().saturating_add(self.errors)
    }

    /// Fold another worker's stats into this one.
    pub fn merge(&mut self, other: Stats) {
        self.successful_get = self.successful_get.saturating_add(other.successful_get);
        self.successful_post = self.successful_post.saturating_add(other.successful_post);
        self.bytes_sent = self.bytes_sent.saturating_add(other.bytes_sent);
        self.bytes_received = self.bytes_received.saturating_add(other.bytes_received);
        self.errors = self.errors.saturating_add(other.errors);
        self.latencies.extend(other.latencies);
    }
}

/// Merge any number of worker reports into a single `Stats`.
#[must_use]
pub fn merge_stats<I>(reports: I) -> Stats
where
    I: IntoIterator<Item = Stats>,
{
    reports.into_iter().fold(Stats::default(), |mut acc, stats| {
        acc.merge(stats);
        acc
    })
}
