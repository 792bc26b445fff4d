use std::time::Duration;

use reqwest::Url;
use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::domain::{Comment, RequestKind, RequestReport};
use crate::error::RequestError;

use super::transport::Transport;
use super::worker::PlannedRequest;

/// Delay before the second attempt.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(20);
/// Upper bound for any single delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);
/// Attempts per logical request, the first one included.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl BackoffPolicy {
    /// Delay slept after failed attempt number `attempt` (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let mut delay = self.initial_delay.min(self.max_delay);
        for _ in 1..attempt {
            delay = delay.saturating_mul(2).min(self.max_delay);
            if delay == self.max_delay {
                break;
            }
        }
        delay
    }

    /// Every delay a request that never succeeds would sleep, in order.
    /// There is no delay after the final attempt.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..self.max_attempts).map(|attempt| self.delay_after(attempt))
    }
}

/// Issues logical requests, retrying failed attempts with exponential
/// backoff.
#[derive(Debug)]
pub struct BackoffRequester<T> {
    transport: T,
    policy: BackoffPolicy,
}

impl<T: Transport> BackoffRequester<T> {
    #[must_use]
    pub const fn new(transport: T, policy: BackoffPolicy) -> Self {
        Self { transport, policy }
    }

    #[must_use]
    pub const fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute a planned request.
    ///
    /// # Errors
    ///
    /// See [`BackoffRequester::get`] and [`BackoffRequester::post`].
    pub async fn send(&self, request: &PlannedRequest) -> Result<RequestReport, RequestError> {
        match request {
            PlannedRequest::ListComments { url } => self.get(url).await,
            PlannedRequest::AddComment { url, comment } => self.post(url, comment).await,
        }
    }

    /// `GET` with retries.
    ///
    /// # Errors
    ///
    /// Returns `RequestError::BackoffExhausted` when every attempt failed.
    pub async fn get(&self, url: &Url) -> Result<RequestReport, RequestError> {
        self.execute(RequestKind::Get, url, None).await
    }

    /// `POST` the comment as JSON with retries.
    ///
    /// # Errors
    ///
    /// Returns `RequestError::SerializationFailed` without any network
    /// attempt when the comment cannot be encoded, and
    /// `RequestError::BackoffExhausted` when every attempt failed.
    pub async fn post(&self, url: &Url, comment: &Comment) -> Result<RequestReport, RequestError> {
        let body = comment
            .to_json()
            .map_err(|source| RequestError::SerializationFailed { source })?;
        self.execute(RequestKind::Post, url, Some(&body)).await
    }

    async fn execute(
        &self,
        kind: RequestKind,
        url: &Url,
        body: Option<&[u8]>,
    ) -> Result<RequestReport, RequestError> {
        let bytes_sent = body.map_or(0, |body| u64::try_from(body.len()).unwrap_or(u64::MAX));
        let mut attempt: u32 = 0;

        loop {
            attempt = attempt.saturating_add(1);
            let start = Instant::now();
            match self.transport.send(kind, url, body).await {
                Ok(bytes_received) => {
                    return Ok(RequestReport {
                        bytes_sent,
                        bytes_received,
                        latency: start.elapsed(),
                    });
                }
                Err(err) if err.is_retryable() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.delay_after(attempt);
                    debug!(
                        "{} {} attempt {} failed: {}; retrying in {:?}",
                        kind.as_str(),
                        url,
                        attempt,
                        err,
                        delay
                    );
                    sleep(delay).await;
                }
                Err(err) if err.is_retryable() => {
                    return Err(RequestError::BackoffExhausted {
                        attempts: attempt,
                        last: Box::new(err),
                    });
                }
                Err(err) => return Err(err),
            }
        }
    }
}
