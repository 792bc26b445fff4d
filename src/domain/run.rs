use std::time::Duration;

use reqwest::Url;

use crate::args::LoadTestArgs;
use crate::error::{AppError, AppResult, HttpError, ValidationError};
use crate::http::{BackoffPolicy, ClientSettings};
use crate::metrics::PercentileSet;

/// Everything a load test needs, validated and passed by reference into the
/// driver and its workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub base_url: Url,
    pub total_requests: u64,
    pub workers: usize,
    pub percentiles: PercentileSet,
    pub backoff: BackoffPolicy,
    pub client: ClientSettings,
    /// Stop early and report partial results once this much time has passed.
    pub deadline: Option<Duration>,
    /// Worker `i` seeds its generator with `seed + i`.
    pub seed: Option<u64>,
}

impl RunConfig {
    /// Build a run configuration from parsed (and config-merged) arguments.
    ///
    /// # Errors
    ///
    /// Returns an error when the host is missing or is not an http(s) URL,
    /// when the backoff ceiling is below the initial delay, or when the
    /// attempt count does not fit.
    pub fn from_args(args: &LoadTestArgs) -> AppResult<Self> {
        let host = args
            .host
            .as_deref()
            .ok_or_else(|| AppError::validation(ValidationError::MissingHost))?;
        let base_url = parse_base_url(host)?;

        if args.backoff_max < args.backoff_initial {
            return Err(AppError::validation(
                ValidationError::BackoffCeilingBelowInitial {
                    initial_ms: args.backoff_initial.as_millis(),
                    max_ms: args.backoff_max.as_millis(),
                },
            ));
        }
        let max_attempts = u32::try_from(args.max_attempts.get()).map_err(|err| {
            tracing::debug!("max attempts conversion failed: {}", err);
            AppError::validation(ValidationError::MaxAttemptsTooLarge {
                value: args.max_attempts.get(),
                max: u32::MAX,
            })
        })?;

        let workers = args.threads.get();
        Ok(Self {
            base_url,
            total_requests: args.requests.get(),
            workers,
            percentiles: args.percentiles.clone(),
            backoff: BackoffPolicy {
                initial_delay: args.backoff_initial,
                max_delay: args.backoff_max,
                max_attempts,
            },
            client: ClientSettings {
                request_timeout: args.request_timeout,
                connect_timeout: args.connect_timeout,
                pool_max_idle_per_host: workers,
            },
            deadline: args.deadline,
            seed: args.seed,
        })
    }
}

/// Parse the service base URL; only `http` and `https` are accepted.
///
/// # Errors
///
/// Returns an error when the URL does not parse or uses another scheme.
pub fn parse_base_url(raw: &str) -> AppResult<Url> {
    let url = Url::parse(raw.trim()).map_err(|err| {
        AppError::http(HttpError::InvalidBaseUrl {
            url: raw.to_owned(),
            source: err,
        })
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(AppError::http(HttpError::UnsupportedScheme {
            url: raw.to_owned(),
        })),
    }
}
