use thiserror::Error;

/// Errors raised while preparing the HTTP side of a run.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Base URL '{url}' must use http or https.")]
    UnsupportedScheme { url: String },
    #[error("Failed to join URL '{url}': {source}")]
    JoinUrlFailed {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
}

/// Outcome of a single logical request that did not succeed.
///
/// `NetworkFailure` and `UnexpectedStatus` describe one attempt and are
/// retried; the other variants end the logical request.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Network failure: {source}")]
    NetworkFailure {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("Unexpected status {status}.")]
    UnexpectedStatus { status: u16 },
    #[error("Exponential backoff exhausted after {attempts} attempts: {last}")]
    BackoffExhausted {
        attempts: u32,
        #[source]
        last: Box<RequestError>,
    },
    #[error("Failed to serialize request body: {source}")]
    SerializationFailed {
        #[source]
        source: serde_json::Error,
    },
    #[error("Request cancelled by shutdown.")]
    Cancelled,
}

impl RequestError {
    pub fn network<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        RequestError::NetworkFailure {
            source: error.into(),
        }
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            RequestError::NetworkFailure { .. } | RequestError::UnexpectedStatus { .. } => true,
            RequestError::BackoffExhausted { .. }
            | RequestError::SerializationFailed { .. }
            | RequestError::Cancelled => false,
        }
    }
}
