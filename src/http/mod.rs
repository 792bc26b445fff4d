//! HTTP request execution: client setup, retry with backoff, and workers.
mod backoff;
mod client;
mod transport;
mod worker;


pub use backoff::{
    BackoffPolicy, BackoffRequester, DEFAULT_INITIAL_DELAY, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_DELAY,
};
pub use client::{ClientSettings, build_client};
pub use transport::{HttpTransport, Transport};
pub use worker::{
    Endpoints, MESSAGE_LEN, PlannedRequest, QUERY_TOKEN_LEN, Worker, WorkerReport,
    random_string, split_iterations,
};
