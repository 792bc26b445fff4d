//! Core library for the `gbload` CLI.
//!
//! `gbload` drives concurrent GET/POST traffic against a guestbook service,
//! retrying failed attempts with exponential backoff, and reports byte
//! totals, success and error counts, latency percentiles, and throughput.
//! The same binary can serve the guestbook itself (`gbload serve`).
pub mod app;
pub mod args;
pub mod config;
pub mod domain;
pub mod entry;
pub mod error;
pub mod guestbook;
pub mod http;
pub mod logger;
pub mod metrics;
pub mod shutdown;
