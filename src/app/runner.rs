use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::domain::RunConfig;
use crate::error::{AppError, AppResult};
use crate::http::{
    BackoffRequester, Endpoints, HttpTransport, Transport, Worker, WorkerReport, build_client,
    split_iterations,
};
use crate::metrics::{RunSummary, merge_stats};
use crate::shutdown::{
    ShutdownSender, setup_deadline_handler, setup_signal_shutdown_handler, shutdown_channel,
};

/// Run a load test against the configured guestbook over real HTTP.
///
/// Ctrl-C (or SIGTERM) and the optional deadline stop the workers early, even
/// when they fire while the client is still being built; the summary is then
/// marked interrupted.
///
/// # Errors
///
/// Returns an error when the HTTP client cannot be built or a worker task
/// fails to report.
pub async fn run_load_test(config: &RunConfig) -> AppResult<RunSummary> {
    let (shutdown_tx, _) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);
    let deadline_handle = config
        .deadline
        .map(|deadline| setup_deadline_handler(&shutdown_tx, deadline));

    let client = build_client(&config.client)?;
    let result = run_with_transport(config, HttpTransport::new(client), &shutdown_tx).await;

    signal_handle.abort();
    if let Some(handle) = deadline_handle {
        handle.abort();
    }
    result
}

/// Spawn one task per worker, wait for every worker's stats on a channel
/// sized to the worker count, then aggregate.
///
/// # Errors
///
/// Returns an error when the endpoints cannot be resolved or a worker task
/// panics.
pub async fn run_with_transport<T>(
    config: &RunConfig,
    transport: T,
    shutdown_tx: &ShutdownSender,
) -> AppResult<RunSummary>
where
    T: Transport + 'static,
{
    let endpoints = Arc::new(Endpoints::new(&config.base_url).map_err(AppError::http)?);
    let requester = Arc::new(BackoffRequester::new(transport, config.backoff));
    let shares = split_iterations(config.total_requests, config.workers);
    let (report_tx, mut report_rx) = mpsc::channel::<WorkerReport>(config.workers.max(1));

    info!(
        "Starting {} requests against {} with {} workers",
        config.total_requests, config.base_url, config.workers
    );

    let start = Instant::now();
    let mut handles = Vec::with_capacity(shares.len());
    for (id, iterations) in shares.into_iter().enumerate() {
        let worker = Worker::new(
            id,
            iterations,
            worker_rng(config.seed, id),
            Arc::clone(&requester),
            Arc::clone(&endpoints),
        );
        let shutdown_rx = shutdown_tx.subscribe();
        let report_tx = report_tx.clone();
        handles.push(tokio::spawn(async move {
            let report = worker.run(shutdown_rx).await;
            if report_tx.send(report).await.is_err() {
                warn!("Results channel closed before worker {} reported", id);
            }
        }));
    }
    drop(report_tx);

    // One report per spawned worker; a worker that panics closes its sender
    // and surfaces below as a join error.
    let mut reports = Vec::with_capacity(handles.len());
    for _ in 0..handles.len() {
        let Some(report) = report_rx.recv().await else {
            break;
        };
        reports.push(report);
    }
    let elapsed = start.elapsed();

    for handle in handles {
        handle.await?;
    }

    let interrupted = reports.iter().any(|report| report.interrupted);
    if interrupted {
        warn!("Run interrupted; reporting partial results");
    }
    let stats = merge_stats(reports.into_iter().map(|report| report.stats));
    info!(
        "Run finished in {:?}: {} succeeded, {} failed",
        elapsed,
        stats.successes(),
        stats.errors
    );

    Ok(RunSummary::build(
        stats,
        elapsed,
        config.total_requests,
        config.workers,
        &config.percentiles,
        interrupted,
    ))
}

/// Random generator for worker `id`: `seed + id` when seeded, entropy
/// otherwise.
#[must_use]
pub fn worker_rng(seed: Option<u64>, id: usize) -> StdRng {
    match seed {
        Some(seed) => {
            let offset = u64::try_from(id).unwrap_or(u64::MAX);
            StdRng::seed_from_u64(seed.wrapping_add(offset))
        }
        None => StdRng::from_entropy(),
    }
}
