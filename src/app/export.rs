use std::str::FromStr;
use std::time::Duration;

use serde_json::{Number, Value, json};
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::error::{AppError, AppResult, MetricsError};
use crate::metrics::RunSummary;

/// JSON rendering of the summary. Latencies are whole microseconds; a
/// percentile without data is `null`.
#[must_use]
pub fn summary_json(summary: &RunSummary) -> Value {
    let percentiles: Vec<Value> = summary
        .percentiles
        .entries()
        .into_iter()
        .map(|(percentile, latency)| {
            json!({
                "percentile": percentile,
                "latency_us": latency.map(micros),
            })
        })
        .collect();

    let requests_per_second = Number::from_str(&summary.requests_per_second())
        .map_or(Value::Null, Value::Number);

    json!({
        "elapsed_us": micros(summary.elapsed),
        "total_requests": summary.total_requests,
        "workers": summary.workers,
        "bytes_sent": summary.bytes_sent,
        "bytes_received": summary.bytes_received,
        "successful_get": summary.successful_get,
        "successful_post": summary.successful_post,
        "errors": summary.errors,
        "percentiles": percentiles,
        "requests_per_second": requests_per_second,
        "interrupted": summary.interrupted,
    })
}

/// Write the JSON summary to `path`.
///
/// # Errors
///
/// Returns an error when the summary cannot be encoded or the file cannot be
/// written.
pub async fn export_json(path: &str, summary: &RunSummary) -> AppResult<()> {
    let encoded = serde_json::to_vec_pretty(&summary_json(summary)).map_err(|err| {
        AppError::metrics(MetricsError::Encode {
            context: "summary",
            source: err,
        })
    })?;
    let io_error = |err: std::io::Error| {
        AppError::metrics(MetricsError::Io {
            context: "summary export",
            source: err,
        })
    };

    let file = tokio::fs::File::create(path).await.map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&encoded).await.map_err(io_error)?;
    writer.write_all(b"\n").await.map_err(io_error)?;
    writer.flush().await.map_err(io_error)?;
    tracing::info!("Summary written to {}", path);
    Ok(())
}

fn micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}
