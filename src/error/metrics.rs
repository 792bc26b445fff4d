use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("No successful requests recorded; latency percentiles are unavailable.")]
    EmptyLatencyData,
    #[error("I/O error during {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to encode {context}: {source}")]
    Encode {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
