use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("Guestbook server failed: {source}")]
    Serve {
        #[source]
        source: std::io::Error,
    },
}

/// Failure reported by a list store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("List store unavailable: {message}")]
    Unavailable { message: String },
}
