//! The guestbook HTTP service targeted by the load generator.
mod handlers;
mod store;


use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tracing::info;

use crate::domain::{ADD_COMMENT_PATH, LIST_COMMENTS_PATH};
use crate::error::{AppError, AppResult, ServiceError};
use crate::shutdown::{ShutdownReceiver, wait_for_shutdown};

pub use handlers::{GuestbookState, add_comment, list_comments};
pub use store::{ListStore, MemoryListStore};

/// Comments returned by `GET /comments` unless configured otherwise.
pub const DEFAULT_RECENT_COMMENTS: usize = 10;

/// Routes for `POST /comment` and `GET /comments`.
#[must_use]
pub fn router(state: GuestbookState) -> Router {
    Router::new()
        .route(&format!("/{}", ADD_COMMENT_PATH), post(add_comment))
        .route(&format!("/{}", LIST_COMMENTS_PATH), get(list_comments))
        .with_state(state)
}

/// Bind the listening socket.
///
/// # Errors
///
/// Returns an error when the address cannot be bound.
pub async fn bind(addr: SocketAddr) -> AppResult<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|err| AppError::service(ServiceError::Bind { addr, source: err }))
}

/// Serve the guestbook on an already bound listener until shutdown is
/// signalled.
///
/// # Errors
///
/// Returns an error when the server fails while accepting connections.
pub async fn serve_on(
    listener: TcpListener,
    state: GuestbookState,
    mut shutdown_rx: ShutdownReceiver,
) -> AppResult<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Guestbook listening on http://{}", addr);
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            wait_for_shutdown(&mut shutdown_rx).await;
            info!("Guestbook shutting down");
        })
        .await
        .map_err(|err| AppError::service(ServiceError::Serve { source: err }))
}

/// Bind `addr` and serve an in-memory guestbook until shutdown.
///
/// # Errors
///
/// Returns an error when binding or serving fails.
pub async fn serve(addr: SocketAddr, recent: usize, shutdown_rx: ShutdownReceiver) -> AppResult<()> {
    let listener = bind(addr).await?;
    let state = GuestbookState::new(Arc::new(MemoryListStore::default()), recent);
    serve_on(listener, state, shutdown_rx).await
}
