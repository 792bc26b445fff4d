use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, debug_handler};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use tracing::{debug, error};

use crate::domain::Comment;

use super::store::ListStore;

#[derive(Clone)]
pub struct GuestbookState {
    store: Arc<dyn ListStore>,
    recent: usize,
}

impl GuestbookState {
    /// `recent` is the page size of `GET /comments`; zero is raised to one.
    #[must_use]
    pub const fn new(store: Arc<dyn ListStore>, recent: usize) -> Self {
        let recent = if recent == 0 { 1 } else { recent };
        Self { store, recent }
    }
}

/// `POST /comment`: store the comment stamped with the server's clock.
#[debug_handler]
pub async fn add_comment(State(state): State<GuestbookState>, body: Bytes) -> Response {
    let mut comment: Comment = match serde_json::from_slice(&body) {
        Ok(comment) => comment,
        Err(err) => {
            debug!("Rejected comment: {}", err);
            return (StatusCode::BAD_REQUEST, err.to_string()).into_response();
        }
    };
    comment.time = Utc::now();

    let encoded = match serde_json::to_string(&comment) {
        Ok(encoded) => encoded,
        Err(err) => return internal_error(&err),
    };
    match state.store.push_front(encoded).await {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(err) => internal_error(&err),
    }
}

/// `GET /comments`: the newest comments, newest first.
#[debug_handler]
pub async fn list_comments(State(state): State<GuestbookState>) -> Response {
    let entries = match state.store.range(0, state.recent.saturating_sub(1)).await {
        Ok(entries) => entries,
        Err(err) => return internal_error(&err),
    };

    let mut comments = Vec::with_capacity(entries.len());
    for entry in &entries {
        match serde_json::from_str::<Comment>(entry) {
            Ok(comment) => comments.push(comment),
            Err(err) => return internal_error(&err),
        }
    }
    Json(comments).into_response()
}

fn internal_error(err: &dyn std::error::Error) -> Response {
    error!("Guestbook request failed: {}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
}
