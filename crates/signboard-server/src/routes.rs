//! HTTP API surface.
//!
//! Mutating endpoints acknowledge idempotently: marking an already-shown
//! (or deleted) message shown and deleting an unknown id both succeed,
//! so a display advancing against a stale snapshot never wedges.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use signboard_core::error::ValidationError;
use signboard_core::message::{Message, MessageDraft, Stats};

use crate::store::{Store, StoreError};
use crate::triggers::TriggerLog;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Shared state lock poisoned")]
    LockPoisoned,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let body = Json(serde_json::json!({
            "success": false,
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}

/// Shared state cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<Store>>,
    triggers: Arc<Mutex<TriggerLog>>,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            triggers: Arc::new(Mutex::new(TriggerLog::new())),
        }
    }

    fn store(&self) -> Result<MutexGuard<'_, Store>, ApiError> {
        self.store.lock().map_err(|_| ApiError::LockPoisoned)
    }

    fn triggers(&self) -> Result<MutexGuard<'_, TriggerLog>, ApiError> {
        self.triggers.lock().map_err(|_| ApiError::LockPoisoned)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/messages",
            get(list_messages).post(add_message).delete(clear_messages),
        )
        .route("/api/messages/reset-shown", post(reset_shown))
        .route("/api/messages/{id}/shown", put(mark_shown))
        .route("/api/messages/{id}", delete(delete_message))
        .route("/api/stats", get(get_stats))
        .route("/api/celebration", post(trigger_celebration))
        .route("/api/celebration/poll", get(poll_celebrations))
        .with_state(state)
}

/// Raw submission body; sanitized and validated server-side.
#[derive(Debug, Deserialize)]
pub struct SubmitBody {
    #[serde(default)]
    pub line1: String,
    #[serde(default)]
    pub line2: String,
    #[serde(default)]
    pub line3: String,
    #[serde(default)]
    pub line4: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub success: bool,
    pub timestamp: f64,
}

#[derive(Debug, Serialize)]
pub struct TriggerPollResponse {
    pub triggers: Vec<f64>,
    pub count: usize,
}

async fn list_messages(State(state): State<AppState>) -> Result<Json<Vec<Message>>, ApiError> {
    Ok(Json(state.store()?.list()?))
}

async fn add_message(
    State(state): State<AppState>,
    Json(body): Json<SubmitBody>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let draft = MessageDraft::new(&body.line1, &body.line2, &body.line3, &body.line4)?;
    let id = state.store()?.insert(&draft)?;
    debug!(id, "message queued");
    Ok(Json(SubmitResponse { success: true, id }))
}

async fn mark_shown(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AckResponse>, ApiError> {
    if !state.store()?.mark_shown(id)? {
        debug!(id, "mark-shown for unknown id");
    }
    Ok(Json(AckResponse { success: true }))
}

async fn reset_shown(State(state): State<AppState>) -> Result<Json<AckResponse>, ApiError> {
    state.store()?.reset_shown()?;
    Ok(Json(AckResponse { success: true }))
}

async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AckResponse>, ApiError> {
    if !state.store()?.delete(id)? {
        debug!(id, "delete for unknown id");
    }
    Ok(Json(AckResponse { success: true }))
}

async fn clear_messages(State(state): State<AppState>) -> Result<Json<AckResponse>, ApiError> {
    state.store()?.clear()?;
    Ok(Json(AckResponse { success: true }))
}

async fn get_stats(State(state): State<AppState>) -> Result<Json<Stats>, ApiError> {
    Ok(Json(state.store()?.stats()?))
}

async fn trigger_celebration(
    State(state): State<AppState>,
) -> Result<Json<TriggerResponse>, ApiError> {
    let timestamp = state.triggers()?.record();
    Ok(Json(TriggerResponse {
        success: true,
        timestamp,
    }))
}

async fn poll_celebrations(
    State(state): State<AppState>,
) -> Result<Json<TriggerPollResponse>, ApiError> {
    let triggers = state.triggers()?.recent();
    let count = triggers.len();
    Ok(Json(TriggerPollResponse { triggers, count }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::new(Store::open_memory().unwrap())
    }

    fn body(line1: &str) -> SubmitBody {
        SubmitBody {
            line1: line1.to_string(),
            line2: String::new(),
            line3: String::new(),
            line4: String::new(),
        }
    }

    #[tokio::test]
    async fn submit_then_list_round_trips() {
        let state = state();
        let Json(resp) = add_message(State(state.clone()), Json(body("hello world!!")))
            .await
            .unwrap();
        assert!(resp.success);

        let Json(messages) = list_messages(State(state)).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, resp.id);
        assert_eq!(messages[0].line1, "HELLO WORLD!!");
        assert!(!messages[0].shown);
    }

    #[tokio::test]
    async fn empty_line1_is_rejected() {
        let state = state();
        let result = add_message(State(state), Json(body("  "))).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn mark_shown_acks_even_for_unknown_ids() {
        let state = state();
        let Json(ack) = mark_shown(State(state), Path(12345)).await.unwrap();
        assert!(ack.success);
    }

    #[tokio::test]
    async fn stats_reflect_queue_and_submission_counter() {
        let state = state();
        let Json(first) = add_message(State(state.clone()), Json(body("a")))
            .await
            .unwrap();
        add_message(State(state.clone()), Json(body("b")))
            .await
            .unwrap();
        mark_shown(State(state.clone()), Path(first.id)).await.unwrap();
        delete_message(State(state.clone()), Path(first.id))
            .await
            .unwrap();

        let Json(stats) = get_stats(State(state)).await.unwrap();
        assert_eq!(stats.total_submitted, 2);
        assert_eq!(stats.total_messages, 1);
        assert_eq!(stats.shown_messages, 0);
    }

    #[tokio::test]
    async fn celebration_trigger_shows_up_in_poll() {
        let state = state();
        let Json(trigger) = trigger_celebration(State(state.clone())).await.unwrap();
        assert!(trigger.success);

        let Json(poll) = poll_celebrations(State(state)).await.unwrap();
        assert_eq!(poll.count, 1);
        assert!((poll.triggers[0] - trigger.timestamp).abs() < f64::EPSILON);
    }
}
