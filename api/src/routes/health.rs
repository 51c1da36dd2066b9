//! Health checks for both servers

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use chrono::Utc;
use serde_json::{Value, json};

use crate::state::{AssistantState, MemoryState, VideoState};

pub fn video_routes() -> Router<Arc<VideoState>> {
    Router::new().route("/health", get(video_health))
}

pub fn assistant_routes() -> Router<Arc<AssistantState>> {
    Router::new().route("/health", get(assistant_health))
}

/// `/healthz` is kept next to `/health` for older clients.
pub fn memory_routes() -> Router<Arc<MemoryState>> {
    Router::new()
        .route("/health", get(memory_health))
        .route("/healthz", get(memory_health))
}

async fn video_health(State(state): State<Arc<VideoState>>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "service": "clipcap-api",
        "timestamp": Utc::now().to_rfc3339(),
        "videos": state.store.len(),
    }))
}

async fn assistant_health(State(state): State<Arc<AssistantState>>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339(),
        "service": "clipcap-assistant",
        "aiConnected": state.assistant.using_ai(),
    }))
}

async fn memory_health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "creator-memory",
        "time": Utc::now().to_rfc3339(),
    }))
}
