//! Creator memory endpoints (/creators, /memories, /webhooks/generation,
//! /feedback, /personalize/suggestions, /analytics/inline)

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::memory::{
    Creator, Feedback, FeedbackAction, GeneratedSuggestion, InlineStats, Memory, MemoryError,
    Personalization, Preferences, PreferencesPatch, SuggestionKind,
};
use crate::services::error::{AppError, AppResult};
use crate::state::MemoryState;

pub fn routes() -> Router<Arc<MemoryState>> {
    Router::new()
        .route("/creators/{creator_id}", put(upsert_creator).get(get_creator))
        .route(
            "/creators/{creator_id}/preferences",
            get(get_preferences).put(put_preferences),
        )
        .route("/memories/ingest", post(ingest_memory))
        .route("/memories/{creator_id}", get(list_memories))
        .route("/webhooks/generation", post(log_generation))
        .route("/feedback", post(submit_feedback))
        .route("/personalize/suggestions", post(personalize))
        .route("/analytics/inline", get(inline_analytics))
}

impl From<MemoryError> for AppError {
    fn from(e: MemoryError) -> Self {
        AppError::not_found(e.to_string())
    }
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| AppError::bad_request(e.body_text()))
}

#[derive(Debug, Serialize)]
struct Acknowledged {
    ok: bool,
}

const ACK: Acknowledged = Acknowledged { ok: true };

#[derive(Debug, Deserialize)]
struct CreatorBody {
    username: Option<String>,
    locale: Option<String>,
    timezone: Option<String>,
}

/// PUT /creators/{creator_id} - Create or replace a creator profile
async fn upsert_creator(
    State(state): State<Arc<MemoryState>>,
    Path(creator_id): Path<String>,
    payload: Result<Json<CreatorBody>, JsonRejection>,
) -> AppResult<Json<Creator>> {
    let body = json_body(payload)?;
    let creator = state.memory.upsert_creator(Creator {
        id: creator_id,
        username: body.username,
        locale: body.locale.unwrap_or_else(|| "en".into()),
        timezone: body.timezone.unwrap_or_else(|| "Asia/Singapore".into()),
    });
    tracing::info!(creator_id = %creator.id, "Creator upserted");
    Ok(Json(creator))
}

/// GET /creators/{creator_id}
async fn get_creator(
    State(state): State<Arc<MemoryState>>,
    Path(creator_id): Path<String>,
) -> AppResult<Json<Creator>> {
    state
        .memory
        .creator(&creator_id)
        .map(Json)
        .ok_or_else(|| MemoryError::CreatorNotFound.into())
}

async fn get_preferences(
    State(state): State<Arc<MemoryState>>,
    Path(creator_id): Path<String>,
) -> Json<Preferences> {
    Json(state.memory.preferences(&creator_id))
}

/// PUT /creators/{creator_id}/preferences - Update only the fields sent
async fn put_preferences(
    State(state): State<Arc<MemoryState>>,
    Path(creator_id): Path<String>,
    payload: Result<Json<PreferencesPatch>, JsonRejection>,
) -> AppResult<Json<Preferences>> {
    let patch = json_body(payload)?;
    Ok(Json(state.memory.update_preferences(&creator_id, patch)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Platform {
    Tiktok,
}

#[derive(Debug, Deserialize)]
struct IngestRequest {
    creator_id: String,
    #[serde(rename = "platform")]
    _platform: Platform,
    caption: String,
    #[serde(default)]
    hashtags: Vec<String>,
    #[serde(default)]
    performance: Option<Map<String, Value>>,
}

/// POST /memories/ingest - Remember a published caption
async fn ingest_memory(
    State(state): State<Arc<MemoryState>>,
    payload: Result<Json<IngestRequest>, JsonRejection>,
) -> AppResult<Json<Memory>> {
    let req = json_body(payload)?;
    let memory = state.memory.ingest(
        &req.creator_id,
        req.caption,
        req.hashtags,
        req.performance.unwrap_or_default(),
    )?;
    tracing::debug!(creator_id = %memory.creator_id, memory_id = memory.id, "Memory ingested");
    Ok(Json(memory))
}

async fn list_memories(
    State(state): State<Arc<MemoryState>>,
    Path(creator_id): Path<String>,
) -> AppResult<Json<Vec<Memory>>> {
    Ok(Json(state.memory.memories(&creator_id)?))
}

fn default_model() -> String {
    "gpt".to_string()
}

#[derive(Debug, Deserialize)]
struct GenerationWebhook {
    creator_id: String,
    suggestion_id: String,
    #[serde(rename = "type", default)]
    kind: SuggestionKind,
    suggested_caption: Option<String>,
    #[serde(default)]
    suggested_hashtags: Vec<String>,
    #[serde(default = "default_model")]
    model: String,
    #[serde(default)]
    meta: Option<Map<String, Value>>,
}

/// POST /webhooks/generation - Log a suggestion shown to the creator
async fn log_generation(
    State(state): State<Arc<MemoryState>>,
    payload: Result<Json<GenerationWebhook>, JsonRejection>,
) -> AppResult<Json<Acknowledged>> {
    let req = json_body(payload)?;
    state.memory.log_suggestion(
        &req.creator_id,
        GeneratedSuggestion {
            suggestion_id: req.suggestion_id,
            kind: req.kind,
            caption: req.suggested_caption,
            hashtags: req.suggested_hashtags,
            model: req.model,
            meta: req.meta.unwrap_or_default(),
        },
    )?;
    Ok(Json(ACK))
}

#[derive(Debug, Deserialize)]
struct FeedbackRequest {
    creator_id: String,
    suggestion_id: String,
    action: FeedbackAction,
    final_caption: Option<String>,
    #[serde(default)]
    final_hashtags: Vec<String>,
    reason: Option<String>,
}

/// POST /feedback - Approve, edit or reject a logged suggestion
async fn submit_feedback(
    State(state): State<Arc<MemoryState>>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> AppResult<Json<Acknowledged>> {
    let req = json_body(payload)?;
    tracing::info!(
        creator_id = %req.creator_id,
        suggestion_id = %req.suggestion_id,
        action = ?req.action,
        "Suggestion feedback"
    );
    state.memory.record_feedback(
        &req.creator_id,
        Feedback {
            suggestion_id: req.suggestion_id,
            action: req.action,
            final_caption: req.final_caption,
            final_hashtags: req.final_hashtags,
            reason: req.reason,
        },
    )?;
    Ok(Json(ACK))
}

#[derive(Debug, Deserialize)]
struct CreatorQuery {
    creator_id: String,
}

/// POST /personalize/suggestions - Guardrails, hints and examples for a creator
async fn personalize(
    State(state): State<Arc<MemoryState>>,
    payload: Result<Json<CreatorQuery>, JsonRejection>,
) -> AppResult<Json<Personalization>> {
    let req = json_body(payload)?;
    Ok(Json(state.memory.personalize(&req.creator_id)))
}

/// GET /analytics/inline?creator_id=
async fn inline_analytics(
    State(state): State<Arc<MemoryState>>,
    query: Result<Query<CreatorQuery>, QueryRejection>,
) -> AppResult<Json<InlineStats>> {
    let Query(query) = query.map_err(|e| AppError::bad_request(e.body_text()))?;
    Ok(Json(state.memory.inline_stats(&query.creator_id)))
}
