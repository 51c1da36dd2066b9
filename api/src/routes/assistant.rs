//! Creator assistant endpoints (/api/chat, /api/captions/generate, /api/trends, /api/creative/ideas)

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::models::HistoryMessage;
use crate::services::assistant::{CaptionDraft, IdeaPrompt};
use crate::services::error::{AppError, AppResult};
use crate::state::AssistantState;

pub fn routes() -> Router<Arc<AssistantState>> {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/captions/generate", post(generate_caption))
        .route("/api/trends", get(trends))
        .route("/api/creative/ideas", post(creative_ideas))
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| AppError::bad_request(e.body_text()))
}

/// Value of a required text field, rejected when missing or blank
fn required(value: Option<String>, message: &str) -> AppResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::bad_request(message))
}

fn default_context() -> String {
    "caption_generation".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest {
    message: Option<String>,
    #[serde(default = "default_context")]
    context: String,
    #[serde(default)]
    previous_messages: Vec<HistoryMessage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatResponse {
    reply: String,
    timestamp: String,
    context: String,
    #[serde(rename = "usingAI")]
    using_ai: bool,
}

/// POST /api/chat - Reply to a creator message
async fn chat(
    State(state): State<Arc<AssistantState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<Json<ChatResponse>> {
    let req = json_body(payload)?;
    let message = required(req.message, "Message is required")?;

    let reply = state
        .assistant
        .chat(&message, &req.context, &req.previous_messages)
        .await;

    Ok(Json(ChatResponse {
        reply,
        timestamp: Utc::now().to_rfc3339(),
        context: req.context,
        using_ai: state.assistant.using_ai(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionRequest {
    description: Option<String>,
    style: Option<String>,
    include_hashtags: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CaptionResponse {
    captions: Vec<CaptionDraft>,
    style: String,
    include_hashtags: bool,
    #[serde(rename = "usingAI")]
    using_ai: bool,
}

/// POST /api/captions/generate - Draft a caption plus alternatives
async fn generate_caption(
    State(state): State<Arc<AssistantState>>,
    payload: Result<Json<CaptionRequest>, JsonRejection>,
) -> AppResult<Json<CaptionResponse>> {
    let req = json_body(payload)?;
    let description = required(req.description, "Content description is required")?;
    let style = req
        .style
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "engaging".to_string());
    let include_hashtags = req.include_hashtags.unwrap_or(true);

    tracing::debug!(style = %style, include_hashtags, "Drafting caption");
    let draft = state
        .assistant
        .draft_caption(&description, &style, include_hashtags)
        .await;

    Ok(Json(CaptionResponse {
        captions: vec![draft],
        style,
        include_hashtags,
        using_ai: state.assistant.using_ai(),
    }))
}

#[derive(Debug, Deserialize)]
struct TrendsQuery {
    category: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TrendsResponse {
    trends: Vec<String>,
    hashtags: Vec<String>,
    suggestions: Vec<String>,
    category: String,
    last_updated: String,
    #[serde(rename = "usingAI")]
    using_ai: bool,
}

/// GET /api/trends?category= - Trending topics, hashtags and tips
async fn trends(
    State(state): State<Arc<AssistantState>>,
    Query(query): Query<TrendsQuery>,
) -> Json<TrendsResponse> {
    let category = query
        .category
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| "general".to_string());

    let report = state.assistant.trends(&category).await;

    Json(TrendsResponse {
        trends: report.trends,
        hashtags: report.hashtags,
        suggestions: report.suggestions,
        category,
        last_updated: Utc::now().to_rfc3339(),
        using_ai: state.assistant.using_ai(),
    })
}

#[derive(Debug, Deserialize)]
struct IdeaRequest {
    topic: Option<String>,
    style: Option<String>,
    audience: Option<String>,
    platform: Option<String>,
}

#[derive(Debug, Serialize)]
struct IdeasResponse {
    ideas: Vec<String>,
}

/// POST /api/creative/ideas - Five one-line content ideas
async fn creative_ideas(
    State(state): State<Arc<AssistantState>>,
    payload: Result<Json<IdeaRequest>, JsonRejection>,
) -> AppResult<Json<IdeasResponse>> {
    let req = json_body(payload)?;
    let prompt = IdeaPrompt {
        topic: required(req.topic, "Topic is required")?,
        style: req.style,
        audience: req.audience,
        platform: req.platform.unwrap_or_else(|| "tiktok".to_string()),
    };

    let ideas = state.assistant.ideas(&prompt).await;
    Ok(Json(IdeasResponse { ideas }))
}
