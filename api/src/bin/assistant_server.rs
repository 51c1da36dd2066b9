//! Creator assistant backend: proxies chat, caption and trend requests to an
//! OpenAI-compatible model and answers with fallbacks when none is
//! configured or the model call fails.
//!
//! ## Environment Variables
//! - `ASSISTANT_PORT` - port to listen on (default: `3002`, falls back to `PORT`)
//! - `OPENAI_API_KEY` - enables the model; absent means fallbacks only
//! - `OPENAI_MODEL` - model name (default: `gpt-3.5-turbo`)
//! - `OPENAI_BASE_URL` - API base (default: `https://api.openai.com/v1`)
//! - `CORS_ORIGIN` - allowed origin (default: `http://localhost:3000`)

use std::sync::Arc;

use clipcap_api::config::AssistantConfig;
use clipcap_api::router::build_assistant_app;
use clipcap_api::services::assistant::Assistant;
use clipcap_api::services::llm::{ChatModel, OpenAiChatModel};
use clipcap_api::state::AssistantState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    clipcap_api::init_tracing("clipcap_api=debug,assistant_server=debug,tower_http=info");

    let config = AssistantConfig::from_env()?;

    let model: Option<Arc<dyn ChatModel>> = match &config.api_key {
        Some(key) => {
            tracing::info!(model = %config.model, base_url = %config.base_url, "Model configured");
            Some(Arc::new(OpenAiChatModel::new(key, &config.model, &config.base_url)))
        }
        None => {
            tracing::warn!("OPENAI_API_KEY not set, serving fallback responses only");
            None
        }
    };

    let state = Arc::new(AssistantState {
        assistant: Assistant::new(model),
    });
    let app = build_assistant_app(state, std::slice::from_ref(&config.cors_origin));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Assistant backend listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(clipcap_api::shutdown_signal())
        .await?;
    Ok(())
}
