//! Creator memory backend: creator profiles, caption preferences, past
//! captions and suggestion feedback, served back as personalization hints.
//!
//! ## Environment Variables
//! - `MEMORY_PORT` - port to listen on (default: `7002`)
//! - `CORS_ORIGINS` - comma-separated allowed origins (default: any)

use std::sync::Arc;

use clipcap_api::config::MemoryServerConfig;
use clipcap_api::domain::CreatorMemory;
use clipcap_api::router::build_memory_app;
use clipcap_api::state::MemoryState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    clipcap_api::init_tracing("clipcap_api=debug,memory_server=debug,tower_http=info");

    let config = MemoryServerConfig::from_env()?;

    let state = Arc::new(MemoryState {
        memory: CreatorMemory::new(),
    });
    let app = build_memory_app(state, &config.cors_origins);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Creator memory backend listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(clipcap_api::shutdown_signal())
        .await?;
    Ok(())
}
