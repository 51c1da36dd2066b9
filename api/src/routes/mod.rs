pub mod assistant;
pub mod health;
pub mod media;
pub mod memory;
pub mod videos;

use axum::Router;
use std::sync::Arc;

use crate::state::{AssistantState, MemoryState, VideoState};

/// Build all routes for the video backend
pub fn video_routes() -> Router<Arc<VideoState>> {
    Router::new()
        .merge(health::video_routes())
        .merge(videos::routes())
        .merge(media::routes())
}

/// Build all routes for the assistant backend
pub fn assistant_routes() -> Router<Arc<AssistantState>> {
    Router::new()
        .merge(health::assistant_routes())
        .merge(assistant::routes())
}

/// Build all routes for the creator memory backend
pub fn memory_routes() -> Router<Arc<MemoryState>> {
    Router::new()
        .merge(health::memory_routes())
        .merge(memory::routes())
}
