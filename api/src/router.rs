//! Router builders shared by the binaries and the integration tests, so both
//! run the same middleware stack.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::header::{CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS};
use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::constants::{MAX_VIDEO_UPLOAD_SIZE, MULTIPART_OVERHEAD};
use crate::routes;
use crate::services::error::route_not_found;
use crate::state::{AssistantState, MemoryState, VideoState};

/// Video/caption backend with CORS, tracing and security headers
pub fn build_video_app(state: Arc<VideoState>, cors_origins: &[String]) -> Router {
    let app = routes::video_routes()
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(MAX_VIDEO_UPLOAD_SIZE + MULTIPART_OVERHEAD))
        .with_state(state);
    apply_common_layers(app, build_cors_layer(cors_origins))
}

/// LLM proxy backend with the same middleware stack
pub fn build_assistant_app(state: Arc<AssistantState>, cors_origins: &[String]) -> Router {
    let app = routes::assistant_routes()
        .fallback(route_not_found)
        .with_state(state);
    apply_common_layers(app, build_cors_layer(cors_origins))
}

/// Creator memory backend with the same middleware stack
pub fn build_memory_app(state: Arc<MemoryState>, cors_origins: &[String]) -> Router {
    let app = routes::memory_routes()
        .fallback(route_not_found)
        .with_state(state);
    apply_common_layers(app, build_cors_layer(cors_origins))
}

fn apply_common_layers(app: Router, cors: CorsLayer) -> Router {
    app.layer(SetResponseHeaderLayer::if_not_present(
        X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    ))
    .layer(SetResponseHeaderLayer::if_not_present(
        X_FRAME_OPTIONS,
        HeaderValue::from_static("DENY"),
    ))
    .layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
    .layer(cors)
}

/// An empty list (or `*`) allows any origin. Unparseable origins are skipped.
pub fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %o, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    base.allow_origin(parsed)
}
