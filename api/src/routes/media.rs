//! Static serving of stored uploads (/uploads/*path)

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::get,
};
use tokio_util::io::ReaderStream;

use crate::constants::content_type_for;
use crate::services::error::{AppError, AppResult, LogErr};
use crate::state::VideoState;

pub fn routes() -> Router<Arc<VideoState>> {
    Router::new().route("/uploads/{*path}", get(serve_upload))
}

/// GET /uploads/*path - Serve a stored video file
async fn serve_upload(
    State(state): State<Arc<VideoState>>,
    Path(path): Path<String>,
) -> AppResult<impl IntoResponse> {
    let resolved = state
        .storage
        .resolve(&path)
        .await
        .ok_or_else(|| AppError::not_found("File not found"))?;

    let file = tokio::fs::File::open(&resolved)
        .await
        .log_500("Open upload error", "Failed to read file")?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&path)),
            // Stored names embed the upload id, so content never changes
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable"),
        ],
        Body::from_stream(ReaderStream::new(file)),
    ))
}
