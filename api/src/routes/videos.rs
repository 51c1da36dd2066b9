//! Video upload and caption endpoints (/api/upload-video, /api/generate-captions, ...)

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Body,
    extract::{Multipart, Path, State, multipart::MultipartError, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use bytes::{Bytes, BytesMut};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;

use crate::constants::{MAX_VIDEO_UPLOAD_SIZE, VIDEO_FIELD, content_type_for, is_allowed_video_type};
use crate::models::{CaptionCandidate, VideoRecord};
use crate::services::error::{AppError, AppResult, LogErr};
use crate::state::VideoState;
use crate::storage::{UploadStorage, sanitize_file_name};

const FILE_TOO_LARGE: &str = "File too large. Maximum size is 100MB.";

pub fn routes() -> Router<Arc<VideoState>> {
    Router::new()
        .route("/api/upload-video", post(upload_video))
        .route("/api/generate-captions", post(generate_captions))
        .route("/api/video/{video_id}", get(get_video))
        .route("/api/download-video/{video_id}", get(download_video))
        .route("/api/debug/videos", get(debug_videos))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    success: bool,
    video_id: String,
    filename: String,
    video_url: String,
    message: &'static str,
}

struct IncomingVideo {
    original_name: String,
    data: Bytes,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::bad_request(FILE_TOO_LARGE);
    }
    tracing::warn!(error = %e, "File upload error");
    AppError::bad_request(format!("File upload error: {}", e.body_text()))
}

/// Pull the `video` field out of the form, enforcing type and size.
async fn read_video_field(multipart: &mut Multipart) -> AppResult<Option<IncomingVideo>> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !is_allowed_video_type(&content_type) {
            tracing::warn!(content_type = %content_type, "Rejected upload with disallowed type");
            return Err(AppError::bad_request("Only video files are allowed!"));
        }

        let original_name = field.file_name().unwrap_or("video").to_string();
        let mut data = BytesMut::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            if data.len() + chunk.len() > MAX_VIDEO_UPLOAD_SIZE {
                return Err(AppError::bad_request(FILE_TOO_LARGE));
            }
            data.extend_from_slice(&chunk);
        }

        return Ok(Some(IncomingVideo {
            original_name,
            data: data.freeze(),
        }));
    }
    Ok(None)
}

/// POST /api/upload-video - Store a video from the `video` multipart field
async fn upload_video(
    State(state): State<Arc<VideoState>>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let incoming = read_video_field(&mut multipart)
        .await?
        .ok_or_else(|| AppError::bad_request("No video file uploaded"))?;

    let id = state.store.next_id();
    let filename = UploadStorage::stored_name(&id, &incoming.original_name);
    state
        .storage
        .save(&filename, &incoming.data)
        .await
        .log_500("Write upload error", "Upload failed")?;

    let record = VideoRecord {
        id: id.clone(),
        filename: filename.clone(),
        original_name: incoming.original_name,
        storage_path: state.storage.display_path(&filename),
        url: state.file_url(&filename),
        size_bytes: incoming.data.len() as u64,
        upload_time: Utc::now(),
        captions: None,
    };
    let video_url = record.url.clone();

    tracing::info!(
        video_id = %id,
        original_name = %record.original_name,
        size_bytes = record.size_bytes,
        "Video uploaded"
    );
    state.store.put(record);

    Ok(Json(UploadResponse {
        success: true,
        video_id: id,
        filename,
        video_url,
        message: "Video uploaded successfully",
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateCaptionsRequest {
    video_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateCaptionsResponse {
    success: bool,
    video_id: String,
    captions: Vec<CaptionCandidate>,
    video_url: String,
}

/// POST /api/generate-captions - Produce three caption candidates for a video
async fn generate_captions(
    State(state): State<Arc<VideoState>>,
    payload: Result<Json<GenerateCaptionsRequest>, JsonRejection>,
) -> AppResult<Json<GenerateCaptionsResponse>> {
    let Json(req) = payload.map_err(|e| AppError::bad_request(e.body_text()))?;
    let video_id = req
        .video_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("videoId is required"))?;

    let video = state
        .store
        .get(&video_id)
        .ok_or_else(|| AppError::not_found("Video not found"))?;

    tracing::info!(video_id = %video_id, "Generating captions");
    if !state.caption_delay.is_zero() {
        tokio::time::sleep(state.caption_delay).await;
    }

    let captions = state
        .captions
        .generate(&video)
        .await
        .log_500("Caption generation error", "Failed to generate captions")?;

    let updated = state
        .store
        .attach_captions(&video_id, captions)
        .map_err(|_| AppError::not_found("Video not found"))?;
    let captions = updated.captions.unwrap_or_default();

    tracing::info!(video_id = %video_id, count = captions.len(), "Captions generated");

    Ok(Json(GenerateCaptionsResponse {
        success: true,
        video_id,
        captions,
        video_url: updated.url,
    }))
}

#[derive(Debug, Serialize)]
struct VideoResponse {
    success: bool,
    video: VideoRecord,
}

/// GET /api/video/:video_id - Fetch one video record
async fn get_video(
    State(state): State<Arc<VideoState>>,
    Path(video_id): Path<String>,
) -> AppResult<Json<VideoResponse>> {
    let video = state
        .store
        .get(&video_id)
        .ok_or_else(|| AppError::not_found("Video not found"))?;
    Ok(Json(VideoResponse {
        success: true,
        video,
    }))
}

/// GET /api/download-video/:video_id - Stream the stored file as an attachment
async fn download_video(
    State(state): State<Arc<VideoState>>,
    Path(video_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let video = state
        .store
        .get(&video_id)
        .ok_or_else(|| AppError::not_found("Video not found"))?;

    let file = state.storage.open(&video.filename).await.map_err(|e| {
        tracing::warn!(video_id = %video_id, error = %e, "Stored video file missing");
        AppError::not_found("Video file not found")
    })?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        sanitize_file_name(&video.original_name)
    );
    let body = Body::from_stream(ReaderStream::new(file));

    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&video.filename).to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

#[derive(Debug, Serialize)]
struct DebugVideosResponse {
    success: bool,
    videos: BTreeMap<String, VideoRecord>,
    count: usize,
}

/// GET /api/debug/videos - Dump the whole store
async fn debug_videos(State(state): State<Arc<VideoState>>) -> Json<DebugVideosResponse> {
    let videos = state.store.list();
    tracing::debug!(count = videos.len(), "Listing stored videos");
    Json(DebugVideosResponse {
        success: true,
        count: videos.len(),
        videos,
    })
}
