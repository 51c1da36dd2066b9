//! Shared helpers for router integration tests.
//!
//! Apps are built through the same `router` builders the binaries use, with
//! a temporary upload directory and no artificial caption delay.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;

use clipcap_api::domain::{CreatorMemory, InMemoryVideoStore};
use clipcap_api::router::{build_assistant_app, build_memory_app, build_video_app};
use clipcap_api::services::assistant::Assistant;
use clipcap_api::services::captions::TemplateCaptionSource;
use clipcap_api::services::llm::{ChatModel, CompletionRequest, LlmError};
use clipcap_api::state::{AssistantState, MemoryState, VideoState};
use clipcap_api::storage::UploadStorage;

pub const PUBLIC_BASE: &str = "http://videos.test";
const BOUNDARY: &str = "clipcap-test-boundary";

pub struct TestVideoApp {
    pub app: Router,
    pub store: Arc<InMemoryVideoStore>,
    /// Keeps the upload directory alive for the test's duration
    pub dir: TempDir,
}

impl TestVideoApp {
    pub fn upload_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("uploads")
    }
}

pub fn video_app() -> TestVideoApp {
    let dir = tempfile::tempdir().expect("create temp upload dir");
    let store = Arc::new(InMemoryVideoStore::new());

    let state = Arc::new(VideoState {
        store: store.clone(),
        captions: Arc::new(TemplateCaptionSource::new()),
        storage: UploadStorage::new(dir.path().join("uploads")),
        public_base_url: PUBLIC_BASE.to_string(),
        caption_delay: Duration::ZERO,
    });

    TestVideoApp {
        app: build_video_app(state, &[]),
        store,
        dir,
    }
}

pub fn assistant_app(model: Option<Arc<dyn ChatModel>>) -> Router {
    let state = Arc::new(AssistantState {
        assistant: Assistant::new(model),
    });
    build_assistant_app(state, &["http://localhost:3000".to_string()])
}

pub fn memory_app() -> Router {
    let state = Arc::new(MemoryState {
        memory: CreatorMemory::new(),
    });
    build_memory_app(state, &[])
}

/// Model that always answers with the same text
pub struct FixedModel(pub &'static str);

#[async_trait]
impl ChatModel for FixedModel {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, LlmError> {
        Ok(self.0.to_string())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Model whose upstream is always down
pub struct DownModel;

#[async_trait]
impl ChatModel for DownModel {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, LlmError> {
        Err(LlmError::Api {
            status: 503,
            body: "upstream unavailable".into(),
        })
    }

    fn name(&self) -> &str {
        "down"
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("response body is JSON")
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes()
        .to_vec()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("build GET request")
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    post_raw_json(uri, &body.to_string())
}

pub fn post_raw_json(uri: &str, raw: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(raw.to_string()))
        .expect("build POST request")
}

pub fn put_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build PUT request")
}

/// Single-file multipart upload request
pub fn multipart_upload(
    uri: &str,
    field: &str,
    file_name: &str,
    content_type: &str,
    data: &[u8],
) -> Request<Body> {
    let mut body = Vec::with_capacity(data.len() + 256);
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("build multipart request")
}
