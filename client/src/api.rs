use std::time::Duration;

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::multipart;
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use url::Url;

use crate::models::{
    CaptionDrafts, ChatReply, ChatRequestBody, CreatorProfile, GeneratedCaptions, HistoryEntry,
    IngestMemoryBody, MemoryEntry, Personalization, TrendReport, UploadResponse, VideoEnvelope,
    VideoInfo,
};

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Errors that can occur while talking to a clipcap backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },
}

impl ApiError {
    /// The `error` field of a JSON error body, if the server sent one.
    pub fn server_message(&self) -> Option<String> {
        let ApiError::UnexpectedStatus { body, .. } = self else {
            return None;
        };
        serde_json::from_str::<serde_json::Value>(body)
            .ok()?
            .get("error")?
            .as_str()
            .map(str::to_string)
    }
}

/// Async JSON client for one backend. The first request probes the primary
/// base URL and its fallbacks against `/health` and sticks with the first
/// one that answers; if none answers the primary is kept.
#[derive(Debug)]
pub struct ApiClient {
    candidates: Vec<String>,
    base: OnceCell<String>,
    http: Client,
}

impl ApiClient {
    /// Client for `base_url` that also tries the same scheme and port on
    /// each of `fallback_hosts`.
    pub fn new(base_url: &str, fallback_hosts: &[String]) -> Result<Self, ApiError> {
        let primary = base_url.trim_end_matches('/').to_string();
        let mut candidates = vec![primary.clone()];
        candidates.extend(fallback_bases(&primary, fallback_hosts));
        Self::with_candidates(candidates)
    }

    /// Client that probes exactly `candidates`, in order.
    pub fn with_candidates(candidates: Vec<String>) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            candidates,
            base: OnceCell::new(),
            http,
        })
    }

    /// Base URL in use, probing on first call.
    pub async fn base_url(&self) -> &str {
        self.base.get_or_init(|| self.probe()).await
    }

    async fn probe(&self) -> String {
        for candidate in &self.candidates {
            let url = format!("{}/health", candidate);
            match self.http.get(&url).timeout(PROBE_TIMEOUT).send().await {
                Ok(resp) if resp.status().is_success() => {
                    tracing::debug!(base = %candidate, "Backend reachable");
                    return candidate.clone();
                }
                Ok(resp) => {
                    tracing::debug!(base = %candidate, status = %resp.status(), "Health probe rejected")
                }
                Err(e) => tracing::debug!(base = %candidate, error = %e, "Health probe failed"),
            }
        }

        let primary = self.candidates.first().cloned().unwrap_or_default();
        tracing::warn!(base = %primary, "No backend answered the health probe, using primary");
        primary
    }

    async fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url().await, path)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.http.get(self.url(path).await).send().await?;
        Self::parse_json(response).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.http.post(self.url(path).await).json(body).send().await?;
        Self::parse_json(response).await
    }

    pub async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.http.put(self.url(path).await).json(body).send().await?;
        Self::parse_json(response).await
    }

    /// Uploads a video to `/api/upload-video` as the `video` form field.
    pub async fn upload_video(
        &self,
        file_name: &str,
        mime_type: &str,
        data: Vec<u8>,
    ) -> Result<UploadResponse, ApiError> {
        let part = multipart::Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(mime_type)?;
        let form = multipart::Form::new().part("video", part);

        let response = self
            .http
            .post(self.url("/api/upload-video").await)
            .multipart(form)
            .send()
            .await?;
        Self::parse_json(response).await
    }

    pub async fn generate_captions(&self, video_id: &str) -> Result<GeneratedCaptions, ApiError> {
        self.post_json(
            "/api/generate-captions",
            &serde_json::json!({ "videoId": video_id }),
        )
        .await
    }

    pub async fn video(&self, video_id: &str) -> Result<VideoInfo, ApiError> {
        let envelope: VideoEnvelope = self.get_json(&format!("/api/video/{}", video_id)).await?;
        Ok(envelope.video)
    }

    /// Fetches the stored file for `video_id`.
    pub async fn download_video(&self, video_id: &str) -> Result<Bytes, ApiError> {
        let response = self
            .http
            .get(self.url(&format!("/api/download-video/{}", video_id)).await)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.bytes().await?)
    }

    pub async fn chat(
        &self,
        message: &str,
        context: &str,
        history: &[HistoryEntry],
    ) -> Result<ChatReply, ApiError> {
        let body = ChatRequestBody {
            message,
            context,
            previous_messages: history,
        };
        self.post_json("/api/chat", &body).await
    }

    pub async fn generate_caption(
        &self,
        description: &str,
        style: &str,
        include_hashtags: bool,
    ) -> Result<CaptionDrafts, ApiError> {
        self.post_json(
            "/api/captions/generate",
            &serde_json::json!({
                "description": description,
                "style": style,
                "includeHashtags": include_hashtags,
            }),
        )
        .await
    }

    pub async fn trends(&self, category: Option<&str>) -> Result<TrendReport, ApiError> {
        let mut url = self.url("/api/trends").await;
        if let Some(category) = category {
            url = Url::parse_with_params(&url, &[("category", category)])
                .map(String::from)
                .unwrap_or(url);
        }
        let response = self.http.get(url).send().await?;
        Self::parse_json(response).await
    }

    /// Create or refresh the creator profile on the memory backend.
    pub async fn upsert_creator(
        &self,
        creator_id: &str,
        username: Option<&str>,
    ) -> Result<CreatorProfile, ApiError> {
        self.put_json(
            &format!("/creators/{}", creator_id),
            &serde_json::json!({ "id": creator_id, "username": username }),
        )
        .await
    }

    pub async fn ingest_memory(
        &self,
        creator_id: &str,
        caption: &str,
        hashtags: &[String],
    ) -> Result<MemoryEntry, ApiError> {
        let body = IngestMemoryBody {
            creator_id,
            platform: "tiktok",
            caption,
            hashtags,
        };
        self.post_json("/memories/ingest", &body).await
    }

    pub async fn personalize(&self, creator_id: &str) -> Result<Personalization, ApiError> {
        self.post_json(
            "/personalize/suggestions",
            &serde_json::json!({ "creator_id": creator_id }),
        )
        .await
    }

    pub async fn health(&self) -> Result<serde_json::Value, ApiError> {
        self.get_json("/health").await
    }

    async fn check_status(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::UnexpectedStatus { status, body })
    }

    async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }
}

/// `primary` with its host swapped for each of `hosts`, keeping scheme, port
/// and path. Hosts equal to the primary's are skipped.
pub fn fallback_bases(primary: &str, hosts: &[String]) -> Vec<String> {
    let Ok(url) = Url::parse(primary) else {
        tracing::warn!(base = %primary, "Base URL does not parse, no fallbacks derived");
        return Vec::new();
    };

    let mut out: Vec<String> = Vec::new();
    for host in hosts {
        if url.host_str() == Some(host.as_str()) {
            continue;
        }
        let mut candidate = url.clone();
        if candidate.set_host(Some(host)).is_err() {
            tracing::warn!(host = %host, "Ignoring invalid fallback host");
            continue;
        }
        let candidate = candidate.as_str().trim_end_matches('/').to_string();
        if !out.contains(&candidate) {
            out.push(candidate);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn hosts(list: &[&str]) -> Vec<String> {
        list.iter().map(|h| h.to_string()).collect()
    }

    #[test]
    fn fallbacks_swap_host_and_keep_port() {
        assert_eq!(
            fallback_bases("http://localhost:3001", &hosts(&["127.0.0.1", "10.0.2.2"])),
            vec!["http://127.0.0.1:3001", "http://10.0.2.2:3001"]
        );
    }

    #[test]
    fn fallbacks_skip_primary_host_and_duplicates() {
        assert_eq!(
            fallback_bases(
                "http://127.0.0.1:3002",
                &hosts(&["127.0.0.1", "10.0.2.2", "10.0.2.2"])
            ),
            vec!["http://10.0.2.2:3002"]
        );
        assert!(fallback_bases("not a url", &hosts(&["127.0.0.1"])).is_empty());
    }

    #[test]
    fn server_message_reads_error_field() {
        let err = ApiError::UnexpectedStatus {
            status: StatusCode::NOT_FOUND,
            body: r#"{"error":"Video not found"}"#.into(),
        };
        assert_eq!(err.server_message().as_deref(), Some("Video not found"));

        let err = ApiError::UnexpectedStatus {
            status: StatusCode::BAD_GATEWAY,
            body: "<html>".into(),
        };
        assert!(err.server_message().is_none());
    }

    /// Answers every connection with `200 {"status":"OK"}`.
    async fn spawn_healthy_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let body = r#"{"status":"OK"}"#;
                let reply = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(reply.as_bytes()).await;
            }
        });
        format!("http://{}", addr)
    }

    async fn unused_base() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn probe_picks_first_healthy_candidate() {
        let dead = unused_base().await;
        let live = spawn_healthy_server().await;
        let client = ApiClient::with_candidates(vec![dead, live.clone()]).expect("client");

        assert_eq!(client.base_url().await, live);
        let health = client.health().await.expect("health");
        assert_eq!(health["status"], "OK");
    }

    #[tokio::test]
    async fn probe_keeps_primary_when_nothing_answers() {
        let primary = unused_base().await;
        let other = unused_base().await;
        let client = ApiClient::with_candidates(vec![primary.clone(), other]).expect("client");
        assert_eq!(client.base_url().await, primary);
    }
}
