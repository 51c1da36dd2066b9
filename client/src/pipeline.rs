//! Processing backends for the upload flow.
//!
//! [`RemotePipeline`] uploads the file and asks the video backend for
//! captions. [`MockPipeline`] waits a fixed delay and returns three canned
//! captions without touching the network.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::api::{ApiClient, ApiError};
use crate::flow::{FlowError, FlowState, ProcessingOutcome, UploadFlow, VideoSelection};
use crate::models::{CaptionSuggestion, hashtags_in};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Text shown to the user when processing fails
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Api(e) => e
                .server_message()
                .unwrap_or_else(|| "Upload failed. Please try again.".to_string()),
            PipelineError::Read { .. } => "Could not read the selected video.".to_string(),
        }
    }
}

/// Turns a selected video into caption candidates
#[async_trait]
pub trait CaptionPipeline: Send + Sync {
    async fn process(&self, selection: &VideoSelection) -> Result<ProcessingOutcome, PipelineError>;

    fn name(&self) -> &'static str;
}

pub struct RemotePipeline {
    api: Arc<ApiClient>,
}

impl RemotePipeline {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl CaptionPipeline for RemotePipeline {
    async fn process(&self, selection: &VideoSelection) -> Result<ProcessingOutcome, PipelineError> {
        let data = tokio::fs::read(&selection.path)
            .await
            .map_err(|source| PipelineError::Read {
                path: selection.path.clone(),
                source,
            })?;
        tracing::info!(file = %selection.file_name, size_bytes = data.len(), "Uploading video");

        let uploaded = self
            .api
            .upload_video(&selection.file_name, &selection.mime_type, data)
            .await?;
        let generated = self.api.generate_captions(&uploaded.video_id).await?;

        Ok(ProcessingOutcome {
            video_id: generated.video_id,
            video_url: generated.video_url,
            captions: generated.captions,
        })
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

pub struct MockPipeline {
    delay: Duration,
    base_url: String,
}

impl MockPipeline {
    pub fn new(delay: Duration, base_url: impl Into<String>) -> Self {
        Self {
            delay,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl CaptionPipeline for MockPipeline {
    async fn process(&self, selection: &VideoSelection) -> Result<ProcessingOutcome, PipelineError> {
        tracing::debug!(file = %selection.file_name, delay_ms = self.delay.as_millis() as u64, "Mock processing");
        tokio::time::sleep(self.delay).await;

        let id = Utc::now().timestamp_millis().to_string();
        Ok(ProcessingOutcome {
            video_url: format!("{}/mock-video-{}", self.base_url, id),
            video_id: id,
            captions: mock_captions(),
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// The three fixed captions the mock pipeline returns
pub fn mock_captions() -> Vec<CaptionSuggestion> {
    let entry = |id: &str, caption: &str, trend: &str, engagement: &str, confidence: u8| {
        CaptionSuggestion {
            id: id.to_string(),
            caption: caption.to_string(),
            trend: trend.to_string(),
            engagement: engagement.to_string(),
            confidence,
            style: None,
            hashtags: hashtags_in(caption),
        }
    };

    vec![
        entry(
            "1",
            "🔥 This is absolutely incredible! Can't stop watching this amazing moment #viral #amazing #fyp #trending",
            "#viral trending +234%",
            "12.3K likes • 89% engagement",
            95,
        ),
        entry(
            "2",
            "✨ POV: When everything goes perfectly and you can't believe your eyes #pov #perfect #satisfying #viral",
            "#pov trending +156%",
            "8.7K likes • 76% engagement",
            88,
        ),
        entry(
            "3",
            "💫 The way this turned out is just *chef's kiss* - who else is obsessed? #obsessed #perfect #viral #fyp",
            "#obsessed trending +89%",
            "15.1K likes • 92% engagement",
            82,
        ),
    ]
}

/// Drive one begin → complete/fail cycle of `flow` through `pipeline`.
///
/// The lock is only held around state transitions, so `restart` can run
/// while the pipeline is busy; the late result is then dropped with
/// [`FlowError::StaleTicket`].
pub async fn run_upload(
    flow: &Mutex<UploadFlow>,
    pipeline: &dyn CaptionPipeline,
    selection: VideoSelection,
) -> Result<FlowState, FlowError> {
    let ticket = {
        let mut flow = flow.lock().unwrap_or_else(PoisonError::into_inner);
        flow.begin(selection.clone())?
    };

    let result = pipeline.process(&selection).await;

    let mut flow = flow.lock().unwrap_or_else(PoisonError::into_inner);
    match result {
        Ok(outcome) => {
            tracing::info!(
                pipeline = pipeline.name(),
                video_id = %outcome.video_id,
                captions = outcome.captions.len(),
                "Processing finished"
            );
            match flow.complete(ticket, outcome) {
                Ok(()) | Err(FlowError::NoCandidates) => Ok(flow.state()),
                Err(e) => Err(e),
            }
        }
        Err(e) => {
            tracing::warn!(pipeline = pipeline.name(), error = %e, "Processing failed");
            flow.fail(ticket, e.user_message())?;
            Ok(flow.state())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::tests::{selection, suggestion};
    use tokio::sync::oneshot;

    struct FailingPipeline;

    #[async_trait]
    impl CaptionPipeline for FailingPipeline {
        async fn process(&self, _: &VideoSelection) -> Result<ProcessingOutcome, PipelineError> {
            Err(PipelineError::Api(ApiError::UnexpectedStatus {
                status: reqwest::StatusCode::BAD_REQUEST,
                body: r#"{"error":"Only video files are allowed!"}"#.into(),
            }))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    /// Blocks until the test opens the gate
    struct GatedPipeline {
        gate: Mutex<Option<oneshot::Receiver<()>>>,
    }

    #[async_trait]
    impl CaptionPipeline for GatedPipeline {
        async fn process(&self, _: &VideoSelection) -> Result<ProcessingOutcome, PipelineError> {
            let gate = self.gate.lock().unwrap().take().expect("gate used once");
            let _ = gate.await;
            Ok(ProcessingOutcome {
                video_id: "42".into(),
                video_url: "http://localhost:3001/uploads/42-clip.mp4".into(),
                captions: vec![suggestion("1")],
            })
        }

        fn name(&self) -> &'static str {
            "gated"
        }
    }

    #[test]
    fn mock_captions_are_fixed() {
        let captions = mock_captions();
        assert_eq!(captions.len(), 3);
        assert_eq!(
            captions.iter().map(|c| c.confidence).collect::<Vec<_>>(),
            vec![95, 88, 82]
        );
        assert_eq!(captions[1].trend, "#pov trending +156%");
        assert_eq!(captions[2].hashtags, vec!["#obsessed", "#perfect", "#viral", "#fyp"]);
    }

    #[tokio::test(start_paused = true)]
    async fn mock_pipeline_reaches_preview_after_delay() {
        let flow = Mutex::new(UploadFlow::new());
        let pipeline = MockPipeline::new(Duration::from_secs(2), "http://localhost:3001/");

        let started = tokio::time::Instant::now();
        let state = run_upload(&flow, &pipeline, selection()).await.expect("run");
        assert!(started.elapsed() >= Duration::from_secs(2));

        assert_eq!(state, FlowState::Preview);
        let flow = flow.lock().unwrap();
        let id = flow.video_id().expect("id").to_string();
        assert_eq!(
            flow.video_url(),
            Some(format!("http://localhost:3001/mock-video-{id}").as_str())
        );
        assert_eq!(flow.captions().len(), 3);
    }

    #[tokio::test]
    async fn pipeline_failure_reverts_to_upload_with_server_message() {
        let flow = Mutex::new(UploadFlow::new());
        let state = run_upload(&flow, &FailingPipeline, selection())
            .await
            .expect("run");

        assert_eq!(state, FlowState::Upload);
        let flow = flow.lock().unwrap();
        assert!(!flow.is_busy());
        assert_eq!(flow.last_error(), Some("Only video files are allowed!"));
    }

    #[tokio::test]
    async fn restart_during_processing_discards_the_result() {
        let flow = Mutex::new(UploadFlow::new());
        let (open, gate) = oneshot::channel();
        let pipeline = GatedPipeline {
            gate: Mutex::new(Some(gate)),
        };

        let run = run_upload(&flow, &pipeline, selection());
        let interfere = async {
            tokio::task::yield_now().await;
            flow.lock().unwrap().restart();
            let _ = open.send(());
        };
        let (result, ()) = tokio::join!(run, interfere);

        assert_eq!(result, Err(FlowError::StaleTicket));
        let flow = flow.lock().unwrap();
        assert_eq!(flow.state(), FlowState::Upload);
        assert!(flow.captions().is_empty());
        assert!(flow.identity().is_none());
    }

    #[test]
    fn read_errors_have_a_friendly_message() {
        let err = PipelineError::Read {
            path: PathBuf::from("/missing.mp4"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(err.user_message(), "Could not read the selected video.");
    }
}
