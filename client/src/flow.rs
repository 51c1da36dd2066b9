//! Upload → processing → preview → download state machine.
//!
//! The flow hands out a [`ProcessingTicket`] when processing starts. Every
//! `restart` or `fail` moves the flow to a new epoch, so a result that comes
//! back for an older ticket is recognised as stale and ignored.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::models::CaptionSuggestion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Upload,
    Processing,
    Preview,
    Download,
}

/// Which id the flow currently knows the video by. A tentative id is
/// assigned as soon as processing starts; the id confirmed by the server
/// always replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoIdentity {
    Tentative(String),
    Confirmed { id: String, url: String },
}

impl VideoIdentity {
    pub fn id(&self) -> &str {
        match self {
            VideoIdentity::Tentative(id) => id,
            VideoIdentity::Confirmed { id, .. } => id,
        }
    }
}

/// A video picked by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSelection {
    pub path: PathBuf,
    pub file_name: String,
    pub mime_type: String,
}

impl VideoSelection {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video.mp4".to_string());
        Self {
            mime_type: mime_for(&file_name).to_string(),
            path: path.to_path_buf(),
            file_name,
        }
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let lower = file_name.to_ascii_lowercase();
    match lower.rsplit('.').next() {
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("webm") => "video/webm",
        _ => "application/octet-stream",
    }
}

/// Proof that a processing run was started in a given epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingTicket {
    epoch: u64,
}

/// What a successful processing run hands back
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingOutcome {
    pub video_id: String,
    pub video_url: String,
    pub captions: Vec<CaptionSuggestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("cannot {action} while in {state:?}")]
    InvalidTransition {
        action: &'static str,
        state: FlowState,
    },

    #[error("processing result belongs to an abandoned run")]
    StaleTicket,

    #[error("no captions were generated")]
    NoCandidates,
}

#[derive(Debug)]
pub struct UploadFlow {
    state: FlowState,
    selection: Option<VideoSelection>,
    identity: Option<VideoIdentity>,
    captions: Vec<CaptionSuggestion>,
    index: usize,
    chosen: Option<CaptionSuggestion>,
    busy: bool,
    last_error: Option<String>,
    epoch: u64,
}

impl Default for UploadFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadFlow {
    pub fn new() -> Self {
        Self {
            state: FlowState::Upload,
            selection: None,
            identity: None,
            captions: Vec::new(),
            index: 0,
            chosen: None,
            busy: false,
            last_error: None,
            epoch: 0,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn selection(&self) -> Option<&VideoSelection> {
        self.selection.as_ref()
    }

    pub fn identity(&self) -> Option<&VideoIdentity> {
        self.identity.as_ref()
    }

    pub fn video_id(&self) -> Option<&str> {
        self.identity.as_ref().map(VideoIdentity::id)
    }

    pub fn video_url(&self) -> Option<&str> {
        match &self.identity {
            Some(VideoIdentity::Confirmed { url, .. }) => Some(url),
            _ => None,
        }
    }

    pub fn captions(&self) -> &[CaptionSuggestion] {
        &self.captions
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn current_caption(&self) -> Option<&CaptionSuggestion> {
        self.captions.get(self.index)
    }

    pub fn chosen_caption(&self) -> Option<&CaptionSuggestion> {
        self.chosen.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Start processing `selection` under a time-derived tentative id.
    pub fn begin(&mut self, selection: VideoSelection) -> Result<ProcessingTicket, FlowError> {
        if self.state != FlowState::Upload {
            return Err(FlowError::InvalidTransition {
                action: "begin processing",
                state: self.state,
            });
        }

        let tentative = Utc::now().timestamp_millis().to_string();
        tracing::debug!(tentative_id = %tentative, file = %selection.file_name, "Processing started");

        self.selection = Some(selection);
        self.identity = Some(VideoIdentity::Tentative(tentative));
        self.last_error = None;
        self.busy = true;
        self.state = FlowState::Processing;
        Ok(ProcessingTicket { epoch: self.epoch })
    }

    /// Whether a result for `ticket` would still be applied.
    pub fn is_current(&self, ticket: ProcessingTicket) -> bool {
        ticket.epoch == self.epoch && self.state == FlowState::Processing
    }

    /// Apply a processing result. Empty captions count as a failure.
    pub fn complete(
        &mut self,
        ticket: ProcessingTicket,
        outcome: ProcessingOutcome,
    ) -> Result<(), FlowError> {
        if !self.is_current(ticket) {
            return Err(FlowError::StaleTicket);
        }
        if outcome.captions.is_empty() {
            self.abort(FlowError::NoCandidates.to_string());
            return Err(FlowError::NoCandidates);
        }

        if let Some(VideoIdentity::Tentative(tentative)) = &self.identity
            && tentative != &outcome.video_id
        {
            tracing::debug!(tentative_id = %tentative, video_id = %outcome.video_id, "Server id replaces tentative id");
        }

        self.identity = Some(VideoIdentity::Confirmed {
            id: outcome.video_id,
            url: outcome.video_url,
        });
        self.captions = outcome.captions;
        self.index = 0;
        self.chosen = None;
        self.busy = false;
        self.state = FlowState::Preview;
        Ok(())
    }

    /// Abandon processing and surface `message` to the user.
    pub fn fail(&mut self, ticket: ProcessingTicket, message: impl Into<String>) -> Result<(), FlowError> {
        if !self.is_current(ticket) {
            return Err(FlowError::StaleTicket);
        }
        self.abort(message.into());
        Ok(())
    }

    fn abort(&mut self, message: String) {
        tracing::warn!(error = %message, "Processing failed");
        self.reset();
        self.last_error = Some(message);
    }

    /// Move to the next candidate. Returns false at the last one.
    pub fn next(&mut self) -> bool {
        if self.state != FlowState::Preview || self.index + 1 >= self.captions.len() {
            return false;
        }
        self.index += 1;
        true
    }

    /// Move to the previous candidate. Returns false at the first one.
    pub fn previous(&mut self) -> bool {
        if self.state != FlowState::Preview || self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Pick the candidate under the cursor and move to download.
    pub fn choose_current(&mut self) -> Result<&CaptionSuggestion, FlowError> {
        if self.state != FlowState::Preview {
            return Err(FlowError::InvalidTransition {
                action: "choose a caption",
                state: self.state,
            });
        }
        let chosen = self
            .captions
            .get(self.index)
            .cloned()
            .ok_or(FlowError::NoCandidates)?;
        self.state = FlowState::Download;
        Ok(self.chosen.insert(chosen))
    }

    /// Name the downloaded file is saved under.
    pub fn download_file_name(&self) -> Option<String> {
        if self.state != FlowState::Download {
            return None;
        }
        self.video_id()
            .map(|id| format!("video-with-captions-{}.mp4", id))
    }

    /// Back to the initial state from anywhere. In-flight results become stale.
    pub fn restart(&mut self) {
        self.reset();
        self.last_error = None;
    }

    fn reset(&mut self) {
        self.state = FlowState::Upload;
        self.selection = None;
        self.identity = None;
        self.captions.clear();
        self.index = 0;
        self.chosen = None;
        self.busy = false;
        self.epoch += 1;
    }
}
