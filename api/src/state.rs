use std::sync::Arc;
use std::time::Duration;

use crate::domain::{CreatorMemory, VideoStore};
use crate::services::assistant::Assistant;
use crate::services::captions::CaptionSource;
use crate::storage::UploadStorage;

/// Shared state of the video/caption backend
pub struct VideoState {
    pub store: Arc<dyn VideoStore>,
    pub captions: Arc<dyn CaptionSource>,
    pub storage: UploadStorage,
    pub public_base_url: String,
    pub caption_delay: Duration,
}

impl VideoState {
    /// Public URL of a stored file
    pub fn file_url(&self, file_name: &str) -> String {
        format!("{}/uploads/{}", self.public_base_url, file_name)
    }
}

/// Shared state of the assistant backend
pub struct AssistantState {
    pub assistant: Assistant,
}

/// Shared state of the creator memory backend
pub struct MemoryState {
    pub memory: CreatorMemory,
}
