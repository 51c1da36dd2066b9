//! Shared data models used across modules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tone tag attached to each caption template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionStyle {
    Excitement,
    Pov,
    Aesthetic,
    Wholesome,
    Suspense,
    Emotional,
}

/// One generated caption option with its cosmetic stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionCandidate {
    pub id: String,
    pub caption: String,
    pub trend: String,
    pub engagement: String,
    pub confidence: u8,
    pub style: CaptionStyle,
    pub hashtags: Vec<String>,
}

/// An uploaded video and, once generated, its caption candidates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: String,
    /// Name of the stored file under the upload directory
    pub filename: String,
    /// Name the client uploaded the file as
    pub original_name: String,
    #[serde(rename = "path")]
    pub storage_path: String,
    pub url: String,
    #[serde(rename = "size")]
    pub size_bytes: u64,
    pub upload_time: DateTime<Utc>,
    pub captions: Option<Vec<CaptionCandidate>>,
}

/// Author of a chat message as sent by the front-end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// Prior conversation turn included with a chat request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub text: String,
    #[serde(rename = "from")]
    pub sender: Sender,
}
