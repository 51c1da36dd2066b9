//! Wire types shared with the clipcap backends

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One caption option shown in the preview carousel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionSuggestion {
    pub id: String,
    pub caption: String,
    pub trend: String,
    pub engagement: String,
    pub confidence: u8,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub video_id: String,
    pub filename: String,
    pub video_url: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCaptions {
    pub video_id: String,
    pub captions: Vec<CaptionSuggestion>,
    pub video_url: String,
}

/// Server-side record of an uploaded video
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    pub id: String,
    pub filename: String,
    pub original_name: String,
    pub path: String,
    pub url: String,
    pub size: u64,
    pub upload_time: DateTime<Utc>,
    #[serde(default)]
    pub captions: Option<Vec<CaptionSuggestion>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideoEnvelope {
    pub video: VideoInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// Prior turn sent along with a chat request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub text: String,
    #[serde(rename = "from")]
    pub sender: Sender,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChatRequestBody<'a> {
    pub message: &'a str,
    pub context: &'a str,
    pub previous_messages: &'a [HistoryEntry],
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    #[serde(rename = "usingAI", default)]
    pub using_ai: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptionDraft {
    pub caption: String,
    #[serde(default)]
    pub alternatives: Vec<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionDrafts {
    pub captions: Vec<CaptionDraft>,
    pub style: String,
    pub include_hashtags: bool,
    #[serde(rename = "usingAI", default)]
    pub using_ai: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    pub trends: Vec<String>,
    pub hashtags: Vec<String>,
    pub suggestions: Vec<String>,
    pub category: String,
    #[serde(rename = "usingAI", default)]
    pub using_ai: bool,
}

/// Creator profile held by the memory backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorProfile {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    pub locale: String,
    pub timezone: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct IngestMemoryBody<'a> {
    pub creator_id: &'a str,
    pub platform: &'static str,
    pub caption: &'a str,
    pub hashtags: &'a [String],
}

/// A caption remembered for a creator
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryEntry {
    pub id: u64,
    pub creator_id: String,
    pub caption: String,
    pub hashtags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Guardrails {
    pub tone: String,
    pub caption_length: String,
    pub banned_words: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonalizationHints {
    pub preferred_hashtags: Vec<String>,
    pub niche: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemoryExample {
    pub caption: String,
    pub hashtags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Personalization {
    pub creator_id: String,
    pub guardrails: Guardrails,
    pub hints: PersonalizationHints,
    pub examples: Vec<MemoryExample>,
}

/// `#tag` words in `text`, trailing punctuation removed
pub fn hashtags_in(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|w| w.starts_with('#'))
        .map(|w| w.trim_end_matches(|c: char| !(c.is_alphanumeric() || c == '_')))
        .filter(|w| w.len() > 1)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestion_tolerates_missing_optional_fields() {
        let json = r##"{"id":"1","caption":"c","trend":"#pov trending +156%","engagement":"8.7K likes • 76% engagement","confidence":88}"##;
        let suggestion: CaptionSuggestion = serde_json::from_str(json).expect("parse");
        assert_eq!(suggestion.confidence, 88);
        assert!(suggestion.style.is_none());
        assert!(suggestion.hashtags.is_empty());
    }

    #[test]
    fn hashtags_drop_trailing_punctuation() {
        assert_eq!(
            hashtags_in("Try it! #ramen, #budget_eats. # #sg🍜"),
            vec!["#ramen", "#budget_eats", "#sg"]
        );
    }

    #[test]
    fn chat_body_uses_backend_field_names() {
        let history = [HistoryEntry {
            text: "hi".into(),
            sender: Sender::User,
        }];
        let body = ChatRequestBody {
            message: "caption ideas?",
            context: "caption_generation",
            previous_messages: &history,
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["previousMessages"][0]["from"], "user");
        assert_eq!(json["context"], "caption_generation");
    }
}
