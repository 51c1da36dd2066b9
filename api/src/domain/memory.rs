//! Creator memory: profiles, caption preferences, past captions and the
//! suggestion feedback loop that feeds personalization.
//!
//! Everything lives in process memory behind one `RwLock`, like the video
//! store. Nothing survives a restart.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Most recent memories returned per creator
pub const MEMORY_LIST_LIMIT: usize = 50;
/// Memories quoted as examples in a personalization payload
pub const PERSONALIZE_EXAMPLES: usize = 3;
/// Hashtags suggested in a personalization payload
pub const PREFERRED_HASHTAGS: usize = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Creator not found")]
    CreatorNotFound,

    #[error("Unknown suggestion_id for this creator")]
    UnknownSuggestion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub id: String,
    pub username: Option<String>,
    pub locale: String,
    pub timezone: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Playful,
    Informative,
    Inspirational,
    Edgy,
    #[default]
    Friendly,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionLength {
    #[default]
    Short,
    Medium,
    Long,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub tone: Tone,
    pub caption_length: CaptionLength,
    pub niche: Option<String>,
    pub banned_words: Vec<String>,
}

/// Partial preference update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesPatch {
    pub tone: Option<Tone>,
    pub caption_length: Option<CaptionLength>,
    pub niche: Option<String>,
    pub banned_words: Option<Vec<String>>,
}

/// A caption the creator published or approved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Memory {
    pub id: u64,
    pub creator_id: String,
    pub caption: String,
    pub hashtags: Vec<String>,
    pub performance: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Caption,
    Hashtags,
    #[default]
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackAction {
    Approved,
    Edited,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    Pending,
    Approved,
    Edited,
    Rejected,
}

impl From<FeedbackAction> for SuggestionStatus {
    fn from(action: FeedbackAction) -> Self {
        match action {
            FeedbackAction::Approved => SuggestionStatus::Approved,
            FeedbackAction::Edited => SuggestionStatus::Edited,
            FeedbackAction::Rejected => SuggestionStatus::Rejected,
        }
    }
}

/// A generated suggestion as reported by the generation webhook
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionLog {
    pub suggestion_id: String,
    pub creator_id: String,
    pub kind: SuggestionKind,
    pub suggested_caption: Option<String>,
    pub suggested_hashtags: Vec<String>,
    pub model: String,
    pub meta: Map<String, Value>,
    pub status: SuggestionStatus,
    pub final_caption: Option<String>,
    pub final_hashtags: Vec<String>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Webhook input for [`CreatorMemory::log_suggestion`]
#[derive(Debug, Clone, Default)]
pub struct GeneratedSuggestion {
    pub suggestion_id: String,
    pub kind: SuggestionKind,
    pub caption: Option<String>,
    pub hashtags: Vec<String>,
    pub model: String,
    pub meta: Map<String, Value>,
}

/// Creator verdict on a logged suggestion
#[derive(Debug, Clone)]
pub struct Feedback {
    pub suggestion_id: String,
    pub action: FeedbackAction,
    pub final_caption: Option<String>,
    pub final_hashtags: Vec<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Guardrails {
    pub tone: Tone,
    pub caption_length: CaptionLength,
    pub banned_words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hints {
    pub preferred_hashtags: Vec<String>,
    pub niche: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryExample {
    pub caption: String,
    pub hashtags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// What a caption generator needs to write in the creator's voice
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Personalization {
    pub creator_id: String,
    pub guardrails: Guardrails,
    pub hints: Hints,
    pub examples: Vec<MemoryExample>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeedbackCounts {
    pub approved: usize,
    pub edited: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InlineStats {
    pub memories: usize,
    pub feedback: FeedbackCounts,
}

#[derive(Debug, Default)]
struct Tables {
    creators: HashMap<String, Creator>,
    preferences: HashMap<String, Preferences>,
    /// Insertion order, so later entries are newer
    memories: Vec<Memory>,
    suggestions: HashMap<String, SuggestionLog>,
    last_memory_id: u64,
}

impl Tables {
    fn add_memory(
        &mut self,
        creator_id: &str,
        caption: String,
        hashtags: Vec<String>,
        performance: Map<String, Value>,
    ) -> Memory {
        self.last_memory_id += 1;
        let memory = Memory {
            id: self.last_memory_id,
            creator_id: creator_id.to_string(),
            caption,
            hashtags,
            performance,
            created_at: Utc::now(),
        };
        self.memories.push(memory.clone());
        memory
    }

    fn recent_memories(&self, creator_id: &str) -> Vec<Memory> {
        self.memories
            .iter()
            .rev()
            .filter(|m| m.creator_id == creator_id)
            .take(MEMORY_LIST_LIMIT)
            .cloned()
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct CreatorMemory {
    tables: RwLock<Tables>,
}

impl CreatorMemory {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace the creator profile.
    pub fn upsert_creator(&self, creator: Creator) -> Creator {
        self.write()
            .creators
            .insert(creator.id.clone(), creator.clone());
        creator
    }

    pub fn creator(&self, id: &str) -> Option<Creator> {
        self.read().creators.get(id).cloned()
    }

    /// Preferences for `creator_id`, created with defaults on first access.
    pub fn preferences(&self, creator_id: &str) -> Preferences {
        if let Some(prefs) = self.read().preferences.get(creator_id) {
            return prefs.clone();
        }
        self.write()
            .preferences
            .entry(creator_id.to_string())
            .or_default()
            .clone()
    }

    pub fn update_preferences(&self, creator_id: &str, patch: PreferencesPatch) -> Preferences {
        let mut tables = self.write();
        let prefs = tables
            .preferences
            .entry(creator_id.to_string())
            .or_default();
        if let Some(tone) = patch.tone {
            prefs.tone = tone;
        }
        if let Some(length) = patch.caption_length {
            prefs.caption_length = length;
        }
        if let Some(niche) = patch.niche {
            prefs.niche = Some(niche);
        }
        if let Some(words) = patch.banned_words {
            prefs.banned_words = words;
        }
        prefs.clone()
    }

    /// Store a caption for a known creator.
    pub fn ingest(
        &self,
        creator_id: &str,
        caption: String,
        hashtags: Vec<String>,
        performance: Map<String, Value>,
    ) -> Result<Memory, MemoryError> {
        let mut tables = self.write();
        if !tables.creators.contains_key(creator_id) {
            return Err(MemoryError::CreatorNotFound);
        }
        Ok(tables.add_memory(creator_id, caption, hashtags, performance))
    }

    /// Newest first, at most [`MEMORY_LIST_LIMIT`].
    pub fn memories(&self, creator_id: &str) -> Result<Vec<Memory>, MemoryError> {
        let tables = self.read();
        if !tables.creators.contains_key(creator_id) {
            return Err(MemoryError::CreatorNotFound);
        }
        Ok(tables.recent_memories(creator_id))
    }

    /// Most used hashtags across recent memories. Ties keep the order in
    /// which the tags were first seen, newest memory first.
    pub fn top_hashtags(&self, creator_id: &str, limit: usize) -> Vec<String> {
        let memories = self.read().recent_memories(creator_id);

        let mut counts: Vec<(String, usize)> = Vec::new();
        for tag in memories.iter().flat_map(|m| &m.hashtags) {
            match counts.iter_mut().find(|(seen, _)| seen == tag) {
                Some((_, n)) => *n += 1,
                None => counts.push((tag.clone(), 1)),
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.into_iter().take(limit).map(|(tag, _)| tag).collect()
    }

    /// Record a generated suggestion. Re-sending an id replaces the suggested
    /// content but keeps its feedback status.
    pub fn log_suggestion(
        &self,
        creator_id: &str,
        suggestion: GeneratedSuggestion,
    ) -> Result<(), MemoryError> {
        let mut tables = self.write();
        if !tables.creators.contains_key(creator_id) {
            return Err(MemoryError::CreatorNotFound);
        }

        let now = Utc::now();
        match tables.suggestions.get_mut(&suggestion.suggestion_id) {
            Some(log) => {
                log.kind = suggestion.kind;
                log.suggested_caption = suggestion.caption;
                log.suggested_hashtags = suggestion.hashtags;
                log.model = suggestion.model;
                log.meta = suggestion.meta;
                log.updated_at = now;
            }
            None => {
                tables.suggestions.insert(
                    suggestion.suggestion_id.clone(),
                    SuggestionLog {
                        suggestion_id: suggestion.suggestion_id,
                        creator_id: creator_id.to_string(),
                        kind: suggestion.kind,
                        suggested_caption: suggestion.caption,
                        suggested_hashtags: suggestion.hashtags,
                        model: suggestion.model,
                        meta: suggestion.meta,
                        status: SuggestionStatus::Pending,
                        final_caption: None,
                        final_hashtags: Vec::new(),
                        reason: None,
                        created_at: now,
                        updated_at: now,
                    },
                );
            }
        }
        Ok(())
    }

    pub fn suggestion(&self, suggestion_id: &str) -> Option<SuggestionLog> {
        self.read().suggestions.get(suggestion_id).cloned()
    }

    /// Apply feedback to a suggestion owned by `creator_id`. Approved and
    /// edited captions become memories.
    pub fn record_feedback(&self, creator_id: &str, feedback: Feedback) -> Result<(), MemoryError> {
        let mut tables = self.write();
        let log = tables
            .suggestions
            .get_mut(&feedback.suggestion_id)
            .filter(|log| log.creator_id == creator_id)
            .ok_or(MemoryError::UnknownSuggestion)?;

        log.status = feedback.action.into();
        log.final_caption = feedback.final_caption.clone();
        log.final_hashtags = feedback.final_hashtags.clone();
        log.reason = feedback.reason;
        log.updated_at = Utc::now();

        if feedback.action != FeedbackAction::Rejected {
            tables.add_memory(
                creator_id,
                feedback.final_caption.unwrap_or_default(),
                feedback.final_hashtags,
                Map::new(),
            );
        }
        Ok(())
    }

    pub fn personalize(&self, creator_id: &str) -> Personalization {
        let prefs = self.preferences(creator_id);
        let preferred_hashtags = self
            .top_hashtags(creator_id, PREFERRED_HASHTAGS)
            .into_iter()
            .filter(|tag| !prefs.banned_words.contains(tag))
            .collect();
        let examples = self
            .read()
            .recent_memories(creator_id)
            .into_iter()
            .take(PERSONALIZE_EXAMPLES)
            .map(|m| MemoryExample {
                caption: m.caption,
                hashtags: m.hashtags,
                created_at: m.created_at,
            })
            .collect();

        Personalization {
            creator_id: creator_id.to_string(),
            guardrails: Guardrails {
                tone: prefs.tone,
                caption_length: prefs.caption_length,
                banned_words: prefs.banned_words,
            },
            hints: Hints {
                preferred_hashtags,
                niche: prefs.niche,
            },
            examples,
        }
    }

    pub fn inline_stats(&self, creator_id: &str) -> InlineStats {
        let tables = self.read();
        let mut stats = InlineStats {
            memories: tables
                .memories
                .iter()
                .filter(|m| m.creator_id == creator_id)
                .count(),
            ..Default::default()
        };
        for log in tables.suggestions.values().filter(|l| l.creator_id == creator_id) {
            match log.status {
                SuggestionStatus::Approved => stats.feedback.approved += 1,
                SuggestionStatus::Edited => stats.feedback.edited += 1,
                SuggestionStatus::Rejected => stats.feedback.rejected += 1,
                SuggestionStatus::Pending => {}
            }
        }
        stats
    }
}
