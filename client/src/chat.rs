//! Creator chat with explicit approval of bot suggestions.
//!
//! Bot replies never enter the log directly: each one is held as the pending
//! suggestion until the user approves, edits or rejects it. Submitting a new
//! message while a suggestion is pending drops that suggestion.

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::ApiClient;
use crate::models::{HistoryEntry, Sender};

pub const GREETING: &str = "Hello! How can I help you today?";

/// Turns forwarded to the backend with each message
const HISTORY_WINDOW: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: u64,
    pub text: String,
    pub sender: Sender,
}

/// A reply to fetch for the latest user message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyRequest {
    pub request_id: u64,
    pub message: String,
    pub history: Vec<HistoryEntry>,
}

/// Notified with every suggestion the user approves
pub trait SuggestionObserver: Send + Sync {
    fn suggestion_approved(&self, message: &ChatMessage);
}

/// For sessions without a creator memory backend
#[derive(Debug, Default)]
pub struct NoopObserver;

impl SuggestionObserver for NoopObserver {
    fn suggestion_approved(&self, _message: &ChatMessage) {}
}

pub struct ChatController {
    messages: Vec<ChatMessage>,
    input: String,
    pending: Option<String>,
    awaiting: Option<u64>,
    next_id: u64,
    observer: Arc<dyn SuggestionObserver>,
}

impl ChatController {
    pub fn new(observer: Arc<dyn SuggestionObserver>) -> Self {
        let mut controller = Self {
            messages: Vec::new(),
            input: String::new(),
            pending: None,
            awaiting: None,
            next_id: 1,
            observer,
        };
        controller.push(GREETING.to_string(), Sender::Bot);
        controller
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Whether a reply is still outstanding
    pub fn is_waiting(&self) -> bool {
        self.awaiting.is_some()
    }

    fn push(&mut self, text: String, sender: Sender) -> ChatMessage {
        let message = ChatMessage {
            id: self.next_id,
            text,
            sender,
        };
        self.next_id += 1;
        self.messages.push(message.clone());
        message
    }

    /// Append a user message and describe the reply to fetch. Blank input is
    /// ignored.
    pub fn submit(&mut self, text: &str) -> Option<ReplyRequest> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if self.pending.take().is_some() {
            tracing::debug!("Dropping pending suggestion for new message");
        }

        let skip = self.messages.len().saturating_sub(HISTORY_WINDOW);
        let history = self.messages[skip..]
            .iter()
            .map(|m| HistoryEntry {
                text: m.text.clone(),
                sender: m.sender,
            })
            .collect();

        let message = self.push(text.to_string(), Sender::User);
        self.input.clear();
        self.awaiting = Some(message.id);

        Some(ReplyRequest {
            request_id: message.id,
            message: message.text,
            history,
        })
    }

    /// Hold `text` as the pending suggestion if it answers the latest
    /// request. Returns false for stale replies.
    pub fn receive_reply(&mut self, request_id: u64, text: impl Into<String>) -> bool {
        if self.awaiting != Some(request_id) {
            tracing::debug!(request_id, "Ignoring reply to superseded message");
            return false;
        }
        self.awaiting = None;
        self.pending = Some(text.into());
        true
    }

    /// Promote the pending suggestion into the log.
    pub fn approve(&mut self) -> Option<ChatMessage> {
        let text = self.pending.take()?;
        let message = self.push(text, Sender::Bot);
        self.observer.suggestion_approved(&message);
        Some(message)
    }

    /// Discard the pending suggestion and load it into the input for editing.
    pub fn edit(&mut self) -> bool {
        match self.pending.take() {
            Some(text) => {
                self.input = text;
                true
            }
            None => false,
        }
    }

    /// Discard the pending suggestion.
    pub fn reject(&mut self) -> bool {
        self.pending.take().is_some()
    }
}

/// Produces a bot reply for a user message
#[async_trait]
pub trait ReplySource: Send + Sync {
    async fn reply(&self, request: &ReplyRequest) -> String;
}

/// Offline keyword heuristic
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalReplySource;

#[async_trait]
impl ReplySource for LocalReplySource {
    async fn reply(&self, request: &ReplyRequest) -> String {
        local_reply(&request.message)
    }
}

pub fn local_reply(message: &str) -> String {
    let lower = message.to_lowercase();
    if lower.contains("trend") {
        [
            "• Behind-the-scenes 10s cut with a reveal, try #BTS",
            "• 'I tried X so you don't have to' quick review, try #HonestReview",
            "• 3 fast tips with on-screen text, try #ProTips",
            "• 'Day in the life' montage with time stamps, try #DayInMyLife",
            "• Before/After transformation with beat drop, try #GlowUp",
        ]
        .join("\n")
    } else if lower.contains("caption") {
        [
            "1) Stop scrolling! You won't believe this… 🔥",
            "2) POV: You finally try the hack everyone's talking about 👀",
            "3) This changed my results in 7 days. Here's how ⬇️",
            "Hashtags: #viral #howto #creator",
        ]
        .join("\n")
    } else {
        format!(
            "For \"{}\", hook viewers in the first 3 seconds and end with a question to boost comments! 🚀",
            message
        )
    }
}

/// Asks the assistant backend, falling back to [`LocalReplySource`] on any
/// error.
pub struct RemoteReplySource {
    api: Arc<ApiClient>,
    context: String,
}

impl RemoteReplySource {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            context: "caption_generation".to_string(),
        }
    }
}

#[async_trait]
impl ReplySource for RemoteReplySource {
    async fn reply(&self, request: &ReplyRequest) -> String {
        match self
            .api
            .chat(&request.message, &self.context, &request.history)
            .await
        {
            Ok(reply) => {
                tracing::debug!(using_ai = reply.using_ai, "Assistant replied");
                reply.reply
            }
            Err(e) => {
                tracing::warn!(error = %e, "Assistant unavailable, using local reply");
                local_reply(&request.message)
            }
        }
    }
}
