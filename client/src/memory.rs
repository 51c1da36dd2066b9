//! Forwards approved chat suggestions to the creator memory backend.
//!
//! [`SuggestionObserver`] is synchronous, so approvals are queued on a
//! channel and a background task posts them as memories in order.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::ApiClient;
use crate::chat::{ChatMessage, SuggestionObserver};
use crate::models::hashtags_in;

pub struct MemorySync {
    tx: mpsc::UnboundedSender<ChatMessage>,
}

impl MemorySync {
    /// Start the forwarding task. It finishes once every `MemorySync` handle
    /// is dropped and returns how many memories were stored.
    pub fn spawn(api: Arc<ApiClient>, creator_id: impl Into<String>) -> (Self, JoinHandle<usize>) {
        let creator_id = creator_id.into();
        let (tx, mut rx) = mpsc::unbounded_channel::<ChatMessage>();

        let task = tokio::spawn(async move {
            let mut stored = 0;
            while let Some(message) = rx.recv().await {
                let hashtags = hashtags_in(&message.text);
                match api.ingest_memory(&creator_id, &message.text, &hashtags).await {
                    Ok(memory) => {
                        tracing::debug!(memory_id = memory.id, creator_id = %creator_id, "Approved suggestion remembered");
                        stored += 1;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, creator_id = %creator_id, "Failed to store approved suggestion")
                    }
                }
            }
            stored
        });

        (Self { tx }, task)
    }
}

impl SuggestionObserver for MemorySync {
    fn suggestion_approved(&self, message: &ChatMessage) {
        if self.tx.send(message.clone()).is_err() {
            tracing::warn!("Memory sync task stopped, dropping approved suggestion");
        }
    }
}
