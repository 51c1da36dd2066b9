//! Process-lifetime video store.
//!
//! The store is constructed once at startup and injected into the router
//! state. Nothing is persisted; records vanish when the process exits.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{PoisonError, RwLock};

use chrono::Utc;

use crate::models::{CaptionCandidate, VideoRecord};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("video {0} not found")]
    NotFound(String),
}

/// Key-value access to uploaded videos
pub trait VideoStore: Send + Sync {
    /// Allocate a new identifier derived from wall-clock time.
    fn next_id(&self) -> String;

    /// Insert or replace a record (last write wins).
    fn put(&self, record: VideoRecord);

    fn get(&self, id: &str) -> Option<VideoRecord>;

    /// Attach generated captions to an existing record and return the
    /// updated record. Unknown ids leave the store untouched.
    fn attach_captions(
        &self,
        id: &str,
        captions: Vec<CaptionCandidate>,
    ) -> Result<VideoRecord, StoreError>;

    /// Snapshot of every record, ordered by id.
    fn list(&self) -> BTreeMap<String, VideoRecord>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `HashMap` behind an `RwLock`. Ids are epoch milliseconds, bumped past the
/// last issued id when two uploads land in the same millisecond.
#[derive(Debug, Default)]
pub struct InMemoryVideoStore {
    videos: RwLock<HashMap<String, VideoRecord>>,
    last_id: AtomicI64,
}

impl InMemoryVideoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VideoStore for InMemoryVideoStore {
    fn next_id(&self) -> String {
        let now = Utc::now().timestamp_millis();
        let mut last = self.last_id.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match self.last_id.compare_exchange_weak(
                last,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate.to_string(),
                Err(actual) => last = actual,
            }
        }
    }

    fn put(&self, record: VideoRecord) {
        let mut videos = self.videos.write().unwrap_or_else(PoisonError::into_inner);
        videos.insert(record.id.clone(), record);
    }

    fn get(&self, id: &str) -> Option<VideoRecord> {
        let videos = self.videos.read().unwrap_or_else(PoisonError::into_inner);
        videos.get(id).cloned()
    }

    fn attach_captions(
        &self,
        id: &str,
        captions: Vec<CaptionCandidate>,
    ) -> Result<VideoRecord, StoreError> {
        let mut videos = self.videos.write().unwrap_or_else(PoisonError::into_inner);
        let record = videos
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.captions = Some(captions);
        Ok(record.clone())
    }

    fn list(&self) -> BTreeMap<String, VideoRecord> {
        let videos = self.videos.read().unwrap_or_else(PoisonError::into_inner);
        videos
            .iter()
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect()
    }

    fn len(&self) -> usize {
        self.videos
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
