//! In-memory chat sessions.
//!
//! Transcripts are cloned on read so no `DashMap` guard is ever held across
//! an `.await`. The store is bounded: once full, starting a session drops the
//! oldest one. Session ids are UUID v7, so the smallest id is the oldest.

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use heavylifter_types::chat::{ChatPage, Transcript};
use heavylifter_types::error::TranscriptError;

/// Sessions kept when no explicit limit is given.
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

/// Concurrent map of session id to transcript, shared by cloning.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<DashMap<Uuid, Transcript>>,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_max_sessions(DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding at most `max_sessions` transcripts (at least one).
    pub fn with_max_sessions(max_sessions: usize) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    /// Start an empty transcript for `page` and return a snapshot of it,
    /// evicting the oldest sessions first if the store is full.
    pub fn create(&self, page: ChatPage) -> Transcript {
        while self.inner.len() >= self.max_sessions {
            let Some(oldest) = self.inner.iter().map(|entry| *entry.key()).min() else {
                break;
            };
            if self.inner.remove(&oldest).is_some() {
                tracing::debug!(session_id = %oldest, "Evicted oldest chat session");
            }
        }
        let transcript = Transcript::new(page);
        self.inner.insert(transcript.id, transcript.clone());
        transcript
    }

    pub fn get(&self, id: &Uuid) -> Option<Transcript> {
        self.inner.get(id).map(|r| r.value().clone())
    }

    /// Append a user turn and its reply, both or neither.
    pub fn record_exchange(
        &self,
        id: &Uuid,
        user: impl Into<String>,
        assistant: impl Into<String>,
    ) -> Result<(), TranscriptError> {
        let mut transcript = self
            .inner
            .get_mut(id)
            .ok_or(TranscriptError::SessionNotFound)?;
        transcript.record_exchange(user, assistant)
    }

    pub fn clear(&self, id: &Uuid) -> Result<(), TranscriptError> {
        let mut transcript = self
            .inner
            .get_mut(id)
            .ok_or(TranscriptError::SessionNotFound)?;
        transcript.clear();
        Ok(())
    }

    pub fn remove(&self, id: &Uuid) -> Option<Transcript> {
        self.inner.remove(id).map(|(_, t)| t)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
