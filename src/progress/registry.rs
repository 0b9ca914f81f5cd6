use crate::progress::ProgressEvent;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;

/// A live crawl session: the attached progress sink and start timestamp
///
/// The entry's lifetime bounds the validity of progress emission: once it
/// is removed, emits for the session become silent no-ops.
#[derive(Debug)]
pub struct SessionEntry {
    pub sink: UnboundedSender<ProgressEvent>,
    pub started_at: DateTime<Utc>,
}

/// Registry of live crawl sessions, keyed by session identifier
///
/// The registry is the only mutable state shared between concurrent
/// flows. Access is whole-entry insert/lookup/remove under a mutex;
/// entries are never mutated in place, only replaced. The lock is never
/// held across an await.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, SessionEntry>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session, replacing any previous entry wholesale
    pub fn register(&self, session_id: &str, sink: UnboundedSender<ProgressEvent>) {
        let entry = SessionEntry {
            sink,
            started_at: Utc::now(),
        };
        self.sessions
            .lock()
            .unwrap()
            .insert(session_id.to_string(), entry);
        tracing::debug!("Registered crawl session {}", session_id);
    }

    /// Removes a session, dropping its sink (which closes the stream)
    pub fn remove(&self, session_id: &str) -> Option<SessionEntry> {
        let removed = self.sessions.lock().unwrap().remove(session_id);
        if removed.is_some() {
            tracing::debug!("Removed crawl session {}", session_id);
        }
        removed
    }

    /// Returns a clone of the session's sink, if the session is still live
    pub fn sink(&self, session_id: &str) -> Option<UnboundedSender<ProgressEvent>> {
        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .map(|entry| entry.sink.clone())
    }

    pub fn started_at(&self, session_id: &str) -> Option<DateTime<Utc>> {
        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .map(|entry| entry.started_at)
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.lock().unwrap().contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().unwrap().is_empty()
    }
}
