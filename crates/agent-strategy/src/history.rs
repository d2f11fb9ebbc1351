//! Conversation history for one session
//!
//! History is shown to the user only; it is never fed back to the model.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One completed interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// Topic as submitted
    pub topic: String,
    /// Generated strategies
    pub strategies_text: String,
    /// When the answer was produced
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Create an entry stamped with the current time
    pub fn new(topic: impl Into<String>, strategies_text: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            strategies_text: strategies_text.into(),
            created_at: Utc::now(),
        }
    }
}

/// Append-only log of interactions, in arrival order
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    /// All entries, oldest first
    pub fn all(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
