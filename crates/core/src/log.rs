//! ConversationLog trait — durable per-session turn history.
//!
//! The pipeline's history-load stage reads from here, not from the live
//! context buffer: the log survives restarts and holds turns the buffer
//! has already trimmed.

use crate::error::StoreError;
use crate::session::Turn;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One persisted conversation entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,

    pub session_id: String,

    pub user_text: String,

    pub assistant_text: String,

    /// Whether this turn produced a knowledge-base write
    #[serde(default)]
    pub knowledge_updated: bool,

    /// The written knowledge path, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_path: Option<String>,
}

impl LogEntry {
    pub fn new(
        session_id: impl Into<String>,
        user_text: impl Into<String>,
        assistant_text: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            session_id: session_id.into(),
            user_text: user_text.into(),
            assistant_text: assistant_text.into(),
            knowledge_updated: false,
            knowledge_path: None,
        }
    }

    /// Record the knowledge write this turn produced.
    pub fn with_knowledge_path(mut self, path: impl Into<String>) -> Self {
        self.knowledge_updated = true;
        self.knowledge_path = Some(path.into());
        self
    }
}

/// Append-only conversation history, queried newest-first but returned in
/// chronological order.
#[async_trait]
pub trait ConversationLog: Send + Sync {
    async fn append(&self, entry: LogEntry) -> std::result::Result<(), StoreError>;

    /// The most recent `limit` turns for a session, oldest first.
    async fn recent(
        &self,
        session_id: &str,
        limit: usize,
    ) -> std::result::Result<Vec<Turn>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_tracks_knowledge_write() {
        let entry = LogEntry::new("s1", "q", "a").with_knowledge_path("technical/ml/note.txt");
        assert!(entry.knowledge_updated);
        assert_eq!(entry.knowledge_path.as_deref(), Some("technical/ml/note.txt"));
    }

    #[test]
    fn entry_serialization_skips_empty_path() {
        let entry = LogEntry::new("s1", "q", "a");
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("knowledge_path"));
    }
}
