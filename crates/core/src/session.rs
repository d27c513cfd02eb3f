//! Session and turn domain types.
//!
//! These are the value objects that flow through the whole system:
//! a user message arrives → the pipeline shapes it → the answer engine
//! responds → the turn lands in the session buffer and the log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a conversation session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One user input plus its corresponding assistant output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// What the user said
    pub user_text: String,

    /// What the assistant answered
    pub assistant_text: String,

    /// When the turn completed
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(user_text: impl Into<String>, assistant_text: impl Into<String>) -> Self {
        Self {
            user_text: user_text.into(),
            assistant_text: assistant_text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Character length of the turn as counted against the context budget.
    pub fn char_len(&self) -> usize {
        self.user_text.chars().count() + self.assistant_text.chars().count()
    }

    /// Render as the two-line `user: …` / `assistant: …` form used in
    /// prompts and relevant-context extracts.
    pub fn render(&self) -> String {
        format!("user: {}\nassistant: {}", self.user_text, self.assistant_text)
    }
}

/// The role of a context message handed to the answer engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The assistant
    Assistant,
    /// Synthesized context (e.g. a history summary)
    System,
}

/// A role-tagged message in the context handed to the answer engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextMessage {
    pub role: Role,
    pub content: String,
}

impl ContextMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}
