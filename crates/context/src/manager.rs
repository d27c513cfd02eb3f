//! Per-session conversation buffers, bounded by a character budget.
//!
//! Each session owns an ordered deque of turns. Appending trims from the
//! oldest end while the cumulative character length exceeds the budget —
//! but the single most recent turn is never evicted, even when it alone
//! blows the budget. Buffers are independent across sessions; access
//! within one session serializes through the manager's lock.

use loreweave_core::session::Turn;
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory session buffers. Sessions are created on first turn and live
/// for the process lifetime; an outer application can evict them through
/// [`remove_session`](ContextManager::remove_session).
pub struct ContextManager {
    budget_chars: usize,
    relevant_turns: usize,
    sessions: RwLock<HashMap<String, VecDeque<Turn>>>,
}

impl ContextManager {
    pub fn new(budget_chars: usize, relevant_turns: usize) -> Self {
        Self {
            budget_chars,
            relevant_turns,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Append a finished turn, then trim oldest-first back under budget.
    pub async fn add_turn(
        &self,
        session_id: &str,
        user_text: impl Into<String>,
        assistant_text: impl Into<String>,
    ) {
        let mut sessions = self.sessions.write().await;
        let buffer = sessions.entry(session_id.to_string()).or_default();
        buffer.push_back(Turn::new(user_text, assistant_text));

        let mut total: usize = buffer.iter().map(Turn::char_len).sum();
        while total > self.budget_chars && buffer.len() > 1 {
            if let Some(evicted) = buffer.pop_front() {
                total -= evicted.char_len();
                debug!(session_id, "Evicted oldest turn from context buffer");
            }
        }
    }

    /// The live buffer for a session, oldest first.
    pub async fn get_context(&self, session_id: &str) -> Vec<Turn> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|buffer| buffer.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// The most recent turns rendered as `user: …` / `assistant: …` lines.
    ///
    /// This is a recency window standing in for a future relevance-ranked
    /// extractor; the query parameter is accepted now so call sites will
    /// not change when ranking lands.
    pub async fn extract_relevant(&self, session_id: &str, _query: &str) -> String {
        let sessions = self.sessions.read().await;
        let Some(buffer) = sessions.get(session_id) else {
            return String::new();
        };
        let skip = buffer.len().saturating_sub(self.relevant_turns);
        buffer
            .iter()
            .skip(skip)
            .map(Turn::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Drop a session's buffer entirely. Returns whether it existed.
    pub async fn remove_session(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    /// Total buffered character length for a session (tests, diagnostics).
    pub async fn buffered_chars(&self, session_id: &str) -> usize {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|buffer| buffer.iter().map(Turn::char_len).sum())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn turns_accumulate_in_order() {
        let manager = ContextManager::new(1000, 3);
        manager.add_turn("s1", "q1", "a1").await;
        manager.add_turn("s1", "q2", "a2").await;

        let context = manager.get_context("s1").await;
        assert_eq!(context.len(), 2);
        assert_eq!(context[0].user_text, "q1");
        assert_eq!(context[1].user_text, "q2");
    }

    #[tokio::test]
    async fn trims_oldest_when_over_budget() {
        // Each turn is 8 chars; budget fits two turns.
        let manager = ContextManager::new(16, 3);
        manager.add_turn("s1", "aaaa", "bbbb").await;
        manager.add_turn("s1", "cccc", "dddd").await;
        manager.add_turn("s1", "eeee", "ffff").await;

        let context = manager.get_context("s1").await;
        assert_eq!(context.len(), 2);
        assert_eq!(context[0].user_text, "cccc");
        assert!(manager.buffered_chars("s1").await <= 16);
    }

    #[tokio::test]
    async fn last_turn_survives_even_over_budget() {
        let manager = ContextManager::new(4, 3);
        manager.add_turn("s1", "short", "turn").await;
        manager
            .add_turn("s1", "a very long user input", "a very long answer")
            .await;

        let context = manager.get_context("s1").await;
        assert_eq!(context.len(), 1);
        assert_eq!(context[0].user_text, "a very long user input");
    }

    #[tokio::test]
    async fn budget_holds_after_any_sequence() {
        let manager = ContextManager::new(50, 3);
        for i in 0..20 {
            manager.add_turn("s1", format!("question {i}"), format!("answer {i}")).await;
            let total = manager.buffered_chars("s1").await;
            let len = manager.get_context("s1").await.len();
            assert!(total <= 50 || len == 1, "total={total} len={len}");
        }
    }

    #[tokio::test]
    async fn sessions_are_independent() {
        let manager = ContextManager::new(1000, 3);
        manager.add_turn("s1", "one", "1").await;
        manager.add_turn("s2", "two", "2").await;

        assert_eq!(manager.get_context("s1").await.len(), 1);
        assert_eq!(manager.get_context("s2").await.len(), 1);
        assert!(manager.remove_session("s1").await);
        assert!(manager.get_context("s1").await.is_empty());
        assert_eq!(manager.get_context("s2").await.len(), 1);
    }

    #[tokio::test]
    async fn extract_relevant_takes_recency_window() {
        let manager = ContextManager::new(10_000, 3);
        for i in 0..5 {
            manager.add_turn("s1", format!("q{i}"), format!("a{i}")).await;
        }

        let extract = manager.extract_relevant("s1", "anything").await;
        assert!(!extract.contains("q1"));
        assert!(extract.contains("user: q2"));
        assert!(extract.contains("assistant: a4"));
    }

    #[tokio::test]
    async fn extract_relevant_empty_session_is_empty() {
        let manager = ContextManager::new(100, 3);
        assert_eq!(manager.extract_relevant("nope", "q").await, "");
    }
}
