//! Credential pool — ordered credentials plus the shared rotation cursor.
//!
//! The cursor is the one piece of state shared across concurrent turns.
//! Rotation is conditional on the index the failing caller observed, so
//! two concurrent failures that both saw index `i` advance the cursor
//! once, not twice — rotating past a good credential would waste it.

use std::sync::Mutex;

/// Process-wide credential pool. Initialized once at startup; mutated only
/// by rotation on failure.
pub struct CredentialPool {
    credentials: Vec<String>,
    cursor: Mutex<usize>,
}

impl CredentialPool {
    pub fn new(credentials: Vec<String>) -> Self {
        Self {
            credentials,
            cursor: Mutex::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Snapshot the current credential and its index.
    pub fn current(&self) -> Option<(usize, String)> {
        if self.credentials.is_empty() {
            return None;
        }
        let idx = *self.cursor.lock().unwrap_or_else(|e| e.into_inner());
        Some((idx, self.credentials[idx].clone()))
    }

    /// Advance the cursor past `observed`, circularly — but only if no
    /// other caller rotated first. Returns the index now current.
    pub fn rotate_from(&self, observed: usize) -> usize {
        let mut cursor = self.cursor.lock().unwrap_or_else(|e| e.into_inner());
        if *cursor == observed {
            *cursor = (observed + 1) % self.credentials.len().max(1);
        }
        *cursor
    }

    /// The index the next call will start from (for logs and tests).
    pub fn cursor(&self) -> usize {
        *self.cursor.lock().unwrap_or_else(|e| e.into_inner())
    }
}
