//! Error types for the loreweave domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all loreweave operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Oracle errors ---
    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    // --- Store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Curation errors ---
    #[error("Curation error: {0}")]
    Curation(#[from] CurationError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures of the text-generation oracle and its credential pool.
///
/// `Exhausted` is the only variant the client surfaces after rotation:
/// every transport-level failure (network, quota, auth, malformed body)
/// triggers a rotation to the next credential first.
#[derive(Debug, Clone, Error)]
pub enum OracleError {
    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Quota exceeded, retry after {retry_after_secs}s")]
    Quota { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed oracle reply: {0}")]
    MalformedReply(String),

    #[error("Every credential in the pool failed for this call")]
    Exhausted,
}

/// Filesystem-backed store failures. Always scoped to a single path so a
/// batch operation can isolate the failing document and continue.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path escapes the store root: {0}")]
    OutsideRoot(PathBuf),

    #[error("Log record error: {0}")]
    Record(String),
}

impl StoreError {
    /// Wrap an `io::Error` with the path it occurred at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum CurationError {
    #[error("A reorganization run is already in progress for this root")]
    AlreadyRunning,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oracle_error_displays_correctly() {
        let err = Error::Oracle(OracleError::Api {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn store_error_carries_path() {
        let err = StoreError::io(
            "docs/ml/intro.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("docs/ml/intro.txt"));
    }

    #[test]
    fn curation_error_from_store() {
        let err: CurationError = StoreError::Record("bad line".into()).into();
        assert!(err.to_string().contains("bad line"));
    }
}
