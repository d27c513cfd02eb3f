//! DocumentStore trait — key-value-by-path access to the knowledge base.
//!
//! The curator never touches the filesystem directly; it speaks this
//! narrow interface so tests can run against a temp directory and the
//! application can swap in whatever hierarchy it likes. Paths are always
//! relative to the store root and use `/` separators.

use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Metadata for a stored document, as needed by curation.
#[derive(Debug, Clone)]
pub struct DocumentMeta {
    /// Byte size on disk
    pub size: u64,
    /// Last modification time
    pub modified: DateTime<Utc>,
}

/// Hierarchical file store rooted at a knowledge directory.
///
/// Invariants implementations must keep:
/// - `write` creates missing parent directories;
/// - `rename` is atomic where the underlying filesystem supports it;
/// - no operation reaches outside the root.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// List relative paths of all files whose name ends with `suffix`,
    /// in a stable (sorted) order.
    async fn list(&self, suffix: &str) -> std::result::Result<Vec<String>, StoreError>;

    async fn read(&self, path: &str) -> std::result::Result<String, StoreError>;

    async fn write(&self, path: &str, content: &str) -> std::result::Result<(), StoreError>;

    async fn rename(&self, src: &str, dst: &str) -> std::result::Result<(), StoreError>;

    async fn delete(&self, path: &str) -> std::result::Result<(), StoreError>;

    async fn mkdir(&self, path: &str) -> std::result::Result<(), StoreError>;

    async fn exists(&self, path: &str) -> bool;

    async fn metadata(&self, path: &str) -> std::result::Result<DocumentMeta, StoreError>;

    /// Remove every directory under the root left without files.
    async fn remove_empty_dirs(&self) -> std::result::Result<usize, StoreError>;
}
