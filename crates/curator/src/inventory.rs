//! Phase 1 — inventory of the knowledge store.
//!
//! Lists every text document with its content, size, modification time,
//! and a hash of the leading content used for duplicate detection. A
//! document that cannot be read is logged and skipped; one bad file never
//! aborts the run.

use chrono::{DateTime, Utc};
use loreweave_core::error::StoreError;
use loreweave_core::store::DocumentStore;
use sha2::{Digest, Sha256};
use tracing::warn;

/// Everything curation needs to know about one stored document.
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    /// Path relative to the knowledge root
    pub path: String,

    /// File name component
    pub name: String,

    pub content: String,

    /// Content length in characters
    pub size: usize,

    /// Hex SHA-256 of the first N characters
    pub content_hash: String,

    pub modified: DateTime<Utc>,
}

impl DocumentInfo {
    /// The directory part of the relative path (`""` at the root).
    pub fn parent_dir(&self) -> &str {
        self.path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
    }
}

/// A character-bounded prefix, safe on multi-byte content.
pub(crate) fn char_prefix(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}

/// Hash the first `prefix_chars` characters of the content.
pub(crate) fn content_hash(content: &str, prefix_chars: usize) -> String {
    hex::encode(Sha256::digest(char_prefix(content, prefix_chars)))
}

/// Collect all `.txt` documents under the store root, in stable (sorted)
/// order. Per-document read failures are isolated.
pub(crate) async fn take_inventory(
    store: &dyn DocumentStore,
    hash_prefix_chars: usize,
) -> Result<Vec<DocumentInfo>, StoreError> {
    let paths = store.list(".txt").await?;
    let mut docs = Vec::with_capacity(paths.len());

    for path in paths {
        let content = match store.read(&path).await {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path, error = %e, "Skipping unreadable document");
                continue;
            }
        };
        let modified = match store.metadata(&path).await {
            Ok(meta) => meta.modified,
            Err(e) => {
                warn!(path = %path, error = %e, "Metadata unavailable, using now");
                Utc::now()
            }
        };
        let name = path.rsplit('/').next().unwrap_or(&path).to_string();
        docs.push(DocumentInfo {
            name,
            size: content.chars().count(),
            content_hash: content_hash(&content, hash_prefix_chars),
            content,
            modified,
            path,
        });
    }

    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loreweave_store::FsStore;

    #[test]
    fn char_prefix_respects_boundaries() {
        assert_eq!(char_prefix("hello", 3), "hel");
        assert_eq!(char_prefix("你好世界", 2), "你好");
        assert_eq!(char_prefix("ab", 10), "ab");
    }

    #[test]
    fn identical_prefixes_hash_identically() {
        let a = format!("{}{}", "x".repeat(100), "tail one");
        let b = format!("{}{}", "x".repeat(100), "different tail");
        assert_eq!(content_hash(&a, 100), content_hash(&b, 100));
        assert_ne!(content_hash(&a, 200), content_hash(&b, 200));
    }

    #[test]
    fn parent_dir_of_root_file_is_empty() {
        let doc = DocumentInfo {
            path: "note.txt".into(),
            name: "note.txt".into(),
            content: String::new(),
            size: 0,
            content_hash: String::new(),
            modified: Utc::now(),
        };
        assert_eq!(doc.parent_dir(), "");
    }

    #[tokio::test]
    async fn inventory_collects_documents_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::open(dir.path()).unwrap();
        store.write("b/second.txt", "second doc content").await.unwrap();
        store.write("a/first.txt", "first doc content").await.unwrap();
        store.write("ignored.md", "not a text doc").await.unwrap();

        let docs = take_inventory(&store, 1000).await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].path, "a/first.txt");
        assert_eq!(docs[0].name, "first.txt");
        assert_eq!(docs[0].size, "first doc content".chars().count());
        assert_eq!(docs[1].parent_dir(), "b");
    }
}
