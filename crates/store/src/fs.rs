//! Filesystem document store rooted at the knowledge directory.
//!
//! All paths are relative to the root with `/` separators. Writes create
//! missing parents; moves use `rename` (atomic on one filesystem);
//! nothing reaches outside the root.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use loreweave_core::error::StoreError;
use loreweave_core::store::{DocumentMeta, DocumentStore};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Store adapter over a plain directory tree.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open a store at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| StoreError::io(&root, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative path against the root, rejecting traversal.
    fn resolve(&self, rel: &str) -> Result<PathBuf, StoreError> {
        let rel_path = Path::new(rel);
        if rel_path.is_absolute()
            || rel_path
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(StoreError::OutsideRoot(rel_path.to_path_buf()));
        }
        Ok(self.root.join(rel_path))
    }

    fn relativize(&self, abs: &Path) -> String {
        abs.strip_prefix(&self.root)
            .unwrap_or(abs)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn walk_files(&self, dir: &Path, suffix: &str, out: &mut Vec<String>) -> Result<(), StoreError> {
        let entries = std::fs::read_dir(dir).map_err(|e| StoreError::io(dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(dir, e))?;
            let path = entry.path();
            if path.is_dir() {
                self.walk_files(&path, suffix, out)?;
            } else if path
                .file_name()
                .is_some_and(|n| n.to_string_lossy().ends_with(suffix))
            {
                out.push(self.relativize(&path));
            }
        }
        Ok(())
    }

    /// Remove empty directories bottom-up; returns how many went away.
    fn sweep_empty(dir: &Path, root: &Path, removed: &mut usize) -> Result<(), StoreError> {
        let entries = std::fs::read_dir(dir).map_err(|e| StoreError::io(dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(dir, e))?;
            let path = entry.path();
            if path.is_dir() {
                Self::sweep_empty(&path, root, removed)?;
            }
        }
        if dir != root {
            let mut remaining = std::fs::read_dir(dir).map_err(|e| StoreError::io(dir, e))?;
            if remaining.next().is_none() {
                std::fs::remove_dir(dir).map_err(|e| StoreError::io(dir, e))?;
                debug!(dir = %dir.display(), "Removed empty directory");
                *removed += 1;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FsStore {
    async fn list(&self, suffix: &str) -> Result<Vec<String>, StoreError> {
        let mut out = Vec::new();
        self.walk_files(&self.root, suffix, &mut out)?;
        out.sort();
        Ok(out)
    }

    async fn read(&self, path: &str) -> Result<String, StoreError> {
        let abs = self.resolve(path)?;
        std::fs::read_to_string(&abs).map_err(|e| StoreError::io(abs, e))
    }

    async fn write(&self, path: &str, content: &str) -> Result<(), StoreError> {
        let abs = self.resolve(path)?;
        if let Some(parent) = abs.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        std::fs::write(&abs, content).map_err(|e| StoreError::io(abs, e))
    }

    async fn rename(&self, src: &str, dst: &str) -> Result<(), StoreError> {
        let abs_src = self.resolve(src)?;
        let abs_dst = self.resolve(dst)?;
        if let Some(parent) = abs_dst.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        std::fs::rename(&abs_src, &abs_dst).map_err(|e| StoreError::io(abs_src, e))
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        let abs = self.resolve(path)?;
        std::fs::remove_file(&abs).map_err(|e| StoreError::io(abs, e))
    }

    async fn mkdir(&self, path: &str) -> Result<(), StoreError> {
        let abs = self.resolve(path)?;
        std::fs::create_dir_all(&abs).map_err(|e| StoreError::io(abs, e))
    }

    async fn exists(&self, path: &str) -> bool {
        self.resolve(path).map(|abs| abs.exists()).unwrap_or(false)
    }

    async fn metadata(&self, path: &str) -> Result<DocumentMeta, StoreError> {
        let abs = self.resolve(path)?;
        let meta = std::fs::metadata(&abs).map_err(|e| StoreError::io(&abs, e))?;
        let modified: DateTime<Utc> = meta
            .modified()
            .map_err(|e| StoreError::io(&abs, e))?
            .into();
        Ok(DocumentMeta {
            size: meta.len(),
            modified,
        })
    }

    async fn remove_empty_dirs(&self) -> Result<usize, StoreError> {
        let mut removed = 0;
        Self::sweep_empty(&self.root, &self.root, &mut removed)?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, FsStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::open(dir.path().join("kb")).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn write_read_roundtrip_creates_parents() {
        let (_dir, store) = store();
        store.write("technical/ml/intro.txt", "hello").await.unwrap();
        assert_eq!(store.read("technical/ml/intro.txt").await.unwrap(), "hello");
        assert!(store.exists("technical/ml/intro.txt").await);
    }

    #[tokio::test]
    async fn list_is_recursive_and_sorted() {
        let (_dir, store) = store();
        store.write("b/two.txt", "2").await.unwrap();
        store.write("a/one.txt", "1").await.unwrap();
        store.write("a/skip.md", "x").await.unwrap();
        store.write("root.txt", "0").await.unwrap();

        let listed = store.list(".txt").await.unwrap();
        assert_eq!(listed, vec!["a/one.txt", "b/two.txt", "root.txt"]);
    }

    #[tokio::test]
    async fn rename_moves_across_directories() {
        let (_dir, store) = store();
        store.write("inbox/doc.txt", "content").await.unwrap();
        store.rename("inbox/doc.txt", "technical/ml/doc.txt").await.unwrap();
        assert!(!store.exists("inbox/doc.txt").await);
        assert_eq!(store.read("technical/ml/doc.txt").await.unwrap(), "content");
    }

    #[tokio::test]
    async fn delete_removes_file() {
        let (_dir, store) = store();
        store.write("doc.txt", "x").await.unwrap();
        store.delete("doc.txt").await.unwrap();
        assert!(!store.exists("doc.txt").await);
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let (_dir, store) = store();
        let err = store.read("../outside.txt").await.unwrap_err();
        assert!(matches!(err, StoreError::OutsideRoot(_)));
        let err = store.write("/abs.txt", "x").await.unwrap_err();
        assert!(matches!(err, StoreError::OutsideRoot(_)));
    }

    #[tokio::test]
    async fn metadata_reports_size() {
        let (_dir, store) = store();
        store.write("doc.txt", "12345").await.unwrap();
        let meta = store.metadata("doc.txt").await.unwrap();
        assert_eq!(meta.size, 5);
    }

    #[tokio::test]
    async fn sweep_removes_nested_empty_dirs() {
        let (_dir, store) = store();
        store.mkdir("empty/nested/deep").await.unwrap();
        store.write("kept/doc.txt", "x").await.unwrap();

        let removed = store.remove_empty_dirs().await.unwrap();
        assert_eq!(removed, 3);
        assert!(!store.exists("empty").await);
        assert!(store.exists("kept/doc.txt").await);
    }

    #[tokio::test]
    async fn missing_file_errors_with_path() {
        let (_dir, store) = store();
        let err = store.read("absent.txt").await.unwrap_err();
        assert!(err.to_string().contains("absent.txt"));
    }
}
