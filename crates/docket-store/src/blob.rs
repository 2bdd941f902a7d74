//! Filesystem blob store for uploaded document content
//!
//! Documents land under `<root>/documents/` with a timestamped name and are
//! addressed by an opaque `/files/<name>` locator. The HTTP layer serves
//! the same directory under `/files`, so a locator doubles as the URL the
//! client fetches the original file from.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, warn};

/// Prefix every locator starts with
pub const LOCATOR_PREFIX: &str = "/files/";

/// Errors that can occur storing or deleting blobs
#[derive(Error, Debug)]
pub enum BlobError {
    /// Filesystem error
    #[error("blob store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Locator does not address this store
    #[error("invalid blob locator: {0}")]
    InvalidLocator(String),
}

/// Stores document content on the local filesystem
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    /// Create a store rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the blobs live in, for static file serving
    pub fn documents_dir(&self) -> PathBuf {
        self.root.join("documents")
    }

    /// Write one uploaded file, returning its locator
    ///
    /// The stored name is `<millis>-<sanitized original name>`; the
    /// timestamp keeps repeated uploads of the same file distinct.
    pub fn store(&self, file_name: &str, bytes: &[u8]) -> Result<String, BlobError> {
        let dir = self.documents_dir();
        fs::create_dir_all(&dir)?;

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let stored_name = format!("{millis}-{}", sanitize_file_name(file_name));
        fs::write(dir.join(&stored_name), bytes)?;

        debug!(file_name, stored_name, bytes = bytes.len(), "blob stored");
        Ok(format!("{LOCATOR_PREFIX}{stored_name}"))
    }

    /// Delete the blob behind a locator
    ///
    /// A locator whose file is already gone is not an error; deletion is
    /// used for compensation and cascades, both of which may run twice.
    pub fn delete(&self, locator: &str) -> Result<(), BlobError> {
        let name = locator
            .strip_prefix(LOCATOR_PREFIX)
            .ok_or_else(|| BlobError::InvalidLocator(locator.to_string()))?;
        if name.is_empty() || name.contains('/') || name.contains('\\') {
            return Err(BlobError::InvalidLocator(locator.to_string()));
        }

        let path = self.documents_dir().join(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(locator, "blob already absent on delete");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve a locator to its on-disk path without touching the filesystem
    pub fn path_for(&self, locator: &str) -> Result<PathBuf, BlobError> {
        let name = locator
            .strip_prefix(LOCATOR_PREFIX)
            .ok_or_else(|| BlobError::InvalidLocator(locator.to_string()))?;
        if name.is_empty() || name.contains('/') || name.contains('\\') {
            return Err(BlobError::InvalidLocator(locator.to_string()));
        }
        Ok(self.documents_dir().join(name))
    }
}

/// Reduce an uploaded file name to a safe basename
///
/// Takes the basename only and keeps alphanumerics plus a small allow-set
/// of punctuation, so a hostile filename header cannot traverse paths.
fn sanitize_file_name(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("document");
    let safe: String = base
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | ' '))
        .collect();
    let safe = safe.trim().to_string();
    if safe.is_empty() {
        "document".to_string()
    } else {
        safe
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, FileBlobStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBlobStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_store_and_delete_round_trip() {
        let (_dir, store) = temp_store();

        let locator = store.store("complaint.pdf", b"%PDF-1.7").unwrap();
        assert!(locator.starts_with("/files/"));
        assert!(locator.ends_with("-complaint.pdf"));

        let path = store.path_for(&locator).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"%PDF-1.7");

        store.delete(&locator).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (_dir, store) = temp_store();
        let locator = store.store("a.txt", b"text").unwrap();

        store.delete(&locator).unwrap();
        store.delete(&locator).unwrap();
    }

    #[test]
    fn test_hostile_file_names_cannot_traverse() {
        let (_dir, store) = temp_store();

        let locator = store.store("../../etc/passwd", b"nope").unwrap();
        assert!(locator.starts_with("/files/"));
        assert!(locator.ends_with("-etcpasswd") || locator.ends_with("-passwd"));

        let path = store.path_for(&locator).unwrap();
        assert!(path.starts_with(store.documents_dir()));
    }

    #[test]
    fn test_foreign_locator_is_rejected() {
        let (_dir, store) = temp_store();
        assert!(matches!(
            store.delete("/elsewhere/file"),
            Err(BlobError::InvalidLocator(_))
        ));
        assert!(matches!(
            store.delete("/files/nested/name"),
            Err(BlobError::InvalidLocator(_))
        ));
    }

    #[test]
    fn test_empty_file_name_gets_default() {
        let (_dir, store) = temp_store();
        let locator = store.store("///", b"x").unwrap();
        assert!(locator.ends_with("-document"));
    }
}
