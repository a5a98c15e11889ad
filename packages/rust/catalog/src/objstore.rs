//! Object storage for uploaded spreadsheets and entry attachments.
//!
//! The trait keeps the service layer independent of where bytes live; the
//! shipped implementation is a plain directory tree. Keys are relative
//! slash-separated paths like `dbs/registry.xlsx` or
//! `entries/YPS-001/summary.pdf`.

use std::path::{Path, PathBuf};

use polidoc_shared::{PolidocError, Result};

/// Blob storage seam.
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key`, replacing any existing object.
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Whether an object exists under `key`.
    fn exists(&self, key: &str) -> Result<bool>;

    /// Remove the object under `key`. Missing objects are not an error.
    fn delete(&self, key: &str) -> Result<()>;

    /// Public URL the object is served from.
    fn public_url(&self, key: &str) -> String;
}

/// Object key for an uploaded spreadsheet.
pub fn spreadsheet_key(filename: &str) -> String {
    format!("dbs/{filename}")
}

/// Object key for a file attached to a catalog entry.
pub fn attachment_key(item_id: &str, filename: &str) -> String {
    format!("entries/{item_id}/{filename}")
}

/// Filesystem-backed object store rooted at a directory.
pub struct LocalObjectStore {
    root: PathBuf,
    public_url_prefix: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_url_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_url_prefix: public_url_prefix.into(),
        }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        // Keys are internal, but reject traversal outright anyway.
        if key.is_empty()
            || Path::new(key).is_absolute()
            || key.split('/').any(|part| part.is_empty() || part == "..")
        {
            return Err(PolidocError::ObjectStore(format!(
                "invalid object key {key:?}"
            )));
        }
        Ok(self.root.join(key))
    }
}

impl ObjectStore for LocalObjectStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PolidocError::io(parent, e))?;
        }
        std::fs::write(&path, bytes).map_err(|e| PolidocError::io(&path, e))?;
        tracing::debug!(key, bytes = bytes.len(), "stored object");
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.resolve(key)?.exists())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.resolve(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PolidocError::io(&path, e)),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}{key}", self.public_url_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn test_store() -> LocalObjectStore {
        let root = std::env::temp_dir().join(format!("polidoc_objects_{}", Uuid::now_v7()));
        LocalObjectStore::new(root, "https://files.polidoc.local/")
    }

    #[test]
    fn put_exists_delete_cycle() {
        let store = test_store();
        let key = spreadsheet_key("registry.xlsx");

        assert!(!store.exists(&key).expect("exists"));
        store.put(&key, b"workbook bytes").expect("put");
        assert!(store.exists(&key).expect("exists"));

        store.put(&key, b"replaced").expect("overwrite");
        store.delete(&key).expect("delete");
        assert!(!store.exists(&key).expect("exists"));
        // Deleting again is fine
        store.delete(&key).expect("delete missing");
    }

    #[test]
    fn keys_and_urls() {
        let store = test_store();
        assert_eq!(spreadsheet_key("db.xlsx"), "dbs/db.xlsx");
        assert_eq!(
            attachment_key("YPS-001", "summary.pdf"),
            "entries/YPS-001/summary.pdf"
        );
        assert_eq!(
            store.public_url("dbs/db.xlsx"),
            "https://files.polidoc.local/dbs/db.xlsx"
        );
    }

    #[test]
    fn traversal_keys_are_rejected() {
        let store = test_store();
        for key in ["../escape", "a//b", "/abs", ""] {
            assert!(store.put(key, b"x").is_err(), "key {key:?} accepted");
        }
    }
}
