//! File-backed storage.
//!
//! All keys live in one JSON object on disk. Every read goes to the file, and
//! every write re-reads it, applies one key change and rewrites it
//! (temp file + rename). Instances sharing a path therefore see each other's
//! keys, and the last writer wins per key.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tracing::{debug, info, warn};

use crate::error::{CoreError, Result};
use crate::storage::Storage;

type Document = BTreeMap<String, String>;

/// Distinguishes temp files of concurrent writers in one process
static FLUSH_SEQ: AtomicU64 = AtomicU64::new(0);

/// Persistent storage kept in a single JSON document.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Opens the storage file at `path`.
    ///
    /// A missing file reads as empty. An unreadable or corrupt file also
    /// reads as empty and is replaced on the next write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = read_document(&path)?;

        info!("Opened storage file {} ({} keys)", path.display(), values.len());

        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, values: &Document) -> Result<()> {
        let raw =
            serde_json::to_string_pretty(values).map_err(|e| CoreError::Storage(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| CoreError::Storage(e.to_string()))?;
            }
        }

        let seq = FLUSH_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = self
            .path
            .with_extension(format!("{}-{}.tmp", std::process::id(), seq));
        fs::write(&tmp, raw).map_err(|e| CoreError::Storage(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| CoreError::Storage(e.to_string()))?;

        debug!("Flushed {} keys to {}", values.len(), self.path.display());
        Ok(())
    }

    fn mutate(&self, apply: impl FnOnce(&mut Document)) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| CoreError::Storage("storage lock poisoned".to_string()))?;

        let mut values = read_document(&self.path)?;
        apply(&mut values);
        self.flush(&values)
    }
}

fn read_document(path: &Path) -> Result<Document> {
    match fs::read_to_string(path) {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(values) => Ok(values),
            Err(err) => {
                warn!("Storage file {} is corrupt, reading as empty: {}", path.display(), err);
                Ok(Document::new())
            }
        },
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(Document::new()),
        Err(err) => Err(CoreError::Storage(err.to_string())),
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        match read_document(&self.path) {
            Ok(mut values) => values.remove(key),
            Err(err) => {
                warn!("Failed to read storage file {}: {}", self.path.display(), err);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.mutate(|values| {
            values.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.mutate(|values| {
            values.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");

        {
            let storage = FileStorage::open(&path).unwrap();
            storage.set("openpart_favorites", "[]").unwrap();
            storage.set("theme", "dark").unwrap();
            storage.remove("theme").unwrap();
        }

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get("openpart_favorites").as_deref(), Some("[]"));
        assert!(reopened.get("theme").is_none());
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::open(dir.path().join("nested/storage.json")).unwrap();

        assert!(storage.get("anything").is_none());
        storage.set("k", "v").unwrap();
        assert!(storage.path().exists());
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json").unwrap();

        let storage = FileStorage::open(&path).unwrap();
        assert!(storage.get("k").is_none());

        storage.set("k", "v").unwrap();
        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_instances_sharing_a_file_keep_each_others_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        let a = FileStorage::open(&path).unwrap();
        let b = FileStorage::open(&path).unwrap();

        a.set("openpart_favorites", r#"[{"id":1}]"#).unwrap();
        assert_eq!(b.get("openpart_favorites").as_deref(), Some(r#"[{"id":1}]"#));

        b.set("openpart_comparison", "[]").unwrap();
        assert_eq!(a.get("openpart_favorites").as_deref(), Some(r#"[{"id":1}]"#));
        assert_eq!(a.get("openpart_comparison").as_deref(), Some("[]"));

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get("openpart_favorites").as_deref(), Some(r#"[{"id":1}]"#));
        assert_eq!(reopened.get("openpart_comparison").as_deref(), Some("[]"));
    }

    #[test]
    fn test_same_key_last_writer_wins() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        let a = FileStorage::open(&path).unwrap();
        let b = FileStorage::open(&path).unwrap();

        a.set("openpart_favorites", "[1]").unwrap();
        b.set("openpart_favorites", "[2]").unwrap();

        assert_eq!(a.get("openpart_favorites").as_deref(), Some("[2]"));
        b.remove("openpart_favorites").unwrap();
        assert!(a.get("openpart_favorites").is_none());
    }
}
