//! Storage Module
//!
//! Synchronous string key-value storage shared by every persisted list and
//! history. JSON (de)serialization and corruption recovery live here so each
//! consumer gets the same behavior.

mod file;
mod memory;

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::error::{CoreError, Result};

pub use file::FileStorage;
pub use memory::MemoryStorage;

// == Storage Trait ==
/// Origin-scoped key-value storage over strings.
pub trait Storage: Send + Sync {
    /// Returns the stored string, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

// == JSON Helpers ==
/// Reads and parses the JSON value stored under `key`.
///
/// A value that fails to parse is discarded from storage and reported as
/// absent; the parse error never reaches the caller.
pub fn load_json<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<T> {
    let raw = storage.get(key)?;

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("Discarding corrupt value under '{}': {}", key, err);
            if let Err(remove_err) = storage.remove(key) {
                warn!("Failed to remove corrupt value under '{}': {}", key, remove_err);
            }
            None
        }
    }
}

/// Serializes `value` as JSON and stores it under `key`.
pub fn save_json<T: Serialize + ?Sized>(storage: &dyn Storage, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value).map_err(|e| CoreError::Storage(e.to_string()))?;
    storage.set(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_json_absent() {
        let storage = MemoryStorage::new();
        let value: Option<Vec<u32>> = load_json(&storage, "missing");
        assert!(value.is_none());
    }

    #[test]
    fn test_save_then_load() {
        let storage = MemoryStorage::new();
        save_json(&storage, "numbers", &vec![1, 2, 3]).unwrap();

        let value: Option<Vec<u32>> = load_json(&storage, "numbers");
        assert_eq!(value, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_corrupt_value_is_discarded() {
        let storage = MemoryStorage::new();
        storage.set("numbers", "{not json").unwrap();

        let value: Option<Vec<u32>> = load_json(&storage, "numbers");

        assert!(value.is_none());
        assert!(storage.get("numbers").is_none(), "corrupt value should be removed");
    }

    #[test]
    fn test_wrong_shape_is_discarded() {
        let storage = MemoryStorage::new();
        storage.set("numbers", r#"{"a": 1}"#).unwrap();

        let value: Option<Vec<u32>> = load_json(&storage, "numbers");

        assert!(value.is_none());
        assert!(storage.get("numbers").is_none());
    }
}
