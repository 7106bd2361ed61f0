//! In-process storage backend.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{CoreError, Result};
use crate::storage::Storage;

/// Storage held in a process-local map.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .write()
            .map_err(|_| CoreError::Storage("storage lock poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self
            .values
            .write()
            .map_err(|_| CoreError::Storage("storage lock poisoned".to_string()))?;
        values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());

        storage.set("theme", "dark").unwrap();
        assert_eq!(storage.get("theme").as_deref(), Some("dark"));

        storage.set("theme", "light").unwrap();
        assert_eq!(storage.get("theme").as_deref(), Some("light"));
        assert_eq!(storage.len(), 1);

        storage.remove("theme").unwrap();
        assert!(storage.get("theme").is_none());
    }

    #[test]
    fn test_remove_absent_is_ok() {
        let storage = MemoryStorage::new();
        assert!(storage.remove("nothing").is_ok());
    }
}
