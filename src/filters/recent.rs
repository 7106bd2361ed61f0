//! Recent Filters
//!
//! Most-recent-first history of applied filter sets, deduplicated by
//! structural hash and capped in length.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::current_timestamp_ms;
use crate::error::Result;
use crate::filters::{describe, has_active_filters, structural_hash, FieldMetadata, FilterSet};
use crate::storage::{load_json, save_json, Storage};

pub const RECENT_FILTERS_KEY: &str = "openpart_recent_filters";

/// One remembered filter set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentFilter {
    pub filters: FilterSet,
    pub description: String,
    pub hash: String,
    /// Unix milliseconds
    pub saved_at: u64,
}

#[derive(Clone)]
pub struct RecentFilters {
    key: String,
    max_items: usize,
    storage: Arc<dyn Storage>,
    write_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for RecentFilters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecentFilters")
            .field("key", &self.key)
            .field("max_items", &self.max_items)
            .finish()
    }
}

impl RecentFilters {
    pub fn new(storage: Arc<dyn Storage>, max_items: usize) -> Self {
        Self::with_key(RECENT_FILTERS_KEY, storage, max_items)
    }

    pub fn with_key(key: impl Into<String>, storage: Arc<dyn Storage>, max_items: usize) -> Self {
        Self {
            key: key.into(),
            max_items,
            storage,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// History, most recent first. Corrupt history reads as empty.
    pub fn list(&self) -> Vec<RecentFilter> {
        load_json(self.storage.as_ref(), &self.key).unwrap_or_default()
    }

    /// Puts `filters` at the front of the history, dropping an earlier entry
    /// with the same constraints. Inactive sets are not recorded.
    pub fn record(&self, filters: &FilterSet, meta: &FieldMetadata) -> Result<Option<RecentFilter>> {
        if !has_active_filters(filters) || self.max_items == 0 {
            return Ok(None);
        }

        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let entry = RecentFilter {
            filters: filters.normalized(),
            description: describe(filters, meta),
            hash: structural_hash(filters),
            saved_at: current_timestamp_ms(),
        };

        let mut history = self.list();
        history.retain(|existing| existing.hash != entry.hash);
        history.insert(0, entry.clone());
        history.truncate(self.max_items);

        save_json(self.storage.as_ref(), &self.key, &history)?;
        debug!("Recorded filter set {} ({} in history)", entry.hash, history.len());

        Ok(Some(entry))
    }

    pub fn clear(&self) -> Result<()> {
        self.storage.remove(&self.key)
    }
}
