//! Bounded List Manager
//!
//! A capacity-limited, id-deduplicated list of part references persisted
//! under one storage key. Every successful mutation writes the whole list
//! back and publishes the new snapshot on the change bus.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::current_timestamp_ms;
use crate::error::{CoreError, Result};
use crate::lists::transfer::{parse_document, ExportDocument};
use crate::lists::{ChangeBus, ListItem, PartRef, RawId};
use crate::storage::{load_json, save_json, Storage};

/// Minimum number of parts for a compatibility check
const MIN_CHECK_PARTS: usize = 2;

// == Operation Results ==
/// Result of `add`, `remove` and `clear`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ListUpdate {
    /// List length after the operation
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    Added,
    Removed,
}

/// Result of `toggle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToggleOutcome {
    pub action: ToggleAction,
    pub count: usize,
}

/// Result of `add_many`. Partial progress is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub added: usize,
    pub skipped: usize,
    pub count: usize,
    pub errors: Vec<String>,
}

/// Result of `import_list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    pub imported: usize,
    pub skipped: usize,
    pub count: usize,
}

/// Overview used by list badges and the compatibility page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListSummary {
    pub count: usize,
    pub can_check: bool,
    pub max_reached: bool,
    pub categories: Vec<String>,
    pub part_ids: Vec<i64>,
}

// == Bounded List ==
/// Persisted, deduplicated, capacity-limited list of parts.
#[derive(Clone)]
pub struct BoundedList {
    key: String,
    max_items: usize,
    storage: Arc<dyn Storage>,
    bus: ChangeBus,
    /// Serializes read-modify-write cycles within this process
    write_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for BoundedList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedList")
            .field("key", &self.key)
            .field("max_items", &self.max_items)
            .finish()
    }
}

impl BoundedList {
    // == Constructor ==
    /// Creates a manager for the list stored under `key`.
    pub fn new(
        key: impl Into<String>,
        max_items: usize,
        storage: Arc<dyn Storage>,
        bus: ChangeBus,
    ) -> Self {
        Self {
            key: key.into(),
            max_items,
            storage,
            bus,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    // == Reads ==
    /// Current list contents. Corrupt stored data reads as an empty list.
    pub fn list(&self) -> Vec<ListItem> {
        load_json(self.storage.as_ref(), &self.key).unwrap_or_default()
    }

    /// True if an item with the normalized `id` is in the list.
    pub fn contains(&self, id: impl Into<RawId>) -> bool {
        match id.into().normalize() {
            Ok(id) => self.list().iter().any(|item| item.id == id),
            Err(_) => false,
        }
    }

    pub fn count(&self) -> usize {
        self.list().len()
    }

    // == Add ==
    /// Appends a part.
    ///
    /// Fails with `AlreadyPresent` if its normalized id is already listed and
    /// with `CapacityExceeded` if the list is full.
    pub fn add(&self, part: &PartRef) -> Result<ListUpdate> {
        let _guard = self.lock();
        self.add_unlocked(part)
    }

    fn add_unlocked(&self, part: &PartRef) -> Result<ListUpdate> {
        let mut items = self.list();
        let item = ListItem::from_part(part, current_timestamp_ms())?;

        if items.iter().any(|existing| existing.id == item.id) {
            return Err(CoreError::AlreadyPresent(item.id));
        }
        if items.len() >= self.max_items {
            return Err(CoreError::CapacityExceeded {
                max: self.max_items,
            });
        }

        debug!("Adding part {} to '{}'", item.id, self.key);
        items.push(item);
        self.persist(&items)?;

        Ok(ListUpdate { count: items.len() })
    }

    // == Remove ==
    /// Removes the item with the normalized `id`, failing with `NotPresent`
    /// if there is none.
    pub fn remove(&self, id: impl Into<RawId>) -> Result<ListUpdate> {
        let _guard = self.lock();
        self.remove_unlocked(id.into().normalize()?)
    }

    fn remove_unlocked(&self, id: i64) -> Result<ListUpdate> {
        let mut items = self.list();
        let before = items.len();

        items.retain(|item| item.id != id);
        if items.len() == before {
            return Err(CoreError::NotPresent(id));
        }

        debug!("Removed part {} from '{}'", id, self.key);
        self.persist(&items)?;

        Ok(ListUpdate { count: items.len() })
    }

    // == Clear ==
    /// Drops the persisted list and publishes an empty snapshot.
    pub fn clear(&self) -> Result<ListUpdate> {
        let _guard = self.lock();
        self.storage.remove(&self.key)?;
        self.bus.publish(&self.key, &[]);

        info!("Cleared list '{}'", self.key);
        Ok(ListUpdate { count: 0 })
    }

    // == Toggle ==
    /// Removes the part if listed, adds it otherwise.
    pub fn toggle(&self, part: &PartRef) -> Result<ToggleOutcome> {
        let _guard = self.lock();
        let id = part.id.normalize()?;

        if self.list().iter().any(|item| item.id == id) {
            let update = self.remove_unlocked(id)?;
            Ok(ToggleOutcome {
                action: ToggleAction::Removed,
                count: update.count,
            })
        } else {
            let update = self.add_unlocked(part)?;
            Ok(ToggleOutcome {
                action: ToggleAction::Added,
                count: update.count,
            })
        }
    }

    // == Add Many ==
    /// Adds parts in order, skipping ones already listed and stopping at
    /// capacity. Parts added before the stop stay added.
    pub fn add_many(&self, parts: &[PartRef]) -> Result<BatchOutcome> {
        if parts.is_empty() {
            return Err(CoreError::InvalidRequest(
                "no parts were provided".to_string(),
            ));
        }

        let _guard = self.lock();
        let mut items = self.list();
        let now = current_timestamp_ms();
        let mut outcome = BatchOutcome {
            added: 0,
            skipped: 0,
            count: items.len(),
            errors: Vec::new(),
        };

        for part in parts {
            let item = match ListItem::from_part(part, now) {
                Ok(item) => item,
                Err(err) => {
                    outcome.errors.push(err.to_string());
                    continue;
                }
            };

            if items.iter().any(|existing| existing.id == item.id) {
                outcome.skipped += 1;
                continue;
            }

            if items.len() >= self.max_items {
                outcome.errors.push(format!(
                    "Reached the limit of {} parts, remaining parts were not added",
                    self.max_items
                ));
                break;
            }

            items.push(item);
            outcome.added += 1;
        }

        if outcome.added > 0 {
            self.persist(&items)?;
        }
        outcome.count = items.len();

        info!(
            "Batch add to '{}': {} added, {} skipped",
            self.key, outcome.added, outcome.skipped
        );
        Ok(outcome)
    }

    // == Summary ==
    pub fn summary(&self) -> ListSummary {
        let items = self.list();
        let mut seen = HashSet::new();
        let categories = items
            .iter()
            .filter_map(|item| item.category.clone())
            .filter(|category| !category.is_empty() && seen.insert(category.clone()))
            .collect();

        ListSummary {
            count: items.len(),
            can_check: items.len() >= MIN_CHECK_PARTS,
            max_reached: items.len() >= self.max_items,
            categories,
            part_ids: items.iter().map(|item| item.id).collect(),
        }
    }

    /// Link to the compatibility page for the listed parts, once there are
    /// enough of them to compare.
    pub fn check_url(&self) -> Option<String> {
        let items = self.list();
        if items.len() < MIN_CHECK_PARTS {
            return None;
        }

        let ids: Vec<String> = items.iter().map(|item| item.id.to_string()).collect();
        Some(format!("/compatibility?parts={}", ids.join(",")))
    }

    // == Export / Import ==
    /// Serializes the current list for download. An empty list has nothing
    /// to export.
    pub fn export_list(&self) -> Result<ExportDocument> {
        let items = self.list();
        if items.is_empty() {
            return Err(CoreError::EmptyList);
        }
        ExportDocument::new(&self.key, &items)
    }

    /// Merges an exported document into the list.
    ///
    /// Every record is validated first. Records whose id is already listed
    /// (or repeated within the document) are skipped. If the merged list
    /// would exceed capacity nothing is written.
    pub fn import_list(&self, data: &str) -> Result<ImportOutcome> {
        let imported = parse_document(data, current_timestamp_ms())?;

        let _guard = self.lock();
        let mut items = self.list();
        let mut ids: HashSet<i64> = items.iter().map(|item| item.id).collect();
        let mut added = 0;
        let mut skipped = 0;

        for item in imported {
            if ids.insert(item.id) {
                items.push(item);
                added += 1;
            } else {
                skipped += 1;
            }
        }

        if items.len() > self.max_items {
            warn!(
                "Import into '{}' rejected: {} parts exceeds limit {}",
                self.key,
                items.len(),
                self.max_items
            );
            return Err(CoreError::CapacityExceeded {
                max: self.max_items,
            });
        }

        if added > 0 {
            self.persist(&items)?;
        }

        info!("Imported {} parts into '{}'", added, self.key);
        Ok(ImportOutcome {
            imported: added,
            skipped,
            count: items.len(),
        })
    }

    // == Internals ==
    fn persist(&self, items: &[ListItem]) -> Result<()> {
        save_json(self.storage.as_ref(), &self.key, items)?;
        self.bus.publish(&self.key, items);
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
