//! List Kinds
//!
//! The three lists the portal keeps: comparison targets, favorites and the
//! compatibility-check candidates.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use crate::config::Config;
use crate::error::CoreError;
use crate::lists::{BoundedList, ChangeBus};
use crate::storage::Storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Comparison,
    Favorites,
    CompatibilityCheck,
}

impl ListKind {
    pub const ALL: [ListKind; 3] = [
        ListKind::Comparison,
        ListKind::Favorites,
        ListKind::CompatibilityCheck,
    ];

    /// Storage key the list persists under.
    pub fn storage_key(self) -> &'static str {
        match self {
            ListKind::Comparison => "openpart_comparison",
            ListKind::Favorites => "openpart_favorites",
            ListKind::CompatibilityCheck => "openpart_compatibility_check",
        }
    }

    /// Path segment used by the HTTP API.
    pub fn slug(self) -> &'static str {
        match self {
            ListKind::Comparison => "comparison",
            ListKind::Favorites => "favorites",
            ListKind::CompatibilityCheck => "compatibility",
        }
    }

    pub fn max_items(self, config: &Config) -> usize {
        match self {
            ListKind::Comparison => config.comparison_max_items,
            ListKind::Favorites => config.favorites_max_items,
            ListKind::CompatibilityCheck => config.compatibility_max_items,
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ListKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ListKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| CoreError::InvalidRequest(format!("Unknown list '{}'", s)))
    }
}

// == List Registry ==
/// One manager per list kind over a shared storage and change bus.
#[derive(Debug, Clone)]
pub struct ListRegistry {
    comparison: BoundedList,
    favorites: BoundedList,
    compatibility_check: BoundedList,
    bus: ChangeBus,
}

impl ListRegistry {
    pub fn new(storage: Arc<dyn Storage>, bus: ChangeBus, config: &Config) -> Self {
        let build = |kind: ListKind| {
            BoundedList::new(
                kind.storage_key(),
                kind.max_items(config),
                storage.clone(),
                bus.clone(),
            )
        };

        Self {
            comparison: build(ListKind::Comparison),
            favorites: build(ListKind::Favorites),
            compatibility_check: build(ListKind::CompatibilityCheck),
            bus,
        }
    }

    pub fn get(&self, kind: ListKind) -> &BoundedList {
        match kind {
            ListKind::Comparison => &self.comparison,
            ListKind::Favorites => &self.favorites,
            ListKind::CompatibilityCheck => &self.compatibility_check,
        }
    }

    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lists::PartRef;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_kind_from_slug() {
        assert_eq!("favorites".parse::<ListKind>().unwrap(), ListKind::Favorites);
        assert_eq!(
            "compatibility".parse::<ListKind>().unwrap(),
            ListKind::CompatibilityCheck
        );
        assert!("wishlist".parse::<ListKind>().is_err());
    }

    #[test]
    fn test_registry_uses_configured_limits() {
        let config = Config::default();
        let registry = ListRegistry::new(Arc::new(MemoryStorage::new()), ChangeBus::new(), &config);

        assert_eq!(registry.get(ListKind::Comparison).max_items(), 4);
        assert_eq!(registry.get(ListKind::Favorites).max_items(), 100);
        assert_eq!(registry.get(ListKind::CompatibilityCheck).max_items(), 10);
        assert_eq!(
            registry.get(ListKind::CompatibilityCheck).key(),
            "openpart_compatibility_check"
        );
    }

    #[test]
    fn test_registry_lists_are_independent() {
        let registry = ListRegistry::new(
            Arc::new(MemoryStorage::new()),
            ChangeBus::new(),
            &Config::default(),
        );

        registry
            .get(ListKind::Favorites)
            .add(&PartRef::new(1, "A"))
            .unwrap();

        assert_eq!(registry.get(ListKind::Favorites).count(), 1);
        assert_eq!(registry.get(ListKind::Comparison).count(), 0);
    }

    #[test]
    fn test_registry_bus_reaches_watchers() {
        let registry = ListRegistry::new(
            Arc::new(MemoryStorage::new()),
            ChangeBus::new(),
            &Config::default(),
        );
        let mut watcher = registry.bus().watch(ListKind::Comparison.storage_key());

        registry
            .get(ListKind::Favorites)
            .add(&PartRef::new(1, "A"))
            .unwrap();
        registry
            .get(ListKind::Comparison)
            .add(&PartRef::new(2, "B"))
            .unwrap();

        let snapshot = watcher.latest().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, 2);
    }
}
