//! Cache Store Module
//!
//! Keyed memo store with fixed-TTL expiry. Expired entries are dropped lazily
//! on `get` and proactively by `cleanup`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheEntry, CacheStats, DEFAULT_TTL};

/// Cache shared between handlers and the cleanup task.
pub type SharedCache<V> = Arc<RwLock<TtlCache<V>>>;

// == TTL Cache ==
/// Generic key → value store whose entries expire a fixed TTL after `set`.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: HashMap<String, CacheEntry<V>>,
    stats: CacheStats,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    // == Constructor ==
    /// Creates an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            ttl,
        }
    }

    /// Wraps the cache for sharing across tasks.
    pub fn shared(ttl: Duration) -> SharedCache<V> {
        Arc::new(RwLock::new(Self::new(ttl)))
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any existing entry and resetting its expiry.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        self.entries.insert(key.into(), CacheEntry::new(value, self.ttl));
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Returns the value if present and not expired.
    ///
    /// An expired entry is removed on the spot, so a later `get` cannot
    /// resurrect it.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = current_timestamp_ms();

        match self.entries.get(key) {
            Some(entry) if !entry.is_expired_at(now) => {
                let value = entry.value.clone();
                self.stats.record_hit();
                Some(value)
            }
            Some(_) => {
                self.entries.remove(key);
                self.stats.record_expirations(1);
                self.stats.set_total_entries(self.entries.len());
                self.stats.record_miss();
                None
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Cleanup ==
    /// Removes every expired entry. Returns the number removed.
    pub fn cleanup(&mut self) -> usize {
        let now = current_timestamp_ms();
        let before = self.entries.len();

        self.entries.retain(|_, entry| !entry.is_expired_at(now));

        let removed = before - self.entries.len();
        self.stats.record_expirations(removed);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Clear ==
    /// Unconditionally empties the cache.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.set_total_entries(0);
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Number of stored entries, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

// == Key Derivation ==
/// Builds an order-independent key for a set of identifiers.
///
/// `[3, 1, 2]`, `[1, 2, 3]` and `[2, 3, 1, 1]` all map to `"1,2,3"`.
pub fn make_key(ids: &[i64]) -> String {
    let mut sorted = ids.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn short_cache() -> TtlCache<String> {
        TtlCache::new(Duration::from_millis(50))
    }

    #[test]
    fn test_cache_new() {
        let cache: TtlCache<String> = TtlCache::default();
        assert!(cache.is_empty());
        assert_eq!(cache.ttl(), Duration::from_secs(300));
    }

    #[test]
    fn test_set_and_get() {
        let mut cache = TtlCache::new(Duration::from_secs(60));

        cache.set("search:cpu", "results".to_string());

        assert_eq!(cache.get("search:cpu"), Some("results".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_absent() {
        let mut cache = short_cache();
        assert_eq!(cache.get("nothing"), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_overwrite() {
        let mut cache = TtlCache::new(Duration::from_secs(60));

        cache.set("k", 1);
        cache.set("k", 2);

        assert_eq!(cache.get("k"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_expired_entry_is_evicted_on_get() {
        let mut cache = short_cache();
        cache.set("k", "v".to_string());

        sleep(Duration::from_millis(80));

        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty(), "expired entry should be removed by get");
        assert_eq!(cache.get("k"), None);

        let stats = cache.stats();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.misses, 2);
    }

    #[test]
    fn test_cleanup_removes_only_expired() {
        let mut cache = short_cache();
        cache.set("old", "v".to_string());

        sleep(Duration::from_millis(80));
        cache.set("fresh", "v".to_string());

        assert_eq!(cache.cleanup(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("fresh").is_some());
    }

    #[test]
    fn test_clear() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        cache.set("a", 1);
        cache.set("b", 2);

        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_make_key_is_order_independent() {
        assert_eq!(make_key(&[3, 1, 2]), "1,2,3");
        assert_eq!(make_key(&[3, 1, 2]), make_key(&[2, 3, 1]));
        assert_eq!(make_key(&[10, 9]), "9,10");
        assert_eq!(make_key(&[]), "");
    }

    #[test]
    fn test_make_key_ignores_repeated_ids() {
        assert_eq!(make_key(&[1, 1, 2]), make_key(&[1, 2]));
        assert_eq!(make_key(&[2, 1, 2, 1]), "1,2");
    }
}
