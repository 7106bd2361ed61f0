//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// TTL in seconds for search and compatibility results
    pub cache_ttl: u64,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// JSON file backing persistent storage; in-memory when unset
    pub storage_path: Option<PathBuf>,
    /// Capacity of the comparison list
    pub comparison_max_items: usize,
    /// Capacity of the favorites list
    pub favorites_max_items: usize,
    /// Capacity of the compatibility-check list
    pub compatibility_max_items: usize,
    /// Number of recent filter sets remembered
    pub recent_filters_max: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_TTL` - Cache TTL in seconds (default: 300)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 60)
    /// - `STORAGE_PATH` - Storage file path (default: unset, in-memory)
    /// - `COMPARISON_MAX_ITEMS` (default: 4)
    /// - `FAVORITES_MAX_ITEMS` (default: 100)
    /// - `COMPATIBILITY_MAX_ITEMS` (default: 10)
    /// - `RECENT_FILTERS_MAX` (default: 10)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cache_ttl: env_or("CACHE_TTL", defaults.cache_ttl),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            storage_path: env::var("STORAGE_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            comparison_max_items: env_or("COMPARISON_MAX_ITEMS", defaults.comparison_max_items),
            favorites_max_items: env_or("FAVORITES_MAX_ITEMS", defaults.favorites_max_items),
            compatibility_max_items: env_or(
                "COMPATIBILITY_MAX_ITEMS",
                defaults.compatibility_max_items,
            ),
            recent_filters_max: env_or("RECENT_FILTERS_MAX", defaults.recent_filters_max),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cache_ttl: 300,
            cleanup_interval: 60,
            storage_path: None,
            comparison_max_items: 4,
            favorites_max_items: 100,
            compatibility_max_items: 10,
            recent_filters_max: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.cleanup_interval, 60);
        assert!(config.storage_path.is_none());
        assert_eq!(config.compatibility_max_items, 10);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("SERVER_PORT");
        env::remove_var("CACHE_TTL");
        env::remove_var("CLEANUP_INTERVAL");
        env::remove_var("STORAGE_PATH");
        env::remove_var("FAVORITES_MAX_ITEMS");

        let config = Config::from_env();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cache_ttl, 300);
        assert_eq!(config.cleanup_interval, 60);
        assert!(config.storage_path.is_none());
        assert_eq!(config.favorites_max_items, 100);
    }
}
