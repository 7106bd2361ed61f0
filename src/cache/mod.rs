//! Cache Module
//!
//! Provides in-memory memoization with fixed-TTL expiration.

use std::time::Duration;

mod entry;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use stats::CacheStats;
pub use store::{make_key, SharedCache, TtlCache};

// == Public Constants ==
/// TTL used when none is configured
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
