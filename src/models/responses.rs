//! Response DTOs for the local API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;
use crate::filters::{FilterSet, QueryParams};
use crate::lists::{ListItem, ListKind, ListSummary};

/// Response body for `GET /lists/:kind`
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse {
    pub kind: ListKind,
    pub count: usize,
    pub max_items: usize,
    pub items: Vec<ListItem>,
}

/// Response body for single-item list mutations
#[derive(Debug, Clone, Serialize)]
pub struct MutationResponse<T: Serialize> {
    pub message: String,
    #[serde(flatten)]
    pub outcome: T,
}

impl<T: Serialize> MutationResponse<T> {
    pub fn new(message: impl Into<String>, outcome: T) -> Self {
        Self {
            message: message.into(),
            outcome,
        }
    }
}

/// Response body for `GET /lists/:kind/contains/:id`
#[derive(Debug, Clone, Serialize)]
pub struct ContainsResponse {
    pub id: i64,
    pub contains: bool,
}

/// Response body for `GET /lists/:kind/summary`
#[derive(Debug, Clone, Serialize)]
pub struct SummaryResponse {
    #[serde(flatten)]
    pub summary: ListSummary,
    pub check_url: Option<String>,
}

/// Response body for `POST /filters/encode`
#[derive(Debug, Clone, Serialize)]
pub struct EncodeResponse {
    pub params: QueryParams,
    pub query: String,
}

/// Response body for `POST /filters/describe`
#[derive(Debug, Clone, Serialize)]
pub struct DescribeResponse {
    pub description: String,
    pub active: bool,
    pub hash: String,
    pub filters: FilterSet,
}

/// Response body for cache lookups
#[derive(Debug, Clone, Serialize)]
pub struct CachedValueResponse {
    pub key: String,
    pub value: Value,
}

/// Response body for cache writes
#[derive(Debug, Clone, Serialize)]
pub struct CacheWriteResponse {
    pub message: String,
    pub key: String,
}

impl CacheWriteResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' cached", key),
            key,
        }
    }
}

/// Response body for `GET /cache/stats`
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub search: CacheSection,
    pub compatibility: CacheSection,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheSection {
    #[serde(flatten)]
    pub stats: CacheStats,
    pub hit_rate: f64,
    pub ttl_seconds: u64,
}

impl CacheSection {
    pub fn new(stats: CacheStats, ttl_seconds: u64) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
            ttl_seconds,
        }
    }
}

/// Response body for `POST /backend/failure`
#[derive(Debug, Clone, Serialize)]
pub struct FailureResponse {
    pub message: String,
    pub status: Option<u16>,
    pub requires_login: bool,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
