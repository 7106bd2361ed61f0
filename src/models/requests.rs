//! Request DTOs for the local API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;
use serde_json::Value;

use crate::filters::{FieldMetadata, FilterSet};
use crate::lists::PartRef;

/// Request body for `POST /lists/:kind/batch`
#[derive(Debug, Clone, Deserialize)]
pub struct BatchAddRequest {
    pub parts: Vec<PartRef>,
}

/// Request body for `POST /filters/merge`
#[derive(Debug, Clone, Deserialize)]
pub struct MergeRequest {
    #[serde(default)]
    pub base: FilterSet,
    #[serde(default)]
    pub overlay: FilterSet,
}

/// Request body for `POST /filters/describe` and `POST /filters/recent`
#[derive(Debug, Clone, Deserialize)]
pub struct DescribeRequest {
    #[serde(default)]
    pub filters: FilterSet,
    #[serde(default)]
    pub fields: FieldMetadata,
}

/// Request body for `PUT /cache/search`
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSearchRequest {
    pub key: String,
    pub value: Value,
}

impl CacheSearchRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        None
    }
}

/// Query for `GET /cache/search`
#[derive(Debug, Clone, Deserialize)]
pub struct CacheKeyQuery {
    pub key: String,
}

/// Request body for `PUT /cache/compatibility`
#[derive(Debug, Clone, Deserialize)]
pub struct CacheCompatibilityRequest {
    pub part_ids: Vec<i64>,
    pub value: Value,
}

impl CacheCompatibilityRequest {
    pub fn validate(&self) -> Option<String> {
        if self.part_ids.is_empty() {
            return Some("At least one part id is required".to_string());
        }
        None
    }
}

/// Query for `GET /cache/compatibility?parts=3,1,2`
#[derive(Debug, Clone, Deserialize)]
pub struct PartsQuery {
    pub parts: String,
}

impl PartsQuery {
    /// Parses the comma-separated id list.
    pub fn part_ids(&self) -> Result<Vec<i64>, String> {
        self.parts
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<i64>().map_err(|_| format!("Invalid part id '{}'", s)))
            .collect()
    }
}

/// Request body for `POST /backend/failure`
#[derive(Debug, Clone, Deserialize)]
pub struct FailureReport {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub transport_failed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_request_accepts_mixed_ids() {
        let json = r#"{"parts": [{"id": "5", "name": "Widget"}, {"id": 7, "name": "Gadget"}]}"#;
        let req: BatchAddRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.parts.len(), 2);
    }

    #[test]
    fn test_parts_query() {
        let query = PartsQuery {
            parts: "3, 1,2,".to_string(),
        };
        assert_eq!(query.part_ids().unwrap(), vec![3, 1, 2]);

        let query = PartsQuery {
            parts: "3,x".to_string(),
        };
        assert!(query.part_ids().is_err());
    }

    #[test]
    fn test_validate_empty_key() {
        let req = CacheSearchRequest {
            key: "".to_string(),
            value: Value::Null,
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_describe_request_defaults() {
        let req: DescribeRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.filters, FilterSet::new());
        assert!(req.fields.is_empty());
    }
}
