//! Import/Export Module
//!
//! Shape validation for externally supplied list documents and the
//! downloadable export format.

use serde::Serialize;
use serde_json::Value;

use crate::error::{CoreError, Result};
use crate::lists::{ListItem, RawId};

// == Export Document ==
/// A list serialized for download.
#[derive(Debug, Clone, Serialize)]
pub struct ExportDocument {
    /// Suggested file name, `<storage key>_<YYYY-MM-DD>.json`
    pub file_name: String,
    /// Pretty-printed JSON array of items
    pub content: String,
}

impl ExportDocument {
    pub fn new(key: &str, items: &[ListItem]) -> Result<Self> {
        let content =
            serde_json::to_string_pretty(items).map_err(|e| CoreError::Storage(e.to_string()))?;
        let date = chrono::Utc::now().format("%Y-%m-%d");

        Ok(Self {
            file_name: format!("{}_{}.json", key, date),
            content,
        })
    }
}

// == Record Validation ==
/// Validates one imported record and converts it to a list item.
///
/// A record needs a non-zero id that normalizes to an integer and a
/// non-empty name. Zero is rejected in every spelling (`0`, `"0"`, `"00"`),
/// since ids are compared in normalized form. `category`, `image_url` and `addedAt` are optional.
pub fn validate_record(index: usize, record: &Value, now_ms: u64) -> Result<ListItem> {
    let object = record
        .as_object()
        .ok_or_else(|| invalid(index, "record is not an object"))?;

    let raw_id: RawId = object
        .get("id")
        .cloned()
        .and_then(|id| serde_json::from_value(id).ok())
        .ok_or_else(|| invalid(index, "missing id"))?;
    let id = raw_id
        .normalize()
        .map_err(|_| invalid(index, "id is not an integer"))?;
    if id == 0 {
        return Err(invalid(index, "missing id"));
    }

    let name = object
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| invalid(index, "missing name"))?;

    Ok(ListItem {
        id,
        name: name.to_string(),
        category: optional_string(object.get("category")),
        image_url: optional_string(object.get("image_url")),
        added_at: object
            .get("addedAt")
            .and_then(Value::as_u64)
            .unwrap_or(now_ms),
    })
}

/// Parses an import document into validated items.
pub fn parse_document(data: &str, now_ms: u64) -> Result<Vec<ListItem>> {
    let document: Value = serde_json::from_str(data)
        .map_err(|e| CoreError::ImportValidation(format!("document is not valid JSON: {}", e)))?;

    let records = document
        .as_array()
        .ok_or_else(|| CoreError::ImportValidation("document is not an array".to_string()))?;

    records
        .iter()
        .enumerate()
        .map(|(index, record)| validate_record(index, record, now_ms))
        .collect()
}

fn optional_string(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

fn invalid(index: usize, reason: &str) -> CoreError {
    CoreError::ImportValidation(format!("record {}: {}", index, reason))
}
