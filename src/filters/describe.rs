//! Filter Descriptions
//!
//! Human-readable summaries of filter sets and the structural hash used to
//! deduplicate filter history.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::filters::{has_active_filters, FilterSet, NumericRange};

/// Display metadata keyed by field name.
pub type FieldMetadata = BTreeMap<String, FieldMeta>;

/// How a filter field is shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMeta {
    pub label: String,
    #[serde(default)]
    pub unit: Option<String>,
}

impl FieldMeta {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            unit: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

const NO_FILTERS: &str = "No filters";

// == Describe ==
/// Summarizes the active constraints, e.g.
/// `Category: CPU, GPU; Price: 10 to 500 USD; Socket: AM4; In stock: yes`.
pub fn describe(filters: &FilterSet, meta: &FieldMetadata) -> String {
    if !has_active_filters(filters) {
        return NO_FILTERS.to_string();
    }

    let filters = filters.normalized();
    let mut parts = Vec::new();

    if !filters.categories.is_empty() {
        let categories: Vec<&str> = filters.categories.iter().map(String::as_str).collect();
        parts.push(format!("Category: {}", categories.join(", ")));
    }

    for (field, range) in &filters.numeric_filters {
        parts.push(format!("{}: {}", label(meta, field), describe_range(range, unit(meta, field))));
    }

    for (field, values) in &filters.enum_filters {
        let values: Vec<&str> = values.iter().map(String::as_str).collect();
        parts.push(format!("{}: {}", label(meta, field), values.join(", ")));
    }

    for (field, value) in &filters.boolean_filters {
        let shown = if *value { "yes" } else { "no" };
        parts.push(format!("{}: {}", label(meta, field), shown));
    }

    parts.join("; ")
}

fn label<'a>(meta: &'a FieldMetadata, field: &'a str) -> &'a str {
    meta.get(field).map(|m| m.label.as_str()).unwrap_or(field)
}

fn unit<'a>(meta: &'a FieldMetadata, field: &str) -> Option<&'a str> {
    meta.get(field).and_then(|m| m.unit.as_deref())
}

fn describe_range(range: &NumericRange, unit: Option<&str>) -> String {
    let bounds = match (range.min, range.max) {
        (Some(min), Some(max)) => format!("{} to {}", min, max),
        (Some(min), None) => format!("≥ {}", min),
        (None, Some(max)) => format!("≤ {}", max),
        (None, None) => String::new(),
    };
    match unit {
        Some(unit) => format!("{} {}", bounds, unit),
        None => bounds,
    }
}

// == Structural Hash ==
/// SHA-256 hex digest of the canonical serialization of the active
/// constraints. Equal constraint sets hash equally regardless of how they
/// were built.
pub fn structural_hash(filters: &FilterSet) -> String {
    let canonical = serde_json::to_string(&filters.normalized()).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    format!("{:x}", hasher.finalize())
}
