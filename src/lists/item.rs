//! List Item Module
//!
//! Lightweight part references stored in bounded lists, and the identifier
//! normalization every list operation goes through.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CoreError, Result};

// == Raw Identifier ==
/// An identifier as it arrives from callers: a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawId {
    /// Coerces the identifier to its canonical integer form.
    pub fn normalize(&self) -> Result<i64> {
        normalize_id(self)
    }
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Int(n) => write!(f, "{}", n),
            RawId::Float(n) => write!(f, "{}", n),
            RawId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RawId {
    fn from(id: i64) -> Self {
        RawId::Int(id)
    }
}

impl From<i32> for RawId {
    fn from(id: i32) -> Self {
        RawId::Int(id.into())
    }
}

impl From<&str> for RawId {
    fn from(id: &str) -> Self {
        RawId::Text(id.to_string())
    }
}

impl From<String> for RawId {
    fn from(id: String) -> Self {
        RawId::Text(id)
    }
}

// == Normalization ==
/// Coerces a numeric or string identifier to an integer.
///
/// Strings follow integer-prefix parsing: leading whitespace is skipped, an
/// optional sign is accepted and parsing stops at the first non-digit, so
/// `" 12abc"` is `12`. Floats truncate toward zero.
pub fn normalize_id(raw: &RawId) -> Result<i64> {
    match raw {
        RawId::Int(n) => Ok(*n),
        RawId::Float(n) if n.is_finite() => Ok(n.trunc() as i64),
        RawId::Float(_) => Err(CoreError::InvalidId(raw.to_string())),
        RawId::Text(s) => parse_leading_int(s).ok_or_else(|| CoreError::InvalidId(s.clone())),
    }
}

fn parse_leading_int(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits_len == 0 {
        return None;
    }

    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn deserialize_normalized_id<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = RawId::deserialize(deserializer)?;
    normalize_id(&raw).map_err(serde::de::Error::custom)
}

// == Part Reference ==
/// A part as handed to `add`/`toggle`/`add_many`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartRef {
    pub id: RawId,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "imageUrl")]
    pub image_url: Option<String>,
}

impl PartRef {
    pub fn new(id: impl Into<RawId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: None,
            image_url: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

// == List Item ==
/// A normalized record held in a bounded list.
///
/// Serialized in the portal's persisted shape:
/// `{"id", "name", "category", "image_url", "addedAt"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    #[serde(deserialize_with = "deserialize_normalized_id")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Unix milliseconds
    #[serde(rename = "addedAt", default)]
    pub added_at: u64,
}

impl ListItem {
    /// Builds a normalized item from a part reference.
    pub fn from_part(part: &PartRef, added_at: u64) -> Result<Self> {
        Ok(Self {
            id: part.id.normalize()?,
            name: part.name.clone(),
            category: part.category.clone(),
            image_url: part.image_url.clone(),
            added_at,
        })
    }
}
