//! Filter Codec
//!
//! Flat query-string form of a `FilterSet`:
//!
//! | param     | format                              |
//! |-----------|-------------------------------------|
//! | `category`| `CPU,GPU`                           |
//! | `numeric` | `price:10:500,tdp::95`              |
//! | `enum`    | `socket:AM4,LGA1700\|memory:DDR5`   |
//! | `boolean` | `inStock:true,refurbished:false`    |
//!
//! Groups without active constraints are left out. `:`, `,` and `|` are
//! separators and are not escaped inside field names or values.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::filters::{FilterSet, NumericRange};

pub const CATEGORY_PARAM: &str = "category";
pub const NUMERIC_PARAM: &str = "numeric";
pub const ENUM_PARAM: &str = "enum";
pub const BOOLEAN_PARAM: &str = "boolean";

// == Query Params ==
/// Encoded filter parameters keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Form-urlencoded query string, without the leading `?`.
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish()
    }

    /// Parses a form-urlencoded query string (a leading `?` is allowed).
    /// Later duplicates of a parameter win.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self(
            url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        )
    }
}

impl From<BTreeMap<String, String>> for QueryParams {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

// == Encode ==
/// Converts a filter set to its sparse flat representation.
pub fn encode(filters: &FilterSet) -> QueryParams {
    let mut params = QueryParams::new();

    let categories: Vec<&str> = filters
        .categories
        .iter()
        .map(String::as_str)
        .filter(|c| !c.is_empty())
        .collect();
    if !categories.is_empty() {
        params.insert(CATEGORY_PARAM, categories.join(","));
    }

    let ranges: Vec<String> = filters
        .numeric_filters
        .iter()
        .filter_map(|(field, range)| {
            let min = range.min.filter(|v| v.is_finite());
            let max = range.max.filter(|v| v.is_finite());
            if min.is_none() && max.is_none() {
                return None;
            }
            Some(format!("{}:{}:{}", field, format_bound(min), format_bound(max)))
        })
        .collect();
    if !ranges.is_empty() {
        params.insert(NUMERIC_PARAM, ranges.join(","));
    }

    let options: Vec<String> = filters
        .enum_filters
        .iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(field, values)| {
            let values: Vec<&str> = values.iter().map(String::as_str).collect();
            format!("{}:{}", field, values.join(","))
        })
        .collect();
    if !options.is_empty() {
        params.insert(ENUM_PARAM, options.join("|"));
    }

    let flags: Vec<String> = filters
        .boolean_filters
        .iter()
        .map(|(field, value)| format!("{}:{}", field, value))
        .collect();
    if !flags.is_empty() {
        params.insert(BOOLEAN_PARAM, flags.join(","));
    }

    params
}

fn format_bound(bound: Option<f64>) -> String {
    bound.map(|v| v.to_string()).unwrap_or_default()
}

// == Decode ==
/// Rebuilds a filter set. Malformed segments are skipped, never fatal.
pub fn decode(params: &QueryParams) -> FilterSet {
    FilterSet {
        categories: params
            .get(CATEGORY_PARAM)
            .map(decode_categories)
            .unwrap_or_default(),
        numeric_filters: params
            .get(NUMERIC_PARAM)
            .map(decode_ranges)
            .unwrap_or_default(),
        enum_filters: params
            .get(ENUM_PARAM)
            .map(decode_options)
            .unwrap_or_default(),
        boolean_filters: params
            .get(BOOLEAN_PARAM)
            .map(decode_flags)
            .unwrap_or_default(),
    }
}

fn decode_categories(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

fn decode_ranges(raw: &str) -> BTreeMap<String, NumericRange> {
    raw.split(',')
        .filter_map(|segment| {
            let parts: Vec<&str> = segment.split(':').collect();
            let range = match parts.as_slice() {
                [field, min, max] if !field.is_empty() => {
                    match (parse_bound(min), parse_bound(max)) {
                        (Some(min), Some(max)) => Some((field.to_string(), NumericRange::new(min, max))),
                        _ => None,
                    }
                }
                _ => None,
            };
            match range {
                Some((field, range)) if range.is_active() => Some((field, range)),
                _ => {
                    if !segment.is_empty() {
                        debug!("Skipping malformed numeric filter segment '{}'", segment);
                    }
                    None
                }
            }
        })
        .collect()
}

/// `Some(None)` for an empty bound, `None` when the bound is not a finite number.
fn parse_bound(raw: &str) -> Option<Option<f64>> {
    if raw.is_empty() {
        return Some(None);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
}

fn decode_options(raw: &str) -> BTreeMap<String, BTreeSet<String>> {
    raw.split('|')
        .filter_map(|segment| {
            let (field, values) = segment.split_once(':')?;
            if field.is_empty() {
                debug!("Skipping enum filter segment without field '{}'", segment);
                return None;
            }
            let values: BTreeSet<String> = values
                .split(',')
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect();
            if values.is_empty() {
                return None;
            }
            Some((field.to_string(), values))
        })
        .collect()
}

fn decode_flags(raw: &str) -> BTreeMap<String, bool> {
    raw.split(',')
        .filter_map(|segment| {
            let (field, value) = segment.split_once(':')?;
            if field.is_empty() {
                return None;
            }
            match value {
                "true" => Some((field.to_string(), true)),
                "false" => Some((field.to_string(), false)),
                _ => {
                    debug!("Skipping boolean filter segment '{}'", segment);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FilterSet {
        FilterSet::new()
            .with_category("CPU")
            .with_category("GPU")
            .with_range("price", Some(10.0), Some(500.0))
            .with_options("socket", ["AM4", "LGA1700"])
            .with_flag("inStock", true)
    }

    #[test]
    fn test_encode_format() {
        let params = encode(&sample());

        assert_eq!(params.get(CATEGORY_PARAM), Some("CPU,GPU"));
        assert_eq!(params.get(NUMERIC_PARAM), Some("price:10:500"));
        assert_eq!(params.get(ENUM_PARAM), Some("socket:AM4,LGA1700"));
        assert_eq!(params.get(BOOLEAN_PARAM), Some("inStock:true"));
    }

    #[test]
    fn test_round_trip_sample() {
        let filters = sample();
        assert_eq!(decode(&encode(&filters)), filters);
    }

    #[test]
    fn test_encode_is_sparse() {
        let params = encode(&FilterSet::new().with_range("price", None, None));
        assert!(params.is_empty());

        let params = encode(&FilterSet::new().with_flag("inStock", false));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_open_bounds() {
        let filters = FilterSet::new()
            .with_range("tdp", None, Some(95.0))
            .with_range("weight", Some(0.5), None);
        let params = encode(&filters);

        assert_eq!(params.get(NUMERIC_PARAM), Some("tdp::95,weight:0.5:"));
        assert_eq!(decode(&params), filters);
    }

    #[test]
    fn test_multiple_enum_fields() {
        let filters = FilterSet::new()
            .with_options("socket", ["AM4"])
            .with_options("memory", ["DDR4", "DDR5"]);
        let params = encode(&filters);

        assert_eq!(params.get(ENUM_PARAM), Some("memory:DDR4,DDR5|socket:AM4"));
        assert_eq!(decode(&params), filters);
    }

    #[test]
    fn test_decode_skips_malformed_segments() {
        let mut params = QueryParams::new();
        params.insert(CATEGORY_PARAM, ",CPU,,");
        params.insert(NUMERIC_PARAM, "price:10:500,:1:2,tdp:abc:5,weight:1,volts::,amps:1:2:3");
        params.insert(ENUM_PARAM, "socket:AM4|:x|novalues:|bare");
        params.insert(BOOLEAN_PARAM, "inStock:true,used:maybe,:false,refurbished:false");

        let filters = decode(&params);

        assert_eq!(filters.categories.len(), 1);
        assert_eq!(filters.numeric_filters.len(), 1);
        assert_eq!(
            filters.numeric_filters["price"],
            NumericRange::new(Some(10.0), Some(500.0))
        );
        assert_eq!(filters.enum_filters.len(), 1);
        assert_eq!(filters.boolean_filters.len(), 2);
        assert!(!filters.boolean_filters["refurbished"]);
    }

    #[test]
    fn test_decode_empty_params() {
        assert_eq!(decode(&QueryParams::new()), FilterSet::new());
    }

    #[test]
    fn test_query_string_round_trip() {
        let params = encode(&sample());
        let query = params.to_query_string();

        assert!(query.contains("category=CPU%2CGPU"));
        assert_eq!(QueryParams::from_query_string(&query), params);
        assert_eq!(QueryParams::from_query_string(&format!("?{}", query)), params);
    }

    #[test]
    fn test_non_finite_bounds_are_dropped() {
        let filters = FilterSet::new().with_range("price", Some(f64::NAN), Some(f64::INFINITY));
        assert!(encode(&filters).is_empty());
    }
}
