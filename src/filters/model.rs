//! Filter Model
//!
//! Structured search constraints: categories, numeric ranges, enum
//! selections and boolean flags.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

// == Numeric Range ==
/// Inclusive range with optional bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl NumericRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// A range constrains something once either bound is a finite number.
    pub fn is_active(&self) -> bool {
        let finite = self.finite();
        finite.min.is_some() || finite.max.is_some()
    }

    /// Copy with non-finite bounds treated as unset.
    pub fn finite(&self) -> NumericRange {
        NumericRange {
            min: self.min.filter(|v| v.is_finite()),
            max: self.max.filter(|v| v.is_finite()),
        }
    }
}

// == Filter Set ==
/// Active search constraints.
///
/// Sorted containers keep iteration and serialization order canonical, so
/// two sets with the same constraints serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterSet {
    pub categories: BTreeSet<String>,
    pub numeric_filters: BTreeMap<String, NumericRange>,
    pub enum_filters: BTreeMap<String, BTreeSet<String>>,
    pub boolean_filters: BTreeMap<String, bool>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.insert(category.into());
        self
    }

    pub fn with_range(mut self, field: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        self.numeric_filters
            .insert(field.into(), NumericRange::new(min, max));
        self
    }

    pub fn with_options<I, S>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_filters
            .entry(field.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_flag(mut self, field: impl Into<String>, value: bool) -> Self {
        self.boolean_filters.insert(field.into(), value);
        self
    }

    /// Copy with inactive entries (empty categories, unbounded ranges,
    /// empty selections) dropped.
    pub fn normalized(&self) -> FilterSet {
        FilterSet {
            categories: self
                .categories
                .iter()
                .filter(|category| !category.is_empty())
                .cloned()
                .collect(),
            numeric_filters: self
                .numeric_filters
                .iter()
                .filter(|(_, range)| range.is_active())
                .map(|(field, range)| (field.clone(), range.finite()))
                .collect(),
            enum_filters: self
                .enum_filters
                .iter()
                .filter(|(_, values)| !values.is_empty())
                .map(|(field, values)| (field.clone(), values.clone()))
                .collect(),
            boolean_filters: self.boolean_filters.clone(),
        }
    }

    /// Compares active constraints only.
    pub fn same_constraints(&self, other: &FilterSet) -> bool {
        self.normalized() == other.normalized()
    }
}

// == Operations ==
/// True iff at least one constraint is set.
pub fn has_active_filters(filters: &FilterSet) -> bool {
    filters.categories.iter().any(|category| !category.is_empty())
        || filters.numeric_filters.values().any(NumericRange::is_active)
        || filters.enum_filters.values().any(|values| !values.is_empty())
        || !filters.boolean_filters.is_empty()
}

/// Field-wise merge: each constraint group that is active in `overlay`
/// replaces the same group in `base`; inactive groups keep `base`'s values.
pub fn merge(base: &FilterSet, overlay: &FilterSet) -> FilterSet {
    let overlay = overlay.normalized();

    FilterSet {
        categories: if overlay.categories.is_empty() {
            base.categories.clone()
        } else {
            overlay.categories
        },
        numeric_filters: if overlay.numeric_filters.is_empty() {
            base.numeric_filters.clone()
        } else {
            overlay.numeric_filters
        },
        enum_filters: if overlay.enum_filters.is_empty() {
            base.enum_filters.clone()
        } else {
            overlay.enum_filters
        },
        boolean_filters: if overlay.boolean_filters.is_empty() {
            base.boolean_filters.clone()
        } else {
            overlay.boolean_filters
        },
    }
}
