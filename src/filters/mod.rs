//! Filters Module
//!
//! Structured search filters, their flat query-string codec, summaries and
//! the recent-filters history.

mod codec;
mod describe;
mod model;
mod recent;


pub use codec::{
    decode, encode, QueryParams, BOOLEAN_PARAM, CATEGORY_PARAM, ENUM_PARAM, NUMERIC_PARAM,
};
pub use describe::{describe, structural_hash, FieldMeta, FieldMetadata};
pub use model::{has_active_filters, merge, FilterSet, NumericRange};
pub use recent::{RecentFilter, RecentFilters, RECENT_FILTERS_KEY};
