//! Lists Module
//!
//! Bounded, deduplicated, persisted lists of part references with change
//! notification.

mod item;
mod kinds;
mod manager;
mod notify;
mod transfer;


pub use item::{normalize_id, ListItem, PartRef, RawId};
pub use kinds::{ListKind, ListRegistry};
pub use manager::{
    BatchOutcome, BoundedList, ImportOutcome, ListSummary, ListUpdate, ToggleAction,
    ToggleOutcome,
};
pub use notify::{ChangeBus, ListChange, ListWatcher};
pub use transfer::{parse_document, validate_record, ExportDocument};
