//! OpenPart client core
//!
//! Local state for a parts-catalog client: bounded part lists with
//! persistence and change notification, a URL filter codec, TTL result
//! caches and backend failure handling, served over a small HTTP API.

pub mod api;
pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod filters;
pub mod lists;
pub mod models;
pub mod storage;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
pub use error::{CoreError, Result};
pub use tasks::spawn_cleanup_task;
