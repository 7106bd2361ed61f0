//! API Module
//!
//! HTTP handlers and routing for the local client-core REST API.
//!
//! # Endpoints
//! - `/lists/:kind/...` - Bounded part lists (comparison, favorites, compatibility)
//! - `GET /lists/:kind/events` - Server-sent list snapshots after every change
//! - `/filters/...` - Filter codec, merge, description and recent history
//! - `/cache/...` - Search and compatibility result caches
//! - `POST /backend/failure` - Catalog failure classification
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
