//! Backend Module
//!
//! The client-side half of the catalog API boundary: failure taxonomy and
//! the persisted session that authorizes requests.

mod auth;
mod failure;

pub use auth::{AuthSession, TOKEN_KEY, USER_KEY};
pub use failure::BackendFailure;
