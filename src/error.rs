//! Error types for the OpenPart client core
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Core Error Enum ==
/// Unified error type for list, filter and storage operations.
///
/// Every variant is recoverable and carries a user-facing message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Item with this id is already in the list
    #[error("Part {0} is already in the list")]
    AlreadyPresent(i64),

    /// No item with this id is in the list
    #[error("Part {0} is not in the list")]
    NotPresent(i64),

    /// The list is full
    #[error("The list holds at most {max} parts")]
    CapacityExceeded { max: usize },

    /// Identifier could not be coerced to an integer
    #[error("Invalid part id: {0}")]
    InvalidId(String),

    /// Nothing to export
    #[error("The list is empty, nothing to export")]
    EmptyList,

    /// Import document rejected
    #[error("Import rejected: {0}")]
    ImportValidation(String),

    /// Nothing cached under this key, or the entry expired
    #[error("No cached value for '{0}'")]
    CacheMiss(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Persistent storage refused a write
    #[error("Save failed, please retry ({0})")]
    Storage(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = match &self {
            CoreError::AlreadyPresent(_) => StatusCode::CONFLICT,
            CoreError::NotPresent(_) | CoreError::CacheMiss(_) => StatusCode::NOT_FOUND,
            CoreError::CapacityExceeded { .. } => StatusCode::CONFLICT,
            CoreError::InvalidId(_)
            | CoreError::EmptyList
            | CoreError::ImportValidation(_)
            | CoreError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the client core.
pub type Result<T> = std::result::Result<T, CoreError>;
