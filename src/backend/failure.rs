//! Backend Failure Taxonomy
//!
//! Maps catalog API failures to user-facing messages. Nothing here is fatal:
//! every failure resolves to a value the caller can show.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendFailure {
    /// 400
    #[error("{0}")]
    BadRequest(String),

    /// 401
    #[error("Your session has expired, please log in again")]
    Unauthorized,

    /// 403
    #[error("You do not have permission to do this")]
    Forbidden,

    /// 404
    #[error("The requested resource does not exist")]
    NotFound,

    /// 422
    #[error("{detail}")]
    Validation { detail: String, errors: Vec<String> },

    /// 429
    #[error("Too many requests, please slow down")]
    RateLimited,

    /// 500
    #[error("Server error")]
    Internal,

    /// 503
    #[error("The service is temporarily unavailable")]
    Unavailable,

    /// Any other status code
    #[error("Server error ({status})")]
    Server { status: u16 },

    /// No response arrived
    #[error("Network error, please check your connection")]
    Connectivity,

    /// Anything else
    #[error("Unknown error")]
    Unknown,
}

/// Error body shape: `{"detail": "...", "errors": [...]}`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    errors: Vec<Value>,
}

impl BackendFailure {
    /// Classifies a response by status code, reading `detail`/`errors` from
    /// the JSON body when present.
    pub fn from_response(status: u16, body: &str) -> Self {
        let body: ErrorBody = serde_json::from_str(body).unwrap_or_default();

        match status {
            400 => BackendFailure::BadRequest(
                body.detail.unwrap_or_else(|| "The request was invalid".to_string()),
            ),
            401 => BackendFailure::Unauthorized,
            403 => BackendFailure::Forbidden,
            404 => BackendFailure::NotFound,
            422 => BackendFailure::Validation {
                detail: body
                    .detail
                    .unwrap_or_else(|| "The submitted data failed validation".to_string()),
                errors: body.errors.iter().map(error_text).collect(),
            },
            429 => BackendFailure::RateLimited,
            500 => BackendFailure::Internal,
            503 => BackendFailure::Unavailable,
            status => BackendFailure::Server { status },
        }
    }

    /// Classifies a failed call: a status means a response arrived, no
    /// status but a transport error means connectivity, otherwise unknown.
    pub fn classify(status: Option<u16>, body: Option<&str>, transport_failed: bool) -> Self {
        match (status, transport_failed) {
            (Some(status), _) => Self::from_response(status, body.unwrap_or_default()),
            (None, true) => BackendFailure::Connectivity,
            (None, false) => BackendFailure::Unknown,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    /// A 401 means the stored session must be dropped.
    pub fn requires_login(&self) -> bool {
        matches!(self, BackendFailure::Unauthorized)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            BackendFailure::BadRequest(_) => Some(400),
            BackendFailure::Unauthorized => Some(401),
            BackendFailure::Forbidden => Some(403),
            BackendFailure::NotFound => Some(404),
            BackendFailure::Validation { .. } => Some(422),
            BackendFailure::RateLimited => Some(429),
            BackendFailure::Internal => Some(500),
            BackendFailure::Unavailable => Some(503),
            BackendFailure::Server { status } => Some(*status),
            BackendFailure::Connectivity | BackendFailure::Unknown => None,
        }
    }
}

/// Validation errors arrive as strings or as `{"msg": ...}` objects.
fn error_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .get("msg")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    }
}
