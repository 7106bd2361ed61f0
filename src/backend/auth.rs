//! Persisted admin session: bearer token and user profile.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::backend::BackendFailure;
use crate::error::Result;
use crate::storage::{load_json, save_json, Storage};

pub const TOKEN_KEY: &str = "openpart_admin_token";
pub const USER_KEY: &str = "openpart_admin_user";

#[derive(Clone)]
pub struct AuthSession {
    storage: Arc<dyn Storage>,
}

impl AuthSession {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn set_token(&self, token: &str) -> Result<()> {
        self.storage.set(TOKEN_KEY, token)
    }

    /// Stored user profile. A corrupt profile reads as absent.
    pub fn user(&self) -> Option<Value> {
        load_json(self.storage.as_ref(), USER_KEY)
    }

    pub fn set_user(&self, user: &Value) -> Result<()> {
        save_json(self.storage.as_ref(), USER_KEY, user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Drops both the token and the profile.
    pub fn logout(&self) -> Result<()> {
        self.storage.remove(TOKEN_KEY)?;
        self.storage.remove(USER_KEY)?;
        info!("Admin session cleared");
        Ok(())
    }

    /// `Authorization` header value for the current token.
    pub fn authorization_header(&self) -> Option<String> {
        self.token().map(|token| format!("Bearer {}", token))
    }

    /// Applies the session side effects of a failed call and returns the
    /// message to show.
    pub fn handle_failure(&self, failure: &BackendFailure) -> Result<String> {
        if failure.requires_login() {
            self.logout()?;
        }
        Ok(failure.message())
    }
}
