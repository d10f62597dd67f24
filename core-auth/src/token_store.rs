//! Session-scoped token storage
//!
//! The access token lives in the visitor's server-side session under a
//! single well-known attribute. It is never written anywhere else and never
//! logged.

use crate::error::Result;
use crate::types::{AccessToken, AuthState};
use bridge_traits::storage::SessionStore;
use std::sync::Arc;
use tracing::debug;

/// Session attribute holding the access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Reads and writes the access token of a session.
#[derive(Clone)]
pub struct SessionTokenStore {
    sessions: Arc<dyn SessionStore>,
}

impl SessionTokenStore {
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }

    pub async fn store_token(&self, session_id: &str, token: &AccessToken) -> Result<()> {
        self.sessions
            .set(session_id, ACCESS_TOKEN_KEY, token.as_str())
            .await?;

        debug!("Stored access token in session");
        Ok(())
    }

    pub async fn access_token(&self, session_id: &str) -> Result<Option<AccessToken>> {
        let token = self.sessions.get(session_id, ACCESS_TOKEN_KEY).await?;
        match AuthState::from_token(token) {
            AuthState::Authenticated(token) => Ok(Some(token)),
            _ => Ok(None),
        }
    }
}
