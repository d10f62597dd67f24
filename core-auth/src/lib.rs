//! # Authentication Module
//!
//! OAuth 2.0 authorization-code flow against the Yandex OAuth server, with
//! the resulting access token kept in the visitor's server-side session.
//!
//! ## Overview
//!
//! - [`OAuthFlowManager`] builds the authorization URL, validates the
//!   provider callback and exchanges the code for an [`AccessToken`]
//! - [`SessionTokenStore`] reads and writes the token through the injected
//!   [`SessionStore`](bridge_traits::SessionStore)
//! - [`AuthState`] describes where a visitor stands in the flow
//!
//! Tokens are never refreshed: when one stops working the visitor simply
//! goes through the flow again.

pub mod error;
pub mod oauth;
pub mod token_store;
pub mod types;

pub use error::{AuthError, Result};
pub use oauth::{OAuthConfig, OAuthFlowManager};
pub use token_store::{SessionTokenStore, ACCESS_TOKEN_KEY};
pub use types::{AccessToken, AuthState, CallbackParams, TokenResponse};
