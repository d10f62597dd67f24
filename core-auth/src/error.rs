use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authorization code is missing from the callback")]
    MissingAuthorizationCode,

    #[error("Authorization denied by the provider: {}", denial_reason(.error, .description))]
    AuthorizationDenied {
        error: String,
        description: Option<String>,
    },

    #[error("Failed to obtain access token: {description}")]
    TokenEndpoint { status: u16, description: String },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid token response: {0}")]
    InvalidTokenResponse(String),

    #[error("Session storage error: {0}")]
    Session(#[from] BridgeError),

    #[error("{0}")]
    Other(String),
}

fn denial_reason<'a>(error: &'a str, description: &'a Option<String>) -> &'a str {
    description.as_deref().unwrap_or(error)
}

impl AuthError {
    /// Whether the failure was caused by the request rather than by the
    /// provider or this server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AuthError::MissingAuthorizationCode
                | AuthError::AuthorizationDenied { .. }
                | AuthError::TokenEndpoint { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
