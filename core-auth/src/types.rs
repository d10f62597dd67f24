use serde::Deserialize;
use std::fmt;

/// Opaque bearer credential issued by the OAuth provider.
///
/// The value is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// Where a visitor stands in the authorization-code flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// No token in the session.
    Unauthenticated,
    /// Sent to the provider's consent page, callback not received yet.
    AwaitingProviderCallback,
    /// A token is stored in the session.
    Authenticated(AccessToken),
}

impl AuthState {
    /// Derive the state from whatever the session holds.
    pub fn from_token(token: Option<String>) -> Self {
        match token {
            Some(token) if !token.is_empty() => AuthState::Authenticated(AccessToken(token)),
            _ => AuthState::Unauthenticated,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn access_token(&self) -> Option<&AccessToken> {
        match self {
            AuthState::Authenticated(token) => Some(token),
            _ => None,
        }
    }
}

/// Query parameters the provider appends to the redirect URI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    /// Set when the user refused access or the request was malformed.
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Successful token endpoint answer. Only `access_token` is used.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Error body of the token endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl TokenErrorResponse {
    /// `error_description`, falling back to the `error` code.
    pub fn description(&self) -> Option<&str> {
        self.error_description
            .as_deref()
            .or(self.error.as_deref())
            .filter(|d| !d.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken::new("y0_secret");
        let debug = format!("{:?}", token);

        assert!(!debug.contains("y0_secret"));
        assert_eq!(token.as_str(), "y0_secret");
    }

    #[test]
    fn test_auth_state_from_token() {
        assert_eq!(AuthState::from_token(None), AuthState::Unauthenticated);
        assert_eq!(
            AuthState::from_token(Some(String::new())),
            AuthState::Unauthenticated
        );

        let state = AuthState::from_token(Some("T1".to_string()));
        assert!(state.is_authenticated());
        assert_eq!(state.access_token().map(AccessToken::as_str), Some("T1"));
        assert!(!AuthState::AwaitingProviderCallback.is_authenticated());
    }

    #[test]
    fn test_token_response_deserialization() {
        let json = r#"{
            "access_token": "y0_AgAAAA",
            "expires_in": 31536000,
            "refresh_token": "1:abc",
            "token_type": "bearer"
        }"#;

        let response: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.access_token, "y0_AgAAAA");
        assert_eq!(response.expires_in, Some(31_536_000));
        assert_eq!(response.token_type.as_deref(), Some("bearer"));
    }

    #[test]
    fn test_token_response_minimal() {
        let response: TokenResponse = serde_json::from_str(r#"{"access_token": "T1"}"#).unwrap();
        assert_eq!(response.access_token, "T1");
        assert!(response.refresh_token.is_none());
        assert!(response.scope.is_none());
    }

    #[test]
    fn test_token_error_description_fallback() {
        let body: TokenErrorResponse =
            serde_json::from_str(r#"{"error": "invalid_grant", "error_description": "Code has expired"}"#)
                .unwrap();
        assert_eq!(body.description(), Some("Code has expired"));

        let body: TokenErrorResponse = serde_json::from_str(r#"{"error": "invalid_client"}"#).unwrap();
        assert_eq!(body.description(), Some("invalid_client"));

        assert_eq!(TokenErrorResponse::default().description(), None);
    }
}
