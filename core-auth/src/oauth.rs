//! OAuth 2.0 Authorization Code Flow
//!
//! This module implements the confidential-client variant of RFC 6749 against
//! the Yandex OAuth server.
//!
//! # Overview
//!
//! The OAuth flow manager handles:
//! - Building the authorization URL the visitor is redirected to
//! - Validating the provider callback
//! - Exchanging the authorization code for an access token
//! - Storing the token in the visitor's session
//!
//! # Security
//!
//! - Authorization codes, tokens and the client secret are never logged
//! - A callback without a code is rejected before any outbound request
//!
//! # Example
//!
//! ```no_run
//! use core_auth::oauth::{OAuthConfig, OAuthFlowManager};
//! use std::sync::Arc;
//!
//! # fn example() -> core_auth::Result<()> {
//! # use bridge_traits::http::HttpClient;
//! # let http_client: Arc<dyn HttpClient> = todo!();
//! let config = OAuthConfig::yandex(
//!     "your-client-id",
//!     "your-client-secret",
//!     "http://localhost:8000/oauth/callback",
//! );
//!
//! let flow_manager = OAuthFlowManager::new(config, http_client);
//! let auth_url = flow_manager.build_auth_url()?;
//! // Redirect the visitor to auth_url...
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::token_store::SessionTokenStore;
use crate::types::{AccessToken, AuthState, CallbackParams, TokenErrorResponse, TokenResponse};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

pub const YANDEX_AUTHORIZE_URL: &str = "https://oauth.yandex.com/authorize";
pub const YANDEX_TOKEN_URL: &str = "https://oauth.yandex.com/token";
/// Read-only access to the visitor's disk.
pub const YANDEX_DISK_READ_SCOPE: &str = "cloud_api:disk.read";

/// OAuth 2.0 client configuration.
#[derive(Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Redirect URI registered with the provider
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    /// Authorization endpoint URL
    pub auth_url: String,
    /// Token endpoint URL
    pub token_url: String,
}

impl OAuthConfig {
    /// Configuration for the Yandex OAuth server with disk read scope.
    pub fn yandex(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            scopes: vec![YANDEX_DISK_READ_SCOPE.to_string()],
            auth_url: YANDEX_AUTHORIZE_URL.to_string(),
            token_url: YANDEX_TOKEN_URL.to_string(),
        }
    }
}

impl fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .finish()
    }
}

/// OAuth 2.0 flow manager.
///
/// Drives a visitor from [`AuthState::Unauthenticated`] through
/// [`AuthState::AwaitingProviderCallback`] to [`AuthState::Authenticated`].
pub struct OAuthFlowManager {
    config: OAuthConfig,
    http_client: Arc<dyn HttpClient>,
}

impl OAuthFlowManager {
    pub fn new(config: OAuthConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            config,
            http_client,
        }
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Build the authorization URL the visitor must be sent to.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured authorization endpoint is not a
    /// valid URL.
    pub fn build_auth_url(&self) -> Result<String> {
        let mut url = Url::parse(&self.config.auth_url)
            .map_err(|e| AuthError::Other(format!("Invalid auth URL: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("scope", &self.config.scopes.join(" "));

        Ok(url.to_string())
    }

    /// Start the flow: the returned URL moves the visitor to
    /// [`AuthState::AwaitingProviderCallback`].
    #[instrument(skip(self))]
    pub fn begin_authorization(&self) -> Result<(String, AuthState)> {
        let url = self.build_auth_url()?;
        debug!("Redirecting visitor to the OAuth provider");
        Ok((url, AuthState::AwaitingProviderCallback))
    }

    /// Exchange an authorization code for an access token.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MissingAuthorizationCode`] for an empty code (no request is sent)
    /// - [`AuthError::TokenEndpoint`] when the provider answers with a non-200 status
    /// - [`AuthError::NetworkError`] when no answer was obtained
    /// - [`AuthError::InvalidTokenResponse`] when a 200 body cannot be parsed
    #[instrument(skip(self, code))]
    pub async fn exchange_code(&self, code: &str) -> Result<AccessToken> {
        if code.trim().is_empty() {
            return Err(AuthError::MissingAuthorizationCode);
        }

        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let encoded_body = serde_urlencoded::to_string(&params[..])
            .map_err(|e| AuthError::Other(format!("Failed to encode token request: {}", e)))?;

        let request = HttpRequest::new(HttpMethod::Post, self.config.token_url.clone())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Accept", "application/json")
            .body(Bytes::from(encoded_body));

        debug!("Exchanging authorization code for an access token");

        let response = self.http_client.execute(request).await.map_err(|e| {
            error!(error = %e, "Token endpoint unreachable");
            AuthError::NetworkError(e.to_string())
        })?;

        if response.status != 200 {
            let status = response.status;
            let body: TokenErrorResponse = response.json().unwrap_or_default();
            let description = body
                .description()
                .map(str::to_string)
                .or_else(|| response.text().ok().filter(|t| !t.trim().is_empty()))
                .unwrap_or_else(|| format!("HTTP {}", status));

            warn!(status, error = %description, "Token endpoint rejected the authorization code");

            return Err(AuthError::TokenEndpoint {
                status,
                description,
            });
        }

        let token: TokenResponse = response.json().map_err(|e| {
            error!(error = %e, "Token endpoint returned an unreadable body");
            AuthError::InvalidTokenResponse(e.to_string())
        })?;

        if token.access_token.is_empty() {
            error!("Token endpoint returned an empty access token");
            return Err(AuthError::InvalidTokenResponse(
                "access_token is empty".to_string(),
            ));
        }

        info!(expires_in = ?token.expires_in, "Obtained access token");

        Ok(AccessToken::new(token.access_token))
    }

    /// Complete the flow for one callback request.
    ///
    /// On success the token is written to the session identified by
    /// `session_id` and the resulting [`AuthState::Authenticated`] returned.
    #[instrument(skip(self, params, tokens, session_id))]
    pub async fn handle_callback(
        &self,
        params: &CallbackParams,
        tokens: &SessionTokenStore,
        session_id: &str,
    ) -> Result<AuthState> {
        if let Some(error) = params.error.as_deref().filter(|e| !e.is_empty()) {
            warn!(error, description = ?params.error_description, "Provider reported an authorization error");
            return Err(AuthError::AuthorizationDenied {
                error: error.to_string(),
                description: params.error_description.clone(),
            });
        }

        let code = match params.code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => code,
            _ => {
                warn!("OAuth callback received without an authorization code");
                return Err(AuthError::MissingAuthorizationCode);
            }
        };

        let token = self.exchange_code(code).await?;
        tokens.store_token(session_id, &token).await?;

        Ok(AuthState::Authenticated(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_server::MemorySessionStore;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::http::HttpResponse;
    use mockall::mock;
    use std::time::Duration;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    fn config() -> OAuthConfig {
        OAuthConfig::yandex("test-client", "test-secret", "http://localhost:8000/oauth/callback")
    }

    fn token_store() -> SessionTokenStore {
        SessionTokenStore::new(Arc::new(MemorySessionStore::new(Duration::from_secs(60))))
    }

    fn callback(code: Option<&str>) -> CallbackParams {
        CallbackParams {
            code: code.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_auth_url() {
        let manager = OAuthFlowManager::new(config(), Arc::new(MockHttpClient::new()));
        let url = Url::parse(&manager.build_auth_url().unwrap()).unwrap();

        assert_eq!(url.host_str(), Some("oauth.yandex.com"));
        assert_eq!(url.path(), "/authorize");

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("response_type".to_string(), "code".to_string()),
                ("client_id".to_string(), "test-client".to_string()),
                (
                    "redirect_uri".to_string(),
                    "http://localhost:8000/oauth/callback".to_string()
                ),
                ("scope".to_string(), "cloud_api:disk.read".to_string()),
            ]
        );
        assert!(url.as_str().contains("redirect_uri=http%3A%2F%2Flocalhost%3A8000%2Foauth%2Fcallback"));
    }

    #[test]
    fn test_build_auth_url_invalid_url() {
        let mut config = config();
        config.auth_url = "not a valid url".to_string();

        let manager = OAuthFlowManager::new(config, Arc::new(MockHttpClient::new()));
        assert!(matches!(manager.build_auth_url(), Err(AuthError::Other(_))));
    }

    #[test]
    fn test_begin_authorization_awaits_callback() {
        let manager = OAuthFlowManager::new(config(), Arc::new(MockHttpClient::new()));
        let (url, state) = manager.begin_authorization().unwrap();

        assert!(url.starts_with(YANDEX_AUTHORIZE_URL));
        assert_eq!(state, AuthState::AwaitingProviderCallback);
    }

    #[test]
    fn test_config_debug_redacts_secret() {
        let debug = format!("{:?}", config());
        assert!(!debug.contains("test-secret"));
    }

    #[tokio::test]
    async fn test_exchange_code_posts_form() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .withf(|request| {
                let body = request
                    .body
                    .as_ref()
                    .map(|b| String::from_utf8_lossy(b).to_string())
                    .unwrap_or_default();

                request.method == HttpMethod::Post
                    && request.url == YANDEX_TOKEN_URL
                    && request.headers.get("Content-Type").map(String::as_str)
                        == Some("application/x-www-form-urlencoded")
                    && body.contains("grant_type=authorization_code")
                    && body.contains("code=4821")
                    && body.contains("client_id=test-client")
                    && body.contains("client_secret=test-secret")
                    && body.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8000%2Foauth%2Fcallback")
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, r#"{"access_token":"T1","expires_in":3600}"#)));

        let manager = OAuthFlowManager::new(config(), Arc::new(http_client));
        let token = manager.exchange_code("4821").await.unwrap();

        assert_eq!(token.as_str(), "T1");
    }

    #[tokio::test]
    async fn test_callback_stores_token_in_session() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, r#"{"access_token":"T1"}"#)));

        let manager = OAuthFlowManager::new(config(), Arc::new(http_client));
        let tokens = token_store();

        let state = manager
            .handle_callback(&callback(Some("4821")), &tokens, "sid")
            .await
            .unwrap();

        assert_eq!(state, AuthState::Authenticated(AccessToken::new("T1")));
        assert_eq!(
            tokens.access_token("sid").await.unwrap(),
            Some(AccessToken::new("T1"))
        );
    }

    #[tokio::test]
    async fn test_callback_without_code_never_calls_token_endpoint() {
        let mut http_client = MockHttpClient::new();
        http_client.expect_execute().times(0);

        let manager = OAuthFlowManager::new(config(), Arc::new(http_client));
        let tokens = token_store();

        for params in [callback(None), callback(Some("")), callback(Some("   "))] {
            let result = manager.handle_callback(&params, &tokens, "sid").await;
            assert!(matches!(result, Err(AuthError::MissingAuthorizationCode)));
        }

        assert_eq!(tokens.access_token("sid").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_callback_with_provider_error() {
        let mut http_client = MockHttpClient::new();
        http_client.expect_execute().times(0);

        let manager = OAuthFlowManager::new(config(), Arc::new(http_client));
        let params = CallbackParams {
            code: None,
            error: Some("access_denied".to_string()),
            error_description: Some("User denied access".to_string()),
        };

        let err = manager
            .handle_callback(&params, &token_store(), "sid")
            .await
            .unwrap_err();

        assert!(err.is_client_error());
        assert!(err.to_string().contains("User denied access"));
    }

    #[tokio::test]
    async fn test_token_endpoint_rejection_carries_description() {
        let mut http_client = MockHttpClient::new();
        http_client.expect_execute().times(1).returning(|_| {
            Ok(HttpResponse::new(
                401,
                r#"{"error":"bad_verification_code","error_description":"invalid_grant"}"#,
            ))
        });

        let manager = OAuthFlowManager::new(config(), Arc::new(http_client));
        let tokens = token_store();
        let err = manager
            .handle_callback(&callback(Some("stale")), &tokens, "sid")
            .await
            .unwrap_err();

        match &err {
            AuthError::TokenEndpoint {
                status,
                description,
            } => {
                assert_eq!(*status, 401);
                assert_eq!(description, "invalid_grant");
            }
            other => panic!("expected TokenEndpoint, got {:?}", other),
        }
        assert_eq!(err.to_string(), "Failed to obtain access token: invalid_grant");
        assert!(err.is_client_error());
        assert_eq!(tokens.access_token("sid").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_token_endpoint_rejection_with_plain_body() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(503, "")));

        let manager = OAuthFlowManager::new(config(), Arc::new(http_client));
        let err = manager.exchange_code("4821").await.unwrap_err();

        assert!(matches!(
            err,
            AuthError::TokenEndpoint { status: 503, ref description } if description == "HTTP 503"
        ));
    }

    #[tokio::test]
    async fn test_network_failure_is_not_a_client_error() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .times(1)
            .returning(|_| Err(BridgeError::OperationFailed("Connection refused".to_string())));

        let manager = OAuthFlowManager::new(config(), Arc::new(http_client));
        let err = manager.exchange_code("4821").await.unwrap_err();

        assert!(matches!(err, AuthError::NetworkError(_)));
        assert!(!err.is_client_error());
    }

    #[tokio::test]
    async fn test_unparsable_success_body() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, "<html>oops</html>")));

        let manager = OAuthFlowManager::new(config(), Arc::new(http_client));
        let err = manager.exchange_code("4821").await.unwrap_err();

        assert!(matches!(err, AuthError::InvalidTokenResponse(_)));
        assert!(!err.is_client_error());
    }
}
