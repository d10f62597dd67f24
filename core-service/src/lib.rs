//! Disk browser service façade.
//!
//! Wires the host-provided bridges (HTTP, listing provider, cache, sessions)
//! into the three capabilities the web layer needs: the OAuth flow, the
//! cached listing and the download proxy.

pub mod download;
pub mod error;
pub mod listing;

pub use download::{filename_from_url, DownloadProxy, DownloadedFile, FALLBACK_FILENAME};
pub use error::{Result, ServiceError};
pub use listing::{filter_by_media_type, listing_cache_key, ListingCache, LISTING_NAMESPACE};

use std::sync::Arc;

use bridge_traits::{
    http::HttpClient,
    storage::{CacheStore, PublicResourceProvider, SessionStore},
};
use core_auth::{AccessToken, OAuthConfig, OAuthFlowManager, SessionTokenStore};
use core_runtime::config::AppConfig;

/// Aggregated handle to all bridge dependencies the service requires.
#[derive(Clone)]
pub struct ServiceDependencies {
    pub http_client: Arc<dyn HttpClient>,
    pub provider: Arc<dyn PublicResourceProvider>,
    pub cache: Arc<dyn CacheStore>,
    pub sessions: Arc<dyn SessionStore>,
}

impl ServiceDependencies {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        provider: Arc<dyn PublicResourceProvider>,
        cache: Arc<dyn CacheStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            http_client,
            provider,
            cache,
            sessions,
        }
    }
}

/// Primary façade exposed to the web layer.
///
/// Cheap to clone; every clone shares the same cache and session store.
#[derive(Clone)]
pub struct DiskService {
    inner: Arc<Inner>,
}

struct Inner {
    oauth: OAuthFlowManager,
    tokens: SessionTokenStore,
    listings: ListingCache,
    downloads: DownloadProxy,
}

impl DiskService {
    /// Build the service from runtime configuration.
    pub fn new(config: &AppConfig, deps: ServiceDependencies) -> Self {
        let oauth_config = OAuthConfig::yandex(
            config.oauth.client_id.clone(),
            config.oauth.client_secret.clone(),
            config.oauth.redirect_uri.clone(),
        );

        Self::with_oauth_config(oauth_config, config, deps)
    }

    /// Like [`new`](Self::new) but with explicit OAuth endpoints.
    pub fn with_oauth_config(
        oauth_config: OAuthConfig,
        config: &AppConfig,
        deps: ServiceDependencies,
    ) -> Self {
        let inner = Inner {
            oauth: OAuthFlowManager::new(oauth_config, Arc::clone(&deps.http_client)),
            tokens: SessionTokenStore::new(deps.sessions),
            listings: ListingCache::new(deps.provider, deps.cache, config.listing_cache_ttl),
            downloads: DownloadProxy::new(deps.http_client, config.download_allowed_hosts.clone()),
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn oauth(&self) -> &OAuthFlowManager {
        &self.inner.oauth
    }

    pub fn tokens(&self) -> &SessionTokenStore {
        &self.inner.tokens
    }

    pub fn listings(&self) -> &ListingCache {
        &self.inner.listings
    }

    pub fn downloads(&self) -> &DownloadProxy {
        &self.inner.downloads
    }

    /// Access token stored in the session, if the visitor has completed the flow.
    pub async fn session_token(&self, session_id: &str) -> Result<Option<AccessToken>> {
        Ok(self.inner.tokens.access_token(session_id).await?)
    }
}
