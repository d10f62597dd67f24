//! Cached public folder listings
//!
//! Listings are cached per `(public_key, access_token)` pair, so two visitors
//! never share an entry even when they browse the same folder. The cached
//! value is the JSON encoding of the provider's item list and is only ever
//! replaced wholesale. Filtering by media type happens on a freshly decoded
//! copy and is never written back.

use bridge_traits::storage::{CacheStore, FileItem, PublicResourceProvider};
use bridge_traits::BridgeError;
use bytes::Bytes;
use core_runtime::logging::redact_if_sensitive;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::error::{Result, ServiceError};

/// Cache namespace for folder listings.
pub const LISTING_NAMESPACE: &str = "file_list";

/// Cache key for the listing of `public_key` as seen with `access_token`.
pub fn listing_cache_key(public_key: &str, access_token: &str) -> String {
    format!("{}:{}:{}", LISTING_NAMESPACE, public_key, access_token)
}

/// Items whose `media_type` equals `media_type`, in listing order.
pub fn filter_by_media_type(items: Vec<FileItem>, media_type: &str) -> Vec<FileItem> {
    items
        .into_iter()
        .filter(|item| item.has_media_type(media_type))
        .collect()
}

/// Read-through cache in front of a [`PublicResourceProvider`].
pub struct ListingCache {
    provider: Arc<dyn PublicResourceProvider>,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl ListingCache {
    pub fn new(
        provider: Arc<dyn PublicResourceProvider>,
        cache: Arc<dyn CacheStore>,
        ttl: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            ttl,
        }
    }

    /// Listing of `public_key`, optionally narrowed to one media type.
    ///
    /// An empty `media_type` means no filter.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Provider`] when the provider could not be reached.
    /// A provider that answers with a failing status yields an empty listing
    /// which is not cached.
    #[instrument(
        skip(self, public_key, access_token),
        fields(public_key = %redact_if_sensitive("public_key", public_key))
    )]
    pub async fn get_cached_listing(
        &self,
        public_key: &str,
        access_token: &str,
        media_type: Option<&str>,
    ) -> Result<Vec<FileItem>> {
        let items = self.listing(public_key, access_token).await?;

        match media_type.filter(|m| !m.is_empty()) {
            Some(media_type) => Ok(filter_by_media_type(items, media_type)),
            None => Ok(items),
        }
    }

    async fn listing(&self, public_key: &str, access_token: &str) -> Result<Vec<FileItem>> {
        let key = listing_cache_key(public_key, access_token);

        if let Some(items) = self.cached(&key).await {
            debug!(count = items.len(), "Listing served from cache");
            return Ok(items);
        }

        let items = match self
            .provider
            .list_public_resources(public_key, access_token)
            .await
        {
            Ok(items) => items,
            Err(BridgeError::UpstreamStatus { status, message }) => {
                warn!(status, error = %message, "Listing request rejected, serving empty listing");
                return Ok(Vec::new());
            }
            Err(e) => return Err(ServiceError::Provider(e)),
        };

        let encoded = serde_json::to_vec(&items)?;
        if let Err(e) = self.cache.set(&key, Bytes::from(encoded), self.ttl).await {
            warn!(error = %e, "Failed to cache listing");
        }

        debug!(count = items.len(), ttl_secs = self.ttl.as_secs(), "Listing fetched and cached");
        Ok(items)
    }

    /// Decoded cache entry, or `None` on a miss or an unreadable entry.
    async fn cached(&self, key: &str) -> Option<Vec<FileItem>> {
        let bytes = match self.cache.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Cache lookup failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(items) => Some(items),
            Err(e) => {
                warn!(error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }
}
