//! Storage Abstractions
//!
//! Provides the remote folder contract (`PublicResourceProvider`), the record
//! it returns (`FileItem`) and the two server-side key-value stores handlers
//! depend on: per-user sessions and the shared TTL cache.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::warn;

use crate::error::{BridgeError, Result};

/// One entry of a public folder listing.
///
/// The well-known keys are typed for convenience; everything else the
/// provider sends is kept in `extra`. A typed key sent as `null` decodes to
/// `None` and is omitted when the record is encoded again, so cached
/// records never carry explicit nulls for those keys. Unknown keys keep
/// their `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// `file` or `dir`
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,

    /// Coarse category assigned by the provider (`image`, `video`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Direct download URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FileItem {
    pub fn is_dir(&self) -> bool {
        self.resource_type.as_deref() == Some("dir")
    }

    pub fn download_url(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// Exact comparison against the provider's `media_type` field.
    pub fn has_media_type(&self, media_type: &str) -> bool {
        self.media_type.as_deref() == Some(media_type)
    }
}

/// Read access to publicly shared folders of a storage provider.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::PublicResourceProvider;
///
/// let items = provider.fetch_listing("https://yadi.sk/d/abc", token).await?;
/// ```
#[async_trait]
pub trait PublicResourceProvider: Send + Sync {
    /// List the folder behind `public_key`.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::UpstreamStatus`] when the provider answers with a
    ///   non-success status
    /// - any other variant when no usable answer was obtained
    async fn list_public_resources(
        &self,
        public_key: &str,
        access_token: &str,
    ) -> Result<Vec<FileItem>>;

    /// Like [`list_public_resources`](Self::list_public_resources), but a
    /// status failure degrades to an empty listing.
    ///
    /// Callers cannot tell an empty folder from a rejected request. Transport
    /// failures are still returned as errors.
    async fn fetch_listing(&self, public_key: &str, access_token: &str) -> Result<Vec<FileItem>> {
        match self.list_public_resources(public_key, access_token).await {
            Err(BridgeError::UpstreamStatus { status, message }) => {
                warn!(status, error = %message, "Listing request rejected, returning empty listing");
                Ok(Vec::new())
            }
            other => other,
        }
    }
}

/// Server-side per-user session state.
///
/// Sessions are addressed by an opaque id handed to the browser. Expiry is
/// the implementation's business; an expired session simply reads as empty.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SessionStore;
///
/// store.set(session_id, "access_token", token).await?;
/// let token = store.get(session_id, "access_token").await?;
/// ```
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read one attribute. Unknown or expired sessions return `Ok(None)`.
    async fn get(&self, session_id: &str, key: &str) -> Result<Option<String>>;

    /// Write one attribute, creating the session if needed.
    async fn set(&self, session_id: &str, key: &str, value: &str) -> Result<()>;
}

/// Shared key-value cache with per-entry time-to-live.
///
/// Values are opaque bytes and are always replaced wholesale by `set`.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a live entry. Expired or missing keys return `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<Bytes>>;

    /// Store `value` under `key` for `ttl`.
    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<()>;
}
