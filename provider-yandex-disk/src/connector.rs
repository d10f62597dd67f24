//! Yandex.Disk API connector implementation
//!
//! Implements the `PublicResourceProvider` trait for the public-resources
//! endpoint of the Yandex.Disk REST API v1.

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use bridge_traits::storage::{FileItem, PublicResourceProvider};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::error::{Result, YandexDiskError};
use crate::types::{ApiErrorBody, ListingResponse};

/// Public resources endpoint
pub const PUBLIC_RESOURCES_URL: &str = "https://cloud-api.yandex.net/v1/disk/resources/public";

/// Yandex.Disk API connector
///
/// Stateless apart from the HTTP client: the access token is passed per call
/// because every visitor brings their own.
///
/// Each listing is a single request. There is no pagination, so only the
/// first page the API returns is seen, and no retry.
pub struct YandexDiskConnector {
    http_client: Arc<dyn HttpClient>,
    endpoint: String,
}

impl YandexDiskConnector {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            endpoint: PUBLIC_RESOURCES_URL.to_string(),
        }
    }

    /// Point the connector at another deployment of the same API.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn listing_url(&self, public_key: &str) -> String {
        format!(
            "{}?public_key={}",
            self.endpoint,
            urlencoding::encode(public_key)
        )
    }

    /// List a public folder, reporting status failures as
    /// [`YandexDiskError::ApiError`].
    #[instrument(skip(self, public_key, access_token), fields(public_key = %public_key))]
    pub async fn try_fetch_listing(
        &self,
        public_key: &str,
        access_token: &str,
    ) -> Result<Vec<FileItem>> {
        let request = HttpRequest::new(HttpMethod::Get, self.listing_url(public_key))
            .oauth_token(access_token)
            .header("Accept", "application/json");

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| YandexDiskError::NetworkError(e.to_string()))?;

        if response.status != 200 {
            let body: ApiErrorBody = response.json().unwrap_or_default();
            let message = body
                .summary()
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", response.status));

            return Err(YandexDiskError::ApiError {
                status_code: response.status,
                message,
            });
        }

        let listing: ListingResponse = response
            .json()
            .map_err(|e| YandexDiskError::ParseError(e.to_string()))?;
        let items = listing.into_items();

        debug!(count = items.len(), "Fetched public folder listing");

        Ok(items)
    }

    /// List a public folder; any non-200 status yields an empty listing.
    ///
    /// A rejected request and an empty folder look the same to the caller.
    /// Use [`try_fetch_listing`](Self::try_fetch_listing) to tell them apart.
    pub async fn fetch_listing(&self, public_key: &str, access_token: &str) -> Result<Vec<FileItem>> {
        match self.try_fetch_listing(public_key, access_token).await {
            Err(YandexDiskError::ApiError {
                status_code,
                message,
            }) => {
                warn!(status = status_code, error = %message, "Listing request failed, returning empty listing");
                Ok(Vec::new())
            }
            other => other,
        }
    }
}

#[async_trait]
impl PublicResourceProvider for YandexDiskConnector {
    async fn list_public_resources(
        &self,
        public_key: &str,
        access_token: &str,
    ) -> bridge_traits::error::Result<Vec<FileItem>> {
        Ok(self.try_fetch_listing(public_key, access_token).await?)
    }
}
