//! Yandex.Disk REST API response types

use bridge_traits::storage::FileItem;
use serde::Deserialize;

/// Body of `GET /v1/disk/resources/public`.
///
/// Depending on the API revision the folder contents arrive either as a
/// top-level `items` array or nested under `_embedded`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingResponse {
    #[serde(default)]
    pub items: Option<Vec<FileItem>>,

    #[serde(default, rename = "_embedded")]
    pub embedded: Option<EmbeddedItems>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmbeddedItems {
    #[serde(default)]
    pub items: Vec<FileItem>,
}

impl ListingResponse {
    /// `items`, then `_embedded.items`, then nothing.
    pub fn into_items(self) -> Vec<FileItem> {
        self.items
            .or_else(|| self.embedded.map(|embedded| embedded.items))
            .unwrap_or_default()
    }
}

/// Error body returned with non-200 statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ApiErrorBody {
    pub fn summary(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.description.as_deref())
            .or(self.error.as_deref())
    }
}
