//! # Yandex.Disk Provider
//!
//! Read-only client for publicly shared Yandex.Disk folders.
//!
//! ## Overview
//!
//! [`YandexDiskConnector`] lists the contents of a public folder through the
//! `v1/disk/resources/public` endpoint of the Yandex.Disk REST API and
//! implements [`PublicResourceProvider`](bridge_traits::PublicResourceProvider)
//! so the service layer never sees provider-specific types.
//!
//! ## Example
//!
//! ```ignore
//! use provider_yandex_disk::YandexDiskConnector;
//!
//! let connector = YandexDiskConnector::new(http_client);
//! let items = connector.fetch_listing("https://yadi.sk/d/abc", &token).await?;
//! ```

mod connector;
mod error;
mod types;

pub use connector::{YandexDiskConnector, PUBLIC_RESOURCES_URL};
pub use error::{Result, YandexDiskError};
pub use types::{ApiErrorBody, ListingResponse};
