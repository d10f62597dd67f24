//! # Host Bridge Traits
//!
//! Abstraction traits the disk browser core is written against.
//!
//! ## Overview
//!
//! This crate defines the contract between the request handling core and the
//! concrete infrastructure it runs on. Handlers never reach for globals: the
//! HTTP client, the session store and the cache store are all injected as
//! trait objects, which keeps every handler testable with in-memory fakes.
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - One-shot async HTTP exchange
//! - [`PublicResourceProvider`](storage::PublicResourceProvider) - Listing of a publicly shared folder
//!
//! ### Server-side state
//! - [`SessionStore`](storage::SessionStore) - Per-user key-value session attributes
//! - [`CacheStore`](storage::CacheStore) - Shared byte cache with per-entry TTL
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. A
//! provider that got an answer with a failing status reports
//! [`BridgeError::UpstreamStatus`](error::BridgeError::UpstreamStatus) so
//! callers can decide whether to degrade or surface it.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so they can be shared across the
//! request tasks of the web server.

pub mod error;
pub mod http;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use storage::{CacheStore, FileItem, PublicResourceProvider, SessionStore};
pub use time::{Clock, LogLevel, ManualClock, SystemClock};
