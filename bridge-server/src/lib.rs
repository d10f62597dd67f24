//! # Server Bridge Implementations
//!
//! Default implementations of the bridge traits for the web server process.
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`
//! - `SessionStore` kept in process memory with a sliding expiry
//! - `CacheStore` kept in process memory, bounded by an LRU and per-entry TTL
//!
//! Both stores lose their contents on restart, which matches the lifetime of
//! the tokens they hold.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_server::{MemoryCacheStore, MemorySessionStore, ReqwestHttpClient};
//! use std::time::Duration;
//!
//! let http_client = ReqwestHttpClient::new(Duration::from_secs(30))?;
//! let sessions = MemorySessionStore::new(Duration::from_secs(14 * 24 * 3600));
//! let cache = MemoryCacheStore::new(1024);
//! ```

mod cache;
mod http;
mod session;

pub use cache::MemoryCacheStore;
pub use http::ReqwestHttpClient;
pub use session::MemorySessionStore;
