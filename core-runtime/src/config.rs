//! # Application Configuration
//!
//! Provides the validated settings the disk browser is assembled from.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct an
//! [`AppConfig`]. It enforces fail-fast validation: the OAuth client
//! credentials are required, and every duration and size must be non-zero,
//! so a misconfigured deployment refuses to start instead of failing on the
//! first request.
//!
//! ## Sources
//!
//! [`AppConfig::from_env`] reads the process environment:
//!
//! | Variable | Default |
//! |---|---|
//! | `YA_CLIENT_ID` | required |
//! | `YA_CLIENT_SECRET` | required |
//! | `YA_REDIRECT_URI` | required |
//! | `DISK_BIND_ADDR` | `127.0.0.1:8000` |
//! | `DISK_LISTING_CACHE_TTL_SECS` | `300` |
//! | `DISK_CACHE_CAPACITY` | `1024` |
//! | `DISK_SESSION_TTL_SECS` | `1209600` (14 days) |
//! | `DISK_HTTP_TIMEOUT_SECS` | `30` |
//! | `DISK_DOWNLOAD_ALLOWED_HOSTS` | `yandex.net,yandex.ru,yandex.com` |
//! | `DISK_SECURE_COOKIES` | `false` |
//! | `DISK_LOG_FORMAT` | `pretty` in debug builds, `json` in release |
//! | `DISK_LOG_LEVEL` | `info` |
//! | `DISK_LOG_FILTER` | none |
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::AppConfig;
//!
//! let config = AppConfig::builder()
//!     .client_id("my-client")
//!     .client_secret("my-secret")
//!     .redirect_uri("http://localhost:8000/oauth/callback")
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use crate::logging::{LogFormat, LoggingConfig};
use bridge_traits::time::LogLevel;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_LISTING_CACHE_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(14 * 24 * 60 * 60);
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_DOWNLOAD_HOSTS: &[&str] = &["yandex.net", "yandex.ru", "yandex.com"];

/// OAuth client registration.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl fmt::Debug for OAuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// Which hosts the download proxy may fetch from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedHosts {
    /// Any host (`*`).
    Any,
    /// Hosts equal to, or a subdomain of, one of the listed domains.
    Suffixes(Vec<String>),
}

impl AllowedHosts {
    pub fn permits(&self, host: &str) -> bool {
        match self {
            AllowedHosts::Any => true,
            AllowedHosts::Suffixes(domains) => {
                let host = host.trim_end_matches('.').to_ascii_lowercase();
                domains.iter().any(|domain| {
                    host == *domain
                        || host
                            .strip_suffix(domain.as_str())
                            .is_some_and(|prefix| prefix.ends_with('.'))
                })
            }
        }
    }
}

impl Default for AllowedHosts {
    fn default() -> Self {
        AllowedHosts::Suffixes(DEFAULT_DOWNLOAD_HOSTS.iter().map(|h| h.to_string()).collect())
    }
}

impl FromStr for AllowedHosts {
    type Err = Error;

    /// Parse `*` or a comma separated list of domains.
    fn from_str(value: &str) -> Result<Self> {
        if value.trim() == "*" {
            return Ok(AllowedHosts::Any);
        }

        let domains: Vec<String> = value
            .split(',')
            .map(|d| d.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .collect();

        if domains.is_empty() {
            return Err(Error::InvalidValue {
                name: "download allowed hosts".to_string(),
                value: value.to_string(),
                message: "expected '*' or a comma separated list of domains".to_string(),
            });
        }

        Ok(AllowedHosts::Suffixes(domains))
    }
}

/// Settings for the whole application.
///
/// Use [`AppConfigBuilder`] (via [`AppConfig::builder`]) or
/// [`AppConfig::from_env`] to construct instances.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub oauth: OAuthSettings,

    /// Address the HTTP server listens on
    pub bind_addr: SocketAddr,

    /// How long a folder listing stays cached
    pub listing_cache_ttl: Duration,

    /// Maximum number of cache entries before LRU eviction
    pub cache_capacity: usize,

    /// Lifetime of a session after its last write
    pub session_ttl: Duration,

    /// Timeout applied to every outbound HTTP call
    pub http_timeout: Duration,

    pub download_allowed_hosts: AllowedHosts,

    /// Mark the session cookie `Secure`
    pub secure_cookies: bool,

    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Unset and blank variables fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut builder = AppConfig::builder();

        if let Some(value) = var("YA_CLIENT_ID") {
            builder = builder.client_id(value);
        }
        if let Some(value) = var("YA_CLIENT_SECRET") {
            builder = builder.client_secret(value);
        }
        if let Some(value) = var("YA_REDIRECT_URI") {
            builder = builder.redirect_uri(value);
        }
        if let Some(value) = var("DISK_BIND_ADDR") {
            builder = builder.bind_addr(parse_value("DISK_BIND_ADDR", &value)?);
        }
        if let Some(value) = var("DISK_LISTING_CACHE_TTL_SECS") {
            builder = builder.listing_cache_ttl(Duration::from_secs(parse_value(
                "DISK_LISTING_CACHE_TTL_SECS",
                &value,
            )?));
        }
        if let Some(value) = var("DISK_CACHE_CAPACITY") {
            builder = builder.cache_capacity(parse_value("DISK_CACHE_CAPACITY", &value)?);
        }
        if let Some(value) = var("DISK_SESSION_TTL_SECS") {
            builder = builder.session_ttl(Duration::from_secs(parse_value(
                "DISK_SESSION_TTL_SECS",
                &value,
            )?));
        }
        if let Some(value) = var("DISK_HTTP_TIMEOUT_SECS") {
            builder = builder.http_timeout(Duration::from_secs(parse_value(
                "DISK_HTTP_TIMEOUT_SECS",
                &value,
            )?));
        }
        if let Some(value) = var("DISK_DOWNLOAD_ALLOWED_HOSTS") {
            builder = builder.download_allowed_hosts(value.parse()?);
        }
        if let Some(value) = var("DISK_SECURE_COOKIES") {
            builder = builder.secure_cookies(parse_bool("DISK_SECURE_COOKIES", &value)?);
        }

        let mut logging = LoggingConfig::default();
        if let Some(value) = var("DISK_LOG_FORMAT") {
            logging = logging.with_format(value.parse()?);
        }
        if let Some(value) = var("DISK_LOG_LEVEL") {
            let level = LogLevel::parse(&value).ok_or_else(|| Error::InvalidValue {
                name: "DISK_LOG_LEVEL".to_string(),
                value: value.clone(),
                message: "expected one of trace, debug, info, warn, error".to_string(),
            })?;
            logging = logging.with_level(level);
        }
        if let Some(value) = var("DISK_LOG_FILTER") {
            logging = logging.with_filter(value);
        }

        builder.logging(logging).build()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - OAuth settings are non-empty and the redirect URI is absolute http(s)
    /// - Cache TTL, cache capacity, session TTL and HTTP timeout are non-zero
    pub fn validate(&self) -> Result<()> {
        if self.oauth.client_id.trim().is_empty() {
            return Err(Error::Config("OAuth client id cannot be empty".to_string()));
        }

        if self.oauth.client_secret.trim().is_empty() {
            return Err(Error::Config(
                "OAuth client secret cannot be empty".to_string(),
            ));
        }

        let redirect = self.oauth.redirect_uri.as_str();
        if !(redirect.starts_with("http://") || redirect.starts_with("https://")) {
            return Err(Error::Config(format!(
                "OAuth redirect URI must be an absolute http(s) URL, got '{}'",
                redirect
            )));
        }

        if self.listing_cache_ttl.is_zero() {
            return Err(Error::Config(
                "Listing cache TTL must be greater than 0 seconds".to_string(),
            ));
        }

        if self.cache_capacity == 0 {
            return Err(Error::Config(
                "Cache capacity must be greater than 0 entries".to_string(),
            ));
        }

        if self.session_ttl.is_zero() {
            return Err(Error::Config(
                "Session TTL must be greater than 0 seconds".to_string(),
            ));
        }

        if self.http_timeout.is_zero() {
            return Err(Error::Config(
                "HTTP timeout must be greater than 0 seconds".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_value<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| Error::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
        message: e.to_string(),
    })
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
            message: "expected true or false".to_string(),
        }),
    }
}

fn oauth_missing_error(variable: &str, what: &str) -> Error {
    Error::CapabilityMissing {
        capability: format!("OAuth {}", what),
        message: format!(
            "An OAuth {} is required to sign users in. Set {} or call the matching builder method.",
            what, variable
        ),
    }
}

/// Builder for constructing [`AppConfig`] instances.
///
/// Call [`build()`](AppConfigBuilder::build) once the OAuth credentials are
/// set; every other field has a default.
#[derive(Default)]
pub struct AppConfigBuilder {
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: Option<String>,
    bind_addr: Option<SocketAddr>,
    listing_cache_ttl: Option<Duration>,
    cache_capacity: Option<usize>,
    session_ttl: Option<Duration>,
    http_timeout: Option<Duration>,
    download_allowed_hosts: Option<AllowedHosts>,
    secure_cookies: bool,
    logging: Option<LoggingConfig>,
}

impl AppConfigBuilder {
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Sets the redirect URI registered with the OAuth provider.
    ///
    /// It must point at this server's `/oauth/callback` route.
    pub fn redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = Some(addr);
        self
    }

    /// Default: 300 seconds
    pub fn listing_cache_ttl(mut self, ttl: Duration) -> Self {
        self.listing_cache_ttl = Some(ttl);
        self
    }

    /// Default: 1024 entries
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = Some(capacity);
        self
    }

    /// Default: 14 days
    pub fn session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = Some(ttl);
        self
    }

    /// Default: 30 seconds
    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    pub fn download_allowed_hosts(mut self, hosts: AllowedHosts) -> Self {
        self.download_allowed_hosts = Some(hosts);
        self
    }

    pub fn secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Builds the final `AppConfig` instance.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] when an OAuth credential was never set
    /// - [`Error::Config`] when a value fails [`AppConfig::validate`]
    pub fn build(self) -> Result<AppConfig> {
        let client_id = self
            .client_id
            .ok_or_else(|| oauth_missing_error("YA_CLIENT_ID", "client id"))?;
        let client_secret = self
            .client_secret
            .ok_or_else(|| oauth_missing_error("YA_CLIENT_SECRET", "client secret"))?;
        let redirect_uri = self
            .redirect_uri
            .ok_or_else(|| oauth_missing_error("YA_REDIRECT_URI", "redirect URI"))?;

        let bind_addr = match self.bind_addr {
            Some(addr) => addr,
            None => parse_value("DISK_BIND_ADDR", DEFAULT_BIND_ADDR)?,
        };

        let config = AppConfig {
            oauth: OAuthSettings {
                client_id,
                client_secret,
                redirect_uri,
            },
            bind_addr,
            listing_cache_ttl: self.listing_cache_ttl.unwrap_or(DEFAULT_LISTING_CACHE_TTL),
            cache_capacity: self.cache_capacity.unwrap_or(DEFAULT_CACHE_CAPACITY),
            session_ttl: self.session_ttl.unwrap_or(DEFAULT_SESSION_TTL),
            http_timeout: self.http_timeout.unwrap_or(DEFAULT_HTTP_TIMEOUT),
            download_allowed_hosts: self.download_allowed_hosts.unwrap_or_default(),
            secure_cookies: self.secure_cookies,
            logging: self.logging.unwrap_or_default(),
        };

        config.validate()?;

        Ok(config)
    }
}
