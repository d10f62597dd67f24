//! Cookie-backed session identifiers
//!
//! The cookie only carries an opaque random id. Everything stored for the
//! visitor lives in the server-side [`SessionStore`](bridge_traits::SessionStore).

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use cookie::time::Duration as CookieDuration;
use rand::RngCore;
use std::time::Duration;

pub const SESSION_COOKIE: &str = "sessionid";

const SESSION_ID_BYTES: usize = 32;

/// Attributes applied to every session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieSettings {
    pub secure: bool,
    pub max_age: Duration,
}

/// Fresh 256-bit session id, URL-safe base64 without padding.
pub fn new_session_id() -> String {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Session id carried by the request, if any.
pub fn session_id(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().trim().to_string())
        .filter(|id| !id.is_empty())
}

pub fn session_cookie(session_id: String, settings: &CookieSettings) -> Cookie<'static> {
    let max_age = i64::try_from(settings.max_age.as_secs()).unwrap_or(i64::MAX);

    Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(max_age))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ids_are_unique_and_url_safe() {
        let a = new_session_id();
        let b = new_session_id();

        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_cookie_attributes() {
        let settings = CookieSettings {
            secure: false,
            max_age: Duration::from_secs(60),
        };
        let cookie = session_cookie("abc".to_string(), &settings);

        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert!(!cookie.secure().unwrap_or(false));
    }

    #[test]
    fn test_session_id_from_jar() {
        let jar = CookieJar::new();
        assert_eq!(session_id(&jar), None);

        let jar = jar.add(Cookie::new(SESSION_COOKIE, "xyz"));
        assert_eq!(session_id(&jar).as_deref(), Some("xyz"));

        let jar = jar.add(Cookie::new(SESSION_COOKIE, ""));
        assert_eq!(session_id(&jar), None);
    }
}
