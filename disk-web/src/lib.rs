//! # Web Surface
//!
//! axum router exposing the disk browser over HTTP.
//!
//! ## Routes
//!
//! | Route | Method | Purpose |
//! |---|---|---|
//! | `/` | GET | landing page |
//! | `/oauth/authorize` | GET | 302 to the provider's authorization page |
//! | `/oauth/callback` | GET | code exchange, starts the session |
//! | `/files` | GET, POST | folder listing (other methods go back to `/`) |
//! | `/download` | POST | proxied file download |
//! | `/healthz` | GET | liveness probe |
//!
//! Failures are plain-text bodies produced by [`AppError`].

pub mod app;
pub mod error;
pub mod handlers;
pub mod session;
pub mod templates;

pub use app::{router, AppState};
pub use error::AppError;
pub use session::{CookieSettings, SESSION_COOKIE};
