use axum::routing::{get, post};
use axum::Router;
use core_runtime::config::AppConfig;
use core_service::DiskService;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::session::CookieSettings;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: DiskService,
    pub cookies: CookieSettings,
}

impl AppState {
    pub fn new(service: DiskService, config: &AppConfig) -> Self {
        Self {
            service,
            cookies: CookieSettings {
                secure: config.secure_cookies,
                max_age: config.session_ttl,
            },
        }
    }
}

/// All routes of the browser.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/healthz", get(handlers::healthz))
        .route("/oauth/authorize", get(handlers::authorize))
        .route("/oauth/callback", get(handlers::oauth_callback))
        .route(
            "/files",
            get(handlers::list_files)
                .post(handlers::list_files_form)
                .fallback(handlers::redirect_home),
        )
        .route("/download", post(handlers::download))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
