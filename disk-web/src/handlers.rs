//! Route handlers

use axum::extract::{Form, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use core_auth::{AccessToken, CallbackParams};
use serde::Deserialize;
use tracing::{debug, info};

use crate::app::AppState;
use crate::error::AppError;
use crate::session::{new_session_id, session_cookie, session_id};
use crate::templates::{render_index, render_listing};

const SIGNED_IN_NOTICE: &str = "Signed in. Paste a public folder link to browse it.";

#[derive(Debug, Default, Deserialize)]
pub struct FilesQuery {
    pub public_key: Option<String>,
    pub media_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FilesForm {
    pub public_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DownloadForm {
    pub file_url: Option<String>,
}

/// 302 with a `Location` header.
fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(_) => AppError::Internal(format!("Invalid redirect target: {}", location)).into_response(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn authorize_redirect(state: &AppState) -> Result<Response, AppError> {
    let (url, _) = state.service.oauth().begin_authorization()?;
    Ok(found(&url))
}

async fn session_token(state: &AppState, jar: &CookieJar) -> Result<Option<AccessToken>, AppError> {
    match session_id(jar) {
        Some(id) => Ok(state.service.session_token(&id).await?),
        None => Ok(None),
    }
}

pub async fn index() -> Html<String> {
    Html(render_index(None))
}

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn authorize(State(state): State<AppState>) -> Result<Response, AppError> {
    authorize_redirect(&state)
}

/// Provider redirect target. A successful exchange starts a new session.
pub async fn oauth_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Html<String>), AppError> {
    let session_id = new_session_id();

    state
        .service
        .oauth()
        .handle_callback(&params, state.service.tokens(), &session_id)
        .await?;

    info!("Visitor signed in");

    let jar = jar.add(session_cookie(session_id, &state.cookies));
    Ok((jar, Html(render_index(Some(SIGNED_IN_NOTICE)))))
}

async fn render_files(
    state: &AppState,
    jar: &CookieJar,
    public_key: Option<String>,
    media_type: Option<String>,
) -> Result<Response, AppError> {
    let Some(token) = session_token(state, jar).await? else {
        debug!("No access token in session, starting OAuth flow");
        return authorize_redirect(state);
    };

    let Some(public_key) = non_empty(public_key) else {
        return Ok(found("/"));
    };

    let media_type = non_empty(media_type);
    let items = state
        .service
        .listings()
        .get_cached_listing(&public_key, token.as_str(), media_type.as_deref())
        .await?;

    Ok(Html(render_listing(&public_key, &items, media_type.as_deref())).into_response())
}

pub async fn list_files(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<FilesQuery>,
) -> Result<Response, AppError> {
    render_files(&state, &jar, query.public_key, query.media_type).await
}

/// Form submission from the landing page; never filtered.
pub async fn list_files_form(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<FilesForm>,
) -> Result<Response, AppError> {
    render_files(&state, &jar, form.public_key, None).await
}

pub async fn redirect_home() -> Response {
    found("/")
}

pub async fn download(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<DownloadForm>,
) -> Result<Response, AppError> {
    if session_token(&state, &jar).await?.is_none() {
        return authorize_redirect(&state);
    }

    let file_url = non_empty(form.file_url)
        .ok_or_else(|| AppError::BadRequest("Missing file_url".to_string()))?;

    let file = state.service.downloads().download(&file_url).await?;

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file.filename))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"download\""));

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.body,
    )
        .into_response())
}
