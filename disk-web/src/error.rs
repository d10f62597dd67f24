use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use core_auth::AuthError;
use core_service::ServiceError;
use thiserror::Error;
use tracing::{error, warn};

pub const OAUTH_PROVIDER_UNREACHABLE: &str = "Error communicating with the OAuth provider";
pub const STORAGE_PROVIDER_UNREACHABLE: &str = "Error communicating with the storage provider";
pub const INTERNAL_ERROR: &str = "Internal server error";

/// Failures a handler reports to the visitor as a plain-text body.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    /// A failing status passed through from a file host.
    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    #[error("{0}")]
    BadGateway(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Upstream { status, .. } => *status,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        if err.is_client_error() {
            return AppError::BadRequest(err.to_string());
        }

        match err {
            AuthError::NetworkError(_) | AuthError::InvalidTokenResponse(_) => {
                error!(error = %err, "OAuth provider exchange failed");
                AppError::Internal(OAUTH_PROVIDER_UNREACHABLE.to_string())
            }
            other => {
                error!(error = %other, "Authentication failed");
                AppError::Internal(INTERNAL_ERROR.to_string())
            }
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidUrl(_) => AppError::BadRequest(err.to_string()),
            ServiceError::HostNotAllowed(_) => AppError::Forbidden(err.to_string()),
            ServiceError::DownloadFailed { status } => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                AppError::Upstream {
                    status,
                    message: err.to_string(),
                }
            }
            ServiceError::Network(_) | ServiceError::Provider(_) => {
                warn!(error = %err, "Storage provider unreachable");
                AppError::BadGateway(STORAGE_PROVIDER_UNREACHABLE.to_string())
            }
            ServiceError::Auth(auth) => auth.into(),
            ServiceError::Serialization(_) => {
                error!(error = %err, "Failed to encode listing");
                AppError::Internal(INTERNAL_ERROR.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_endpoint_rejection_is_bad_request() {
        let err: AppError = AuthError::TokenEndpoint {
            status: 401,
            description: "invalid_grant".to_string(),
        }
        .into();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Failed to obtain access token: invalid_grant");
    }

    #[test]
    fn test_network_fault_is_internal_error() {
        let err: AppError = AuthError::NetworkError("connection reset".to_string()).into();

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), OAUTH_PROVIDER_UNREACHABLE);
    }

    #[test]
    fn test_download_status_passes_through() {
        let err: AppError = ServiceError::DownloadFailed { status: 404 }.into();

        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Error occurred while downloading file.");
    }

    #[test]
    fn test_download_url_errors() {
        let bad: AppError = ServiceError::InvalidUrl("nope".to_string()).into();
        let forbidden: AppError = ServiceError::HostNotAllowed("evil.example".to_string()).into();

        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
    }
}
