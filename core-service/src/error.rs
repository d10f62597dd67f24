use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid download URL: {0}")]
    InvalidUrl(String),

    #[error("Downloads from host '{0}' are not allowed")]
    HostNotAllowed(String),

    #[error("Error occurred while downloading file.")]
    DownloadFailed { status: u16 },

    #[error("Upstream request failed: {0}")]
    Network(String),

    #[error("Storage provider error: {0}")]
    Provider(BridgeError),

    #[error("Authentication error: {0}")]
    Auth(#[from] core_auth::AuthError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
