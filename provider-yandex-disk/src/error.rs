//! Error types for the Yandex.Disk provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Yandex.Disk provider errors
#[derive(Error, Debug)]
pub enum YandexDiskError {
    /// API request returned a non-200 status
    #[error("Yandex.Disk API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// A 200 response whose body could not be decoded
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// No response was obtained
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

/// Result type for Yandex.Disk operations
pub type Result<T> = std::result::Result<T, YandexDiskError>;

impl From<YandexDiskError> for BridgeError {
    fn from(error: YandexDiskError) -> Self {
        match error {
            YandexDiskError::ApiError {
                status_code,
                message,
            } => BridgeError::UpstreamStatus {
                status: status_code,
                message,
            },
            YandexDiskError::ParseError(msg) => {
                BridgeError::OperationFailed(format!("Parse error: {}", msg))
            }
            YandexDiskError::NetworkError(msg) => {
                BridgeError::OperationFailed(format!("Network error: {}", msg))
            }
            YandexDiskError::BridgeError(e) => e,
        }
    }
}
