//! Error types for the infrastructure layer
//!
//! Nothing here crosses a controller boundary: domain code turns these into
//! notifications or logs them.

use thiserror::Error;

use crate::infra::notifier::Notification;

/// Failure talking to the flux server
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status without a decodable envelope
    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The server answered with `meta.ok == false`
    #[error("{short} ({code}): {long}")]
    Api { code: u16, short: String, long: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// `meta.ok` but no `content` where one was required
    #[error("Empty response from server")]
    MissingContent,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Message shown to the user for a failed content fetch
    pub fn to_notification(&self) -> Notification {
        Notification::error(self.to_string())
    }

    /// Server-reported error code, or the HTTP status when there is one
    pub fn code(&self) -> Option<u16> {
        match self {
            ApiError::Api { code, .. } => Some(*code),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Status {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        ApiError::InvalidUrl(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure reading or writing the local configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No configuration directory available on this platform")]
    NoConfigDir,
}
