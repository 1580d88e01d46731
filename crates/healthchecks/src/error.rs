//! Error types for the healthchecks client.

use thiserror::Error;

/// Result type for healthchecks operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the healthchecks API.
#[derive(Error, Debug)]
pub enum Error {
    /// The API answered with a non-success status.
    #[error("healthchecks API returned {status}: {body}")]
    Api { status: u16, body: String },

    /// Configuration error.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// HTTP error from reqwest.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parse error.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an API error.
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }

    /// Create a config error.
    pub fn config_error(reason: impl Into<String>) -> Self {
        Self::ConfigError {
            reason: reason.into(),
        }
    }

    /// The HTTP status of an API error, if this is one.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if the API reported the resource as absent.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            Self::Http(_) => true,
            _ => false,
        }
    }
}
