//! Error types for bridge-services

use bridge_core::ProviderError;
use reqwest::StatusCode;

/// Result type for bridge-services operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the backend integrations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport-level HTTP failure (connect, TLS, timeout, body)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("GET {url} returned {status}")]
    Status { url: String, status: StatusCode },

    /// A configured base URL could not be used
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// A tool argument was present but unusable
    #[error("{0}")]
    InvalidArgument(String),

    /// An upstream timestamp was not in a known format
    #[error("Invalid timestamp '{0}'")]
    Timestamp(String),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML configuration could not be parsed
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<Error> for ProviderError {
    fn from(err: Error) -> Self {
        match err {
            Error::Status { url, status } if status == StatusCode::NOT_FOUND => {
                ProviderError::NotFound(url)
            }
            Error::InvalidArgument(message) => ProviderError::InvalidArguments(message),
            other => ProviderError::upstream(other.to_string()),
        }
    }
}
