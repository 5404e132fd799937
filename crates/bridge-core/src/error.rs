//! Error types for bridge-core

/// Result type for bridge-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while assembling the gateway
///
/// Per-call failures never show up here: the dispatcher turns them into
/// in-band text content. These variants describe construction and startup
/// problems that the hosting process has to act on.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two providers declared the same tool name
    #[error("Tool '{name}' is declared by both '{first}' and '{second}'")]
    DuplicateTool {
        name: String,
        first: String,
        second: String,
    },

    /// Initialization finished with every provider disabled
    #[error("No services are enabled (checked: {})", services.join(", "))]
    NoServicesEnabled { services: Vec<String> },

    /// Base64 payload could not be decoded
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),
}

/// Failures a provider reports across the provider boundary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// A required credential or setting was not configured
    #[error("{variable} is not set")]
    MissingCredential { variable: String },

    /// The connectivity or authentication probe failed
    #[error("could not reach {service}: {message}")]
    Unreachable { service: String, message: String },

    /// The caller supplied unusable arguments
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The upstream API failed or answered with something unexpected
    #[error("{message}")]
    Upstream { message: String },

    /// The requested entity does not exist upstream
    #[error("not found: {0}")]
    NotFound(String),
}

impl ProviderError {
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    pub fn missing_credential(variable: impl Into<String>) -> Self {
        Self::MissingCredential {
            variable: variable.into(),
        }
    }
}
