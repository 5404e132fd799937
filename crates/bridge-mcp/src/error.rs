//! Error types for the MCP server

use thiserror::Error;

/// Result type alias for MCP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during MCP server operations
#[derive(Debug, Error)]
pub enum Error {
    /// Error from the dispatch core (startup failures, routing conflicts)
    #[error("core error: {0}")]
    Core(#[from] bridge_core::Error),

    /// Error while loading configuration or building providers
    #[error("configuration error: {0}")]
    Config(#[from] bridge_services::Error),

    /// Error during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Request parameters did not match the method's shape
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// IO error on the stdio transport
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
