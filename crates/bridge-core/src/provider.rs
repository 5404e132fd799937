//! Provider trait implemented by each backend integration

use async_trait::async_trait;

use crate::content::{Arguments, ToolDescriptor, ToolResult};
use crate::error::ProviderError;

/// A backend integration exposing a tool catalog and a call handler
///
/// Providers are constructed before the registry probes them. A provider
/// whose client could not be built (for instance because its credential is
/// absent) still exists and still declares its catalog; it simply fails
/// [`Provider::initialize`] and stays disabled.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable identifier, e.g. `"jira"`
    fn id(&self) -> &str;

    /// Human-readable name used in messages, e.g. `"Jira"`
    fn display_name(&self) -> &str;

    /// The tools this provider contributes, in presentation order
    ///
    /// Must not perform I/O.
    fn tools(&self) -> Vec<ToolDescriptor>;

    /// Check credentials and connectivity
    async fn initialize(&self) -> Result<(), ProviderError>;

    /// Execute one of this provider's tools
    ///
    /// Expected failures (missing argument, empty result) should come back as
    /// text results. An `Err` is reported to the client by the dispatcher.
    async fn call(
        &self,
        name: &str,
        arguments: Arguments,
    ) -> Result<ToolResult, ProviderError>;
}
