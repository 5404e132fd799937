//! MCP server for the Bridge gateway
//!
//! Exposes the tools of every enabled backend (Jira, GitLab, Confluence) to
//! an AI assistant over the Model Context Protocol.
//!
//! # Architecture
//!
//! ```text
//! [ MCP Client (assistant / IDE) ]
//!        | (JSON-RPC over stdio)
//!        v
//! [ bridge-mcp (BridgeMcpServer) ]
//!        | (Gateway: list_tools / call_tool)
//!        v
//! [ bridge-core (registry, catalog, dispatcher, media) ]
//!        |
//!        +--> [ bridge-services (Jira / GitLab / Confluence over HTTPS) ]
//! ```

pub mod cli;
pub mod error;
pub mod protocol;
pub mod server;

use std::sync::Arc;

use bridge_core::{Gateway, ServiceRegistry};
use bridge_services::{BridgeConfig, build_providers};

pub use cli::Args;
pub use error::{Error, Result};
pub use server::BridgeMcpServer;

/// Initialize every provider and assemble the gateway
///
/// Fails with [`bridge_core::Error::NoServicesEnabled`] when no provider
/// initialized, and with [`bridge_core::Error::DuplicateTool`] when two
/// providers declare the same tool name.
pub async fn start(config: &BridgeConfig) -> Result<Gateway> {
    let registry = ServiceRegistry::initialize(build_providers(config)).await;
    registry.ensure_any_enabled()?;
    Ok(Gateway::new(Arc::new(registry))?)
}
