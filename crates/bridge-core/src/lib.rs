//! Tool dispatch and media aggregation for the Bridge MCP gateway
//!
//! This crate owns the policy of the gateway and none of its I/O:
//!
//! - **Service registry**: which providers initialized and are enabled
//! - **Tool catalog**: the merged tool list of enabled providers
//! - **Dispatcher**: name-based routing with enablement checks
//! - **Media pipeline**: attachment filtering, download and encoding
//!
//! # Architecture
//!
//! ```text
//!            transport (bridge-mcp)
//!                    |
//!                 Gateway
//!               /         \
//!        ToolCatalog    Dispatcher
//!               \         /
//!            ServiceRegistry
//!                    |
//!       Provider (jira, gitlab, confluence)
//!                    |
//!              MediaPipeline --> Downloader
//! ```
//!
//! Providers and downloaders are traits; concrete backends live in
//! `bridge-services`.

pub mod catalog;
pub mod content;
pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod media;
pub mod provider;
pub mod registry;

pub use catalog::ToolCatalog;
pub use content::{Arguments, ContentBlock, ToolDescriptor, ToolResult};
pub use dispatch::Dispatcher;
pub use error::{Error, ProviderError, Result};
pub use gateway::Gateway;
pub use media::{AttachmentRef, DownloadError, Downloader, MediaKind, MediaPipeline, classify};
pub use provider::Provider;
pub use registry::{ServiceDescriptor, ServiceRegistry};
