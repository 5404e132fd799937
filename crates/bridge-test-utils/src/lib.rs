//! Shared test fixtures for the bridge-mcp workspace.
//!
//! This crate is a dev-dependency only and is never published.
//!
//! # Modules
//!
//! - [`provider`]: [`MockProvider`], a scriptable provider that counts calls
//! - [`downloader`]: [`StaticDownloader`], canned attachment bytes per URL

pub mod downloader;
pub mod provider;

pub use downloader::{StaticDownloader, attachment};
pub use provider::{MockProvider, tool};
