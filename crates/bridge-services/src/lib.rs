//! Backend integrations for the Bridge MCP gateway
//!
//! One [`Provider`] per backend:
//!
//! - [`jira::JiraProvider`]: issues, comments, attachments and inline media
//! - [`gitlab::GitLabProvider`]: projects, merge requests, pipelines, issues
//! - [`confluence::ConfluenceProvider`]: pages, spaces, children, comments
//!
//! Each provider is constructed from [`BridgeConfig`] whether or not its
//! credentials are present; a missing credential surfaces when the registry
//! initializes it and leaves the service disabled.

pub mod args;
pub mod config;
pub mod confluence;
pub mod error;
pub mod gitlab;
pub mod http;
pub mod jira;

use std::sync::Arc;

use bridge_core::Provider;

pub use config::{
    BridgeConfig, ConfluenceConfig, GitLabConfig, JiraConfig, MediaConfig, parse_flag,
};
pub use confluence::ConfluenceProvider;
pub use error::{Error, Result};
pub use gitlab::GitLabProvider;
pub use http::{Auth, HttpApi};
pub use jira::JiraProvider;

/// Construct every provider, in catalog order
pub fn build_providers(config: &BridgeConfig) -> Vec<Arc<dyn Provider>> {
    vec![
        Arc::new(JiraProvider::new(&config.jira, &config.media)),
        Arc::new(GitLabProvider::new(&config.gitlab)),
        Arc::new(ConfluenceProvider::new(&config.confluence)),
    ]
}

/// Environment variables each service needs, for startup diagnostics
pub fn required_variables() -> Vec<(&'static str, &'static [&'static str])> {
    vec![
        ("Jira", &[jira::URL_VARIABLE, jira::TOKEN_VARIABLE][..]),
        ("GitLab", &[gitlab::TOKEN_VARIABLE][..]),
        (
            "Confluence",
            &[
                confluence::URL_VARIABLE,
                confluence::USERNAME_VARIABLE,
                confluence::TOKEN_VARIABLE,
            ][..],
        ),
    ]
}
