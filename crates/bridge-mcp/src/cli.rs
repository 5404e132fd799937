//! Command-line and environment configuration
//!
//! Settings are layered, later layers winning:
//!
//! 1. the TOML file named by `--config` / `BRIDGE_CONFIG`
//! 2. a `.env` file in the working directory (loaded by `main` before parsing)
//! 3. command-line flags and environment variables

use std::convert::Infallible;
use std::path::PathBuf;

use bridge_services::{BridgeConfig, parse_flag};
use clap::Parser;

use crate::Result;

fn bool_setting(value: &str) -> std::result::Result<bool, Infallible> {
    Ok(parse_flag(value))
}

/// MCP server bridging Jira, GitLab and Confluence
#[derive(Debug, Default, Parser)]
#[command(name = "bridge-mcp")]
#[command(about = "MCP server bridging Jira, GitLab and Confluence")]
#[command(version)]
pub struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "BRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Jira base URL
    #[arg(long, env = "JIRA_URL")]
    pub jira_url: Option<String>,

    /// Jira personal access token
    #[arg(long, env = "JIRA_PERSONAL_ACCESS_TOKEN", hide_env_values = true)]
    pub jira_token: Option<String>,

    /// Verify Jira TLS certificates (1/true/yes/on)
    #[arg(long, env = "JIRA_VERIFY_SSL", value_parser = bool_setting)]
    pub jira_verify_ssl: Option<bool>,

    /// GitLab base URL [default: https://gitlab.com]
    #[arg(long, env = "GITLAB_URL")]
    pub gitlab_url: Option<String>,

    /// GitLab personal access token
    #[arg(long, env = "GITLAB_PERSONAL_ACCESS_TOKEN", hide_env_values = true)]
    pub gitlab_token: Option<String>,

    /// Confluence base URL (include /wiki for Confluence Cloud)
    #[arg(long, env = "CONFLUENCE_URL")]
    pub confluence_url: Option<String>,

    /// Confluence username (email for Confluence Cloud)
    #[arg(long, env = "CONFLUENCE_USERNAME")]
    pub confluence_username: Option<String>,

    /// Confluence API token
    #[arg(long, env = "CONFLUENCE_API_TOKEN", hide_env_values = true)]
    pub confluence_api_token: Option<String>,

    /// Per-attachment download timeout in seconds [default: 30]
    #[arg(
        long,
        env = "BRIDGE_DOWNLOAD_TIMEOUT_SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub download_timeout_secs: Option<u64>,

    /// Media files returned when a call does not say [default: 10]
    #[arg(long, env = "BRIDGE_MAX_MEDIA_FILES")]
    pub max_media_files: Option<u32>,
}

impl Args {
    /// Read the optional TOML file and apply flag/environment overrides
    pub fn load_config(&self) -> Result<BridgeConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!(path = %path.display(), "Loading configuration file");
                BridgeConfig::load(path)?
            }
            None => BridgeConfig::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    /// Overlay every setting that was given
    pub fn apply(&self, config: &mut BridgeConfig) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *target = value.clone();
            }
        }
        fn set_some<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                *target = value.clone();
            }
        }

        set_some(&mut config.jira.url, &self.jira_url);
        set_some(&mut config.jira.personal_access_token, &self.jira_token);
        set(&mut config.jira.verify_ssl, &self.jira_verify_ssl);

        set(&mut config.gitlab.url, &self.gitlab_url);
        set_some(&mut config.gitlab.personal_access_token, &self.gitlab_token);

        set_some(&mut config.confluence.url, &self.confluence_url);
        set_some(&mut config.confluence.username, &self.confluence_username);
        set_some(&mut config.confluence.api_token, &self.confluence_api_token);

        set(
            &mut config.media.download_timeout_secs,
            &self.download_timeout_secs,
        );
        set(&mut config.media.max_files, &self.max_media_files);
    }
}
