//! Gateway configuration
//!
//! Settings come from an optional TOML file and are then overridden by
//! command-line flags and environment variables in `bridge-mcp`. Absent
//! credentials are not a configuration error: the affected provider simply
//! fails initialization and stays disabled.
//!
//! # Example
//!
//! ```toml
//! [jira]
//! url = "https://jira.example.com"
//! personal_access_token = "..."
//! verify_ssl = false
//!
//! [gitlab]
//! url = "https://gitlab.example.com"
//!
//! [media]
//! download_timeout_secs = 20
//! max_files = 5
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Result;

pub const DEFAULT_GITLAB_URL: &str = "https://gitlab.com";
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 30;
pub const MIN_DOWNLOAD_TIMEOUT_SECS: u64 = 1;
pub const DEFAULT_MAX_MEDIA_FILES: u32 = 10;

/// Complete gateway configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub jira: JiraConfig,
    pub gitlab: GitLabConfig,
    pub confluence: ConfluenceConfig,
    pub media: MediaConfig,
}

impl BridgeConfig {
    /// Parse a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Jira connection settings (personal access token auth)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JiraConfig {
    pub url: Option<String>,
    pub personal_access_token: Option<String>,
    pub verify_ssl: bool,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            url: None,
            personal_access_token: None,
            verify_ssl: true,
        }
    }
}

/// GitLab connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitLabConfig {
    pub url: String,
    pub personal_access_token: Option<String>,
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_GITLAB_URL.to_string(),
            personal_access_token: None,
        }
    }
}

/// Confluence connection settings (username + API token)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfluenceConfig {
    pub url: Option<String>,
    pub username: Option<String>,
    pub api_token: Option<String>,
}

/// Attachment download settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub download_timeout_secs: u64,
    /// Used when a media tool call omits `max_files`
    pub max_files: u32,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            max_files: DEFAULT_MAX_MEDIA_FILES,
        }
    }
}

impl MediaConfig {
    /// Never shorter than one second
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs.max(MIN_DOWNLOAD_TIMEOUT_SECS))
    }
}

/// Interpret a boolean-ish setting
///
/// `1`, `true`, `yes` and `on` (any case, surrounding whitespace ignored) are
/// true; everything else is false.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Treat empty strings as unset
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
