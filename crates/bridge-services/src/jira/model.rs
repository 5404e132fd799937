//! Jira REST API (v2) response shapes
//!
//! Only the fields the tools render are modelled; everything else in the
//! payload is ignored.

use bridge_core::AttachmentRef;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{Error, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerInfo {
    pub version: String,
    pub server_title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IssueFields {
    pub summary: String,
    pub description: Option<String>,
    pub status: Option<Named>,
    pub priority: Option<Named>,
    pub issuetype: Option<Named>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub reporter: Option<User>,
    pub assignee: Option<User>,
    pub project: Option<Project>,
    pub components: Vec<Named>,
    pub labels: Vec<String>,
    pub fix_versions: Vec<Named>,
    pub resolution: Option<Named>,
    pub duedate: Option<String>,
    pub attachment: Vec<Attachment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Named {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    pub display_name: String,
    pub email_address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Project {
    pub key: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchResults {
    pub total: u64,
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommentPage {
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Comment {
    pub id: String,
    pub author: Option<User>,
    pub body: String,
    pub created: String,
    pub updated: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub filename: String,
    pub size: u64,
    pub mime_type: String,
    pub created: String,
    pub author: Option<User>,
    /// Download URL
    pub content: String,
}

impl Attachment {
    pub fn author_name(&self) -> &str {
        self.author
            .as_ref()
            .map(|a| a.display_name.as_str())
            .unwrap_or("Unknown")
    }

    /// An unreadable `created` value leaves the timestamp unset
    pub fn to_ref(&self) -> AttachmentRef {
        let created_at = match parse_timestamp(&self.created) {
            Ok(at) => Some(at),
            Err(err) => {
                tracing::debug!(
                    attachment = %self.filename,
                    error = %err,
                    "Ignoring attachment timestamp"
                );
                None
            }
        };
        AttachmentRef {
            filename: self.filename.clone(),
            mime_type: self.mime_type.clone(),
            size_bytes: self.size,
            source_url: self.content.clone(),
            author: self.author_name().to_string(),
            created_at,
        }
    }
}

/// Parse Jira's `2024-01-15T10:30:00.000+0000`, falling back to RFC 3339
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| Error::Timestamp(value.to_string()))
}
