//! Jira tool catalog

use bridge_core::ToolDescriptor;
use serde_json::json;

use crate::config::DEFAULT_MAX_MEDIA_FILES;

pub const GET_ISSUE: &str = "get_jira_issue";
pub const SEARCH_ISSUES: &str = "search_jira_issues";
pub const GET_COMMENTS: &str = "get_issue_comments";
pub const GET_ATTACHMENTS: &str = "get_issue_attachments";
pub const GET_MEDIA: &str = "get_issue_media";

pub const DEFAULT_SEARCH_RESULTS: u32 = 50;

fn issue_key_only(name: &str, description: &str) -> ToolDescriptor {
    ToolDescriptor::new(
        name,
        description,
        json!({
            "type": "object",
            "properties": {
                "issue_key": {
                    "type": "string",
                    "description": "The Jira issue key (e.g., BAL-7437)"
                }
            },
            "required": ["issue_key"]
        }),
    )
}

/// All Jira tools, in presentation order
pub fn tool_definitions() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            GET_ISSUE,
            "Get detailed information about a specific Jira issue by its key (e.g., BAL-7437)",
            json!({
                "type": "object",
                "properties": {
                    "issue_key": {
                        "type": "string",
                        "description": "The Jira issue key (e.g., BAL-7437, PROJ-123)"
                    }
                },
                "required": ["issue_key"]
            }),
        ),
        ToolDescriptor::new(
            SEARCH_ISSUES,
            "Search for Jira issues using JQL (Jira Query Language)",
            json!({
                "type": "object",
                "properties": {
                    "jql": {
                        "type": "string",
                        "description": "JQL query string (e.g., 'project = BAL AND status = Open')"
                    },
                    "max_results": {
                        "type": "number",
                        "description": "Maximum number of results to return (default: 50)",
                        "default": DEFAULT_SEARCH_RESULTS
                    }
                },
                "required": ["jql"]
            }),
        ),
        issue_key_only(GET_COMMENTS, "Get all comments for a specific Jira issue"),
        issue_key_only(GET_ATTACHMENTS, "Get all attachments for a specific Jira issue"),
        ToolDescriptor::new(
            GET_MEDIA,
            "Download and display images and videos attached to a Jira issue. \
             Returns actual image content that can be displayed inline.",
            json!({
                "type": "object",
                "properties": {
                    "issue_key": {
                        "type": "string",
                        "description": "The Jira issue key (e.g., BAL-7437)"
                    },
                    "max_files": {
                        "type": "number",
                        "description": "Maximum number of media files to return (default: 10)",
                        "default": DEFAULT_MAX_MEDIA_FILES
                    }
                },
                "required": ["issue_key"]
            }),
        ),
    ]
}
