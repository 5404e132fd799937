//! Markdown rendering of Jira entities

use std::fmt::Write as _;

use bridge_core::media::group_thousands;

use super::model::{Attachment, Comment, Issue, Named, User};

fn name_or<'a>(named: &'a Option<Named>, fallback: &'a str) -> &'a str {
    named.as_ref().map(|n| n.name.as_str()).unwrap_or(fallback)
}

fn user_or<'a>(user: &'a Option<User>, fallback: &'a str) -> &'a str {
    user.as_ref()
        .map(|u| u.display_name.as_str())
        .unwrap_or(fallback)
}

fn names(items: &[Named]) -> String {
    items
        .iter()
        .map(|n| n.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn browse_url(base_url: &str, key: &str) -> String {
    format!("{}/browse/{}", base_url, key)
}

/// Full issue view for `get_jira_issue`
pub fn issue(issue: &Issue, base_url: &str) -> String {
    let f = &issue.fields;
    let description = f
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or("No description");
    let (project_name, project_key) = f
        .project
        .as_ref()
        .map(|p| (p.name.as_str(), p.key.as_str()))
        .unwrap_or(("N/A", "N/A"));

    let mut out = format!(
        "# {key}: {summary}\n\n\
         **Status:** {status}\n\
         **Priority:** {priority}\n\
         **Type:** {kind}\n\n\
         **URL:** {url}\n\n\
         ## Description\n{description}\n\n\
         ## Details\n\
         - **Created:** {created}\n\
         - **Updated:** {updated}\n\
         - **Reporter:** {reporter}\n\
         - **Assignee:** {assignee}\n\
         - **Project:** {project_name} ({project_key})\n",
        key = issue.key,
        summary = f.summary,
        status = name_or(&f.status, "Unknown"),
        priority = name_or(&f.priority, "None"),
        kind = name_or(&f.issuetype, "Unknown"),
        url = browse_url(base_url, &issue.key),
        created = f.created.as_deref().unwrap_or("N/A"),
        updated = f.updated.as_deref().unwrap_or("N/A"),
        reporter = user_or(&f.reporter, "N/A"),
        assignee = user_or(&f.assignee, "Unassigned"),
    );

    if !f.components.is_empty() {
        let _ = write!(out, "\n**Components:** {}", names(&f.components));
    }
    if !f.labels.is_empty() {
        let _ = write!(out, "\n**Labels:** {}", f.labels.join(", "));
    }
    if !f.fix_versions.is_empty() {
        let _ = write!(out, "\n**Fix Versions:** {}", names(&f.fix_versions));
    }
    if let Some(resolution) = &f.resolution {
        let _ = write!(out, "\n**Resolution:** {}", resolution.name);
    }
    if let Some(due) = &f.duedate {
        let _ = write!(out, "\n**Due Date:** {}", due);
    }

    out
}

/// Result list for `search_jira_issues`
pub fn search_results(jql: &str, issues: &[Issue], base_url: &str) -> String {
    let mut out = format!(
        "# Search Results ({} issues)\n\n**Query:** {}\n\n",
        issues.len(),
        jql
    );
    for issue in issues {
        let f = &issue.fields;
        let _ = write!(
            out,
            "## {}: {}\n\
             - **Status:** {}\n\
             - **Priority:** {}\n\
             - **Assignee:** {}\n\
             - **URL:** {}\n\n",
            issue.key,
            f.summary,
            name_or(&f.status, "Unknown"),
            name_or(&f.priority, "None"),
            user_or(&f.assignee, "Unassigned"),
            browse_url(base_url, &issue.key),
        );
    }
    out
}

/// Numbered comment thread for `get_issue_comments`
pub fn comments(issue_key: &str, comments: &[Comment]) -> String {
    let mut out = format!(
        "# Comments for {} ({} comments)\n\n",
        issue_key,
        comments.len()
    );
    for (i, comment) in comments.iter().enumerate() {
        let _ = write!(
            out,
            "## Comment {}\n\
             **Author:** {}\n\
             **Created:** {}\n\
             **Updated:** {}\n\n\
             {}\n\n---\n\n",
            i + 1,
            user_or(&comment.author, "Unknown"),
            comment.created,
            comment.updated,
            comment.body,
        );
    }
    out
}

/// Listing of every attachment for `get_issue_attachments`
pub fn attachments(issue_key: &str, attachments: &[Attachment]) -> String {
    let mut out = format!(
        "# Attachments for {} ({} files)\n\n",
        issue_key,
        attachments.len()
    );
    for attachment in attachments {
        let _ = write!(
            out,
            "## {}\n\
             - **Size:** {} bytes\n\
             - **Type:** {}\n\
             - **Author:** {}\n\
             - **Created:** {}\n\
             - **URL:** {}\n\n",
            attachment.filename,
            group_thousands(attachment.size),
            attachment.mime_type,
            attachment.author_name(),
            attachment.created,
            attachment.content,
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_issue() -> Issue {
        serde_json::from_value(json!({
            "id": "10001",
            "key": "BAL-7437",
            "fields": {
                "summary": "Crash on save",
                "description": "Steps to reproduce...",
                "status": {"name": "In Progress"},
                "priority": {"name": "High"},
                "issuetype": {"name": "Bug"},
                "created": "2024-01-15T10:30:00.000+0000",
                "updated": "2024-01-16T09:00:00.000+0000",
                "reporter": {"displayName": "Grace Hopper"},
                "project": {"key": "BAL", "name": "Balance"},
                "labels": ["regression", "ui"],
                "components": [{"name": "Editor"}]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_issue_markdown() {
        let text = issue(&sample_issue(), "https://jira.example.com");
        assert!(text.starts_with("# BAL-7437: Crash on save\n"));
        assert!(text.contains("**Status:** In Progress"));
        assert!(text.contains("**Priority:** High"));
        assert!(text.contains("**URL:** https://jira.example.com/browse/BAL-7437"));
        assert!(text.contains("- **Reporter:** Grace Hopper"));
        assert!(text.contains("- **Assignee:** Unassigned"));
        assert!(text.contains("- **Project:** Balance (BAL)"));
        assert!(text.contains("**Labels:** regression, ui"));
        assert!(text.contains("**Components:** Editor"));
        assert!(!text.contains("Fix Versions"));
        assert!(!text.contains("Resolution"));
    }

    #[test]
    fn test_issue_without_description() {
        let mut issue_value = sample_issue();
        issue_value.fields.description = None;
        issue_value.fields.priority = None;
        let text = issue(&issue_value, "https://jira.example.com");
        assert!(text.contains("## Description\nNo description"));
        assert!(text.contains("**Priority:** None"));
    }

    #[test]
    fn test_comments_are_numbered() {
        let list: Vec<Comment> = serde_json::from_value(json!([
            {"id": "1", "author": {"displayName": "A"}, "body": "first", "created": "c1", "updated": "u1"},
            {"id": "2", "author": {"displayName": "B"}, "body": "second", "created": "c2", "updated": "u2"}
        ]))
        .unwrap();
        let text = comments("BAL-1", &list);
        assert!(text.starts_with("# Comments for BAL-1 (2 comments)"));
        assert!(text.contains("## Comment 1\n**Author:** A"));
        assert!(text.contains("## Comment 2\n**Author:** B"));
    }
}
