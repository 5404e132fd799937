//! GitLab provider
//!
//! Read-only access to projects, merge requests, pipelines and issues via the
//! GitLab REST API v4. Every tool is a single GET rendered as short markdown.

use std::fmt::Write as _;

use async_trait::async_trait;
use bridge_core::{Arguments, Provider, ProviderError, ToolDescriptor, ToolResult};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::args;
use crate::config::{GitLabConfig, non_empty};
use crate::http::{Auth, HttpApi};
use crate::{Error, Result};

pub const ID: &str = "gitlab";
pub const TOKEN_VARIABLE: &str = "GITLAB_PERSONAL_ACCESS_TOKEN";

pub const GET_PROJECT: &str = "get_gitlab_project";
pub const LIST_PROJECTS: &str = "list_gitlab_projects";
pub const LIST_MERGE_REQUESTS: &str = "list_merge_requests";
pub const GET_MERGE_REQUEST: &str = "get_merge_request";
pub const LIST_PIPELINES: &str = "list_pipelines";
pub const GET_PIPELINE: &str = "get_pipeline";
pub const LIST_ISSUES: &str = "list_gitlab_issues";
pub const GET_ISSUE: &str = "get_gitlab_issue";

const MERGE_REQUEST_STATES: &[&str] = &["opened", "closed", "merged", "all"];
const ISSUE_STATES: &[&str] = &["opened", "closed", "all"];

const DEFAULT_PER_PAGE: u32 = 20;
const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CurrentUser {
    username: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Project {
    id: u64,
    name: String,
    path_with_namespace: String,
    description: Option<String>,
    default_branch: Option<String>,
    visibility: Option<String>,
    web_url: String,
    star_count: u64,
    forks_count: u64,
    last_activity_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Author {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MergeRequest {
    iid: u64,
    title: String,
    description: Option<String>,
    state: String,
    author: Option<Author>,
    source_branch: String,
    target_branch: String,
    merge_status: Option<String>,
    created_at: String,
    updated_at: String,
    web_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Pipeline {
    id: u64,
    status: String,
    #[serde(rename = "ref")]
    git_ref: String,
    sha: String,
    source: Option<String>,
    created_at: String,
    updated_at: Option<String>,
    duration: Option<f64>,
    web_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Issue {
    iid: u64,
    title: String,
    description: Option<String>,
    state: String,
    author: Option<Author>,
    assignees: Vec<Author>,
    labels: Vec<String>,
    created_at: String,
    updated_at: String,
    web_url: String,
}

fn author_name(author: &Option<Author>) -> &str {
    author.as_ref().map(|a| a.name.as_str()).unwrap_or("Unknown")
}

fn or_none(text: &Option<String>) -> &str {
    text.as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or("No description")
}

fn project_schema(extra: Value, required: &[&str]) -> Value {
    let mut properties = json!({
        "project": {
            "type": "string",
            "description": "Project ID or full path (e.g., group/project)"
        }
    });
    if let (Some(base), Value::Object(more)) = (properties.as_object_mut(), extra) {
        base.extend(more);
    }
    let mut required_fields = vec!["project"];
    required_fields.extend_from_slice(required);
    json!({
        "type": "object",
        "properties": properties,
        "required": required_fields
    })
}

fn state_property(states: &[&str]) -> Value {
    json!({
        "type": "string",
        "description": format!("Filter by state ({})", states.join(", ")),
        "enum": states
    })
}

fn per_page_property() -> Value {
    json!({
        "type": "number",
        "description": "Maximum number of results to return (default: 20)",
        "default": DEFAULT_PER_PAGE
    })
}

/// All GitLab tools, in presentation order
pub fn tool_definitions() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            GET_PROJECT,
            "Get details of a GitLab project by ID or path",
            project_schema(json!({}), &[]),
        ),
        ToolDescriptor::new(
            LIST_PROJECTS,
            "List GitLab projects the token is a member of",
            json!({
                "type": "object",
                "properties": {
                    "search": {
                        "type": "string",
                        "description": "Only return projects matching this text"
                    },
                    "per_page": per_page_property()
                }
            }),
        ),
        ToolDescriptor::new(
            LIST_MERGE_REQUESTS,
            "List merge requests for a GitLab project",
            project_schema(
                json!({
                    "state": state_property(MERGE_REQUEST_STATES),
                    "per_page": per_page_property()
                }),
                &[],
            ),
        ),
        ToolDescriptor::new(
            GET_MERGE_REQUEST,
            "Get details of a specific merge request",
            project_schema(
                json!({
                    "merge_request_iid": {
                        "type": "number",
                        "description": "The merge request IID within the project"
                    }
                }),
                &["merge_request_iid"],
            ),
        ),
        ToolDescriptor::new(
            LIST_PIPELINES,
            "List CI/CD pipelines for a GitLab project",
            project_schema(
                json!({
                    "ref": {
                        "type": "string",
                        "description": "Only pipelines for this branch or tag"
                    },
                    "per_page": per_page_property()
                }),
                &[],
            ),
        ),
        ToolDescriptor::new(
            GET_PIPELINE,
            "Get details of a specific CI/CD pipeline",
            project_schema(
                json!({
                    "pipeline_id": {
                        "type": "number",
                        "description": "The pipeline ID"
                    }
                }),
                &["pipeline_id"],
            ),
        ),
        ToolDescriptor::new(
            LIST_ISSUES,
            "List issues for a GitLab project",
            project_schema(
                json!({
                    "state": state_property(ISSUE_STATES),
                    "per_page": per_page_property()
                }),
                &[],
            ),
        ),
        ToolDescriptor::new(
            GET_ISSUE,
            "Get details of a specific GitLab issue",
            project_schema(
                json!({
                    "issue_iid": {
                        "type": "number",
                        "description": "The issue IID within the project"
                    }
                }),
                &["issue_iid"],
            ),
        ),
    ]
}

/// GitLab integration
pub struct GitLabProvider {
    api: std::result::Result<HttpApi, ProviderError>,
}

impl GitLabProvider {
    pub fn new(config: &GitLabConfig) -> Self {
        let api = match non_empty(&config.personal_access_token) {
            None => Err(ProviderError::missing_credential(TOKEN_VARIABLE)),
            Some(token) => HttpApi::new(&config.url, Auth::PrivateToken(token.to_string()), true)
                .map_err(|e| ProviderError::Unreachable {
                    service: "GitLab".to_string(),
                    message: e.to_string(),
                }),
        };
        Self { api }
    }

    fn api(&self) -> std::result::Result<&HttpApi, ProviderError> {
        self.api.as_ref().map_err(Clone::clone)
    }

    async fn get_project(&self, api: &HttpApi, project: &str) -> Result<ToolResult> {
        let p: Project = api.get_json(&["api", "v4", "projects", project], &[]).await?;

        let mut out = format!(
            "# {} ({})\n\n**ID:** {}\n**URL:** {}\n\n## Description\n{}\n\n## Details\n",
            p.name,
            p.path_with_namespace,
            p.id,
            p.web_url,
            or_none(&p.description)
        );
        let _ = writeln!(
            out,
            "- **Default Branch:** {}",
            p.default_branch.as_deref().unwrap_or("N/A")
        );
        let _ = writeln!(
            out,
            "- **Visibility:** {}",
            p.visibility.as_deref().unwrap_or("N/A")
        );
        let _ = writeln!(out, "- **Stars:** {}", p.star_count);
        let _ = writeln!(out, "- **Forks:** {}", p.forks_count);
        let _ = writeln!(
            out,
            "- **Last Activity:** {}",
            p.last_activity_at.as_deref().unwrap_or("N/A")
        );
        Ok(ToolResult::text(out))
    }

    async fn list_projects(&self, api: &HttpApi, arguments: &Arguments) -> Result<ToolResult> {
        let mut query = vec![
            ("membership", "true".to_string()),
            ("per_page", per_page(arguments)),
        ];
        if let Some(search) = args::string(arguments, "search") {
            query.push(("search", search.to_string()));
        }
        let projects: Vec<Project> = api.get_json(&["api", "v4", "projects"], &query).await?;

        if projects.is_empty() {
            return Ok(ToolResult::text("No projects found"));
        }
        let mut out = format!("# GitLab Projects ({})\n\n", projects.len());
        for p in &projects {
            let _ = write!(
                out,
                "## {}\n- **ID:** {}\n- **URL:** {}\n\n",
                p.path_with_namespace, p.id, p.web_url
            );
        }
        Ok(ToolResult::text(out))
    }

    async fn list_merge_requests(
        &self,
        api: &HttpApi,
        project: &str,
        arguments: &Arguments,
    ) -> Result<ToolResult> {
        let query = vec![
            ("state", state(arguments, MERGE_REQUEST_STATES)?),
            ("per_page", per_page(arguments)),
        ];
        let mrs: Vec<MergeRequest> = api
            .get_json(&["api", "v4", "projects", project, "merge_requests"], &query)
            .await?;

        if mrs.is_empty() {
            return Ok(ToolResult::text(format!(
                "No merge requests found for project {}",
                project
            )));
        }
        let mut out = format!("# Merge Requests for {} ({})\n\n", project, mrs.len());
        for mr in &mrs {
            let _ = write!(
                out,
                "## !{}: {}\n\
                 - **State:** {}\n\
                 - **Author:** {}\n\
                 - **Branches:** {} → {}\n\
                 - **URL:** {}\n\n",
                mr.iid,
                mr.title,
                mr.state,
                author_name(&mr.author),
                mr.source_branch,
                mr.target_branch,
                mr.web_url
            );
        }
        Ok(ToolResult::text(out))
    }

    async fn get_merge_request(&self, api: &HttpApi, project: &str, iid: &str) -> Result<ToolResult> {
        let mr: MergeRequest = api
            .get_json(&["api", "v4", "projects", project, "merge_requests", iid], &[])
            .await?;

        Ok(ToolResult::text(format!(
            "# !{}: {}\n\n\
             **State:** {}\n\
             **Author:** {}\n\
             **Branches:** {} → {}\n\
             **Merge Status:** {}\n\n\
             **URL:** {}\n\n\
             ## Description\n{}\n\n\
             ## Details\n\
             - **Created:** {}\n\
             - **Updated:** {}\n",
            mr.iid,
            mr.title,
            mr.state,
            author_name(&mr.author),
            mr.source_branch,
            mr.target_branch,
            mr.merge_status.as_deref().unwrap_or("unknown"),
            mr.web_url,
            or_none(&mr.description),
            mr.created_at,
            mr.updated_at
        )))
    }

    async fn list_pipelines(
        &self,
        api: &HttpApi,
        project: &str,
        arguments: &Arguments,
    ) -> Result<ToolResult> {
        let mut query = vec![("per_page", per_page(arguments))];
        if let Some(git_ref) = args::string(arguments, "ref") {
            query.push(("ref", git_ref.to_string()));
        }
        let pipelines: Vec<Pipeline> = api
            .get_json(&["api", "v4", "projects", project, "pipelines"], &query)
            .await?;

        if pipelines.is_empty() {
            return Ok(ToolResult::text(format!(
                "No pipelines found for project {}",
                project
            )));
        }
        let mut out = format!("# Pipelines for {} ({})\n\n", project, pipelines.len());
        for p in &pipelines {
            let _ = write!(
                out,
                "## #{} ({})\n- **Ref:** {}\n- **Created:** {}\n- **URL:** {}\n\n",
                p.id, p.status, p.git_ref, p.created_at, p.web_url
            );
        }
        Ok(ToolResult::text(out))
    }

    async fn get_pipeline(&self, api: &HttpApi, project: &str, id: &str) -> Result<ToolResult> {
        let p: Pipeline = api
            .get_json(&["api", "v4", "projects", project, "pipelines", id], &[])
            .await?;

        let duration = p
            .duration
            .map(|d| format!("{:.0}s", d))
            .unwrap_or_else(|| "N/A".to_string());
        Ok(ToolResult::text(format!(
            "# Pipeline #{}\n\n\
             **Status:** {}\n\
             **Ref:** {}\n\
             **Commit:** {}\n\n\
             **URL:** {}\n\n\
             ## Details\n\
             - **Source:** {}\n\
             - **Created:** {}\n\
             - **Updated:** {}\n\
             - **Duration:** {}\n",
            p.id,
            p.status,
            p.git_ref,
            p.sha,
            p.web_url,
            p.source.as_deref().unwrap_or("N/A"),
            p.created_at,
            p.updated_at.as_deref().unwrap_or("N/A"),
            duration
        )))
    }

    async fn list_issues(
        &self,
        api: &HttpApi,
        project: &str,
        arguments: &Arguments,
    ) -> Result<ToolResult> {
        let query = vec![
            ("state", state(arguments, ISSUE_STATES)?),
            ("per_page", per_page(arguments)),
        ];
        let issues: Vec<Issue> = api
            .get_json(&["api", "v4", "projects", project, "issues"], &query)
            .await?;

        if issues.is_empty() {
            return Ok(ToolResult::text(format!(
                "No issues found for project {}",
                project
            )));
        }
        let mut out = format!("# Issues for {} ({})\n\n", project, issues.len());
        for issue in &issues {
            let _ = write!(
                out,
                "## #{}: {}\n- **State:** {}\n- **Author:** {}\n- **URL:** {}\n\n",
                issue.iid,
                issue.title,
                issue.state,
                author_name(&issue.author),
                issue.web_url
            );
        }
        Ok(ToolResult::text(out))
    }

    async fn get_issue(&self, api: &HttpApi, project: &str, iid: &str) -> Result<ToolResult> {
        let issue: Issue = api
            .get_json(&["api", "v4", "projects", project, "issues", iid], &[])
            .await?;

        let assignees = if issue.assignees.is_empty() {
            "Unassigned".to_string()
        } else {
            issue
                .assignees
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut out = format!(
            "# #{}: {}\n\n\
             **State:** {}\n\
             **Author:** {}\n\
             **Assignees:** {}\n\n\
             **URL:** {}\n\n\
             ## Description\n{}\n\n\
             ## Details\n\
             - **Created:** {}\n\
             - **Updated:** {}\n",
            issue.iid,
            issue.title,
            issue.state,
            author_name(&issue.author),
            assignees,
            issue.web_url,
            or_none(&issue.description),
            issue.created_at,
            issue.updated_at
        );
        if !issue.labels.is_empty() {
            let _ = write!(out, "\n**Labels:** {}", issue.labels.join(", "));
        }
        Ok(ToolResult::text(out))
    }
}

/// The `state` filter, `opened` when absent
fn state(arguments: &Arguments, allowed: &[&str]) -> Result<String> {
    match args::string(arguments, "state") {
        None => Ok("opened".to_string()),
        Some(state) if allowed.contains(&state) => Ok(state.to_string()),
        Some(state) => Err(Error::InvalidArgument(format!(
            "state must be one of {}, got '{}'",
            allowed.join(", "),
            state
        ))),
    }
}

fn per_page(arguments: &Arguments) -> String {
    args::count(arguments, "per_page")
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE)
        .to_string()
}

#[async_trait]
impl Provider for GitLabProvider {
    fn id(&self) -> &str {
        ID
    }

    fn display_name(&self) -> &str {
        "GitLab"
    }

    fn tools(&self) -> Vec<ToolDescriptor> {
        tool_definitions()
    }

    async fn initialize(&self) -> std::result::Result<(), ProviderError> {
        let api = self.api()?;
        let user: CurrentUser = api
            .get_json(&["api", "v4", "user"], &[])
            .await
            .map_err(|e| ProviderError::Unreachable {
                service: "GitLab".to_string(),
                message: e.to_string(),
            })?;

        tracing::info!(url = %api.base_url(), user = %user.username, "Connected to GitLab");
        Ok(())
    }

    async fn call(
        &self,
        name: &str,
        arguments: Arguments,
    ) -> std::result::Result<ToolResult, ProviderError> {
        let api = self.api()?;

        if name == LIST_PROJECTS {
            return self
                .list_projects(api, &arguments)
                .await
                .map_err(ProviderError::from);
        }

        let Some(project) = args::identifier(&arguments, "project") else {
            return Ok(args::missing("project"));
        };

        let result = match name {
            GET_PROJECT => self.get_project(api, &project).await,
            LIST_MERGE_REQUESTS => self.list_merge_requests(api, &project, &arguments).await,
            GET_MERGE_REQUEST => match args::identifier(&arguments, "merge_request_iid") {
                Some(iid) => self.get_merge_request(api, &project, &iid).await,
                None => Ok(args::missing("merge_request_iid")),
            },
            LIST_PIPELINES => self.list_pipelines(api, &project, &arguments).await,
            GET_PIPELINE => match args::identifier(&arguments, "pipeline_id") {
                Some(id) => self.get_pipeline(api, &project, &id).await,
                None => Ok(args::missing("pipeline_id")),
            },
            LIST_ISSUES => self.list_issues(api, &project, &arguments).await,
            GET_ISSUE => match args::identifier(&arguments, "issue_iid") {
                Some(iid) => self.get_issue(api, &project, &iid).await,
                None => Ok(args::missing("issue_iid")),
            },
            _ => Ok(ToolResult::error(format!("Unknown tool: {}", name))),
        };
        result.map_err(ProviderError::from)
    }
}
