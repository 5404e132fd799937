//! Jira provider
//!
//! Talks to the Jira REST API v2 with a personal access token. The provider
//! exists even without credentials so that its tools can be routed and
//! answered with the reason it is disabled.

pub mod format;
pub mod model;
pub mod tools;

use async_trait::async_trait;
use bridge_core::{Arguments, MediaPipeline, Provider, ProviderError, ToolDescriptor, ToolResult};

use crate::args;
use crate::config::{JiraConfig, MediaConfig, non_empty};
use crate::http::{Auth, HttpApi};
use crate::Result;
use model::{Attachment, CommentPage, Issue, SearchResults, ServerInfo};

pub const ID: &str = "jira";
pub const TOKEN_VARIABLE: &str = "JIRA_PERSONAL_ACCESS_TOKEN";
pub const URL_VARIABLE: &str = "JIRA_URL";

/// Jira integration
pub struct JiraProvider {
    api: std::result::Result<HttpApi, ProviderError>,
    media: MediaPipeline,
    default_max_files: u32,
}

impl JiraProvider {
    pub fn new(config: &JiraConfig, media: &MediaConfig) -> Self {
        let api = match (
            non_empty(&config.personal_access_token),
            non_empty(&config.url),
        ) {
            (None, _) => Err(ProviderError::missing_credential(TOKEN_VARIABLE)),
            (_, None) => Err(ProviderError::missing_credential(URL_VARIABLE)),
            (Some(token), Some(url)) => {
                HttpApi::new(url, Auth::Bearer(token.to_string()), config.verify_ssl).map_err(
                    |e| ProviderError::Unreachable {
                        service: "Jira".to_string(),
                        message: e.to_string(),
                    },
                )
            }
        };

        Self {
            api,
            media: MediaPipeline::new(media.download_timeout()),
            default_max_files: media.max_files,
        }
    }

    fn api(&self) -> std::result::Result<&HttpApi, ProviderError> {
        self.api.as_ref().map_err(Clone::clone)
    }

    async fn fetch_issue(api: &HttpApi, key: &str) -> Result<Issue> {
        api.get_json(&["rest", "api", "2", "issue", key], &[]).await
    }

    async fn fetch_attachments(api: &HttpApi, key: &str) -> Result<Vec<Attachment>> {
        let issue: Issue = api
            .get_json(
                &["rest", "api", "2", "issue", key],
                &[("fields", "attachment".to_string())],
            )
            .await?;
        Ok(issue.fields.attachment)
    }

    async fn get_issue(&self, api: &HttpApi, arguments: &Arguments) -> Result<ToolResult> {
        let Some(key) = args::string(arguments, "issue_key") else {
            return Ok(args::missing("issue_key"));
        };
        let issue = Self::fetch_issue(api, key).await?;
        Ok(ToolResult::text(format::issue(&issue, api.base_url())))
    }

    async fn search_issues(&self, api: &HttpApi, arguments: &Arguments) -> Result<ToolResult> {
        let Some(jql) = args::string(arguments, "jql") else {
            return Ok(args::missing("jql"));
        };
        let max_results =
            args::count(arguments, "max_results").unwrap_or(tools::DEFAULT_SEARCH_RESULTS);

        let results: SearchResults = api
            .get_json(
                &["rest", "api", "2", "search"],
                &[
                    ("jql", jql.to_string()),
                    ("maxResults", max_results.to_string()),
                    ("fields", "summary,status,priority,assignee".to_string()),
                ],
            )
            .await?;

        if results.issues.is_empty() {
            return Ok(ToolResult::text(format!(
                "No issues found matching query: {}",
                jql
            )));
        }
        Ok(ToolResult::text(format::search_results(
            jql,
            &results.issues,
            api.base_url(),
        )))
    }

    async fn get_comments(&self, api: &HttpApi, arguments: &Arguments) -> Result<ToolResult> {
        let Some(key) = args::string(arguments, "issue_key") else {
            return Ok(args::missing("issue_key"));
        };
        let page: CommentPage = api
            .get_json(&["rest", "api", "2", "issue", key, "comment"], &[])
            .await?;

        if page.comments.is_empty() {
            return Ok(ToolResult::text(format!(
                "No comments found for issue {}",
                key
            )));
        }
        Ok(ToolResult::text(format::comments(key, &page.comments)))
    }

    async fn get_attachments(&self, api: &HttpApi, arguments: &Arguments) -> Result<ToolResult> {
        let Some(key) = args::string(arguments, "issue_key") else {
            return Ok(args::missing("issue_key"));
        };
        let attachments = Self::fetch_attachments(api, key).await?;

        if attachments.is_empty() {
            return Ok(ToolResult::text(format!(
                "No attachments found for issue {}",
                key
            )));
        }
        Ok(ToolResult::text(format::attachments(key, &attachments)))
    }

    async fn get_media(&self, api: &HttpApi, arguments: &Arguments) -> Result<ToolResult> {
        let Some(key) = args::string(arguments, "issue_key") else {
            return Ok(args::missing("issue_key"));
        };
        let max_files = args::count(arguments, "max_files").unwrap_or(self.default_max_files);

        let attachments = Self::fetch_attachments(api, key)
            .await?
            .iter()
            .map(Attachment::to_ref)
            .collect::<Vec<_>>();

        Ok(self
            .media
            .build_media_result(key, &attachments, max_files, api)
            .await)
    }
}

#[async_trait]
impl Provider for JiraProvider {
    fn id(&self) -> &str {
        ID
    }

    fn display_name(&self) -> &str {
        "Jira"
    }

    fn tools(&self) -> Vec<ToolDescriptor> {
        tools::tool_definitions()
    }

    async fn initialize(&self) -> std::result::Result<(), ProviderError> {
        let api = self.api()?;
        let info: ServerInfo = api
            .get_json(&["rest", "api", "2", "serverInfo"], &[])
            .await
            .map_err(|e| ProviderError::Unreachable {
                service: "Jira".to_string(),
                message: e.to_string(),
            })?;

        tracing::info!(
            url = %api.base_url(),
            version = %info.version,
            title = %info.server_title,
            "Connected to Jira"
        );
        Ok(())
    }

    async fn call(
        &self,
        name: &str,
        arguments: Arguments,
    ) -> std::result::Result<ToolResult, ProviderError> {
        let api = self.api()?;
        let result = match name {
            tools::GET_ISSUE => self.get_issue(api, &arguments).await,
            tools::SEARCH_ISSUES => self.search_issues(api, &arguments).await,
            tools::GET_COMMENTS => self.get_comments(api, &arguments).await,
            tools::GET_ATTACHMENTS => self.get_attachments(api, &arguments).await,
            tools::GET_MEDIA => self.get_media(api, &arguments).await,
            _ => Ok(ToolResult::error(format!("Unknown tool: {}", name))),
        };
        result.map_err(ProviderError::from)
    }
}
