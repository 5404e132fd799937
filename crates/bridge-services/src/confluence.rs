//! Confluence provider
//!
//! Pages, spaces and page children over the Confluence REST API, using basic
//! auth with a username and API token. For Confluence Cloud the configured
//! URL includes the `/wiki` context path.

use std::fmt::Write as _;

use async_trait::async_trait;
use bridge_core::media::group_thousands;
use bridge_core::{Arguments, Provider, ProviderError, ToolDescriptor, ToolResult};
use serde::Deserialize;
use serde_json::json;

use crate::args;
use crate::config::{ConfluenceConfig, non_empty};
use crate::http::{Auth, HttpApi};
use crate::Result;

pub const ID: &str = "confluence";
pub const URL_VARIABLE: &str = "CONFLUENCE_URL";
pub const USERNAME_VARIABLE: &str = "CONFLUENCE_USERNAME";
pub const TOKEN_VARIABLE: &str = "CONFLUENCE_API_TOKEN";

pub const GET_PAGE: &str = "get_confluence_page";
pub const SEARCH_PAGES: &str = "search_confluence_pages";
pub const GET_SPACE: &str = "get_space";
pub const LIST_SPACES: &str = "list_spaces";
pub const GET_PAGE_CHILDREN: &str = "get_page_children";
pub const GET_PAGE_ATTACHMENTS: &str = "get_page_attachments";
pub const GET_PAGE_COMMENTS: &str = "get_page_comments";

const DEFAULT_LIMIT: u32 = 25;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Page<T> {
    results: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Content {
    id: String,
    title: String,
    #[serde(rename = "type")]
    kind: String,
    space: Option<SpaceRef>,
    version: Option<Version>,
    body: Option<Body>,
    extensions: Option<Extensions>,
    #[serde(rename = "_links")]
    links: Links,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SpaceRef {
    key: String,
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Version {
    number: u64,
    when: Option<String>,
    by: Option<Person>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Person {
    display_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Body {
    storage: Option<Storage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Storage {
    value: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Extensions {
    media_type: Option<String>,
    file_size: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Links {
    webui: Option<String>,
    download: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Space {
    key: String,
    name: String,
    #[serde(rename = "type")]
    kind: String,
    description: Option<SpaceDescription>,
    #[serde(rename = "_links")]
    links: Links,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SpaceDescription {
    plain: Option<Storage>,
}

impl Content {
    fn author(&self) -> &str {
        self.version
            .as_ref()
            .and_then(|v| v.by.as_ref())
            .map(|p| p.display_name.as_str())
            .unwrap_or("Unknown")
    }

    fn modified(&self) -> &str {
        self.version
            .as_ref()
            .and_then(|v| v.when.as_deref())
            .unwrap_or("N/A")
    }

    fn storage(&self) -> &str {
        self.body
            .as_ref()
            .and_then(|b| b.storage.as_ref())
            .map(|s| s.value.as_str())
            .unwrap_or("")
    }
}

fn link(base_url: &str, path: &Option<String>) -> String {
    match path {
        Some(p) => format!("{}{}", base_url, p),
        None => "N/A".to_string(),
    }
}

fn page_id_schema(description: &str) -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "page_id": {
                "type": "string",
                "description": description
            }
        },
        "required": ["page_id"]
    })
}

/// All Confluence tools, in presentation order
pub fn tool_definitions() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            GET_PAGE,
            "Get the content of a Confluence page by its ID",
            page_id_schema("The Confluence page ID"),
        ),
        ToolDescriptor::new(
            SEARCH_PAGES,
            "Search Confluence content using CQL (Confluence Query Language)",
            json!({
                "type": "object",
                "properties": {
                    "cql": {
                        "type": "string",
                        "description": "CQL query string (e.g., 'space = DEV AND title ~ \"release\"')"
                    },
                    "limit": {
                        "type": "number",
                        "description": "Maximum number of results to return (default: 25)",
                        "default": DEFAULT_LIMIT
                    }
                },
                "required": ["cql"]
            }),
        ),
        ToolDescriptor::new(
            GET_SPACE,
            "Get details of a Confluence space by its key",
            json!({
                "type": "object",
                "properties": {
                    "space_key": {
                        "type": "string",
                        "description": "The space key (e.g., DEV)"
                    }
                },
                "required": ["space_key"]
            }),
        ),
        ToolDescriptor::new(
            LIST_SPACES,
            "List Confluence spaces",
            json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "number",
                        "description": "Maximum number of spaces to return (default: 25)",
                        "default": DEFAULT_LIMIT
                    }
                }
            }),
        ),
        ToolDescriptor::new(
            GET_PAGE_CHILDREN,
            "List the child pages of a Confluence page",
            page_id_schema("The parent page ID"),
        ),
        ToolDescriptor::new(
            GET_PAGE_ATTACHMENTS,
            "List the attachments of a Confluence page",
            page_id_schema("The Confluence page ID"),
        ),
        ToolDescriptor::new(
            GET_PAGE_COMMENTS,
            "Get the comments on a Confluence page",
            page_id_schema("The Confluence page ID"),
        ),
    ]
}

/// Confluence integration
pub struct ConfluenceProvider {
    api: std::result::Result<HttpApi, ProviderError>,
}

impl ConfluenceProvider {
    pub fn new(config: &ConfluenceConfig) -> Self {
        let api = match (
            non_empty(&config.url),
            non_empty(&config.username),
            non_empty(&config.api_token),
        ) {
            (None, _, _) => Err(ProviderError::missing_credential(URL_VARIABLE)),
            (_, None, _) => Err(ProviderError::missing_credential(USERNAME_VARIABLE)),
            (_, _, None) => Err(ProviderError::missing_credential(TOKEN_VARIABLE)),
            (Some(url), Some(username), Some(token)) => {
                let auth = Auth::Basic {
                    username: username.to_string(),
                    password: token.to_string(),
                };
                HttpApi::new(url, auth, true).map_err(|e| ProviderError::Unreachable {
                    service: "Confluence".to_string(),
                    message: e.to_string(),
                })
            }
        };
        Self { api }
    }

    fn api(&self) -> std::result::Result<&HttpApi, ProviderError> {
        self.api.as_ref().map_err(Clone::clone)
    }

    async fn get_page(&self, api: &HttpApi, page_id: &str) -> Result<ToolResult> {
        let page: Content = api
            .get_json(
                &["rest", "api", "content", page_id],
                &[("expand", "body.storage,version,space".to_string())],
            )
            .await?;

        let space = page
            .space
            .as_ref()
            .map(|s| format!("{} ({})", s.name, s.key))
            .unwrap_or_else(|| "N/A".to_string());
        let body = page.storage();
        let body = if body.trim().is_empty() {
            "No content"
        } else {
            body
        };

        Ok(ToolResult::text(format!(
            "# {}\n\n\
             **Space:** {}\n\
             **Version:** {}\n\
             **Last Modified:** {} by {}\n\n\
             **URL:** {}\n\n\
             ## Content\n{}\n",
            page.title,
            space,
            page.version.as_ref().map(|v| v.number).unwrap_or(0),
            page.modified(),
            page.author(),
            link(api.base_url(), &page.links.webui),
            body
        )))
    }

    async fn search_pages(&self, api: &HttpApi, arguments: &Arguments) -> Result<ToolResult> {
        let Some(cql) = args::string(arguments, "cql") else {
            return Ok(args::missing("cql"));
        };
        let limit = args::count(arguments, "limit").unwrap_or(DEFAULT_LIMIT);

        let results: Page<Content> = api
            .get_json(
                &["rest", "api", "content", "search"],
                &[
                    ("cql", cql.to_string()),
                    ("limit", limit.to_string()),
                    ("expand", "space".to_string()),
                ],
            )
            .await?;

        if results.results.is_empty() {
            return Ok(ToolResult::text(format!(
                "No pages found matching query: {}",
                cql
            )));
        }
        let mut out = format!(
            "# Search Results ({} results)\n\n**Query:** {}\n\n",
            results.results.len(),
            cql
        );
        for content in &results.results {
            let space = content
                .space
                .as_ref()
                .map(|s| s.key.as_str())
                .unwrap_or("N/A");
            let _ = write!(
                out,
                "## {}\n- **ID:** {}\n- **Type:** {}\n- **Space:** {}\n- **URL:** {}\n\n",
                content.title,
                content.id,
                content.kind,
                space,
                link(api.base_url(), &content.links.webui)
            );
        }
        Ok(ToolResult::text(out))
    }

    async fn get_space(&self, api: &HttpApi, arguments: &Arguments) -> Result<ToolResult> {
        let Some(key) = args::string(arguments, "space_key") else {
            return Ok(args::missing("space_key"));
        };
        let space: Space = api
            .get_json(
                &["rest", "api", "space", key],
                &[("expand", "description.plain".to_string())],
            )
            .await?;

        let description = space
            .description
            .as_ref()
            .and_then(|d| d.plain.as_ref())
            .map(|p| p.value.as_str())
            .filter(|v| !v.trim().is_empty())
            .unwrap_or("No description");

        Ok(ToolResult::text(format!(
            "# {} ({})\n\n**Type:** {}\n**URL:** {}\n\n## Description\n{}\n",
            space.name,
            space.key,
            space.kind,
            link(api.base_url(), &space.links.webui),
            description
        )))
    }

    async fn list_spaces(&self, api: &HttpApi, arguments: &Arguments) -> Result<ToolResult> {
        let limit = args::count(arguments, "limit").unwrap_or(DEFAULT_LIMIT);
        let spaces: Page<Space> = api
            .get_json(&["rest", "api", "space"], &[("limit", limit.to_string())])
            .await?;

        if spaces.results.is_empty() {
            return Ok(ToolResult::text("No spaces found"));
        }
        let mut out = format!("# Confluence Spaces ({})\n\n", spaces.results.len());
        for space in &spaces.results {
            let _ = writeln!(out, "- **{}**: {} ({})", space.key, space.name, space.kind);
        }
        Ok(ToolResult::text(out))
    }

    async fn get_children(&self, api: &HttpApi, page_id: &str) -> Result<ToolResult> {
        let children: Page<Content> = api
            .get_json(&["rest", "api", "content", page_id, "child", "page"], &[])
            .await?;

        if children.results.is_empty() {
            return Ok(ToolResult::text(format!(
                "No child pages found for page {}",
                page_id
            )));
        }
        let mut out = format!(
            "# Child Pages of {} ({})\n\n",
            page_id,
            children.results.len()
        );
        for child in &children.results {
            let _ = writeln!(
                out,
                "- **{}** (ID: {}) {}",
                child.title,
                child.id,
                link(api.base_url(), &child.links.webui)
            );
        }
        Ok(ToolResult::text(out))
    }

    async fn get_attachments(&self, api: &HttpApi, page_id: &str) -> Result<ToolResult> {
        let attachments: Page<Content> = api
            .get_json(
                &["rest", "api", "content", page_id, "child", "attachment"],
                &[("expand", "version".to_string())],
            )
            .await?;

        if attachments.results.is_empty() {
            return Ok(ToolResult::text(format!(
                "No attachments found for page {}",
                page_id
            )));
        }
        let mut out = format!(
            "# Attachments for page {} ({} files)\n\n",
            page_id,
            attachments.results.len()
        );
        for attachment in &attachments.results {
            let ext = attachment.extensions.as_ref();
            let _ = write!(
                out,
                "## {}\n\
                 - **Size:** {} bytes\n\
                 - **Type:** {}\n\
                 - **Author:** {}\n\
                 - **Created:** {}\n\
                 - **URL:** {}\n\n",
                attachment.title,
                group_thousands(ext.and_then(|e| e.file_size).unwrap_or(0)),
                ext.and_then(|e| e.media_type.as_deref()).unwrap_or("unknown"),
                attachment.author(),
                attachment.modified(),
                link(api.base_url(), &attachment.links.download)
            );
        }
        Ok(ToolResult::text(out))
    }

    async fn get_comments(&self, api: &HttpApi, page_id: &str) -> Result<ToolResult> {
        let comments: Page<Content> = api
            .get_json(
                &["rest", "api", "content", page_id, "child", "comment"],
                &[("expand", "body.storage,version".to_string())],
            )
            .await?;

        if comments.results.is_empty() {
            return Ok(ToolResult::text(format!(
                "No comments found for page {}",
                page_id
            )));
        }
        let mut out = format!(
            "# Comments for page {} ({} comments)\n\n",
            page_id,
            comments.results.len()
        );
        for (i, comment) in comments.results.iter().enumerate() {
            let _ = write!(
                out,
                "## Comment {}\n**Author:** {}\n**Created:** {}\n\n{}\n\n---\n\n",
                i + 1,
                comment.author(),
                comment.modified(),
                comment.storage()
            );
        }
        Ok(ToolResult::text(out))
    }
}

#[async_trait]
impl Provider for ConfluenceProvider {
    fn id(&self) -> &str {
        ID
    }

    fn display_name(&self) -> &str {
        "Confluence"
    }

    fn tools(&self) -> Vec<ToolDescriptor> {
        tool_definitions()
    }

    async fn initialize(&self) -> std::result::Result<(), ProviderError> {
        let api = self.api()?;
        let _: Page<Space> = api
            .get_json(&["rest", "api", "space"], &[("limit", "1".to_string())])
            .await
            .map_err(|e| ProviderError::Unreachable {
                service: "Confluence".to_string(),
                message: e.to_string(),
            })?;

        tracing::info!(url = %api.base_url(), "Connected to Confluence");
        Ok(())
    }

    async fn call(
        &self,
        name: &str,
        arguments: Arguments,
    ) -> std::result::Result<ToolResult, ProviderError> {
        let api = self.api()?;

        let page_id = || args::identifier(&arguments, "page_id");
        let result = match name {
            SEARCH_PAGES => self.search_pages(api, &arguments).await,
            GET_SPACE => self.get_space(api, &arguments).await,
            LIST_SPACES => self.list_spaces(api, &arguments).await,
            GET_PAGE | GET_PAGE_CHILDREN | GET_PAGE_ATTACHMENTS | GET_PAGE_COMMENTS => {
                let Some(id) = page_id() else {
                    return Ok(args::missing("page_id"));
                };
                match name {
                    GET_PAGE => self.get_page(api, &id).await,
                    GET_PAGE_CHILDREN => self.get_children(api, &id).await,
                    GET_PAGE_ATTACHMENTS => self.get_attachments(api, &id).await,
                    _ => self.get_comments(api, &id).await,
                }
            }
            _ => Ok(ToolResult::error(format!("Unknown tool: {}", name))),
        };
        result.map_err(ProviderError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn config(url: Option<&str>, username: Option<&str>, token: Option<&str>) -> ConfluenceConfig {
        ConfluenceConfig {
            url: url.map(String::from),
            username: username.map(String::from),
            api_token: token.map(String::from),
        }
    }

    #[rstest]
    #[case(None, Some("bot"), Some("t"), "CONFLUENCE_URL")]
    #[case(Some("https://wiki.example.com"), None, Some("t"), "CONFLUENCE_USERNAME")]
    #[case(Some("https://wiki.example.com"), Some("bot"), Some(" "), "CONFLUENCE_API_TOKEN")]
    #[tokio::test]
    async fn test_missing_credentials_name_the_variable(
        #[case] url: Option<&str>,
        #[case] username: Option<&str>,
        #[case] token: Option<&str>,
        #[case] variable: &str,
    ) {
        let provider = ConfluenceProvider::new(&config(url, username, token));
        assert_eq!(
            provider.initialize().await.unwrap_err(),
            ProviderError::missing_credential(variable)
        );
    }

    #[test]
    fn test_tool_definitions() {
        let names: Vec<_> = tool_definitions().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                GET_PAGE,
                SEARCH_PAGES,
                GET_SPACE,
                LIST_SPACES,
                GET_PAGE_CHILDREN,
                GET_PAGE_ATTACHMENTS,
                GET_PAGE_COMMENTS
            ]
        );
    }

    #[test]
    fn test_content_deserializes_links() {
        let content: Content = serde_json::from_value(json!({
            "id": "123",
            "title": "Runbook",
            "type": "page",
            "version": {"number": 4, "when": "2024-02-01T08:00:00.000Z", "by": {"displayName": "Ada"}},
            "_links": {"webui": "/spaces/DEV/pages/123/Runbook"}
        }))
        .unwrap();
        assert_eq!(content.author(), "Ada");
        assert_eq!(
            link("https://wiki.example.com", &content.links.webui),
            "https://wiki.example.com/spaces/DEV/pages/123/Runbook"
        );
        assert_eq!(content.storage(), "");
    }
}
