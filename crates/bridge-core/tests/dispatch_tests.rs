//! Tests for tool routing, catalog aggregation and the error taxonomy

use std::sync::Arc;

use bridge_core::{
    Arguments, ContentBlock, Dispatcher, Error, Gateway, Provider, ProviderError, ServiceRegistry,
    ToolResult,
};
use bridge_test_utils::MockProvider;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

async fn gateway(providers: Vec<Arc<MockProvider>>) -> Gateway {
    let providers: Vec<Arc<dyn Provider>> = providers
        .into_iter()
        .map(|p| p as Arc<dyn Provider>)
        .collect();
    let registry = Arc::new(ServiceRegistry::initialize(providers).await);
    Gateway::new(registry).unwrap()
}

fn jira() -> MockProvider {
    MockProvider::new("jira")
        .named("Jira")
        .with_tools(&["get_jira_issue", "search_jira_issues", "get_issue_media"])
}

fn gitlab() -> MockProvider {
    MockProvider::new("gitlab")
        .named("GitLab")
        .with_tools(&["get_gitlab_project", "list_merge_requests"])
}

fn confluence() -> MockProvider {
    MockProvider::new("confluence")
        .named("Confluence")
        .with_tools(&["get_confluence_page"])
}

fn single_text(result: &ToolResult) -> &str {
    assert_eq!(result.content.len(), 1, "expected exactly one block: {result:?}");
    result.content[0].as_text().expect("expected a text block")
}

fn tool_names(gateway: &Gateway) -> Vec<String> {
    gateway.list_tools().into_iter().map(|t| t.name).collect()
}

// ==========================================================================
// Catalog aggregation
// ==========================================================================

#[tokio::test]
async fn test_list_tools_merges_enabled_catalogs_in_registration_order() {
    let gw = gateway(vec![
        Arc::new(jira()),
        Arc::new(gitlab()),
        Arc::new(confluence()),
    ])
    .await;

    assert_eq!(
        tool_names(&gw),
        vec![
            "get_jira_issue",
            "search_jira_issues",
            "get_issue_media",
            "get_gitlab_project",
            "list_merge_requests",
            "get_confluence_page",
        ]
    );
}

#[tokio::test]
async fn test_list_tools_skips_disabled_provider() {
    let gw = gateway(vec![
        Arc::new(jira()),
        Arc::new(gitlab().disabled_by(ProviderError::missing_credential(
            "GITLAB_PERSONAL_ACCESS_TOKEN",
        ))),
        Arc::new(confluence()),
    ])
    .await;

    assert_eq!(
        tool_names(&gw),
        vec![
            "get_jira_issue",
            "search_jira_issues",
            "get_issue_media",
            "get_confluence_page",
        ]
    );
}

#[tokio::test]
async fn test_list_tools_is_idempotent() {
    let gw = gateway(vec![Arc::new(jira()), Arc::new(gitlab())]).await;
    assert_eq!(gw.list_tools(), gw.list_tools());
}

#[tokio::test]
async fn test_disabling_provider_removes_its_tools() {
    let before = gateway(vec![Arc::new(jira()), Arc::new(gitlab())]).await;
    assert!(tool_names(&before).contains(&"get_gitlab_project".to_string()));

    let after = gateway(vec![
        Arc::new(jira()),
        Arc::new(gitlab().disabled_by(ProviderError::Unreachable {
            service: "GitLab".into(),
            message: "401 Unauthorized".into(),
        })),
    ])
    .await;
    let names = tool_names(&after);
    assert!(!names.contains(&"get_gitlab_project".to_string()));
    assert!(!names.contains(&"list_merge_requests".to_string()));
    assert_eq!(names.len(), 3);
}

// ==========================================================================
// Dispatch
// ==========================================================================

#[tokio::test]
async fn test_call_routes_to_owning_provider() {
    let jira = Arc::new(jira());
    let gitlab = Arc::new(gitlab());
    let gw = gateway(vec![jira.clone(), gitlab.clone()]).await;

    let mut args = Arguments::new();
    args.insert("issue_key".into(), json!("BAL-7437"));
    let result = gw.call_tool("get_jira_issue", args.clone()).await;

    assert_eq!(single_text(&result), "jira:get_jira_issue");
    assert_eq!(jira.call_count(), 1);
    assert_eq!(gitlab.call_count(), 0);
    assert_eq!(
        jira.last_call(),
        Some(("get_jira_issue".to_string(), args))
    );
}

#[tokio::test]
async fn test_call_returns_provider_result_verbatim() {
    let reply = ToolResult::from_blocks(vec![
        ContentBlock::text("# Media"),
        ContentBlock::binary("image/png", b"\x89PNG"),
    ]);
    let provider = Arc::new(jira().replying(reply.clone()));
    let gw = gateway(vec![provider]).await;

    let result = gw.call_tool("get_issue_media", Arguments::new()).await;
    assert_eq!(result, reply);
}

#[tokio::test]
async fn test_unknown_tool_lists_enabled_services() {
    let gw = gateway(vec![
        Arc::new(jira()),
        Arc::new(gitlab().disabled_by(ProviderError::missing_credential("GITLAB_TOKEN"))),
        Arc::new(confluence()),
    ])
    .await;

    let result = gw.call_tool("delete_everything", Arguments::new()).await;
    assert!(result.is_error());
    assert_eq!(
        single_text(&result),
        "Error: Unknown tool 'delete_everything'. Available services: jira, confluence"
    );
}

#[tokio::test]
async fn test_disabled_service_names_missing_credential_and_skips_handler() {
    let gitlab = Arc::new(gitlab().disabled_by(ProviderError::missing_credential(
        "GITLAB_PERSONAL_ACCESS_TOKEN",
    )));
    let gw = gateway(vec![Arc::new(jira()), gitlab.clone()]).await;

    for name in ["get_gitlab_project", "list_merge_requests"] {
        let result = gw.call_tool(name, Arguments::new()).await;
        assert!(result.is_error());
        assert_eq!(
            single_text(&result),
            "Error: GitLab service is not enabled. Please check your GITLAB_PERSONAL_ACCESS_TOKEN."
        );
    }
    assert_eq!(gitlab.call_count(), 0);
}

#[tokio::test]
async fn test_disabled_service_reports_probe_failure() {
    let jira = Arc::new(jira().disabled_by(ProviderError::Unreachable {
        service: "Jira".into(),
        message: "HTTP 401 Unauthorized".into(),
    }));
    let gw = gateway(vec![jira.clone(), Arc::new(gitlab())]).await;

    let result = gw.call_tool("get_jira_issue", Arguments::new()).await;
    let text = single_text(&result);
    assert!(text.contains("Jira service is not enabled"), "{text}");
    assert!(text.contains("HTTP 401 Unauthorized"), "{text}");
    assert_eq!(jira.call_count(), 0);
}

#[tokio::test]
async fn test_provider_error_becomes_text_tagged_with_tool_name() {
    let provider = Arc::new(jira().failing_with(ProviderError::upstream(
        "GET /rest/api/2/issue/X-1 returned 500 Internal Server Error",
    )));
    let gw = gateway(vec![provider.clone()]).await;

    let result = gw.call_tool("get_jira_issue", Arguments::new()).await;
    assert!(result.is_error());
    assert_eq!(
        single_text(&result),
        "Error executing get_jira_issue: GET /rest/api/2/issue/X-1 returned 500 Internal Server Error"
    );
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_provider_panic_is_contained() {
    let provider = Arc::new(jira().panicking());
    let gw = gateway(vec![provider.clone(), Arc::new(gitlab())]).await;

    let result = gw.call_tool("search_jira_issues", Arguments::new()).await;
    assert!(result.is_error());
    assert!(single_text(&result).starts_with("Error executing search_jira_issues"));

    // The gateway keeps serving afterwards
    let next = gw.call_tool("get_gitlab_project", Arguments::new()).await;
    assert_eq!(single_text(&next), "gitlab:get_gitlab_project");
}

#[tokio::test]
async fn test_routing_table_maps_every_declared_tool_to_its_owner() {
    let providers: Vec<Arc<dyn Provider>> = vec![
        Arc::new(jira()),
        Arc::new(gitlab().disabled_by(ProviderError::missing_credential("GITLAB_TOKEN"))),
    ];
    let registry = Arc::new(ServiceRegistry::initialize(providers).await);
    let dispatcher = Dispatcher::new(registry).unwrap();

    assert_eq!(dispatcher.owner("get_jira_issue"), Some("jira"));
    assert_eq!(dispatcher.owner("get_issue_media"), Some("jira"));
    assert_eq!(dispatcher.owner("list_merge_requests"), Some("gitlab"));
    assert_eq!(dispatcher.owner("delete_everything"), None);
}

#[tokio::test]
async fn test_duplicate_tool_name_is_rejected_at_construction() {
    let first = Arc::new(MockProvider::new("jira").with_tools(&["get_issue"])) as Arc<dyn Provider>;
    let second =
        Arc::new(MockProvider::new("gitlab").with_tools(&["get_issue"])) as Arc<dyn Provider>;
    let registry = Arc::new(ServiceRegistry::initialize(vec![first, second]).await);

    let err = Gateway::new(registry).unwrap_err();
    match err {
        Error::DuplicateTool {
            name,
            first,
            second,
        } => {
            assert_eq!(name, "get_issue");
            assert_eq!(first, "jira");
            assert_eq!(second, "gitlab");
        }
        other => panic!("expected DuplicateTool, got {other:?}"),
    }
}

#[tokio::test]
async fn test_duplicate_is_rejected_even_when_one_side_is_disabled() {
    let first = Arc::new(
        MockProvider::new("jira")
            .with_tools(&["get_issue"])
            .disabled_by(ProviderError::missing_credential("JIRA_TOKEN")),
    ) as Arc<dyn Provider>;
    let second =
        Arc::new(MockProvider::new("gitlab").with_tools(&["get_issue"])) as Arc<dyn Provider>;
    let registry = Arc::new(ServiceRegistry::initialize(vec![first, second]).await);

    assert!(matches!(
        Gateway::new(registry),
        Err(Error::DuplicateTool { .. })
    ));
}

#[tokio::test]
async fn test_unknown_tool_with_no_enabled_services() {
    let gw = gateway(vec![Arc::new(
        jira().disabled_by(ProviderError::missing_credential("JIRA_TOKEN")),
    )])
    .await;

    let result = gw.call_tool("anything", Arguments::new()).await;
    assert_eq!(
        single_text(&result),
        "Error: Unknown tool 'anything'. Available services: none"
    );
}

proptest! {
    #[test]
    fn prop_unknown_names_yield_one_text_block(name in "[a-z_]{1,32}") {
        let known = [
            "get_jira_issue",
            "search_jira_issues",
            "get_issue_media",
            "get_gitlab_project",
            "list_merge_requests",
        ];
        prop_assume!(!known.contains(&name.as_str()));

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let jira = Arc::new(jira());
        let gitlab = Arc::new(gitlab());
        let result = runtime.block_on(async {
            let gw = gateway(vec![jira.clone(), gitlab.clone()]).await;
            gw.call_tool(&name, Arguments::new()).await
        });

        prop_assert_eq!(result.content.len(), 1);
        let text = result.content[0].as_text().unwrap();
        let quoted = format!("'{}'", name);
        prop_assert!(text.contains(&quoted));
        prop_assert!(text.contains("jira, gitlab"));
        prop_assert_eq!(jira.call_count() + gitlab.call_count(), 0);
    }
}
