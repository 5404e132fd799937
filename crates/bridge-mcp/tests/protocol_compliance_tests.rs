//! MCP protocol compliance tests
//!
//! Drives `handle_message` with raw JSON-RPC lines over a gateway built from
//! mock providers: id preservation, error codes, notifications, and the wire
//! form of tool results.

use std::sync::Arc;

use bridge_core::{ContentBlock, Gateway, Provider, ProviderError, ServiceRegistry, ToolResult};
use bridge_mcp::BridgeMcpServer;
use bridge_test_utils::MockProvider;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

async fn server_with(providers: Vec<Arc<dyn Provider>>) -> BridgeMcpServer {
    let registry = ServiceRegistry::initialize(providers).await;
    BridgeMcpServer::new(Gateway::new(Arc::new(registry)).unwrap())
}

async fn default_server() -> BridgeMcpServer {
    server_with(vec![
        Arc::new(
            MockProvider::new("jira")
                .named("Jira")
                .with_tools(&["get_jira_issue", "search_jira_issues"]),
        ),
        Arc::new(
            MockProvider::new("gitlab")
                .named("GitLab")
                .with_tools(&["get_gitlab_project"])
                .disabled_by(ProviderError::missing_credential(
                    "GITLAB_PERSONAL_ACCESS_TOKEN",
                )),
        ),
    ])
    .await
}

async fn request(server: &BridgeMcpServer, message: &str) -> Value {
    let response = server.handle_message(message).await.unwrap();
    serde_json::from_str(&response).unwrap()
}

// ==========================================================================
// JSON-RPC 2.0 envelope
// ==========================================================================

#[tokio::test]
async fn test_numeric_id_preserved() {
    let server = default_server().await;
    let response = request(&server, r#"{"jsonrpc":"2.0","id":42,"method":"ping"}"#).await;

    assert_eq!(response["id"], 42);
    assert_eq!(response["jsonrpc"], "2.0");
    assert_eq!(response["result"], json!({}));
}

#[tokio::test]
async fn test_string_id_preserved_in_error_response() {
    let server = default_server().await;
    let response = request(
        &server,
        r#"{"jsonrpc":"2.0","id":"err-test","method":"resources/list"}"#,
    )
    .await;

    assert_eq!(response["id"], "err-test");
    assert_eq!(response["error"]["code"], -32601);
    assert!(
        response["error"]["message"]
            .as_str()
            .unwrap()
            .contains("resources/list")
    );
}

#[tokio::test]
async fn test_unparsable_line_is_parse_error_with_null_id() {
    let server = default_server().await;
    let response = request(&server, r#"{"invalid json"#).await;

    assert_eq!(response["error"]["code"], -32700);
    assert_eq!(response["id"], Value::Null);
    assert!(response.get("result").is_none());
}

#[tokio::test]
async fn test_request_without_method_is_invalid() {
    let server = default_server().await;
    let response = request(&server, r#"{"jsonrpc":"2.0","id":9}"#).await;

    assert_eq!(response["error"]["code"], -32600);
    assert_eq!(response["id"], 9);
}

#[tokio::test]
async fn test_notifications_produce_no_output() {
    let server = default_server().await;
    for message in [
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        r#"{"jsonrpc":"2.0","method":"initialized"}"#,
        r#"{"jsonrpc":"2.0","id":null,"method":"notifications/cancelled","params":{}}"#,
    ] {
        let response = server.handle_message(message).await.unwrap();
        assert!(response.is_empty(), "{message} should not be answered");
    }
}

// ==========================================================================
// MCP methods
// ==========================================================================

#[tokio::test]
async fn test_initialize_reports_server_info() {
    let server = default_server().await;
    let response = request(
        &server,
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test","version":"1.0"}}}"#,
    )
    .await;

    let result = &response["result"];
    assert_eq!(result["protocolVersion"], "2024-11-05");
    assert_eq!(result["serverInfo"]["name"], "bridge-mcp");
    assert!(result["capabilities"]["tools"].is_object());
}

#[tokio::test]
async fn test_initialize_tolerates_missing_params() {
    let server = default_server().await;
    let response = request(&server, r#"{"jsonrpc":"2.0","id":10,"method":"initialize"}"#).await;

    assert_eq!(response["id"], 10);
    assert!(response.get("error").is_none());
}

#[tokio::test]
async fn test_tools_list_contains_only_enabled_services() {
    let server = default_server().await;
    let response = request(&server, r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#).await;

    let names: Vec<&str> = response["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["get_jira_issue", "search_jira_issues"]);

    let first = &response["result"]["tools"][0];
    assert_eq!(first["inputSchema"]["type"], "object");
    assert!(first["description"].is_string());
}

#[tokio::test]
async fn test_tools_call_routes_to_provider() {
    let jira = Arc::new(MockProvider::new("jira").with_tools(&["get_jira_issue"]));
    let server = server_with(vec![jira.clone()]).await;

    let response = request(
        &server,
        r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"get_jira_issue","arguments":{"issue_key":"BAL-1"}}}"#,
    )
    .await;

    assert_eq!(
        response["result"],
        json!({"content": [{"type": "text", "text": "jira:get_jira_issue"}]})
    );
    let (name, arguments) = jira.last_call().unwrap();
    assert_eq!(name, "get_jira_issue");
    assert_eq!(arguments["issue_key"], "BAL-1");
}

#[tokio::test]
async fn test_tools_call_unknown_tool_is_a_result_not_an_error() {
    let server = default_server().await;
    let response = request(
        &server,
        r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"unknown_tool","arguments":{}}}"#,
    )
    .await;

    assert!(response.get("error").is_none());
    assert_eq!(response["result"]["isError"], true);
    assert_eq!(
        response["result"]["content"][0]["text"],
        "Error: Unknown tool 'unknown_tool'. Available services: jira"
    );
}

#[tokio::test]
async fn test_tools_call_disabled_service() {
    let server = default_server().await;
    let response = request(
        &server,
        r#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{"name":"get_gitlab_project","arguments":{"project":"a/b"}}}"#,
    )
    .await;

    assert_eq!(
        response["result"]["content"][0]["text"],
        "Error: GitLab service is not enabled. Please check your GITLAB_PERSONAL_ACCESS_TOKEN."
    );
}

#[tokio::test]
async fn test_tools_call_binary_block_wire_form() {
    let media = ToolResult::from_blocks(vec![
        ContentBlock::text("## 1. shot.png"),
        ContentBlock::binary("image/png", &[1, 2, 3]),
    ]);
    let jira = Arc::new(
        MockProvider::new("jira")
            .with_tools(&["get_issue_media"])
            .replying(media),
    );
    let server = server_with(vec![jira]).await;

    let response = request(
        &server,
        r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"get_issue_media","arguments":{"issue_key":"BAL-1"}}}"#,
    )
    .await;

    assert_eq!(
        response["result"]["content"],
        json!([
            {"type": "text", "text": "## 1. shot.png"},
            {"type": "image", "data": "AQID", "mimeType": "image/png"}
        ])
    );
}

#[tokio::test]
async fn test_tools_call_without_arguments() {
    let jira = Arc::new(MockProvider::new("jira").with_tools(&["search_jira_issues"]));
    let server = server_with(vec![jira.clone()]).await;

    let response = request(
        &server,
        r#"{"jsonrpc":"2.0","id":8,"method":"tools/call","params":{"name":"search_jira_issues"}}"#,
    )
    .await;

    assert!(response.get("error").is_none());
    assert!(jira.last_call().unwrap().1.is_empty());
}

#[tokio::test]
async fn test_tools_call_malformed_params() {
    let server = default_server().await;

    let missing_name = request(
        &server,
        r#"{"jsonrpc":"2.0","id":11,"method":"tools/call","params":{"arguments":{}}}"#,
    )
    .await;
    assert_eq!(missing_name["error"]["code"], -32602);
    assert_eq!(missing_name["id"], 11);

    let array_arguments = request(
        &server,
        r#"{"jsonrpc":"2.0","id":12,"method":"tools/call","params":{"name":"get_jira_issue","arguments":[1,2]}}"#,
    )
    .await;
    assert_eq!(array_arguments["error"]["code"], -32602);
}
