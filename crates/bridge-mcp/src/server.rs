//! MCP server implementation
//!
//! Reads newline-delimited JSON-RPC requests from stdin and answers each one
//! on stdout before reading the next.

use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use bridge_core::{Arguments, ContentBlock, Gateway, ToolResult};

use crate::protocol::{
    INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, InitializeParams, InitializeResult,
    JsonRpcRequest, JsonRpcResponse, METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION,
    ServerCapabilities, ServerInfo, ToolCallParams, ToolsCapability,
};
use crate::{Error, Result};

/// MCP server over an initialized [`Gateway`]
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use bridge_core::{Gateway, ServiceRegistry};
/// use bridge_mcp::BridgeMcpServer;
///
/// let registry = ServiceRegistry::initialize(providers).await;
/// let server = BridgeMcpServer::new(Gateway::new(Arc::new(registry))?);
/// server.run().await?;
/// ```
pub struct BridgeMcpServer {
    gateway: Gateway,
}

impl BridgeMcpServer {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Serve requests until stdin closes
    pub async fn run(&self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        tracing::info!(
            tools = self.gateway.list_tools().len(),
            "MCP server ready, listening on stdio"
        );

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            tracing::debug!(request = %line, "Received message");

            let response = match self.handle_message(line).await {
                Ok(response) => response,
                Err(e) => serde_json::to_string(&JsonRpcResponse::error(
                    None,
                    INTERNAL_ERROR,
                    format!("Internal error: {}", e),
                ))?,
            };

            if !response.is_empty() {
                stdout.write_all(response.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
        }

        tracing::info!("stdin closed, shutting down");
        Ok(())
    }

    /// Handle a single MCP message
    ///
    /// Returns the serialized response, or an empty string for notifications.
    pub async fn handle_message(&self, message: &str) -> Result<String> {
        let value: Value = match serde_json::from_str(message) {
            Ok(value) => value,
            Err(e) => {
                let response =
                    JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {}", e));
                return serde_json::to_string(&response).map_err(Error::from);
            }
        };

        let id = value.get("id").cloned().filter(|id| !id.is_null());
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                let response =
                    JsonRpcResponse::error(id, INVALID_REQUEST, format!("Invalid Request: {}", e));
                return serde_json::to_string(&response).map_err(Error::from);
            }
        };

        if request.id.is_none() {
            tracing::debug!(method = %request.method, "Notification received");
            return Ok(String::new());
        }

        let id = request.id;
        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params)?,
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => match self.handle_tools_call(request.params).await {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(Error::InvalidParams(message)) => JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    format!("Invalid params: {}", message),
                ),
                Err(e) => return Err(e),
            },
            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };

        serde_json::to_string(&response).map_err(Error::from)
    }

    fn handle_initialize(&self, id: Option<Value>, params: Value) -> Result<JsonRpcResponse> {
        if let Ok(params) = serde_json::from_value::<InitializeParams>(params) {
            tracing::info!(
                client = %params.client_info.name,
                client_version = %params.client_info.version,
                protocol = %params.protocol_version,
                "Client connected"
            );
        }

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: "bridge-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        Ok(JsonRpcResponse::success(id, serde_json::to_value(result)?))
    }

    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let tools: Vec<Value> = self
            .gateway
            .list_tools()
            .into_iter()
            .map(|t| {
                json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect();

        JsonRpcResponse::success(id, json!({ "tools": tools }))
    }

    async fn handle_tools_call(&self, params: Value) -> Result<Value> {
        let params: ToolCallParams =
            serde_json::from_value(params).map_err(|e| Error::InvalidParams(e.to_string()))?;

        let arguments = match params.arguments {
            Value::Null => Arguments::new(),
            Value::Object(map) => map,
            other => {
                return Err(Error::InvalidParams(format!(
                    "arguments must be an object, got {}",
                    other
                )));
            }
        };

        tracing::info!(tool = %params.name, "Tool call");
        let result = self.gateway.call_tool(&params.name, arguments).await;
        Ok(tool_result_to_json(&result))
    }
}

/// Wire form of one content block
pub fn content_to_json(block: &ContentBlock) -> Value {
    match block {
        ContentBlock::Text { text } => json!({
            "type": "text",
            "text": text
        }),
        ContentBlock::Binary { mime_type, data } => json!({
            "type": "image",
            "data": data,
            "mimeType": mime_type
        }),
    }
}

/// Wire form of a tool result
pub fn tool_result_to_json(result: &ToolResult) -> Value {
    let content: Vec<Value> = result.content.iter().map(content_to_json).collect();
    let mut value = json!({ "content": content });
    if let Some(is_error) = result.is_error {
        value["isError"] = Value::Bool(is_error);
    }
    value
}
