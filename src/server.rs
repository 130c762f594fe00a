//! JSON-RPC 2.0 over stdio.
//!
//! One message per line in, one response per line out. Tool failures are
//! reported inside the tool result; only malformed messages, bad params and
//! unknown methods become JSON-RPC errors.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value as JsonValue};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::client::TableClient;
use crate::convert::to_json;
use crate::error::{rpc_codes, McpError, Result};
use crate::resources;
use crate::tools::ToolRegistry;

/// MCP protocol revision spoken by this server.
const PROTOCOL_VERSION: &str = "2024-11-05";

const SERVER_NAME: &str = "aitable-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
const JSONRPC_VERSION: &str = "2.0";

/// An inbound message. Without an `id` it is a notification.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// Must be `"2.0"`
    pub jsonrpc: String,
    /// Request id, absent on notifications. An explicit `null` is still an id.
    #[serde(default, deserialize_with = "present")]
    pub id: Option<JsonValue>,
    /// Method name
    pub method: String,
    /// Method parameters
    #[serde(default)]
    pub params: Option<JsonValue>,
}

/// Any value that is present, `null` included, is `Some`.
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<JsonValue>, D::Error>
where
    D: Deserializer<'de>,
{
    JsonValue::deserialize(deserializer).map(Some)
}

impl JsonRpcRequest {
    /// Decode `params` into `T`. Missing params decode as `{}`.
    fn params<T: DeserializeOwned>(&self) -> Result<T> {
        let params = self
            .params
            .clone()
            .unwrap_or_else(|| JsonValue::Object(Map::new()));
        serde_json::from_value(params).map_err(|e| {
            McpError::Validation(format!("invalid params for '{}': {}", self.method, e))
        })
    }
}

/// Outcome half of a response: exactly one of `result` or `error`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Successful result
    Result(JsonValue),
    /// Failure
    Error(JsonRpcError),
}

/// An outbound response.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    /// Always `"2.0"`
    pub jsonrpc: &'static str,
    /// Id of the request answered; `null` when it could not be read
    pub id: JsonValue,
    /// Result or error
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i32,
    /// Human-readable message
    pub message: String,
}

impl JsonRpcResponse {
    /// A successful response.
    pub fn success(id: JsonValue, result: JsonValue) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            outcome: Outcome::Result(result),
        }
    }

    /// An error response.
    pub fn error(id: JsonValue, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            outcome: Outcome::Error(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }

    /// An error response carrying the code mapped from `err`.
    pub fn from_error(id: JsonValue, err: &McpError) -> Self {
        Self::error(id, err.rpc_code(), err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Option<Map<String, JsonValue>>,
}

#[derive(Debug, Deserialize)]
struct ReadResourceParams {
    uri: String,
}

/// MCP server over one [`TableClient`].
pub struct McpServer {
    client: TableClient,
    registry: ToolRegistry,
    initialized: bool,
}

impl McpServer {
    /// Create a server for `client`.
    pub fn new(client: TableClient) -> Self {
        Self {
            client,
            registry: ToolRegistry::new(),
            initialized: false,
        }
    }

    /// Whether `initialize` has been received.
    pub fn initialized(&self) -> bool {
        self.initialized
    }

    /// Serve stdin to stdout until the client closes stdin.
    pub async fn run(&mut self) -> Result<()> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve newline-delimited JSON-RPC from `reader` to `writer` until EOF.
    pub async fn serve<R, W>(&mut self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(server = SERVER_NAME, version = SERVER_VERSION, "serving");

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(response) = self.handle_line(line).await {
                write_response(&mut writer, &response).await?;
            }
        }

        info!("client disconnected");
        Ok(())
    }

    /// Parse one line in two stages: not JSON is a parse error, JSON that is
    /// not a request is an invalid request.
    async fn handle_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let value: JsonValue = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "unparseable message");
                return Some(JsonRpcResponse::error(
                    JsonValue::Null,
                    rpc_codes::PARSE_ERROR,
                    format!("parse error: {}", e),
                ));
            }
        };

        let id = value.get("id").cloned().unwrap_or(JsonValue::Null);
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => Some(JsonRpcResponse::error(
                id,
                rpc_codes::INVALID_REQUEST,
                format!("invalid request: {}", e),
            )),
        }
    }

    /// Handle one request. Notifications get no response.
    pub async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                request.id.unwrap_or(JsonValue::Null),
                rpc_codes::INVALID_REQUEST,
                "jsonrpc must be \"2.0\"",
            ));
        }

        let Some(id) = request.id.clone() else {
            debug!(method = %request.method, "notification");
            return None;
        };
        debug!(method = %request.method, "request");

        let outcome = match request.method.as_str() {
            "initialize" => Ok(self.initialize()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.list_tools()),
            "tools/call" => self.call_tool(&request).await,
            "resources/list" => resources::list_resources(&self.client)
                .await
                .map(|list| json!({ "resources": list })),
            "resources/templates/list" => {
                Ok(json!({ "resourceTemplates": resources::resource_templates() }))
            }
            "resources/read" => self.read_resource(&request).await,
            other => {
                return Some(JsonRpcResponse::error(
                    id,
                    rpc_codes::METHOD_NOT_FOUND,
                    format!("unknown method: {}", other),
                ))
            }
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => JsonRpcResponse::from_error(id, &err),
        })
    }

    fn initialize(&mut self) -> JsonValue {
        self.initialized = true;
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {},
                "resources": {}
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": SERVER_VERSION
            }
        })
    }

    fn list_tools(&self) -> JsonValue {
        let tools: Vec<JsonValue> = self
            .registry
            .tools()
            .iter()
            .map(|t| {
                json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect();
        json!({ "tools": tools })
    }

    /// Tool failures come back as `isError: true` results, not as errors.
    async fn call_tool(&self, request: &JsonRpcRequest) -> Result<JsonValue> {
        let params: CallToolParams = request.params()?;
        let result = self
            .registry
            .call(
                &self.client,
                &params.name,
                params.arguments.unwrap_or_default(),
            )
            .await;
        to_json(&result)
    }

    async fn read_resource(&self, request: &JsonRpcRequest) -> Result<JsonValue> {
        let params: ReadResourceParams = request.params()?;
        resources::read_resource(&self.client, &params.uri).await
    }
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &JsonRpcResponse,
) -> Result<()> {
    let mut out = serde_json::to_vec(response)?;
    out.push(b'\n');
    writer.write_all(&out).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    fn server() -> McpServer {
        let config = ClientConfig::new("key", Some("http://127.0.0.1:9".to_string())).unwrap();
        McpServer::new(TableClient::new(config).unwrap())
    }

    fn request(raw: JsonValue) -> JsonRpcRequest {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_success_has_result_only() {
        let response = JsonRpcResponse::success(json!(1), json!({ "ok": true }));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({ "jsonrpc": "2.0", "id": 1, "result": { "ok": true } }));
    }

    #[test]
    fn test_error_has_error_only() {
        let response = JsonRpcResponse::error(json!("a"), -32600, "Invalid");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["error"]["code"], -32600);
        assert!(value.get("result").is_none());
    }

    #[test]
    fn test_from_error_uses_rpc_code() {
        let response =
            JsonRpcResponse::from_error(json!(7), &McpError::NotFound("resource 'x'".to_string()));
        match response.outcome {
            Outcome::Error(error) => {
                assert_eq!(error.code, rpc_codes::RESOURCE_NOT_FOUND);
                assert_eq!(error.message, "not found: resource 'x'");
            }
            Outcome::Result(_) => panic!("expected error"),
        }
    }

    #[tokio::test]
    async fn test_notification_gets_no_response() {
        let mut server = server();
        let reply = server
            .handle_request(request(json!({ "jsonrpc": "2.0", "method": "notifications/initialized" })))
            .await;
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn test_null_id_is_a_request() {
        let mut server = server();
        let reply = server
            .handle_line(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#)
            .await
            .unwrap();
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["id"], JsonValue::Null);
        assert_eq!(value["result"], json!({}));
    }

    #[tokio::test]
    async fn test_initialize_and_unknown_method() {
        let mut server = server();
        assert!(!server.initialized());

        let reply = server
            .handle_request(request(json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize" })))
            .await
            .unwrap();
        assert!(server.initialized());
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["result"]["protocolVersion"], PROTOCOL_VERSION);

        let reply = server
            .handle_request(request(json!({ "jsonrpc": "2.0", "id": 2, "method": "bogus" })))
            .await
            .unwrap();
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["error"]["code"], rpc_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bad_params_are_invalid_params() {
        let mut server = server();
        let reply = server
            .handle_request(request(json!({
                "jsonrpc": "2.0", "id": 3, "method": "tools/call",
                "params": { "arguments": {} }
            })))
            .await
            .unwrap();
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["error"]["code"], rpc_codes::INVALID_PARAMS);
        assert!(value["error"]["message"].as_str().unwrap().contains("name"));
    }

    #[tokio::test]
    async fn test_lines_that_are_not_requests() {
        let mut server = server();

        let reply = server.handle_line("{not json").await.unwrap();
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["id"], JsonValue::Null);
        assert_eq!(value["error"]["code"], rpc_codes::PARSE_ERROR);

        let reply = server.handle_line(r#"{"id": 4, "jsonrpc": "2.0"}"#).await.unwrap();
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["id"], 4);
        assert_eq!(value["error"]["code"], rpc_codes::INVALID_REQUEST);
    }
}
