//! Tool registry, result envelope and argument schemas.
//!
//! Provides the infrastructure for registering and dispatching MCP tools, and
//! the result envelope every tool call is answered with.

pub mod bases;
pub mod datasheets;
pub mod detail;
pub mod fields;
pub mod records;
pub mod tables;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use crate::client::TableClient;
use crate::error::{McpError, Result};

/// A tool definition for the MCP tools/list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    /// Tool name (e.g., "list_records")
    pub name: String,
    /// Tool description
    pub description: String,
    /// JSON Schema for the input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: JsonValue,
}

impl ToolDef {
    /// Create a new tool definition.
    pub fn new(name: &str, description: &str, input_schema: JsonValue) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

/// One item of a tool result's `content` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolContent {
    /// Always "text"
    #[serde(rename = "type")]
    pub content_type: String,
    /// Always "application/json"
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    /// Serialized result, or the error message
    pub text: String,
}

/// The `tools/call` result envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallToolResult {
    /// Result payload
    pub content: Vec<ToolContent>,
    /// Whether the tool failed
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl CallToolResult {
    fn text(text: String, is_error: bool) -> Self {
        Self {
            content: vec![ToolContent {
                content_type: "text".to_string(),
                mime_type: "application/json".to_string(),
                text,
            }],
            is_error,
        }
    }

    /// Wrap a successful result.
    pub fn success(value: &JsonValue) -> Self {
        Self::text(value.to_string(), false)
    }

    /// Wrap a failure; the message becomes the text.
    pub fn failure(err: &McpError) -> Self {
        Self::text(err.to_string(), true)
    }
}

/// Registry of all available tools.
pub struct ToolRegistry {
    tools: Vec<ToolDef>,
}

impl ToolRegistry {
    /// Create a new registry with all tools registered.
    pub fn new() -> Self {
        let mut tools = Vec::new();

        // Register all tool categories
        tools.extend(bases::tools());
        tools.extend(tables::tools());
        tools.extend(fields::tools());
        tools.extend(records::tools());
        tools.extend(datasheets::tools());

        Self { tools }
    }

    /// Get all tool definitions.
    pub fn tools(&self) -> &[ToolDef] {
        &self.tools
    }

    /// Dispatch a tool call to the appropriate handler.
    pub async fn dispatch(
        &self,
        client: &TableClient,
        name: &str,
        args: Map<String, JsonValue>,
    ) -> Result<JsonValue> {
        // Route based on the entity the tool acts on
        if name.contains("datasheet") {
            datasheets::dispatch(client, name, args).await
        } else if name.ends_with("_bases") {
            bases::dispatch(client, name, args).await
        } else if name.ends_with("_table") || name.ends_with("_tables") {
            tables::dispatch(client, name, args).await
        } else if name.ends_with("_field") {
            fields::dispatch(client, name, args).await
        } else if name.ends_with("_record") || name.ends_with("_records") {
            records::dispatch(client, name, args).await
        } else {
            Err(McpError::UnknownTool(name.to_string()))
        }
    }

    /// Dispatch and wrap the outcome; never fails.
    pub async fn call(
        &self,
        client: &TableClient,
        name: &str,
        args: Map<String, JsonValue>,
    ) -> CallToolResult {
        match self.dispatch(client, name, args).await {
            Ok(value) => CallToolResult::success(&value),
            Err(err) => {
                debug!(tool = name, error = %err, "tool call failed");
                CallToolResult::failure(&err)
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// JSON Schema for a tool's argument object.
///
/// ```ignore
/// schema!(object {
///     required: { "baseId": string },
///     optional: { "maxRecords": integer }
/// })
/// ```
///
/// Either section may be left out. Unknown keys are rejected, the same as
/// when the arguments are decoded.
#[macro_export]
macro_rules! schema {
    (object {
        $(required: { $($req_name:literal : $req_type:tt),* $(,)? })? $(,)?
        $(optional: { $($opt_name:literal : $opt_type:tt),* $(,)? })?
    }) => {{
        #[allow(unused_mut)]
        let mut properties = serde_json::Map::new();
        #[allow(unused_mut)]
        let mut required: Vec<&str> = Vec::new();
        $($(
            properties.insert($req_name.to_string(), $crate::schema!(@type $req_type));
            required.push($req_name);
        )*)?
        $($(
            properties.insert($opt_name.to_string(), $crate::schema!(@type $opt_type));
        )*)?

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false
        })
    }};

    // Type mappings
    (@type string) => { serde_json::json!({"type": "string"}) };
    (@type integer) => { serde_json::json!({"type": "integer", "minimum": 1}) };
    (@type object) => { serde_json::json!({"type": "object"}) };
    (@type array_string) => { serde_json::json!({"type": "array", "items": {"type": "string"}}) };
    (@type detail_level) => {
        serde_json::json!({
            "type": "string",
            "enum": ["tableIdentifiersOnly", "identifiersOnly", "full"]
        })
    };
}
