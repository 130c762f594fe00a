//! Base-level tools.
//!
//! Tools: list_bases

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use crate::client::TableClient;
use crate::convert::{parse_args, to_json};
use crate::error::{McpError, Result};
use crate::schema;
use crate::tools::ToolDef;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ListBasesArgs {}

/// Get all base tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![ToolDef::new(
        "list_bases",
        "List all accessible bases (or spaces) with their id, name and permission level. \
         Start here to find the baseId the other tools need.",
        schema!(object {}),
    )]
}

/// Dispatch a base tool call.
pub async fn dispatch(
    client: &TableClient,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "list_bases" => {
            let ListBasesArgs {} = parse_args(args)?;
            to_json(&client.list_bases().await?)
        }
        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}
