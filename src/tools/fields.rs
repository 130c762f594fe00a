//! Field tools.
//!
//! Tools: create_field, update_field

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use crate::client::types::{Field, MetadataUpdate};
use crate::client::TableClient;
use crate::convert::{parse_args, require_non_empty, to_json};
use crate::error::{McpError, Result};
use crate::schema;
use crate::tools::ToolDef;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct CreateFieldArgs {
    base_id: String,
    table_id: String,
    name: String,
    #[serde(rename = "type")]
    field_type: String,
    description: Option<String>,
    options: Option<Map<String, JsonValue>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct UpdateFieldArgs {
    base_id: String,
    table_id: String,
    field_id: String,
    name: Option<String>,
    description: Option<String>,
}

/// Get all field tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "create_field",
            "Add a field to a table. 'type' is the upstream field type (e.g. singleLineText, \
             number, singleSelect); 'options' carries type-specific settings. Returns the \
             field as stored by the server.",
            schema!(object {
                required: { "baseId": string, "tableId": string, "name": string, "type": string },
                optional: { "description": string, "options": object }
            }),
        ),
        ToolDef::new(
            "update_field",
            "Rename a field or change its description. Returns the refreshed field.",
            schema!(object {
                required: { "baseId": string, "tableId": string, "fieldId": string },
                optional: { "name": string, "description": string }
            }),
        ),
    ]
}

/// Dispatch a field tool call.
pub async fn dispatch(
    client: &TableClient,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "create_field" => {
            let args: CreateFieldArgs = parse_args(args)?;
            require_non_empty("baseId", &args.base_id)?;
            require_non_empty("tableId", &args.table_id)?;
            require_non_empty("name", &args.name)?;
            require_non_empty("type", &args.field_type)?;

            let field = Field {
                id: None,
                name: args.name,
                field_type: args.field_type,
                description: args.description,
                options: args.options,
            };
            let created = client
                .create_field(&args.base_id, &args.table_id, &field)
                .await?;
            to_json(&created)
        }

        "update_field" => {
            let args: UpdateFieldArgs = parse_args(args)?;
            require_non_empty("baseId", &args.base_id)?;
            require_non_empty("tableId", &args.table_id)?;
            require_non_empty("fieldId", &args.field_id)?;
            if args.name.is_none() && args.description.is_none() {
                return Err(McpError::Validation(
                    "update_field needs at least one of name or description".to_string(),
                ));
            }

            let update = MetadataUpdate {
                name: args.name,
                description: args.description,
            };
            let field = client
                .update_field(&args.base_id, &args.table_id, &args.field_id, &update)
                .await?;
            to_json(&field)
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}
