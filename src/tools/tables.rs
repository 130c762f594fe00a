//! Table tools.
//!
//! Tools: list_tables, describe_table, create_table, update_table

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use crate::client::types::{Field, MetadataUpdate};
use crate::client::TableClient;
use crate::convert::{parse_args, require_items, require_non_empty, to_json};
use crate::error::{McpError, Result};
use crate::schema;
use crate::tools::detail::{project_table, DetailLevel};
use crate::tools::ToolDef;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ListTablesArgs {
    base_id: String,
    #[serde(default)]
    detail_level: DetailLevel,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct DescribeTableArgs {
    base_id: String,
    table_id: String,
    #[serde(default)]
    detail_level: DetailLevel,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct CreateTableArgs {
    base_id: String,
    name: String,
    fields: Vec<Field>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct UpdateTableArgs {
    base_id: String,
    table_id: String,
    name: Option<String>,
    description: Option<String>,
}

/// JSON Schema for a new field definition.
pub(crate) fn field_definition_schema() -> JsonValue {
    serde_json::json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "type": { "type": "string" },
            "description": { "type": "string" },
            "options": { "type": "object" }
        },
        "required": ["name", "type"]
    })
}

/// Get all table tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "list_tables",
            "List the tables of a base. detailLevel controls verbosity: \
             'tableIdentifiersOnly' (id and name), 'identifiersOnly' (plus field and view \
             ids/names) or 'full' (default, complete schema).",
            schema!(object {
                required: { "baseId": string },
                optional: { "detailLevel": detail_level }
            }),
        ),
        ToolDef::new(
            "describe_table",
            "Describe one table: fields, views and primary field. Accepts the same \
             detailLevel values as list_tables.",
            schema!(object {
                required: { "baseId": string, "tableId": string },
                optional: { "detailLevel": detail_level }
            }),
        ),
        ToolDef::new(
            "create_table",
            "Create a table with at least one field. Returns the table as stored by the \
             server, including assigned ids.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "baseId": { "type": "string" },
                    "name": { "type": "string" },
                    "description": { "type": "string" },
                    "fields": { "type": "array", "items": field_definition_schema() }
                },
                "required": ["baseId", "name", "fields"],
                "additionalProperties": false
            }),
        ),
        ToolDef::new(
            "update_table",
            "Rename a table or change its description. Returns the refreshed table.",
            schema!(object {
                required: { "baseId": string, "tableId": string },
                optional: { "name": string, "description": string }
            }),
        ),
    ]
}

/// Dispatch a table tool call.
pub async fn dispatch(
    client: &TableClient,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "list_tables" => {
            let args: ListTablesArgs = parse_args(args)?;
            require_non_empty("baseId", &args.base_id)?;

            let schema = client.get_base_schema(&args.base_id).await?;
            let tables = schema
                .tables
                .iter()
                .map(|t| project_table(t, args.detail_level))
                .collect::<Result<Vec<_>>>()?;
            Ok(JsonValue::Array(tables))
        }

        "describe_table" => {
            let args: DescribeTableArgs = parse_args(args)?;
            require_non_empty("baseId", &args.base_id)?;
            require_non_empty("tableId", &args.table_id)?;

            let table = client.describe_table(&args.base_id, &args.table_id).await?;
            project_table(&table, args.detail_level)
        }

        "create_table" => {
            let args: CreateTableArgs = parse_args(args)?;
            require_non_empty("baseId", &args.base_id)?;
            require_non_empty("name", &args.name)?;
            require_items("fields", &args.fields)?;

            // ids are assigned by the server
            let fields: Vec<Field> = args
                .fields
                .into_iter()
                .map(|f| Field { id: None, ..f })
                .collect();
            for field in &fields {
                require_non_empty("fields.name", &field.name)?;
                require_non_empty("fields.type", &field.field_type)?;
            }

            let table = client
                .create_table(
                    &args.base_id,
                    &args.name,
                    &fields,
                    args.description.as_deref(),
                )
                .await?;
            to_json(&table)
        }

        "update_table" => {
            let args: UpdateTableArgs = parse_args(args)?;
            require_non_empty("baseId", &args.base_id)?;
            require_non_empty("tableId", &args.table_id)?;
            if args.name.is_none() && args.description.is_none() {
                return Err(McpError::Validation(
                    "update_table needs at least one of name or description".to_string(),
                ));
            }

            let update = MetadataUpdate {
                name: args.name,
                description: args.description,
            };
            let table = client
                .update_table(&args.base_id, &args.table_id, &update)
                .await?;
            to_json(&table)
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}
