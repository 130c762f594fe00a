//! Folder-aware datasheet tools (spaces only).
//!
//! Tools: list_datasheets, get_datasheet_records

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use crate::client::types::ListRecordsOptions;
use crate::client::TableClient;
use crate::convert::{parse_args, require_non_empty, require_positive, to_json};
use crate::error::{McpError, Result};
use crate::schema;
use crate::tools::ToolDef;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ListDatasheetsArgs {
    space_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct DatasheetRecordsArgs {
    space_id: String,
    name: String,
    max_records: Option<u32>,
    filter_by_formula: Option<String>,
}

/// Get all datasheet tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "list_datasheets",
            "List every datasheet in a space, including ones nested in folders. Each entry \
             has a 'path' such as 'Folder > Subfolder > Name'. Unreadable folders are skipped.",
            schema!(object {
                required: { "spaceId": string }
            }),
        ),
        ToolDef::new(
            "get_datasheet_records",
            "List the records of a datasheet looked up by exact name anywhere in the space \
             (first match wins).",
            schema!(object {
                required: { "spaceId": string, "name": string },
                optional: { "maxRecords": integer, "filterByFormula": string }
            }),
        ),
    ]
}

/// Dispatch a datasheet tool call.
pub async fn dispatch(
    client: &TableClient,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "list_datasheets" => {
            let args: ListDatasheetsArgs = parse_args(args)?;
            require_non_empty("spaceId", &args.space_id)?;

            to_json(&client.get_all_datasheets(&args.space_id).await)
        }

        "get_datasheet_records" => {
            let args: DatasheetRecordsArgs = parse_args(args)?;
            require_non_empty("spaceId", &args.space_id)?;
            require_non_empty("name", &args.name)?;
            require_positive("maxRecords", args.max_records)?;

            let options = ListRecordsOptions {
                max_records: args.max_records,
                filter_by_formula: args.filter_by_formula,
            };
            let records = client
                .get_datasheet_records_by_name(&args.space_id, &args.name, &options)
                .await?;
            to_json(&records)
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}
