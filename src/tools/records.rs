//! Record tools.
//!
//! Tools: list_records, search_records, get_record, create_record,
//!        update_records, delete_records

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::{json, Map, Value as JsonValue};

use crate::client::types::{DeletedRecord, ListRecordsOptions, Record};
use crate::client::TableClient;
use crate::convert::{parse_args, require_items, require_non_empty, require_positive, to_json};
use crate::error::{McpError, Result};
use crate::schema;
use crate::tools::ToolDef;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ListRecordsArgs {
    base_id: String,
    table_id: String,
    max_records: Option<u32>,
    filter_by_formula: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SearchRecordsArgs {
    base_id: String,
    table_id: String,
    search_term: String,
    field_ids: Option<Vec<String>>,
    max_records: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct GetRecordArgs {
    base_id: String,
    table_id: String,
    record_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct CreateRecordArgs {
    base_id: String,
    table_id: String,
    fields: Map<String, JsonValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct UpdateRecordsArgs {
    base_id: String,
    table_id: String,
    records: Vec<Record>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct DeleteRecordsArgs {
    base_id: String,
    table_id: String,
    record_ids: Vec<String>,
}

/// Get all record tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "list_records",
            "List records from a table, following pagination. maxRecords limits how many \
             the server returns; filterByFormula applies an upstream formula filter.",
            schema!(object {
                required: { "baseId": string, "tableId": string },
                optional: { "maxRecords": integer, "filterByFormula": string }
            }),
        ),
        ToolDef::new(
            "search_records",
            "Search text fields of a table for a term (case-insensitive substring). \
             fieldIds restricts the search to specific text fields; by default every \
             text field is searched.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "baseId": { "type": "string" },
                    "tableId": { "type": "string" },
                    "searchTerm": { "type": "string" },
                    "fieldIds": { "type": "array", "items": { "type": "string" } },
                    "maxRecords": { "type": "integer", "minimum": 1 }
                },
                "required": ["baseId", "tableId", "searchTerm"],
                "additionalProperties": false
            }),
        ),
        ToolDef::new(
            "get_record",
            "Get a single record by id.",
            schema!(object {
                required: { "baseId": string, "tableId": string, "recordId": string }
            }),
        ),
        ToolDef::new(
            "create_record",
            "Create a record. 'fields' maps field names to values.",
            schema!(object {
                required: { "baseId": string, "tableId": string, "fields": object }
            }),
        ),
        ToolDef::new(
            "update_records",
            "Update several records at once. Each item is {id, fields}; only the given \
             fields change. Not atomic: records the server did not update are listed \
             under 'failed'.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "baseId": { "type": "string" },
                    "tableId": { "type": "string" },
                    "records": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "id": { "type": "string" },
                                "fields": { "type": "object" }
                            },
                            "required": ["id", "fields"]
                        }
                    }
                },
                "required": ["baseId", "tableId", "records"],
                "additionalProperties": false
            }),
        ),
        ToolDef::new(
            "delete_records",
            "Delete several records by id. Not atomic: ids the server did not delete are \
             listed under 'failed'.",
            schema!(object {
                required: { "baseId": string, "tableId": string, "recordIds": array_string }
            }),
        ),
    ]
}

/// Dispatch a record tool call.
pub async fn dispatch(
    client: &TableClient,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "list_records" => {
            let args: ListRecordsArgs = parse_args(args)?;
            require_non_empty("baseId", &args.base_id)?;
            require_non_empty("tableId", &args.table_id)?;
            require_positive("maxRecords", args.max_records)?;

            let options = ListRecordsOptions {
                max_records: args.max_records,
                filter_by_formula: args.filter_by_formula,
            };
            let records = client
                .list_records(&args.base_id, &args.table_id, &options)
                .await?;
            to_json(&records)
        }

        "search_records" => {
            let args: SearchRecordsArgs = parse_args(args)?;
            require_non_empty("baseId", &args.base_id)?;
            require_non_empty("tableId", &args.table_id)?;
            require_non_empty("searchTerm", &args.search_term)?;
            require_positive("maxRecords", args.max_records)?;

            let records = client
                .search_records(
                    &args.base_id,
                    &args.table_id,
                    &args.search_term,
                    args.field_ids.as_deref(),
                    args.max_records,
                )
                .await?;
            to_json(&records)
        }

        "get_record" => {
            let args: GetRecordArgs = parse_args(args)?;
            require_non_empty("baseId", &args.base_id)?;
            require_non_empty("tableId", &args.table_id)?;
            require_non_empty("recordId", &args.record_id)?;

            let record = client
                .get_record(&args.base_id, &args.table_id, &args.record_id)
                .await?;
            to_json(&record)
        }

        "create_record" => {
            let args: CreateRecordArgs = parse_args(args)?;
            require_non_empty("baseId", &args.base_id)?;
            require_non_empty("tableId", &args.table_id)?;

            let record = client
                .create_record(&args.base_id, &args.table_id, &args.fields)
                .await?;
            to_json(&record)
        }

        "update_records" => {
            let args: UpdateRecordsArgs = parse_args(args)?;
            require_non_empty("baseId", &args.base_id)?;
            require_non_empty("tableId", &args.table_id)?;
            require_items("records", &args.records)?;
            for record in &args.records {
                require_non_empty("records.id", &record.id)?;
            }

            let requested: Vec<String> = args.records.iter().map(|r| r.id.clone()).collect();
            let updated = client
                .update_records(&args.base_id, &args.table_id, &args.records)
                .await?;
            let succeeded: Vec<&str> = updated.iter().map(|r| r.id.as_str()).collect();
            shape_batch(&requested, &succeeded, to_json(&updated)?)
        }

        "delete_records" => {
            let args: DeleteRecordsArgs = parse_args(args)?;
            require_non_empty("baseId", &args.base_id)?;
            require_non_empty("tableId", &args.table_id)?;
            require_items("recordIds", &args.record_ids)?;
            for id in &args.record_ids {
                require_non_empty("recordIds", id)?;
            }

            let deleted = client
                .delete_records(&args.base_id, &args.table_id, &args.record_ids)
                .await?;
            let confirmed: Vec<&DeletedRecord> = deleted.iter().filter(|d| d.deleted).collect();
            let succeeded: Vec<&str> = confirmed.iter().map(|d| d.id.as_str()).collect();
            shape_batch(&args.record_ids, &succeeded, to_json(&confirmed)?)
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

/// Report a batch result.
///
/// When every requested id succeeded the server's report is returned as is;
/// otherwise it is split into `succeeded` and the ids that did not.
fn shape_batch(requested: &[String], succeeded: &[&str], reported: JsonValue) -> Result<JsonValue> {
    let done: HashSet<&str> = succeeded.iter().copied().collect();
    let failed: Vec<&str> = requested
        .iter()
        .map(|id| id.as_str())
        .filter(|id| !done.contains(id))
        .collect();

    if failed.is_empty() {
        return Ok(reported);
    }
    Ok(json!({ "succeeded": reported, "failed": failed }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_batch_all_succeeded() {
        let requested = vec!["rec1".to_string(), "rec2".to_string()];
        let reported = json!([{"id": "rec1"}, {"id": "rec2"}]);
        let shaped = shape_batch(&requested, &["rec1", "rec2"], reported.clone()).unwrap();
        assert_eq!(shaped, reported);
    }

    #[test]
    fn test_shape_batch_partial() {
        let requested = vec!["rec1".to_string(), "rec2".to_string(), "rec3".to_string()];
        let reported = json!([{"id": "rec2", "deleted": true}]);
        let shaped = shape_batch(&requested, &["rec2"], reported.clone()).unwrap();
        assert_eq!(shaped["succeeded"], reported);
        assert_eq!(shaped["failed"], json!(["rec1", "rec3"]));
    }
}
