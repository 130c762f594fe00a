//! Response verbosity for table listings.

use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use crate::client::types::Table;
use crate::convert::to_json;
use crate::error::Result;

/// How much of a table to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DetailLevel {
    /// `{id, name}` only.
    TableIdentifiersOnly,
    /// Table, field and view ids and names.
    IdentifiersOnly,
    /// The complete table.
    #[default]
    Full,
}

/// Project a table to the requested level. Pure.
pub fn project_table(table: &Table, level: DetailLevel) -> Result<JsonValue> {
    match level {
        DetailLevel::TableIdentifiersOnly => Ok(json!({ "id": table.id, "name": table.name })),
        DetailLevel::IdentifiersOnly => Ok(json!({
            "id": table.id,
            "name": table.name,
            "fields": table
                .fields
                .iter()
                .map(|f| json!({ "id": f.id, "name": f.name }))
                .collect::<Vec<_>>(),
            "views": table
                .views
                .iter()
                .map(|v| json!({ "id": v.id, "name": v.name }))
                .collect::<Vec<_>>(),
        })),
        DetailLevel::Full => to_json(table),
    }
}
