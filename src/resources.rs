//! Read-only MCP resources.
//!
//! - `aitable://{baseId}/schema`: every table of a base
//! - `aitable://{baseId}/{tableId}/records`: every record of a table

use serde_json::{json, Value as JsonValue};

use crate::client::types::ListRecordsOptions;
use crate::client::TableClient;
use crate::convert::to_json;
use crate::error::{McpError, Result};

const SCHEME: &str = "aitable://";

/// A parsed resource URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceUri {
    /// Schema of a base.
    BaseSchema {
        /// Base id
        base_id: String,
    },
    /// Records of a table.
    TableRecords {
        /// Base id
        base_id: String,
        /// Table id
        table_id: String,
    },
}

impl ResourceUri {
    /// Parse `aitable://...`.
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix(SCHEME)
            .ok_or_else(|| McpError::invalid_arg("uri", format!("expected {}...", SCHEME)))?;
        let parts: Vec<&str> = rest.split('/').collect();
        match parts.as_slice() {
            [base_id, "schema"] if !base_id.is_empty() => Ok(ResourceUri::BaseSchema {
                base_id: base_id.to_string(),
            }),
            [base_id, table_id, "records"] if !base_id.is_empty() && !table_id.is_empty() => {
                Ok(ResourceUri::TableRecords {
                    base_id: base_id.to_string(),
                    table_id: table_id.to_string(),
                })
            }
            _ => Err(McpError::NotFound(format!("resource '{}'", uri))),
        }
    }

    /// Render back to a URI string.
    pub fn to_uri(&self) -> String {
        match self {
            ResourceUri::BaseSchema { base_id } => format!("{}{}/schema", SCHEME, base_id),
            ResourceUri::TableRecords { base_id, table_id } => {
                format!("{}{}/{}/records", SCHEME, base_id, table_id)
            }
        }
    }
}

/// Resources for `resources/list`: one schema per base.
pub async fn list_resources(client: &TableClient) -> Result<Vec<JsonValue>> {
    let bases = client.list_bases().await?;
    Ok(bases
        .into_iter()
        .map(|base| {
            let uri = ResourceUri::BaseSchema {
                base_id: base.id.clone(),
            };
            json!({
                "uri": uri.to_uri(),
                "name": format!("{} schema", base.name),
                "mimeType": "application/json",
            })
        })
        .collect())
}

/// Templates for `resources/templates/list`.
pub fn resource_templates() -> Vec<JsonValue> {
    vec![
        json!({
            "uriTemplate": format!("{}{{baseId}}/schema", SCHEME),
            "name": "Base schema",
            "description": "Tables, fields and views of a base",
            "mimeType": "application/json",
        }),
        json!({
            "uriTemplate": format!("{}{{baseId}}/{{tableId}}/records", SCHEME),
            "name": "Table records",
            "description": "All records of a table",
            "mimeType": "application/json",
        }),
    ]
}

/// Contents for `resources/read`.
pub async fn read_resource(client: &TableClient, uri: &str) -> Result<JsonValue> {
    let body = match ResourceUri::parse(uri)? {
        ResourceUri::BaseSchema { base_id } => to_json(&client.get_base_schema(&base_id).await?)?,
        ResourceUri::TableRecords { base_id, table_id } => to_json(
            &client
                .list_records(&base_id, &table_id, &ListRecordsOptions::default())
                .await?,
        )?,
    };

    Ok(json!({
        "contents": [{
            "uri": uri,
            "mimeType": "application/json",
            "text": body.to_string(),
        }]
    }))
}
