//! Fallback dialect: `/fusion/v1` spaces, nodes and datasheets.
//!
//! Every response is wrapped in a `{success, code, message, data}` envelope
//! and uses its own shapes, which are mapped onto the normalized model here.
//! Spaces play the role of bases and datasheets the role of tables.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value as JsonValue};
use tracing::{debug, warn};

use crate::client::dialect::Dialect;
use crate::client::search::{escape_formula_string, matches_term};
use crate::client::types::{
    Base, BaseSchema, DatasheetInfo, DeletedRecord, Field, ListRecordsOptions, MetadataUpdate,
    PermissionLevel, Record, Table, View,
};
use crate::error::{McpError, Result};
use crate::http::{HttpMethod, UpstreamApi};

/// Largest page the records endpoint accepts.
const MAX_PAGE_SIZE: u32 = 1000;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

impl<T> Envelope<T> {
    fn ensure_success(&self) -> Result<()> {
        if self.success {
            Ok(())
        } else {
            Err(McpError::Api {
                code: self.code,
                message: self.message.clone(),
            })
        }
    }

    fn into_data(self) -> Result<T> {
        self.ensure_success()?;
        self.data
            .ok_or_else(|| McpError::InvalidResponse("envelope has no `data`".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct SpaceWire {
    id: String,
    name: String,
    #[serde(default, rename = "isAdmin")]
    is_admin: bool,
}

#[derive(Debug, Deserialize)]
struct SpacesData {
    spaces: Vec<SpaceWire>,
}

#[derive(Debug, Clone, Deserialize)]
struct NodeWire {
    id: String,
    name: String,
    #[serde(rename = "type")]
    node_type: String,
    #[serde(default)]
    children: Vec<NodeWire>,
}

impl NodeWire {
    fn is(&self, node_type: &str) -> bool {
        self.node_type.eq_ignore_ascii_case(node_type)
    }
}

#[derive(Debug, Deserialize)]
struct NodesData {
    nodes: Vec<NodeWire>,
}

#[derive(Debug, Deserialize)]
struct FieldWire {
    id: String,
    name: String,
    #[serde(rename = "type")]
    field_type: String,
    #[serde(default, rename = "isPrimary")]
    is_primary: bool,
    #[serde(default)]
    desc: Option<String>,
    #[serde(default)]
    property: Option<Map<String, JsonValue>>,
}

#[derive(Debug, Deserialize)]
struct FieldsData {
    fields: Vec<FieldWire>,
}

#[derive(Debug, Deserialize)]
struct ViewsData {
    views: Vec<View>,
}

#[derive(Debug, Deserialize)]
struct RecordWire {
    #[serde(rename = "recordId")]
    record_id: String,
    #[serde(default)]
    fields: Map<String, JsonValue>,
}

impl From<RecordWire> for Record {
    fn from(wire: RecordWire) -> Self {
        Record {
            id: wire.record_id,
            fields: wire.fields,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RecordsData {
    #[serde(default)]
    total: u64,
    records: Vec<RecordWire>,
}

#[derive(Debug, Deserialize)]
struct CreatedData {
    id: String,
}

/// Request body shape for a field definition.
fn field_body(field: &Field) -> JsonValue {
    let mut body = json!({ "type": field.field_type, "name": field.name });
    if let Some(property) = &field.options {
        body["property"] = JsonValue::Object(property.clone());
    }
    body
}

/// AITable-style API.
pub struct AitableDialect {
    api: UpstreamApi,
}

impl AitableDialect {
    /// Wrap an authenticated API handle.
    pub fn new(api: UpstreamApi) -> Self {
        Self { api }
    }

    async fn list_nodes(&self, space_id: &str) -> Result<Vec<NodeWire>> {
        let envelope: Envelope<NodesData> = self
            .api
            .get(&format!("/fusion/v1/spaces/{}/nodes", space_id), Vec::new())
            .await?;
        Ok(envelope.into_data()?.nodes)
    }

    async fn node_children(&self, space_id: &str, node_id: &str) -> Result<Vec<NodeWire>> {
        let envelope: Envelope<NodeWire> = self
            .api
            .get(
                &format!("/fusion/v1/spaces/{}/nodes/{}", space_id, node_id),
                Vec::new(),
            )
            .await?;
        Ok(envelope.into_data()?.children)
    }

    async fn load_table(&self, node: &NodeWire, path: &str) -> Result<Table> {
        let fields: Envelope<FieldsData> = self
            .api
            .get(&format!("/fusion/v1/datasheets/{}/fields", node.id), Vec::new())
            .await?;
        let views: Envelope<ViewsData> = self
            .api
            .get(&format!("/fusion/v1/datasheets/{}/views", node.id), Vec::new())
            .await?;
        let fields = fields.into_data()?.fields;
        let views = views.into_data()?.views;

        let primary_field_id = fields
            .iter()
            .find(|f| f.is_primary)
            .or_else(|| fields.first())
            .map(|f| f.id.clone())
            .unwrap_or_default();

        Ok(Table {
            id: node.id.clone(),
            name: node.name.clone(),
            description: None,
            primary_field_id,
            fields: fields
                .into_iter()
                .map(|f| Field {
                    id: Some(f.id),
                    name: f.name,
                    field_type: f.field_type,
                    description: f.desc,
                    options: f.property,
                })
                .collect(),
            views,
            path: Some(path.to_string()),
        })
    }

    /// Walk the folder tree of a space and return every datasheet node with
    /// its breadcrumb path.
    ///
    /// Siblings are visited in upstream order and folders are entered as
    /// they are met. A folder that cannot be fetched is logged and its
    /// subtree skipped; only a failed root listing is an error.
    async fn walk_datasheets(&self, space_id: &str) -> Result<Vec<(NodeWire, String)>> {
        let roots = self.list_nodes(space_id).await?;

        let mut found = Vec::new();
        let mut pending: Vec<(NodeWire, Option<String>)> =
            roots.into_iter().rev().map(|node| (node, None)).collect();

        while let Some((node, parent_path)) = pending.pop() {
            let path = match parent_path {
                Some(parent) => format!("{} > {}", parent, node.name),
                None => node.name.clone(),
            };

            if node.is("datasheet") {
                found.push((node, path));
            } else if node.is("folder") {
                match self.node_children(space_id, &node.id).await {
                    Ok(children) => pending.extend(
                        children
                            .into_iter()
                            .rev()
                            .map(|child| (child, Some(path.clone()))),
                    ),
                    Err(e) => {
                        warn!(node = %node.id, path = %path, error = %e, "skipping folder")
                    }
                }
            } else {
                debug!(node = %node.id, node_type = %node.node_type, "ignoring node");
            }
        }

        Ok(found)
    }

    /// Every datasheet of a space, including ones nested in folders.
    ///
    /// Never fails as a whole: an unlistable space yields an empty list.
    pub async fn get_all_datasheets(&self, space_id: &str) -> Vec<DatasheetInfo> {
        match self.walk_datasheets(space_id).await {
            Ok(nodes) => nodes
                .into_iter()
                .map(|(node, path)| DatasheetInfo {
                    id: node.id,
                    name: node.name,
                    path,
                    space_id: space_id.to_string(),
                })
                .collect(),
            Err(e) => {
                warn!(space = space_id, error = %e, "failed to list root nodes");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl Dialect for AitableDialect {
    fn name(&self) -> &'static str {
        "aitable"
    }

    async fn list_bases(&self) -> Result<Vec<Base>> {
        let envelope: Envelope<SpacesData> = self.api.get("/fusion/v1/spaces", Vec::new()).await?;
        Ok(envelope
            .into_data()?
            .spaces
            .into_iter()
            .map(|s| Base {
                id: s.id,
                name: s.name,
                permission_level: if s.is_admin {
                    PermissionLevel::Owner
                } else {
                    PermissionLevel::Read
                },
            })
            .collect())
    }

    async fn get_base_schema(&self, base_id: &str) -> Result<BaseSchema> {
        let nodes = self.walk_datasheets(base_id).await?;
        let mut tables = Vec::new();
        for (node, path) in &nodes {
            match self.load_table(node, path).await {
                Ok(table) => tables.push(table),
                Err(e) => warn!(datasheet = %node.id, error = %e, "skipping datasheet"),
            }
        }
        Ok(BaseSchema { tables })
    }

    async fn list_records(
        &self,
        _base_id: &str,
        table_id: &str,
        options: &ListRecordsOptions,
    ) -> Result<Vec<Record>> {
        let path = format!("/fusion/v1/datasheets/{}/records", table_id);
        let page_size = options
            .max_records
            .map(|m| m.min(MAX_PAGE_SIZE))
            .unwrap_or(MAX_PAGE_SIZE);

        let mut records: Vec<Record> = Vec::new();
        let mut page_num: u32 = 1;
        loop {
            let mut query = vec![
                ("pageSize".to_string(), page_size.to_string()),
                ("pageNum".to_string(), page_num.to_string()),
                ("fieldKey".to_string(), "name".to_string()),
            ];
            if let Some(formula) = &options.filter_by_formula {
                query.push(("filterByFormula".to_string(), formula.clone()));
            }

            let envelope: Envelope<RecordsData> = self.api.get(&path, query).await?;
            let page = envelope.into_data()?;
            let fetched = page.records.len();
            records.extend(page.records.into_iter().map(Record::from));

            let reached_max = options
                .max_records
                .map_or(false, |max| records.len() >= max as usize);
            if fetched == 0 || records.len() as u64 >= page.total || reached_max {
                break;
            }
            page_num += 1;
        }

        Ok(records)
    }

    async fn get_record(&self, base_id: &str, table_id: &str, record_id: &str) -> Result<Record> {
        let options = ListRecordsOptions {
            max_records: Some(2),
            filter_by_formula: Some(format!(
                "RECORD_ID() = \"{}\"",
                escape_formula_string(record_id)
            )),
        };
        let mut matches = self.list_records(base_id, table_id, &options).await?;
        match matches.len() {
            0 => Err(McpError::NotFound(format!(
                "record '{}' in datasheet '{}'",
                record_id, table_id
            ))),
            1 => Ok(matches.remove(0)),
            n => {
                warn!(
                    record = record_id,
                    datasheet = table_id,
                    matches = n,
                    "record lookup matched more than one row, using the first"
                );
                Ok(matches.remove(0))
            }
        }
    }

    async fn search_records(
        &self,
        base_id: &str,
        table_id: &str,
        term: &str,
        fields: &[Field],
        max_records: Option<u32>,
    ) -> Result<Vec<Record>> {
        let options = ListRecordsOptions {
            max_records,
            filter_by_formula: None,
        };
        let candidates = self.list_records(base_id, table_id, &options).await?;
        Ok(candidates
            .into_iter()
            .filter(|record| matches_term(record, term, fields))
            .collect())
    }

    async fn create_record(
        &self,
        _base_id: &str,
        table_id: &str,
        fields: &Map<String, JsonValue>,
    ) -> Result<Record> {
        let envelope: Envelope<RecordsData> = self
            .api
            .send(
                HttpMethod::Post,
                &format!("/fusion/v1/datasheets/{}/records", table_id),
                Vec::new(),
                Some(json!({ "records": [{ "fields": fields }], "fieldKey": "name" })),
            )
            .await?;
        envelope
            .into_data()?
            .records
            .into_iter()
            .next()
            .map(Record::from)
            .ok_or_else(|| McpError::InvalidResponse("create returned no record".to_string()))
    }

    async fn update_records(
        &self,
        _base_id: &str,
        table_id: &str,
        records: &[Record],
    ) -> Result<Vec<Record>> {
        let body: Vec<JsonValue> = records
            .iter()
            .map(|r| json!({ "recordId": r.id, "fields": r.fields }))
            .collect();
        let envelope: Envelope<RecordsData> = self
            .api
            .send(
                HttpMethod::Patch,
                &format!("/fusion/v1/datasheets/{}/records", table_id),
                Vec::new(),
                Some(json!({ "records": body, "fieldKey": "name" })),
            )
            .await?;
        Ok(envelope
            .into_data()?
            .records
            .into_iter()
            .map(Record::from)
            .collect())
    }

    async fn delete_records(
        &self,
        _base_id: &str,
        table_id: &str,
        record_ids: &[String],
    ) -> Result<Vec<DeletedRecord>> {
        let envelope: Envelope<JsonValue> = self
            .api
            .send(
                HttpMethod::Delete,
                &format!("/fusion/v1/datasheets/{}/records", table_id),
                vec![("recordIds".to_string(), record_ids.join(","))],
                None,
            )
            .await?;
        envelope.ensure_success()?;
        // the endpoint reports success for the batch as a whole
        Ok(record_ids
            .iter()
            .map(|id| DeletedRecord {
                id: id.clone(),
                deleted: true,
            })
            .collect())
    }

    async fn create_table(
        &self,
        base_id: &str,
        name: &str,
        fields: &[Field],
        description: Option<&str>,
    ) -> Result<String> {
        let mut body = json!({
            "name": name,
            "fields": fields.iter().map(field_body).collect::<Vec<_>>(),
        });
        if let Some(description) = description {
            body["description"] = json!(description);
        }
        let envelope: Envelope<CreatedData> = self
            .api
            .send(
                HttpMethod::Post,
                &format!("/fusion/v1/spaces/{}/datasheets", base_id),
                Vec::new(),
                Some(body),
            )
            .await?;
        Ok(envelope.into_data()?.id)
    }

    async fn update_table(
        &self,
        _base_id: &str,
        _table_id: &str,
        _update: &MetadataUpdate,
    ) -> Result<String> {
        Err(McpError::Unsupported(
            "datasheets cannot be renamed through the fusion API".to_string(),
        ))
    }

    async fn create_field(&self, base_id: &str, table_id: &str, field: &Field) -> Result<String> {
        let envelope: Envelope<CreatedData> = self
            .api
            .send(
                HttpMethod::Post,
                &format!("/fusion/v1/spaces/{}/datasheets/{}/fields", base_id, table_id),
                Vec::new(),
                Some(field_body(field)),
            )
            .await?;
        Ok(envelope.into_data()?.id)
    }

    async fn update_field(
        &self,
        _base_id: &str,
        _table_id: &str,
        _field_id: &str,
        _update: &MetadataUpdate,
    ) -> Result<String> {
        Err(McpError::Unsupported(
            "fields cannot be updated through the fusion API".to_string(),
        ))
    }
}
