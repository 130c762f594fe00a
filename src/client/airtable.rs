//! Primary dialect: `/v0/meta/bases` metadata plus `/v0/{base}/{table}` records.
//!
//! Payloads already match the normalized model, so most calls decode
//! straight into it.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value as JsonValue};

use crate::client::dialect::Dialect;
use crate::client::search::build_search_formula;
use crate::client::types::{
    Base, BaseSchema, DeletedRecord, Field, ListRecordsOptions, MetadataUpdate, Record,
};
use crate::error::Result;
use crate::http::{HttpMethod, UpstreamApi};

#[derive(Debug, Deserialize)]
struct BasesPage {
    bases: Vec<Base>,
    #[serde(default)]
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecordsPage {
    records: Vec<Record>,
    #[serde(default)]
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecordList {
    records: Vec<Record>,
}

#[derive(Debug, Deserialize)]
struct DeletedList {
    records: Vec<DeletedRecord>,
}

#[derive(Debug, Deserialize)]
struct Created {
    id: String,
}

/// Airtable-style API.
pub struct AirtableDialect {
    api: UpstreamApi,
}

impl AirtableDialect {
    /// Wrap an authenticated API handle.
    pub fn new(api: UpstreamApi) -> Self {
        Self { api }
    }
}

/// Continue only on a non-empty continuation token.
fn next_offset(offset: Option<String>) -> Option<String> {
    offset.filter(|o| !o.is_empty())
}

#[async_trait]
impl Dialect for AirtableDialect {
    fn name(&self) -> &'static str {
        "airtable"
    }

    async fn list_bases(&self) -> Result<Vec<Base>> {
        let mut bases = Vec::new();
        let mut offset: Option<String> = None;
        loop {
            let query = offset
                .take()
                .map(|o| vec![("offset".to_string(), o)])
                .unwrap_or_default();
            let page: BasesPage = self.api.get("/v0/meta/bases", query).await?;
            bases.extend(page.bases);
            match next_offset(page.offset) {
                Some(next) => offset = Some(next),
                None => break,
            }
        }
        Ok(bases)
    }

    async fn get_base_schema(&self, base_id: &str) -> Result<BaseSchema> {
        let mut schema: BaseSchema = self
            .api
            .get(&format!("/v0/meta/bases/{}/tables", base_id), Vec::new())
            .await?;
        for table in &mut schema.tables {
            table.ensure_primary_field();
        }
        Ok(schema)
    }

    async fn list_records(
        &self,
        base_id: &str,
        table_id: &str,
        options: &ListRecordsOptions,
    ) -> Result<Vec<Record>> {
        let path = format!("/v0/{}/{}", base_id, table_id);
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut query = Vec::new();
            if let Some(max) = options.max_records {
                query.push(("maxRecords".to_string(), max.to_string()));
            }
            if let Some(formula) = &options.filter_by_formula {
                query.push(("filterByFormula".to_string(), formula.clone()));
            }
            if let Some(o) = offset.take() {
                query.push(("offset".to_string(), o));
            }

            let page: RecordsPage = self.api.get(&path, query).await?;
            records.extend(page.records);
            match next_offset(page.offset) {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(records)
    }

    async fn get_record(&self, base_id: &str, table_id: &str, record_id: &str) -> Result<Record> {
        self.api
            .get(&format!("/v0/{}/{}/{}", base_id, table_id, record_id), Vec::new())
            .await
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
            filter_by_formula: Some(build_search_formula(term, fields)),
        };
        self.list_records(base_id, table_id, &options).await
    }

    async fn create_record(
        &self,
        base_id: &str,
        table_id: &str,
        fields: &Map<String, JsonValue>,
    ) -> Result<Record> {
        self.api
            .send(
                HttpMethod::Post,
                &format!("/v0/{}/{}", base_id, table_id),
                Vec::new(),
                Some(json!({ "fields": fields })),
            )
            .await
    }

    async fn update_records(
        &self,
        base_id: &str,
        table_id: &str,
        records: &[Record],
    ) -> Result<Vec<Record>> {
        let list: RecordList = self
            .api
            .send(
                HttpMethod::Patch,
                &format!("/v0/{}/{}", base_id, table_id),
                Vec::new(),
                Some(json!({ "records": records })),
            )
            .await?;
        Ok(list.records)
    }

    async fn delete_records(
        &self,
        base_id: &str,
        table_id: &str,
        record_ids: &[String],
    ) -> Result<Vec<DeletedRecord>> {
        let query = record_ids
            .iter()
            .map(|id| ("records[]".to_string(), id.clone()))
            .collect();
        let list: DeletedList = self
            .api
            .send(
                HttpMethod::Delete,
                &format!("/v0/{}/{}", base_id, table_id),
                query,
                None,
            )
            .await?;
        Ok(list.records)
    }

    async fn create_table(
        &self,
        base_id: &str,
        name: &str,
        fields: &[Field],
        description: Option<&str>,
    ) -> Result<String> {
        let mut body = json!({ "name": name, "fields": fields });
        if let Some(description) = description {
            body["description"] = json!(description);
        }
        let created: Created = self
            .api
            .send(
                HttpMethod::Post,
                &format!("/v0/meta/bases/{}/tables", base_id),
                Vec::new(),
                Some(body),
            )
            .await?;
        Ok(created.id)
    }

    async fn update_table(
        &self,
        base_id: &str,
        table_id: &str,
        update: &MetadataUpdate,
    ) -> Result<String> {
        let updated: Created = self
            .api
            .send(
                HttpMethod::Patch,
                &format!("/v0/meta/bases/{}/tables/{}", base_id, table_id),
                Vec::new(),
                Some(serde_json::to_value(update)?),
            )
            .await?;
        Ok(updated.id)
    }

    async fn create_field(&self, base_id: &str, table_id: &str, field: &Field) -> Result<String> {
        let created: Created = self
            .api
            .send(
                HttpMethod::Post,
                &format!("/v0/meta/bases/{}/tables/{}/fields", base_id, table_id),
                Vec::new(),
                Some(serde_json::to_value(field)?),
            )
            .await?;
        Ok(created.id)
    }

    async fn update_field(
        &self,
        base_id: &str,
        table_id: &str,
        field_id: &str,
        update: &MetadataUpdate,
    ) -> Result<String> {
        let updated: Created = self
            .api
            .send(
                HttpMethod::Patch,
                &format!(
                    "/v0/meta/bases/{}/tables/{}/fields/{}",
                    base_id, table_id, field_id
                ),
                Vec::new(),
                Some(serde_json::to_value(update)?),
            )
            .await?;
        Ok(updated.id)
    }
}
