//! Remote table service adapter.
//!
//! [`TableClient`] talks to either an Airtable-style or an AITable-style API
//! with the same key. Every call is tried against the primary dialect first;
//! the fallback dialect is consulted only when that attempt fails, and if it
//! fails too the primary error is reported with the fallback outcome attached.

pub mod airtable;
pub mod aitable;
pub mod dialect;
pub mod search;
pub mod types;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{McpError, Result};
use crate::http::{HttpTransport, ReqwestTransport, UpstreamApi};

use self::airtable::AirtableDialect;
use self::aitable::AitableDialect;
use self::dialect::Dialect;
use self::types::{
    Base, BaseSchema, DatasheetInfo, DeletedRecord, Field, ListRecordsOptions, MetadataUpdate,
    Record, Table,
};

type DialectFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Stateless adapter over the upstream table API.
///
/// Holds no data between calls; every read goes to the server.
pub struct TableClient {
    primary: AirtableDialect,
    fallback: AitableDialect,
}

impl TableClient {
    /// Create a client that talks HTTP through reqwest.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.request_timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over an arbitrary transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let api = UpstreamApi::new(transport, &config);
        Self {
            primary: AirtableDialect::new(api.clone()),
            fallback: AitableDialect::new(api),
        }
    }

    /// Run `call` on the primary dialect, then on the fallback if it failed.
    async fn attempt<'a, T>(
        &'a self,
        operation: &'static str,
        call: impl Fn(&'a dyn Dialect) -> DialectFuture<'a, T>,
    ) -> Result<T> {
        let primary_err = match call(&self.primary).await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        debug!(
            operation,
            dialect = self.primary.name(),
            error = %primary_err,
            "primary dialect failed, trying fallback"
        );

        match call(&self.fallback).await {
            Ok(value) => {
                warn!(
                    operation,
                    dialect = self.fallback.name(),
                    "served by fallback dialect"
                );
                Ok(value)
            }
            Err(fallback_err) => Err(McpError::Fallback {
                primary: Box::new(primary_err),
                fallback: Box::new(fallback_err),
            }),
        }
    }

    /// List every base (or space) the key can access.
    pub async fn list_bases(&self) -> Result<Vec<Base>> {
        self.attempt("list_bases", |d| d.list_bases()).await
    }

    /// Fetch every table of a base with fields and views.
    pub async fn get_base_schema(&self, base_id: &str) -> Result<BaseSchema> {
        self.attempt("get_base_schema", |d| d.get_base_schema(base_id))
            .await
    }

    /// Fetch one table's schema.
    pub async fn describe_table(&self, base_id: &str, table_id: &str) -> Result<Table> {
        let schema = self.get_base_schema(base_id).await?;
        schema
            .tables
            .into_iter()
            .find(|t| t.id == table_id)
            .ok_or_else(|| {
                McpError::NotFound(format!("table '{}' in base '{}'", table_id, base_id))
            })
    }

    /// Discover every datasheet of a space, following folders.
    ///
    /// Only the fallback dialect has folders. Unreachable nodes are skipped,
    /// so this always returns whatever could be found.
    pub async fn get_all_datasheets(&self, space_id: &str) -> Vec<DatasheetInfo> {
        self.fallback.get_all_datasheets(space_id).await
    }

    /// List the records of the first datasheet named exactly `name`.
    pub async fn get_datasheet_records_by_name(
        &self,
        space_id: &str,
        name: &str,
        options: &ListRecordsOptions,
    ) -> Result<Vec<Record>> {
        let datasheets = self.get_all_datasheets(space_id).await;
        let datasheet = datasheets
            .into_iter()
            .find(|d| d.name == name)
            .ok_or_else(|| {
                McpError::NotFound(format!(
                    "datasheet named '{}' in space '{}'",
                    name, space_id
                ))
            })?;
        self.list_records(space_id, &datasheet.id, options).await
    }

    /// List all records of a table, across every page.
    pub async fn list_records(
        &self,
        base_id: &str,
        table_id: &str,
        options: &ListRecordsOptions,
    ) -> Result<Vec<Record>> {
        self.attempt("list_records", |d| {
            d.list_records(base_id, table_id, options)
        })
        .await
    }

    /// Fetch one record by id.
    pub async fn get_record(
        &self,
        base_id: &str,
        table_id: &str,
        record_id: &str,
    ) -> Result<Record> {
        self.attempt("get_record", |d| d.get_record(base_id, table_id, record_id))
            .await
    }

    /// Find records whose text fields contain `term`.
    ///
    /// `field_ids`, when given, must name text fields of the table; nothing is
    /// searched if they don't.
    pub async fn search_records(
        &self,
        base_id: &str,
        table_id: &str,
        term: &str,
        field_ids: Option<&[String]>,
        max_records: Option<u32>,
    ) -> Result<Vec<Record>> {
        let table = self.describe_table(base_id, table_id).await?;
        let fields = search::resolve_search_fields(&table, field_ids)?;
        let fields = fields.as_slice();

        self.attempt("search_records", |d| {
            d.search_records(base_id, table_id, term, fields, max_records)
        })
        .await
    }

    /// Create one record.
    pub async fn create_record(
        &self,
        base_id: &str,
        table_id: &str,
        fields: &Map<String, JsonValue>,
    ) -> Result<Record> {
        self.attempt("create_record", |d| {
            d.create_record(base_id, table_id, fields)
        })
        .await
    }

    /// Patch several records. Not atomic: the result holds what the server
    /// reports as updated.
    pub async fn update_records(
        &self,
        base_id: &str,
        table_id: &str,
        records: &[Record],
    ) -> Result<Vec<Record>> {
        self.attempt("update_records", |d| {
            d.update_records(base_id, table_id, records)
        })
        .await
    }

    /// Delete several records. Not atomic: the result holds what the server
    /// reports.
    pub async fn delete_records(
        &self,
        base_id: &str,
        table_id: &str,
        record_ids: &[String],
    ) -> Result<Vec<DeletedRecord>> {
        self.attempt("delete_records", |d| {
            d.delete_records(base_id, table_id, record_ids)
        })
        .await
    }

    /// Create a table and return it as the server now describes it.
    pub async fn create_table(
        &self,
        base_id: &str,
        name: &str,
        fields: &[Field],
        description: Option<&str>,
    ) -> Result<Table> {
        let table_id = self
            .attempt("create_table", |d| {
                d.create_table(base_id, name, fields, description)
            })
            .await?;
        self.refetch_table(base_id, &table_id).await
    }

    /// Rename or re-describe a table and return its refreshed schema.
    pub async fn update_table(
        &self,
        base_id: &str,
        table_id: &str,
        update: &MetadataUpdate,
    ) -> Result<Table> {
        let table_id = self
            .attempt("update_table", |d| d.update_table(base_id, table_id, update))
            .await?;
        self.refetch_table(base_id, &table_id).await
    }

    /// Add a field and return it as the server now describes it.
    pub async fn create_field(
        &self,
        base_id: &str,
        table_id: &str,
        field: &Field,
    ) -> Result<Field> {
        let field_id = self
            .attempt("create_field", |d| d.create_field(base_id, table_id, field))
            .await?;
        self.refetch_field(base_id, table_id, &field_id).await
    }

    /// Rename or re-describe a field and return its refreshed definition.
    pub async fn update_field(
        &self,
        base_id: &str,
        table_id: &str,
        field_id: &str,
        update: &MetadataUpdate,
    ) -> Result<Field> {
        let field_id = self
            .attempt("update_field", |d| {
                d.update_field(base_id, table_id, field_id, update)
            })
            .await?;
        self.refetch_field(base_id, table_id, &field_id).await
    }

    async fn refetch_table(&self, base_id: &str, table_id: &str) -> Result<Table> {
        let schema = self.get_base_schema(base_id).await?;
        schema
            .tables
            .into_iter()
            .find(|t| t.id == table_id)
            .ok_or_else(|| {
                McpError::Internal(format!(
                    "table '{}' missing from base '{}' after mutation",
                    table_id, base_id
                ))
            })
    }

    async fn refetch_field(&self, base_id: &str, table_id: &str, field_id: &str) -> Result<Field> {
        let table = self.refetch_table(base_id, table_id).await?;
        table.field(field_id).cloned().ok_or_else(|| {
            McpError::Internal(format!(
                "field '{}' missing from table '{}' after mutation",
                field_id, table_id
            ))
        })
    }
}
