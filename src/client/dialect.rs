//! The per-dialect operation interface.
//!
//! [`TableClient`](crate::TableClient) holds one implementation per upstream
//! API shape and tries them in order.

use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};

use crate::client::types::{
    Base, BaseSchema, DeletedRecord, Field, ListRecordsOptions, MetadataUpdate, Record,
};
use crate::error::Result;

/// Operations every upstream dialect provides.
///
/// Mutations of tables and fields only return the id of the affected entity;
/// the caller re-reads the schema to obtain the full object.
#[async_trait]
pub trait Dialect: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// List every base the key can see.
    async fn list_bases(&self) -> Result<Vec<Base>>;

    /// Fetch all tables of a base, with fields and views.
    async fn get_base_schema(&self, base_id: &str) -> Result<BaseSchema>;

    /// List records, following pagination to the end.
    async fn list_records(
        &self,
        base_id: &str,
        table_id: &str,
        options: &ListRecordsOptions,
    ) -> Result<Vec<Record>>;

    /// Fetch one record.
    async fn get_record(&self, base_id: &str, table_id: &str, record_id: &str) -> Result<Record>;

    /// Search `fields` of a table for `term`.
    async fn search_records(
        &self,
        base_id: &str,
        table_id: &str,
        term: &str,
        fields: &[Field],
        max_records: Option<u32>,
    ) -> Result<Vec<Record>>;

    /// Create one record.
    async fn create_record(
        &self,
        base_id: &str,
        table_id: &str,
        fields: &Map<String, JsonValue>,
    ) -> Result<Record>;

    /// Patch several records; returns what the server reports as updated.
    async fn update_records(
        &self,
        base_id: &str,
        table_id: &str,
        records: &[Record],
    ) -> Result<Vec<Record>>;

    /// Delete several records; returns what the server reports.
    async fn delete_records(
        &self,
        base_id: &str,
        table_id: &str,
        record_ids: &[String],
    ) -> Result<Vec<DeletedRecord>>;

    /// Create a table; returns its id.
    async fn create_table(
        &self,
        base_id: &str,
        name: &str,
        fields: &[Field],
        description: Option<&str>,
    ) -> Result<String>;

    /// Rename or re-describe a table; returns its id.
    async fn update_table(
        &self,
        base_id: &str,
        table_id: &str,
        update: &MetadataUpdate,
    ) -> Result<String>;

    /// Add a field to a table; returns its id.
    async fn create_field(&self, base_id: &str, table_id: &str, field: &Field) -> Result<String>;

    /// Rename or re-describe a field; returns its id.
    async fn update_field(
        &self,
        base_id: &str,
        table_id: &str,
        field_id: &str,
        update: &MetadataUpdate,
    ) -> Result<String>;
}
