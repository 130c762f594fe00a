//! Normalized data model shared by both dialects.
//!
//! Primary-dialect payloads deserialize straight into these types; the
//! fallback dialect maps its own wire shapes onto them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Access a caller has on a base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    /// Read-only (also covers `none` and `comment`).
    #[serde(alias = "none", alias = "comment")]
    Read,
    /// Can edit records (`edit` upstream).
    #[serde(alias = "edit")]
    Write,
    /// Can create tables and fields.
    Create,
    /// Full control.
    Owner,
}

/// A base (primary dialect) or space (fallback dialect).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Base {
    /// Base id
    pub id: String,
    /// Display name
    pub name: String,
    /// Caller's access level
    pub permission_level: PermissionLevel,
}

/// A column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Server-assigned id; absent on fields that are about to be created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Field name
    pub name: String,
    /// Upstream type name (e.g. `singleLineText`, `SingleText`)
    #[serde(rename = "type")]
    pub field_type: String,
    /// Free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Type-specific options; unknown keys are kept as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, JsonValue>>,
}

/// A saved view of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    /// View id
    pub id: String,
    /// View name
    pub name: String,
    /// View type (grid, gallery, ...)
    #[serde(rename = "type")]
    pub view_type: String,
}

/// A table (primary dialect) or datasheet (fallback dialect).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// Table id
    pub id: String,
    /// Table name
    pub name: String,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Id of the primary field
    #[serde(default)]
    pub primary_field_id: String,
    /// Fields, in upstream order
    #[serde(default)]
    pub fields: Vec<Field>,
    /// Views, in upstream order
    #[serde(default)]
    pub views: Vec<View>,
    /// Folder breadcrumb (`Folder > Sub > Name`) when found by discovery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Table {
    /// Look up a field by id.
    pub fn field(&self, field_id: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.id.as_deref() == Some(field_id))
    }

    /// Point `primary_field_id` at a real field, falling back to the first one.
    ///
    /// Tables without fields are left untouched.
    pub fn ensure_primary_field(&mut self) {
        if self.field(&self.primary_field_id).is_some() {
            return;
        }
        if let Some(first) = self.fields.first().and_then(|f| f.id.clone()) {
            self.primary_field_id = first;
        }
    }
}

/// Every table of a base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseSchema {
    /// Tables, in upstream order
    pub tables: Vec<Table>,
}

impl BaseSchema {
    /// Look up a table by id.
    pub fn table(&self, table_id: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == table_id)
    }
}

/// A row. Values are kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Record id
    pub id: String,
    /// Cell values keyed by field name
    #[serde(default)]
    pub fields: Map<String, JsonValue>,
}

/// Outcome for one id of a batch delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedRecord {
    /// Record id
    pub id: String,
    /// Whether the server reports it gone
    pub deleted: bool,
}

/// A datasheet found by folder discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasheetInfo {
    /// Datasheet id
    pub id: String,
    /// Datasheet name
    pub name: String,
    /// Folder breadcrumb ending in the datasheet name
    pub path: String,
    /// Owning space
    pub space_id: String,
}

/// Options for listing records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListRecordsOptions {
    /// Limit hint passed to the server.
    pub max_records: Option<u32>,
    /// Upstream formula restricting the result.
    pub filter_by_formula: Option<String>,
}

/// Rename or re-describe a table or field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetadataUpdate {
    /// New name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(id: &str, name: &str) -> Field {
        Field {
            id: Some(id.to_string()),
            name: name.to_string(),
            field_type: "singleLineText".to_string(),
            description: None,
            options: None,
        }
    }

    fn table(primary: &str, fields: Vec<Field>) -> Table {
        Table {
            id: "tbl1".to_string(),
            name: "Tasks".to_string(),
            description: None,
            primary_field_id: primary.to_string(),
            fields,
            views: vec![],
            path: None,
        }
    }

    #[test]
    fn test_primary_field_kept_when_present() {
        let mut t = table("fld2", vec![field("fld1", "Name"), field("fld2", "Notes")]);
        t.ensure_primary_field();
        assert_eq!(t.primary_field_id, "fld2");
    }

    #[test]
    fn test_primary_field_falls_back_to_first() {
        let mut t = table("", vec![field("fld1", "Name"), field("fld2", "Notes")]);
        t.ensure_primary_field();
        assert_eq!(t.primary_field_id, "fld1");

        let mut t = table("fldGone", vec![field("fld7", "Title")]);
        t.ensure_primary_field();
        assert_eq!(t.primary_field_id, "fld7");
    }

    #[test]
    fn test_primary_field_untouched_without_fields() {
        let mut t = table("fld1", vec![]);
        t.ensure_primary_field();
        assert_eq!(t.primary_field_id, "fld1");
    }

    #[test]
    fn test_permission_aliases() {
        let bases: Vec<Base> = serde_json::from_value(json!([
            {"id": "app1", "name": "A", "permissionLevel": "edit"},
            {"id": "app2", "name": "B", "permissionLevel": "comment"},
            {"id": "app3", "name": "C", "permissionLevel": "owner"}
        ]))
        .unwrap();
        assert_eq!(bases[0].permission_level, PermissionLevel::Write);
        assert_eq!(bases[1].permission_level, PermissionLevel::Read);
        assert_eq!(bases[2].permission_level, PermissionLevel::Owner);
    }

    #[test]
    fn test_field_options_tolerate_unknown_keys() {
        let f: Field = serde_json::from_value(json!({
            "id": "fld1",
            "name": "Status",
            "type": "singleSelect",
            "options": {"choices": [{"name": "Todo"}], "somethingNew": true}
        }))
        .unwrap();
        let options = f.options.unwrap();
        assert_eq!(options.get("somethingNew"), Some(&json!(true)));
    }

    #[test]
    fn test_table_path_omitted_when_absent() {
        let t = table("fld1", vec![]);
        let value = serde_json::to_value(&t).unwrap();
        assert!(value.get("path").is_none());
        assert!(value.get("description").is_none());
        assert_eq!(value["primaryFieldId"], json!("fld1"));
    }
}
