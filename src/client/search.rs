//! Record search helpers.
//!
//! Field selection is shared by both search strategies; the formula builder
//! serves server-side search and [`matches_term`] serves in-memory filtering.

use serde_json::Value as JsonValue;

use crate::client::types::{Field, Record, Table};
use crate::error::{McpError, Result};

/// Field types whose values can be searched as text, across both dialects.
pub const SEARCHABLE_FIELD_TYPES: &[&str] = &[
    // primary dialect
    "singleLineText",
    "multilineText",
    "richText",
    "email",
    "url",
    "phoneNumber",
    "singleSelect",
    "multipleSelects",
    // fallback dialect
    "SingleText",
    "Text",
    "URL",
    "Email",
    "Phone",
    "SingleSelect",
    "MultiSelect",
];

/// Whether a field holds searchable text.
pub fn is_searchable(field: &Field) -> bool {
    SEARCHABLE_FIELD_TYPES.contains(&field.field_type.as_str())
}

/// Pick the fields a search runs over.
///
/// Explicit `field_ids` must all name text fields of `table`; otherwise every
/// text field is used. An empty result is a validation error.
pub fn resolve_search_fields(table: &Table, field_ids: Option<&[String]>) -> Result<Vec<Field>> {
    let text_fields: Vec<&Field> = table.fields.iter().filter(|f| is_searchable(f)).collect();

    let selected: Vec<Field> = match field_ids {
        Some(ids) if !ids.is_empty() => {
            let invalid: Vec<&str> = ids
                .iter()
                .filter(|id| {
                    !text_fields
                        .iter()
                        .any(|f| f.id.as_deref() == Some(id.as_str()))
                })
                .map(|id| id.as_str())
                .collect();
            if !invalid.is_empty() {
                return Err(McpError::Validation(format!(
                    "fields not searchable in table '{}' (must exist and be text-typed): {}",
                    table.id,
                    invalid.join(", ")
                )));
            }
            ids.iter()
                .filter_map(|id| table.field(id).cloned())
                .collect()
        }
        _ => text_fields.into_iter().cloned().collect(),
    };

    if selected.is_empty() {
        return Err(McpError::Validation(format!(
            "table '{}' has no text fields to search",
            table.id
        )));
    }
    Ok(selected)
}

/// Escape a value for use inside a double-quoted formula string literal.
pub fn escape_formula_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        if c == '\\' || c == '"' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Field reference `{Name}`, with a literal `}` escaped.
pub fn field_reference(name: &str) -> String {
    format!("{{{}}}", name.replace('}', "\\}"))
}

/// Case-insensitive "contains" predicate OR-ed across `fields`.
pub fn build_search_formula(term: &str, fields: &[Field]) -> String {
    let needle = escape_formula_string(term);
    let clauses: Vec<String> = fields
        .iter()
        .map(|f| {
            format!(
                "FIND(LOWER(\"{}\"), LOWER({} & \"\"))",
                needle,
                field_reference(&f.name)
            )
        })
        .collect();
    format!("OR({})", clauses.join(", "))
}

/// In-memory equivalent of [`build_search_formula`].
///
/// Stops at the first field that matches.
pub fn matches_term(record: &Record, term: &str, fields: &[Field]) -> bool {
    let needle = term.to_lowercase();
    fields.iter().any(|f| {
        record
            .fields
            .get(&f.name)
            .filter(|v| !v.is_null())
            .map(|v| stringify(v).to_lowercase().contains(&needle))
            .unwrap_or(false)
    })
}

/// Text form of a cell value.
fn stringify(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(items) => items
            .iter()
            .map(stringify)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
