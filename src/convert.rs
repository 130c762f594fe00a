//! Argument decoding and result conversion for tool handlers.
//!
//! Tool arguments arrive as a JSON object and are decoded into typed structs;
//! serde's message (which names the offending field) becomes the validation
//! error text.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::error::{McpError, Result};

/// Decode a tool's argument object into `T`.
pub fn parse_args<T: DeserializeOwned>(args: Map<String, JsonValue>) -> Result<T> {
    serde_json::from_value(JsonValue::Object(args))
        .map_err(|e| McpError::Validation(format!("invalid arguments: {}", e)))
}

/// Reject an empty (or whitespace-only) identifier.
pub fn require_non_empty(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(McpError::invalid_arg(name, "must not be empty"));
    }
    Ok(())
}

/// Reject a zero record limit.
pub fn require_positive(name: &str, value: Option<u32>) -> Result<()> {
    match value {
        Some(0) => Err(McpError::invalid_arg(name, "must be at least 1")),
        _ => Ok(()),
    }
}

/// Reject an empty list.
pub fn require_items<T>(name: &str, items: &[T]) -> Result<()> {
    if items.is_empty() {
        return Err(McpError::invalid_arg(name, "must contain at least one item"));
    }
    Ok(())
}

/// Serialize a handler result.
pub fn to_json<T: Serialize>(value: &T) -> Result<JsonValue> {
    serde_json::to_value(value).map_err(|e| McpError::Internal(format!("serialize result: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase", deny_unknown_fields)]
    struct Args {
        base_id: String,
        max_records: Option<u32>,
    }

    fn obj(value: JsonValue) -> Map<String, JsonValue> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parse_args_ok() {
        let args: Args = parse_args(obj(json!({"baseId": "app1", "maxRecords": 5}))).unwrap();
        assert_eq!(args.base_id, "app1");
        assert_eq!(args.max_records, Some(5));
    }

    #[test]
    fn test_parse_args_names_missing_field() {
        let err = parse_args::<Args>(obj(json!({"maxRecords": 5}))).unwrap_err();
        assert!(matches!(err, McpError::Validation(_)));
        assert!(err.to_string().contains("baseId"));
    }

    #[test]
    fn test_parse_args_rejects_wrong_type_and_unknown_keys() {
        let err = parse_args::<Args>(obj(json!({"baseId": "app1", "maxRecords": "ten"}))).unwrap_err();
        assert!(err.to_string().contains("invalid type"));

        let err = parse_args::<Args>(obj(json!({"baseId": "app1", "bogus": 1}))).unwrap_err();
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn test_requirements() {
        assert!(require_non_empty("baseId", "app1").is_ok());
        assert!(require_non_empty("baseId", "  ").is_err());
        assert!(require_positive("maxRecords", None).is_ok());
        assert!(require_positive("maxRecords", Some(0)).is_err());
        assert!(require_items::<u8>("recordIds", &[]).is_err());
    }
}
