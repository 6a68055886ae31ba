//! Sub-table field normalization.
//!
//! FortiOS expects one-to-many fields (a policy's `srcaddr`, an address
//! group's `member`) as an array of objects keyed by the table's primary
//! key. Callers may pass a bare name, a list of names, or the full array.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// Static metadata for one sub-table field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableFieldSpec {
    /// Wire name of the field (`srcaddr`).
    pub name: &'static str,
    /// Primary-key attribute of each entry (`name`, `seq-num`, `id`).
    pub mkey: &'static str,
    /// Attributes every object entry must carry.
    pub required: &'static [&'static str],
    /// Canonical example, shown in help output.
    pub example: &'static str,
}

impl TableFieldSpec {
    /// Normalize `value` against this spec.
    pub fn normalize(&self, value: &Value) -> Result<Vec<Map<String, Value>>, ValidationError> {
        normalize_table_field(value, self.mkey, self.required, self.name)
    }
}

/// Coerce `value` into `[{mkey: ..}, ..]`.
///
/// - a string or number becomes a single entry
/// - a list of strings or numbers becomes one entry per element
/// - object entries pass through once they carry `mkey` and every
///   attribute in `required`
///
/// Anything else is rejected with [`ValidationError::InvalidTableValue`].
///
/// # Example
///
/// ```
/// use fortiapi::normalize_table_field;
/// use serde_json::json;
///
/// let entries = normalize_table_field(&json!(["web", "db"]), "name", &["name"], "member").unwrap();
/// assert_eq!(entries.len(), 2);
/// assert_eq!(entries[1]["name"], "db");
/// ```
pub fn normalize_table_field(
    value: &Value,
    mkey: &str,
    required: &[&str],
    field_name: &str,
) -> Result<Vec<Map<String, Value>>, ValidationError> {
    match value {
        Value::String(_) | Value::Number(_) => Ok(vec![keyed(mkey, value.clone())]),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| normalize_entry(item, index, mkey, required, field_name))
            .collect(),
        other => Err(ValidationError::InvalidTableValue {
            field: field_name.to_string(),
            reason: format!(
                "expected a string, a list of strings, or a list of objects, got {}",
                kind_of(other)
            ),
        }),
    }
}

fn normalize_entry(
    item: &Value,
    index: usize,
    mkey: &str,
    required: &[&str],
    field_name: &str,
) -> Result<Map<String, Value>, ValidationError> {
    match item {
        Value::String(_) | Value::Number(_) => Ok(keyed(mkey, item.clone())),
        Value::Object(entry) => {
            let missing = std::iter::once(mkey)
                .chain(required.iter().copied())
                .find(|key| !entry.contains_key(*key));
            match missing {
                Some(key) => Err(ValidationError::MissingRequiredKey {
                    field: field_name.to_string(),
                    index,
                    key: key.to_string(),
                }),
                None => Ok(entry.clone()),
            }
        }
        other => Err(ValidationError::InvalidTableValue {
            field: field_name.to_string(),
            reason: format!("entry {index} is {}", kind_of(other)),
        }),
    }
}

fn keyed(mkey: &str, value: Value) -> Map<String, Value> {
    let mut entry = Map::new();
    entry.insert(mkey.to_string(), value);
    entry
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_value(entries: Vec<Map<String, Value>>) -> Value {
        Value::Array(entries.into_iter().map(Value::Object).collect())
    }

    #[test]
    fn test_scalar_string_becomes_single_entry() {
        for name in ["all", "web-server", "10.0.0.0/24", ""] {
            let entries = normalize_table_field(&json!(name), "name", &["name"], "srcaddr").unwrap();
            assert_eq!(as_value(entries), json!([{ "name": name }]));
        }
    }

    #[test]
    fn test_list_of_strings_maps_in_order() {
        let entries =
            normalize_table_field(&json!(["a", "b"]), "name", &["name"], "member").unwrap();
        assert_eq!(as_value(entries), json!([{"name": "a"}, {"name": "b"}]));
    }

    #[test]
    fn test_numeric_keys() {
        let entries = normalize_table_field(&json!([1, 2]), "id", &["id"], "hosts").unwrap();
        assert_eq!(as_value(entries), json!([{"id": 1}, {"id": 2}]));

        let entries = normalize_table_field(&json!(10), "seq-num", &[], "rule").unwrap();
        assert_eq!(as_value(entries), json!([{"seq-num": 10}]));
    }

    #[test]
    fn test_objects_pass_through() {
        let value = json!([
            {"port-name": "port1", "vlan": "default"},
            {"port-name": "port2"}
        ]);
        let entries = normalize_table_field(&value, "port-name", &["port-name"], "ports").unwrap();
        assert_eq!(as_value(entries), value);
    }

    #[test]
    fn test_missing_required_key() {
        let err = normalize_table_field(&json!([{"other": "x"}]), "name", &["name"], "srcaddr")
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingRequiredKey {
                field: "srcaddr".to_string(),
                index: 0,
                key: "name".to_string(),
            }
        );
    }

    #[test]
    fn test_secondary_required_key_reported_with_index() {
        let value = json!([
            {"id": 1, "ip": "10.0.0.1"},
            {"id": 2}
        ]);
        let err = normalize_table_field(&value, "id", &["id", "ip"], "hosts").unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingRequiredKey {
                field: "hosts".to_string(),
                index: 1,
                key: "ip".to_string(),
            }
        );
    }

    #[test]
    fn test_mixed_list_normalizes_elementwise() {
        let entries = normalize_table_field(
            &json!(["a", {"name": "b", "comment": "x"}]),
            "name",
            &["name"],
            "member",
        )
        .unwrap();
        assert_eq!(
            as_value(entries),
            json!([{"name": "a"}, {"name": "b", "comment": "x"}])
        );
    }

    #[test]
    fn test_empty_list_is_valid() {
        let entries = normalize_table_field(&json!([]), "name", &["name"], "member").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_rejects_unusable_shapes() {
        assert!(matches!(
            normalize_table_field(&json!(true), "name", &["name"], "member"),
            Err(ValidationError::InvalidTableValue { .. })
        ));
        assert!(matches!(
            normalize_table_field(&json!([["nested"]]), "name", &["name"], "member"),
            Err(ValidationError::InvalidTableValue { .. })
        ));
    }
}
