//! Request payload building.
//!
//! The device treats an omitted field differently from one sent as `""`
//! or `null`, so "not provided" is its own state ([`Provided::Absent`])
//! and never reaches the wire.

use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::normalize::table::TableFieldSpec;
use crate::resource::ResourceDescriptor;

/// A field value that may not have been provided at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Provided<T> {
    /// Not provided; omitted from the payload.
    #[default]
    Absent,
    /// Provided, even if empty or null.
    Set(T),
}

impl<T> Provided<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Provided::Set(_))
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Provided::Set(value) => Some(value),
            Provided::Absent => None,
        }
    }
}

impl<T> From<Option<T>> for Provided<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Provided::Set(value),
            None => Provided::Absent,
        }
    }
}

/// Explicit fields plus an optional raw payload, in wire naming.
///
/// # Example
///
/// ```
/// use fortiapi::Fields;
///
/// let fields = Fields::new()
///     .set("name", "web-server")
///     .set("subnet", "10.0.0.10 255.255.255.255")
///     .maybe("comment", None::<String>);
/// assert!(fields.get("comment").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    entries: Vec<(String, Provided<Value>)>,
    raw: Option<Map<String, Value>>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a caller-supplied payload; explicit fields override it.
    pub fn from_raw(raw: Map<String, Value>) -> Self {
        Self {
            entries: Vec::new(),
            raw: Some(raw),
        }
    }

    /// Replace the raw payload.
    pub fn with_raw(mut self, raw: Map<String, Value>) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Provide a field.
    pub fn set(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.provided(name, Provided::Set(value.into()))
    }

    /// Provide a field only when `value` is `Some`.
    pub fn maybe<V: Into<Value>>(self, name: impl Into<String>, value: Option<V>) -> Self {
        self.provided(name, value.map(Into::into).into())
    }

    /// Record a field in either state. A later call for the same name wins.
    pub fn provided(mut self, name: impl Into<String>, value: Provided<Value>) -> Self {
        let name = name.into();
        self.entries.retain(|(existing, _)| *existing != name);
        self.entries.push((name, value));
        self
    }

    /// Explicitly set value for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .and_then(|(_, value)| value.as_set())
    }

    pub fn raw(&self) -> Option<&Map<String, Value>> {
        self.raw.as_ref()
    }

    pub fn explicit(&self) -> &[(String, Provided<Value>)] {
        &self.entries
    }

    /// Build the wire body for `descriptor`, normalizing its sub-table
    /// fields and checking explicit values against its field specs.
    pub fn build(&self, descriptor: &ResourceDescriptor) -> Result<Map<String, Value>, ValidationError> {
        for (name, value) in &self.entries {
            if let (Provided::Set(value), Some(spec)) = (value, descriptor.field(name)) {
                spec.validate(value)?;
            }
        }
        build_payload(&self.entries, self.raw.as_ref(), descriptor.table_fields)
    }
}

/// Merge explicit fields over `raw_override`.
///
/// Absent fields are skipped. Set fields named in `table_fields` are
/// normalized first (an explicit `null` is passed through untouched).
/// Explicit values win over the raw payload for the same key.
pub fn build_payload(
    explicit: &[(String, Provided<Value>)],
    raw_override: Option<&Map<String, Value>>,
    table_fields: &[TableFieldSpec],
) -> Result<Map<String, Value>, ValidationError> {
    let mut payload = raw_override.cloned().unwrap_or_default();

    for (name, value) in explicit {
        let Provided::Set(value) = value else {
            continue;
        };

        let wire_value = match table_fields.iter().find(|spec| spec.name == name.as_str()) {
            Some(spec) if !value.is_null() => Value::Array(
                spec.normalize(value)?
                    .into_iter()
                    .map(Value::Object)
                    .collect(),
            ),
            _ => value.clone(),
        };

        payload.insert(name.clone(), wire_value);
    }

    Ok(payload)
}
