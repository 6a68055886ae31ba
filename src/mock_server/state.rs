//! Mock server state management.
//!
//! An in-memory CMDB: ordered tables keyed by resource path, singleton
//! objects, and the device identity reported in every envelope.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::{mkey_segment, FilterExpr, FilterOp, ResourceDescriptor};

/// Why a write was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// No table or no entry with that key.
    NotFound,
    /// An entry with that key already exists.
    Duplicate,
    /// The payload or query is unusable.
    Invalid(String),
}

/// Shared state for the mock server.
///
/// Wrapped in `Arc<RwLock<_>>` for concurrent access.
#[derive(Debug)]
pub struct MockState {
    /// Ordered tables indexed by resource path (`firewall/address`).
    pub tables: HashMap<String, Vec<Map<String, Value>>>,

    /// Singleton objects indexed by resource path (`system/dns`).
    pub singletons: HashMap<String, Map<String, Value>>,

    /// Optional authentication token. If set, requests must carry it as a bearer token.
    pub required_token: Option<String>,

    pub serial: String,
    pub version: String,
    pub build: u64,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            tables: HashMap::new(),
            singletons: HashMap::new(),
            required_token: None,
            serial: "FGVM01TM00000000".to_string(),
            version: "v7.4.3".to_string(),
            build: 2573,
        }
    }
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Add an entry to the end of a table.
    pub fn with_entry(mut self, path: &str, entry: Value) -> Self {
        if let Value::Object(entry) = entry {
            self.tables.entry(path.to_string()).or_default().push(entry);
        }
        self
    }

    /// Create an empty table, so that listing it succeeds.
    pub fn with_table(mut self, path: &str) -> Self {
        self.tables.entry(path.to_string()).or_default();
        self
    }

    /// Set a singleton object.
    pub fn with_singleton(mut self, path: &str, object: Value) -> Self {
        if let Value::Object(object) = object {
            self.singletons.insert(path.to_string(), object);
        }
        self
    }

    /// Set the required authentication token.
    pub fn with_required_token(mut self, token: &str) -> Self {
        self.required_token = Some(token.to_string());
        self
    }

    /// Keys of a table in order.
    pub fn keys(&self, descriptor: &ResourceDescriptor) -> Vec<Value> {
        let Some(mkey) = descriptor.mkey else {
            return Vec::new();
        };
        self.tables
            .get(descriptor.path)
            .map(|entries| entries.iter().filter_map(|e| e.get(mkey).cloned()).collect())
            .unwrap_or_default()
    }

    /// Get an entry by key.
    pub fn get_entry(&self, descriptor: &ResourceDescriptor, key: &str) -> Option<&Map<String, Value>> {
        let index = self.position(descriptor, key)?;
        self.tables.get(descriptor.path)?.get(index)
    }

    /// Entries of a table that pass every filter group.
    pub fn list(
        &self,
        descriptor: &ResourceDescriptor,
        filters: &[String],
    ) -> Result<Vec<&Map<String, Value>>, StateError> {
        let groups = filters
            .iter()
            .map(|group| {
                group
                    .split(',')
                    .map(|expr| {
                        expr.parse::<FilterExpr>()
                            .map_err(|e| StateError::Invalid(e.to_string()))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let entries = self
            .tables
            .get(descriptor.path)
            .ok_or(StateError::NotFound)?;

        Ok(entries
            .iter()
            .filter(|entry| {
                groups
                    .iter()
                    .all(|group| group.iter().any(|expr| matches_filter(expr, entry)))
            })
            .collect())
    }

    /// Append a new entry. Integer-keyed tables assign the next free key
    /// when the payload's key is missing or `0`.
    pub fn create(
        &mut self,
        descriptor: &ResourceDescriptor,
        mut entry: Map<String, Value>,
    ) -> Result<Value, StateError> {
        let mkey = descriptor
            .mkey
            .ok_or_else(|| StateError::Invalid("singleton objects cannot be created".into()))?;

        let assign = match entry.get(mkey) {
            None => true,
            Some(Value::Number(n)) => n.as_i64() == Some(0),
            Some(_) => false,
        };
        if assign && descriptor.mkey_kind == crate::MkeyKind::Integer {
            let next = self
                .keys(descriptor)
                .iter()
                .filter_map(Value::as_i64)
                .max()
                .unwrap_or(0)
                + 1;
            entry.insert(mkey.to_string(), Value::from(next));
        }

        let key = entry
            .get(mkey)
            .and_then(mkey_segment)
            .ok_or_else(|| StateError::Invalid(format!("missing '{mkey}'")))?;
        if self.position(descriptor, &key).is_some() {
            return Err(StateError::Duplicate);
        }

        let value = entry.get(mkey).cloned().unwrap_or(Value::Null);
        self.tables
            .entry(descriptor.path.to_string())
            .or_default()
            .push(entry);
        Ok(value)
    }

    /// Merge `changes` into an existing entry.
    pub fn update(
        &mut self,
        descriptor: &ResourceDescriptor,
        key: &str,
        changes: Map<String, Value>,
    ) -> Result<(), StateError> {
        let index = self.position(descriptor, key).ok_or(StateError::NotFound)?;
        let entry = self
            .tables
            .get_mut(descriptor.path)
            .and_then(|entries| entries.get_mut(index))
            .ok_or(StateError::NotFound)?;
        entry.extend(changes);
        Ok(())
    }

    /// Merge `changes` into a singleton, creating it if needed.
    pub fn update_singleton(&mut self, descriptor: &ResourceDescriptor, changes: Map<String, Value>) {
        self.singletons
            .entry(descriptor.path.to_string())
            .or_default()
            .extend(changes);
    }

    pub fn delete(&mut self, descriptor: &ResourceDescriptor, key: &str) -> Result<(), StateError> {
        let index = self.position(descriptor, key).ok_or(StateError::NotFound)?;
        if let Some(entries) = self.tables.get_mut(descriptor.path) {
            entries.remove(index);
        }
        Ok(())
    }

    /// Move `key` directly before or after `reference`.
    pub fn move_entry(
        &mut self,
        descriptor: &ResourceDescriptor,
        key: &str,
        reference: &str,
        after: bool,
    ) -> Result<(), StateError> {
        let from = self.position(descriptor, key).ok_or(StateError::NotFound)?;
        if self.position(descriptor, reference).is_none() {
            return Err(StateError::Invalid(format!("reference '{reference}' not found")));
        }
        let entries = self
            .tables
            .get_mut(descriptor.path)
            .ok_or(StateError::NotFound)?;

        let entry = entries.remove(from);
        let Some(anchor) = position_in(entries, descriptor, reference) else {
            // Moving relative to itself is a no-op.
            entries.insert(from, entry);
            return Ok(());
        };
        let to = if after { anchor + 1 } else { anchor };
        entries.insert(to, entry);
        Ok(())
    }

    /// Copy `key` under `new_key`, directly after the original.
    pub fn clone_entry(
        &mut self,
        descriptor: &ResourceDescriptor,
        key: &str,
        new_key: &str,
    ) -> Result<(), StateError> {
        let mkey = descriptor.mkey.ok_or(StateError::NotFound)?;
        let from = self.position(descriptor, key).ok_or(StateError::NotFound)?;
        if self.position(descriptor, new_key).is_some() {
            return Err(StateError::Duplicate);
        }

        let entries = self
            .tables
            .get_mut(descriptor.path)
            .ok_or(StateError::NotFound)?;
        let mut copy = entries[from].clone();
        copy.insert(mkey.to_string(), descriptor.parse_mkey(new_key));
        entries.insert(from + 1, copy);
        Ok(())
    }

    fn position(&self, descriptor: &ResourceDescriptor, key: &str) -> Option<usize> {
        position_in(self.tables.get(descriptor.path)?, descriptor, key)
    }
}

fn position_in(entries: &[Map<String, Value>], descriptor: &ResourceDescriptor, key: &str) -> Option<usize> {
    let mkey = descriptor.mkey?;
    entries
        .iter()
        .position(|e| e.get(mkey).and_then(mkey_segment).as_deref() == Some(key))
}

/// Evaluate one predicate the way FortiOS does for scalar attributes.
/// Sub-table attributes match when any entry's values match.
fn matches_filter(expr: &FilterExpr, entry: &Map<String, Value>) -> bool {
    let Some(value) = entry.get(&expr.field) else {
        return matches!(expr.op, FilterOp::Ne | FilterOp::NotContains);
    };

    let candidates: Vec<String> = match value {
        Value::Array(items) => items
            .iter()
            .flat_map(|item| match item {
                Value::Object(obj) => obj.values().filter_map(scalar).collect::<Vec<_>>(),
                other => scalar(other).into_iter().collect(),
            })
            .collect(),
        other => scalar(other).into_iter().collect(),
    };

    match expr.op {
        FilterOp::Ne => !candidates.iter().any(|c| compare(c, FilterOp::Eq, &expr.value)),
        FilterOp::NotContains => !candidates
            .iter()
            .any(|c| compare(c, FilterOp::Contains, &expr.value)),
        _ => candidates.iter().any(|c| compare(c, expr.op, &expr.value)),
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn compare(candidate: &str, op: FilterOp, wanted: &str) -> bool {
    let ordering = match (candidate.parse::<f64>(), wanted.parse::<f64>()) {
        (Ok(a), Ok(b)) => a.partial_cmp(&b),
        _ => Some(candidate.cmp(wanted)),
    };
    match op {
        FilterOp::Eq => candidate == wanted,
        FilterOp::Contains => candidate.contains(wanted),
        FilterOp::Lt => ordering == Some(Ordering::Less),
        FilterOp::Le => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        FilterOp::Gt => ordering == Some(Ordering::Greater),
        FilterOp::Ge => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        FilterOp::Ne => candidate != wanted,
        FilterOp::NotContains => !candidate.contains(wanted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{FIREWALL_ADDRESS, FIREWALL_POLICY};
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn policies() -> MockState {
        MockState::new()
            .with_entry("firewall/policy", json!({"policyid": 1, "name": "a"}))
            .with_entry("firewall/policy", json!({"policyid": 2, "name": "b"}))
            .with_entry("firewall/policy", json!({"policyid": 3, "name": "c"}))
    }

    #[test]
    fn test_create_assigns_integer_keys() {
        let mut state = policies();
        let key = state
            .create(&FIREWALL_POLICY, object(json!({"policyid": 0, "name": "d"})))
            .unwrap();
        assert_eq!(key, json!(4));

        let err = state
            .create(&FIREWALL_POLICY, object(json!({"policyid": 2})))
            .unwrap_err();
        assert_eq!(err, StateError::Duplicate);
    }

    #[test]
    fn test_move_before_and_after() {
        let mut state = policies();
        state.move_entry(&FIREWALL_POLICY, "3", "1", false).unwrap();
        assert_eq!(state.keys(&FIREWALL_POLICY), vec![json!(3), json!(1), json!(2)]);

        state.move_entry(&FIREWALL_POLICY, "3", "2", true).unwrap();
        assert_eq!(state.keys(&FIREWALL_POLICY), vec![json!(1), json!(2), json!(3)]);

        assert!(matches!(
            state.move_entry(&FIREWALL_POLICY, "1", "9", true),
            Err(StateError::Invalid(_))
        ));
    }

    #[test]
    fn test_clone_inserts_after_original() {
        let mut state = policies();
        state.clone_entry(&FIREWALL_POLICY, "1", "10").unwrap();
        assert_eq!(
            state.keys(&FIREWALL_POLICY),
            vec![json!(1), json!(10), json!(2), json!(3)]
        );
        assert_eq!(state.get_entry(&FIREWALL_POLICY, "10").unwrap()["name"], "a");
    }

    #[test]
    fn test_filters_and_or_groups() {
        let state = MockState::new()
            .with_entry("firewall/address", json!({"name": "web", "type": "ipmask"}))
            .with_entry("firewall/address", json!({"name": "corp", "type": "fqdn"}))
            .with_entry("firewall/address", json!({"name": "db", "type": "ipmask"}));

        let hits = state
            .list(&FIREWALL_ADDRESS, &["type==ipmask".to_string(), "name!=db".to_string()])
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["name"], "web");

        let hits = state
            .list(&FIREWALL_ADDRESS, &["name==db,name=@or".to_string()])
            .unwrap();
        assert_eq!(hits.len(), 2);

        assert!(state.list(&FIREWALL_ADDRESS, &["nonsense".to_string()]).is_err());
    }

    #[test]
    fn test_table_attribute_filter() {
        let state = MockState::new().with_entry(
            "firewall/policy",
            json!({"policyid": 1, "srcaddr": [{"name": "web"}, {"name": "db"}]}),
        );
        assert_eq!(
            state
                .list(&FIREWALL_POLICY, &["srcaddr==db".to_string()])
                .unwrap()
                .len(),
            1
        );
    }
}
