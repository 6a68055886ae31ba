//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization, plus [`tabled`] row types.

use serde_json::Value;
use tabled::Tabled;

use crate::{mkey_segment, ApiResponse, ResourceDescriptor};

/// Longest summary shown per table row.
const SUMMARY_WIDTH: usize = 72;

/// Trait for human-readable key-value output.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for ApiResponse {
    fn pretty_print(&self) -> String {
        let header = match (&self.http_method, &self.path, &self.name) {
            (Some(method), Some(path), Some(name)) => format!("{method} {path}/{name}"),
            (_, Some(path), Some(name)) => format!("{path}/{name}"),
            _ => "Response".to_string(),
        };
        let divider = "─".repeat(header.chars().count().max(30));

        let mut lines = vec![header, divider, format!("Status:         {}", self.status)];

        if let Some(mkey) = self.mkey.as_ref().and_then(mkey_segment) {
            lines.push(format!("Key:            {mkey}"));
        }

        if let Some(ref vdom) = self.vdom {
            lines.push(format!("VDOM:           {vdom}"));
        }

        if let Some(ref revision) = self.revision {
            lines.push(format!("Revision:       {revision}"));
        }

        if let (Some(serial), Some(version)) = (&self.serial, &self.version) {
            let build = self.build.map(|b| format!(" build {b}")).unwrap_or_default();
            lines.push(format!("Device:         {serial} ({version}{build})"));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for ResourceDescriptor {
    fn pretty_print(&self) -> String {
        let header = format!("Resource: {}", self.path);
        let divider = "─".repeat(header.len().max(30));

        let mut lines = vec![
            header,
            divider,
            format!("API path:       {}", self.api_path()),
            format!("Key:            {}", self.mkey.unwrap_or("(singleton)")),
        ];

        let capabilities: Vec<&str> = self.capabilities.iter().map(|c| c.as_str()).collect();
        if capabilities.is_empty() {
            lines.push("Operations:     read-only".to_string());
        } else {
            lines.push(format!("Operations:     read, {}", capabilities.join(", ")));
        }

        lines.push(format!("Help:           {}", self.help));
        lines.join("\n")
    }
}

/// One row per registered resource.
#[derive(Tabled)]
pub struct ResourceRow {
    pub path: String,
    pub category: String,
    pub key: String,
    pub operations: String,
}

impl From<&ResourceDescriptor> for ResourceRow {
    fn from(d: &ResourceDescriptor) -> Self {
        Self {
            path: d.path.to_string(),
            category: d.category.to_string(),
            key: d.mkey.unwrap_or("-").to_string(),
            operations: if d.capabilities.is_empty() {
                "read-only".to_string()
            } else {
                d.capabilities
                    .iter()
                    .map(|c| c.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            },
        }
    }
}

/// One row per field of a resource.
#[derive(Tabled)]
pub struct FieldRow {
    pub name: String,
    #[tabled(rename = "type")]
    pub kind: String,
    pub required: String,
    pub default: String,
    pub help: String,
}

impl FieldRow {
    /// Rows for every field of `descriptor`.
    pub fn all(descriptor: &ResourceDescriptor) -> Vec<Self> {
        descriptor
            .fields
            .iter()
            .map(|f| Self {
                name: f.name.to_string(),
                kind: f.kind.to_string(),
                required: if f.required { "yes" } else { "" }.to_string(),
                default: f.default.unwrap_or_default().to_string(),
                help: f.help.to_string(),
            })
            .collect()
    }
}

/// One row per returned object: its key and a scalar summary.
#[derive(Tabled)]
pub struct EntryRow {
    pub key: String,
    pub summary: String,
}

impl EntryRow {
    pub fn new(descriptor: &ResourceDescriptor, entry: &Value) -> Self {
        let key = descriptor
            .mkey
            .and_then(|mkey| entry.get(mkey))
            .and_then(mkey_segment)
            .unwrap_or_else(|| "-".to_string());
        Self {
            key,
            summary: summarize(entry, descriptor.mkey),
        }
    }
}

/// `k=v` pairs of the scalar attributes, truncated.
fn summarize(entry: &Value, skip: Option<&str>) -> String {
    let Some(object) = entry.as_object() else {
        return entry.to_string();
    };

    let summary = object
        .iter()
        .filter(|(k, _)| Some(k.as_str()) != skip && !k.starts_with("q_"))
        .filter_map(|(k, v)| match v {
            Value::String(s) if !s.is_empty() => Some(format!("{k}={s}")),
            Value::Number(n) => Some(format!("{k}={n}")),
            Value::Bool(b) => Some(format!("{k}={b}")),
            Value::Array(items) if !items.is_empty() => Some(format!("{k}=[{}]", items.len())),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ");

    if summary.chars().count() > SUMMARY_WIDTH {
        let cut: String = summary.chars().take(SUMMARY_WIDTH - 1).collect();
        format!("{cut}…")
    } else {
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources;
    use serde_json::json;

    #[test]
    fn test_response_pretty_print_format() {
        let response: ApiResponse = serde_json::from_value(json!({
            "http_method": "PUT",
            "path": "firewall",
            "name": "address",
            "mkey": "web",
            "status": "success",
            "vdom": "root",
            "serial": "FGVM01TM00000000",
            "version": "v7.4.3",
            "build": 2573
        }))
        .unwrap();

        let output = response.pretty_print();
        assert!(output.starts_with("PUT firewall/address"));
        assert!(output.contains("Key:            web"));
        assert!(output.contains("v7.4.3 build 2573"));
    }

    #[test]
    fn test_entry_row_summary() {
        let entry = json!({
            "name": "web",
            "q_origin_key": "web",
            "subnet": "10.0.0.1 255.255.255.255",
            "comment": "",
            "macaddr": []
        });
        let row = EntryRow::new(&resources::FIREWALL_ADDRESS, &entry);
        assert_eq!(row.key, "web");
        assert_eq!(row.summary, "subnet=10.0.0.1 255.255.255.255");
    }

    #[test]
    fn test_resource_row_read_only() {
        let row = ResourceRow::from(&resources::MONITOR_SYSTEM_STATUS);
        assert_eq!(row.operations, "read-only");
        assert_eq!(row.key, "-");
    }
}
