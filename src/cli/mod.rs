//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the fortiapi binary.

use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value};

use crate::{FieldKind, Fields, GetQuery, MovePosition, ResourceDescriptor, Scope};

/// FortiOS API command-line interface.
#[derive(Parser, Debug)]
#[command(name = "fortiapi", about = "FortiOS REST API CLI", version)]
pub struct Cli {
    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Target a specific VDOM.
    #[arg(long, global = true, conflicts_with = "global")]
    pub vdom: Option<String>,

    /// Target the global configuration scope.
    #[arg(long, global = true)]
    pub global: bool,

    /// Log filter, e.g. `fortiapi=debug`.
    #[arg(long, global = true, env = "FORTIOS_LOG", default_value = "warn")]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Scope selected by `--vdom` / `--global`.
    pub fn scope(&self) -> Scope {
        match (&self.vdom, self.global) {
            (_, true) => Scope::Global,
            (Some(vdom), false) => Scope::vdom(vdom.clone()),
            (None, false) => Scope::Default,
        }
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the resource types this client knows about.
    Resources,

    /// Show field metadata for a resource.
    Fields {
        /// Resource path, e.g. `firewall/address`.
        resource: String,
    },

    /// Get a collection, or one object by key.
    Get {
        /// Resource path, e.g. `firewall/address`.
        resource: String,

        /// Object key.
        mkey: Option<String>,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Check whether an object exists.
    Exists {
        resource: String,
        mkey: String,
    },

    /// Create or update an object, depending on whether it exists.
    Set {
        resource: String,

        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Delete an object.
    Delete {
        resource: String,
        mkey: String,
    },

    /// Move an object within an ordered table.
    Move {
        resource: String,

        /// Key of the object to move.
        mkey: String,

        /// `top`, `bottom`, `before`, `after`, or a 1-based slot.
        position: MovePosition,

        /// Reference key for `before` / `after`.
        #[arg(long)]
        reference: Option<String>,
    },

    /// Copy an object under a new key.
    Clone {
        resource: String,
        mkey: String,
        new_mkey: String,
    },
}

/// Read options for `get`.
#[derive(Args, Debug, Default, Clone)]
pub struct QueryArgs {
    /// Filter in FortiOS syntax (`name==web`); repeat to AND.
    #[arg(long)]
    pub filter: Vec<String>,

    /// Sort expression (`name,asc`).
    #[arg(long)]
    pub sort: Option<String>,

    /// Attributes to return; repeat or separate with `|`.
    #[arg(long)]
    pub format: Vec<String>,

    /// Offset of the first object (0-indexed).
    #[arg(long)]
    pub start: Option<u32>,

    /// Number of objects to return.
    #[arg(long)]
    pub count: Option<u32>,

    /// Include object metadata.
    #[arg(long)]
    pub with_meta: bool,

    /// Fetch every page.
    #[arg(long, conflicts_with_all = ["start", "count"])]
    pub all: bool,
}

/// Payload options for `set`.
#[derive(Args, Debug, Default, Clone)]
pub struct PayloadArgs {
    /// Full payload as a JSON object, sent as given.
    #[arg(long)]
    pub data: Option<String>,

    /// A single field as `key=value`; repeat for more. Values follow the
    /// field's declared type; table and unknown fields accept JSON.
    #[arg(long = "field", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub fields: Vec<(String, String)>,
}

impl QueryArgs {
    /// Read query for the collection, or for `mkey` when given.
    pub fn to_query(&self, mkey: Option<Value>) -> GetQuery {
        GetQuery {
            mkey,
            filter: (!self.filter.is_empty()).then(|| self.filter.clone().into()),
            sort: self.sort.clone(),
            format: self
                .format
                .iter()
                .flat_map(|f| f.split('|'))
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .collect(),
            start: self.start,
            count: self.count,
            with_meta: self.with_meta,
            ..Default::default()
        }
    }
}

impl PayloadArgs {
    /// Payload for `set` on `descriptor`. `--field` values win over keys in `--data`.
    ///
    /// # Errors
    ///
    /// Returns an error if `--data` is not a JSON object.
    pub fn to_fields(&self, descriptor: &ResourceDescriptor) -> crate::Result<Fields> {
        let mut fields = match &self.data {
            Some(data) => Fields::from_raw(serde_json::from_str::<Map<String, Value>>(data)?),
            None => Fields::new(),
        };
        for (key, raw) in &self.fields {
            fields = fields.set(key.as_str(), field_value(descriptor, key, raw));
        }
        Ok(fields)
    }
}

/// Interpret `--field` text by the field's kind.
fn field_value(descriptor: &ResourceDescriptor, name: &str, raw: &str) -> Value {
    match descriptor.field(name).map(|f| f.kind) {
        Some(FieldKind::Text { .. } | FieldKind::Choice { .. } | FieldKind::Address) => {
            Value::from(raw)
        }
        Some(FieldKind::Integer { .. }) => raw
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::from(raw)),
        Some(FieldKind::Table) | None => {
            serde_json::from_str(raw).unwrap_or_else(|_| Value::from(raw))
        }
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}
