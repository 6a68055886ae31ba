//! Filter expression normalization.
//!
//! FortiOS combines predicates with AND by repeating the `filter` query
//! key, and with OR by joining predicates with a comma inside one value.
//! Callers tend to hand over filters in whatever shape they copied from a
//! URL, so this module reconciles the common spellings:
//!
//! - `name==web`
//! - `filter=name==web&type==ipmask`
//! - `name==web&filter=type==ipmask`
//! - a pre-split list of any of the above

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::transport::QueryParams;

const FILTER_PREFIX: &str = "filter=";
const EXPLICIT_SEPARATOR: &str = "&filter=";

/// Normalized filter parameter, ready to be placed on the query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterParam {
    /// One predicate (possibly an OR-group).
    Single(String),
    /// Several AND-combined predicates, one `filter` pair each.
    Multiple(Vec<String>),
}

impl FilterParam {
    /// The predicates in wire order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            FilterParam::Single(value) => vec![value.as_str()],
            FilterParam::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }

    /// Append one `filter` pair per predicate.
    pub fn append_to(&self, params: &mut QueryParams) {
        for value in self.values() {
            params.push("filter", value);
        }
    }

    fn from_parts(mut parts: Vec<String>) -> Option<Self> {
        match parts.len() {
            0 => None,
            1 => parts.pop().map(FilterParam::Single),
            _ => Some(FilterParam::Multiple(parts)),
        }
    }
}

/// Filter input as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterInput {
    /// A single string, possibly `&`-joined and `filter=`-prefixed.
    Raw(String),
    /// A pre-split list; each element is normalized the same way.
    List(Vec<String>),
}

impl FilterInput {
    /// Normalize into the wire parameter, or `None` when nothing is left.
    pub fn normalize(&self) -> Option<FilterParam> {
        match self {
            FilterInput::Raw(raw) => normalize_filters(raw),
            FilterInput::List(items) => {
                let parts = items.iter().flat_map(|item| split_parts(item)).collect();
                FilterParam::from_parts(parts)
            }
        }
    }
}

impl From<&str> for FilterInput {
    fn from(value: &str) -> Self {
        FilterInput::Raw(value.to_string())
    }
}

impl From<String> for FilterInput {
    fn from(value: String) -> Self {
        FilterInput::Raw(value)
    }
}

impl From<Vec<String>> for FilterInput {
    fn from(value: Vec<String>) -> Self {
        FilterInput::List(value)
    }
}

impl From<Vec<&str>> for FilterInput {
    fn from(value: Vec<&str>) -> Self {
        FilterInput::List(value.into_iter().map(str::to_string).collect())
    }
}

impl From<FilterExpr> for FilterInput {
    fn from(value: FilterExpr) -> Self {
        FilterInput::Raw(value.to_string())
    }
}

/// Rewrite a raw filter string into its wire form.
///
/// One leading `filter=` is stripped, `&filter=` and `&` both separate
/// AND-combined predicates, and commas are left alone. Empty parts are
/// dropped; if nothing remains the result is `None`.
///
/// # Example
///
/// ```
/// use fortiapi::{normalize_filters, FilterParam};
///
/// assert_eq!(
///     normalize_filters("filter=name==a&status==enable"),
///     Some(FilterParam::Multiple(vec![
///         "name==a".to_string(),
///         "status==enable".to_string(),
///     ])),
/// );
/// assert_eq!(
///     normalize_filters("name==a,name==b"),
///     Some(FilterParam::Single("name==a,name==b".to_string())),
/// );
/// ```
pub fn normalize_filters(raw: &str) -> Option<FilterParam> {
    FilterParam::from_parts(split_parts(raw))
}

fn split_parts(raw: &str) -> Vec<String> {
    let stripped = raw.strip_prefix(FILTER_PREFIX).unwrap_or(raw);
    stripped
        .replace(EXPLICIT_SEPARATOR, "&")
        .split('&')
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Comparison operator of a single filter predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `=@` (contains)
    Contains,
    /// `!@` (does not contain)
    NotContains,
    /// `<=`
    Le,
    /// `<`
    Lt,
    /// `>=`
    Ge,
    /// `>`
    Gt,
}

impl FilterOp {
    /// Two-character operators must be tried before `<` and `>`.
    const ALL: [FilterOp; 8] = [
        FilterOp::Eq,
        FilterOp::Ne,
        FilterOp::Contains,
        FilterOp::NotContains,
        FilterOp::Le,
        FilterOp::Ge,
        FilterOp::Lt,
        FilterOp::Gt,
    ];

    /// Wire spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOp::Eq => "==",
            FilterOp::Ne => "!=",
            FilterOp::Contains => "=@",
            FilterOp::NotContains => "!@",
            FilterOp::Le => "<=",
            FilterOp::Lt => "<",
            FilterOp::Ge => ">=",
            FilterOp::Gt => ">",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `field OP value` predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterExpr {
    pub field: String,
    pub op: FilterOp,
    pub value: String,
}

impl FilterExpr {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Join predicates into one OR-group.
    pub fn any_of(exprs: &[FilterExpr]) -> String {
        exprs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.field, self.op, self.value)
    }
}

/// Error returned when a predicate has no recognizable operator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no filter operator in '{0}'")]
pub struct ParseFilterError(pub String);

impl FromStr for FilterExpr {
    type Err = ParseFilterError;

    /// Parse a single predicate. The leftmost operator wins.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for (idx, _) in s.char_indices() {
            let rest = &s[idx..];
            if let Some(op) = FilterOp::ALL.iter().find(|op| rest.starts_with(op.as_str())) {
                if idx == 0 {
                    break;
                }
                return Ok(FilterExpr::new(
                    &s[..idx],
                    *op,
                    &rest[op.as_str().len()..],
                ));
            }
        }
        Err(ParseFilterError(s.to_string()))
    }
}
