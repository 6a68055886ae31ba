//! Request normalization: filters, sub-table fields and payloads.

mod filter;
mod payload;
mod table;

pub use filter::{
    normalize_filters, FilterExpr, FilterInput, FilterOp, FilterParam, ParseFilterError,
};
pub use payload::{build_payload, Fields, Provided};
pub use table::{normalize_table_field, TableFieldSpec};
