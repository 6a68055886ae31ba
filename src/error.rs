//! Error types for FortiOS API operations.

use thiserror::Error;

use crate::moves::Anchor;

/// Errors raised locally, before any request reaches the device.
///
/// Each variant carries the field, value or range needed to fix the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The payload has no usable value for the resource's identity key.
    #[error("missing identity field '{field}' for {resource}")]
    MissingIdentity { resource: String, field: String },

    /// A sub-table entry lacks an attribute its table requires.
    #[error("entry {index} of table field '{field}' is missing required key '{key}'")]
    MissingRequiredKey {
        field: String,
        index: usize,
        key: String,
    },

    /// A sub-table field was given a value that cannot be coerced into entries.
    #[error("invalid value for table field '{field}': {reason}")]
    InvalidTableValue { field: String, reason: String },

    /// A value is not one of the field's enumerated options.
    #[error("invalid value '{value}' for field '{field}', expected one of: {}", options.join(", "))]
    InvalidOption {
        field: String,
        value: String,
        options: Vec<String>,
    },

    /// An integer value falls outside the field's bounds.
    #[error("value {value} for field '{field}' is outside {min}..={max}")]
    ValueOutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// A string value exceeds the field's maximum length.
    #[error("value for field '{field}' is {len} characters, maximum is {max}")]
    ValueTooLong { field: String, len: usize, max: usize },

    /// A relative move was requested without a reference identifier.
    #[error("moving '{anchor}' requires a reference identifier")]
    MissingReference { anchor: Anchor },

    /// Ordinal positions start at 1.
    #[error("position {position} is invalid, positions start at 1")]
    InvalidPosition { position: i64 },

    /// Ordinal position past the end of the collection.
    #[error("position {position} is out of range, valid positions are 1..={max}")]
    PositionOutOfRange { position: i64, max: i64 },

    /// Top, bottom and ordinal moves need at least one entry to anchor to.
    #[error("cannot resolve a move against an empty collection")]
    EmptyCollection,

    /// The resource does not support the requested operation.
    #[error("{operation} is not supported by {resource}")]
    Unsupported {
        operation: &'static str,
        resource: String,
    },
}

/// Errors that can occur during FortiOS API operations.
#[derive(Debug, Error)]
pub enum FortiError {
    /// Configuration is missing or incomplete.
    #[error("FortiOS configuration required: {0}")]
    ConfigMissing(String),

    /// No descriptor is registered for the requested path.
    #[error("Unknown resource '{0}'")]
    UnknownResource(String),

    /// Local validation failed.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The object or collection does not exist on the device.
    #[error("'{path}' not found")]
    NotFound { path: String },

    /// API request failed.
    #[error("FortiOS API error: {message}")]
    ApiError {
        message: String,
        status_code: Option<u16>,
        error_code: Option<i64>,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// Rate limited.
    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },
}

impl FortiError {
    /// Returns true when the device reported that the target does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FortiError::NotFound { .. })
    }

    /// Returns the validation error, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            FortiError::Validation(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias for FortiOS operations.
pub type Result<T> = core::result::Result<T, FortiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_carry_context() {
        let err = ValidationError::PositionOutOfRange {
            position: 7,
            max: 4,
        };
        assert_eq!(
            err.to_string(),
            "position 7 is out of range, valid positions are 1..=4"
        );

        let err = ValidationError::InvalidOption {
            field: "action".to_string(),
            value: "drop".to_string(),
            options: vec!["accept".to_string(), "deny".to_string()],
        };
        assert!(err.to_string().contains("accept, deny"));
    }

    #[test]
    fn test_not_found_classification() {
        let err = FortiError::NotFound {
            path: "api/v2/cmdb/firewall/address/web".to_string(),
        };
        assert!(err.is_not_found());

        let err = FortiError::ApiError {
            message: "boom".to_string(),
            status_code: Some(500),
            error_code: Some(-5),
        };
        assert!(!err.is_not_found());
    }
}
