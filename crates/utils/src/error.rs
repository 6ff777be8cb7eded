//! Error taxonomy for the receipt notification transformation.
//!
//! Every failure is detected at the point where a field is read, so a
//! partially mapped event is never produced.

use std::{error::Error, fmt::Display};

/// Result type for event parsing and mapping operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Errors that can occur while parsing or mapping a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// A required key is absent, identified by its dotted path.
    MissingField(String),
    /// A key is present but holds a value of the wrong JSON type.
    InvalidField { path: String, expected: &'static str },
    /// An email address lacks the `@` separator.
    MalformedAddress(String),
    /// The mail timestamp could not be parsed as a date/time.
    InvalidTimestamp(String),
    /// The `Records` array is present but empty.
    EmptyRecords,
}

impl TransformError {
    /// Returns the machine-readable kind of this error.
    pub fn kind(&self) -> &'static str {
        match self {
            TransformError::MissingField(_) => "missing_field",
            TransformError::InvalidField { .. } => "invalid_field",
            TransformError::MalformedAddress(_) => "malformed_address",
            TransformError::InvalidTimestamp(_) => "invalid_timestamp",
            TransformError::EmptyRecords => "empty_records",
        }
    }

    pub(crate) fn invalid(path: impl Into<String>, expected: &'static str) -> Self {
        TransformError::InvalidField {
            path: path.into(),
            expected,
        }
    }
}

impl Display for TransformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformError::MissingField(path) => write!(f, "Missing field: {path}"),
            TransformError::InvalidField { path, expected } => {
                write!(f, "Invalid field: {path} (expected {expected})")
            }
            TransformError::MalformedAddress(address) => {
                write!(f, "Malformed address: {address:?} has no '@' separator")
            }
            TransformError::InvalidTimestamp(value) => {
                write!(f, "Invalid timestamp: {value:?}")
            }
            TransformError::EmptyRecords => write!(f, "Records array is empty"),
        }
    }
}

impl Error for TransformError {}
