use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::QueryDataType;

/// Result alias for resolution and extraction operations
pub type MappingResult<T> = Result<T, MappingError>;

/// Mapping error types
///
/// Resolution errors abort the whole mapping definition. Extraction errors
/// fail the record being read; they are deterministic and never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MappingError {
    #[error("Invalid external name: {0}")]
    InvalidExternalName(String),

    #[error("Mismatch between declared and resolved type for field '{field}': declared {declared}, resolved {resolved}")]
    TypeMismatch {
        field: String,
        declared: QueryDataType,
        resolved: QueryDataType,
    },

    #[error("Duplicate external name: {0}")]
    DuplicateExternalName(String),

    #[error("Invalid additional field: {0}")]
    InvalidAdditionalField(String),

    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    #[error("Missing option: {0}")]
    MissingOption(String),

    #[error("Invalid option '{key}': {message}")]
    InvalidOption { key: String, message: String },

    #[error("Column list is required for {0} format")]
    ColumnListRequired(String),

    #[error("Cannot convert {from} to {to}")]
    CannotConvert { from: String, to: QueryDataType },

    #[error("Cannot parse VARCHAR value '{value}' to {to}")]
    CannotParse { value: String, to: QueryDataType },

    #[error("Numeric overflow while converting {from} to {to}")]
    NumericOverflow { from: String, to: QueryDataType },

    #[error("Invalid mapping definition: {0}")]
    InvalidDefinition(String),
}

impl MappingError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            MappingError::InvalidExternalName(_) => "INVALID_EXTERNAL_NAME",
            MappingError::TypeMismatch { .. } => "TYPE_MISMATCH",
            MappingError::DuplicateExternalName(_) => "DUPLICATE_EXTERNAL_NAME",
            MappingError::InvalidAdditionalField(_) => "INVALID_ADDITIONAL_FIELD",
            MappingError::UnsupportedType(_) => "UNSUPPORTED_TYPE",
            MappingError::MissingOption(_) => "MISSING_OPTION",
            MappingError::InvalidOption { .. } => "INVALID_OPTION",
            MappingError::ColumnListRequired(_) => "COLUMN_LIST_REQUIRED",
            MappingError::CannotConvert { .. } => "CANNOT_CONVERT",
            MappingError::CannotParse { .. } => "CANNOT_PARSE",
            MappingError::NumericOverflow { .. } => "NUMERIC_OVERFLOW",
            MappingError::InvalidDefinition(_) => "INVALID_DEFINITION",
        }
    }

    /// Whether the error was raised while resolving a mapping (as opposed to
    /// reading a record)
    pub fn is_resolution_error(&self) -> bool {
        !matches!(
            self,
            MappingError::CannotConvert { .. }
                | MappingError::CannotParse { .. }
                | MappingError::NumericOverflow { .. }
        )
    }
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorDetail {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl From<&MappingError> for ErrorResponse {
    fn from(err: &MappingError) -> Self {
        let detail = ErrorDetail::new(err.code(), err.to_string());
        let detail = match err {
            MappingError::TypeMismatch { .. } => {
                detail.with_details("Declared column types must match the type discovered in the record schema.")
            }
            MappingError::ColumnListRequired(_) => {
                detail.with_details("Declare the columns explicitly; this format does not expose a schema.")
            }
            _ => detail,
        };

        ErrorResponse { error: detail }
    }
}

/// Convert apache_avro::Error to MappingError
impl From<apache_avro::Error> for MappingError {
    fn from(err: apache_avro::Error) -> Self {
        MappingError::InvalidOption {
            key: "avroSchema".to_string(),
            message: err.to_string(),
        }
    }
}

/// Convert serde_json::Error to MappingError
impl From<serde_json::Error> for MappingError {
    fn from(err: serde_json::Error) -> Self {
        MappingError::InvalidDefinition(err.to_string())
    }
}
