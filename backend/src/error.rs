//! Error types for the tower conversion pipeline.
//!
//! - [`SchemaError`] - required columns missing from the input
//! - [`SourceReadError`] - the row source could not produce rows
//! - [`RowProcessingError`] - reserved for rows rejected instead of coerced
//! - [`ConvertError`] - top-level conversion errors
//! - [`ServerError`] - HTTP layer errors
//!
//! Conversion is automatic via `From` implementations, so `?` works
//! across error boundaries.

use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Schema Errors
// =============================================================================

/// A required column that was not found in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingField {
    /// The required column name.
    pub field: String,
    /// Closest actual column name, if one is similar enough.
    pub suggestion: Option<String>,
}

impl std::fmt::Display for MissingField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.suggestion {
            Some(s) => write!(f, "'{}' (did you mean '{}'?)", self.field, s),
            None => write!(f, "'{}'", self.field),
        }
    }
}

/// One or more required columns are absent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// No actual column resembles any missing field.
    #[error("Missing required column(s): {}", join_fields(.missing))]
    MissingFields { missing: Vec<MissingField> },

    /// At least one missing field has a close match among the actual columns.
    #[error("Missing required column(s): {}", join_fields(.missing))]
    MissingFieldsWithSuggestions { missing: Vec<MissingField> },
}

impl SchemaError {
    /// Build the right variant from a list of missing fields.
    pub fn from_missing(missing: Vec<MissingField>) -> Self {
        if missing.iter().any(|m| m.suggestion.is_some()) {
            SchemaError::MissingFieldsWithSuggestions { missing }
        } else {
            SchemaError::MissingFields { missing }
        }
    }

    pub fn missing(&self) -> &[MissingField] {
        match self {
            SchemaError::MissingFields { missing }
            | SchemaError::MissingFieldsWithSuggestions { missing } => missing,
        }
    }

    /// Names of the missing columns, in required order.
    pub fn missing_names(&self) -> Vec<&str> {
        self.missing().iter().map(|m| m.field.as_str()).collect()
    }

    pub fn has_suggestions(&self) -> bool {
        matches!(self, SchemaError::MissingFieldsWithSuggestions { .. })
    }
}

fn join_fields(fields: &[MissingField]) -> String {
    fields
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Source Errors
// =============================================================================

/// The input collaborator failed to produce rows.
#[derive(Debug, Error)]
pub enum SourceReadError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode the bytes.
    #[error("Failed to decode content: {0}")]
    EncodingError(String),

    /// Invalid CSV format.
    #[error("Invalid CSV format at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Empty file.
    #[error("Input file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in input")]
    NoHeaders,

    /// JSON input was not an array of records.
    #[error("Expected a JSON array of records")]
    NotAnArray,

    /// A record was not a JSON object.
    #[error("Record {0} is not an object")]
    NotAnObject(usize),
}

// =============================================================================
// Row Errors
// =============================================================================

/// A row the engine refuses to coerce.
///
/// Nothing raises this today: malformed values are converted to strings.
#[derive(Debug, Clone, Error)]
#[error("Row {row}, field '{field}': {message}")]
pub struct RowProcessingError {
    pub row: usize,
    pub field: String,
    pub message: String,
}

// =============================================================================
// Conversion Errors (top-level)
// =============================================================================

/// Top-level conversion errors.
///
/// This is the error type returned by [`crate::transform::pipeline`].
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Required columns missing.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Row source failure.
    #[error("Source error: {0}")]
    Source(#[from] SourceReadError),

    /// Row rejected.
    #[error("Row error: {0}")]
    Row(#[from] RowProcessingError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Output IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Conversion error.
    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for row source operations.
pub type SourceResult<T> = Result<T, SourceReadError>;

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let source_err = SourceReadError::EmptyFile;
        let convert_err: ConvertError = source_err.into();
        assert!(convert_err.to_string().contains("empty"));

        let schema_err = SchemaError::from_missing(vec![MissingField {
            field: "Floor Number".into(),
            suggestion: None,
        }]);
        let convert_err: ConvertError = schema_err.into();
        assert!(convert_err.to_string().contains("Floor Number"));
    }

    #[test]
    fn test_schema_error_variant_selection() {
        let plain = SchemaError::from_missing(vec![MissingField {
            field: "Company Name(s)".into(),
            suggestion: None,
        }]);
        assert!(!plain.has_suggestions());

        let suggested = SchemaError::from_missing(vec![
            MissingField { field: "Tower Name".into(), suggestion: Some("Tower Nam".into()) },
            MissingField { field: "Company Name(s)".into(), suggestion: None },
        ]);
        assert!(suggested.has_suggestions());
        assert_eq!(suggested.missing_names(), vec!["Tower Name", "Company Name(s)"]);
    }

    #[test]
    fn test_schema_error_message() {
        let err = SchemaError::from_missing(vec![MissingField {
            field: "Tower Name".into(),
            suggestion: Some("Tower Nam".into()),
        }]);
        let msg = err.to_string();
        assert!(msg.contains("'Tower Name'"));
        assert!(msg.contains("did you mean 'Tower Nam'?"));
    }
}
