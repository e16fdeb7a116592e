//! Validation for tower conversion.
//!
//! Two distinct checks live here:
//!
//! - [`columns`] - the gate in front of the pipeline: are the required
//!   input columns present, and if not, what did the user probably mean?
//! - Document validation - JSON Schema (Draft 7) check of an output
//!   document, used when reading documents back in.
//!
//! # Embedded Schema
//!
//! `schemas/tower-document.json` is embedded at compile time.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use towerdoc::validation::validate_document;
//!
//! let doc = json!([
//!     { "data": [{ "name": ["Company X"], "floor": "1" }], "tower": "Tower-A" }
//! ]);
//! assert!(validate_document(&doc).is_ok());
//! ```

pub mod columns;

pub use columns::{
    similarity_ratio, suggest, validate_columns, SimilarityConfig, DEFAULT_SIMILARITY_THRESHOLD,
};

use once_cell::sync::Lazy;
use serde_json::Value;

static DOCUMENT_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/tower-document.json"))
        .expect("Invalid embedded schema")
});

/// Validate a JSON value against a JSON Schema.
///
/// Returns every error message when invalid.
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate against the tower document schema.
pub fn validate_document(data: &Value) -> Result<(), Vec<String>> {
    validate(&DOCUMENT_SCHEMA, data)
}

/// Quick check against the tower document schema.
pub fn is_valid_document(data: &Value) -> bool {
    jsonschema::draft7::is_valid(&DOCUMENT_SCHEMA, data)
}
