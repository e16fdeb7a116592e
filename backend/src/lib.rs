//! # Towerdoc - tower occupancy spreadsheets to nested JSON
//!
//! Towerdoc turns a flat table with one row per company on a floor of a
//! tower into a nested document: tower → floors → company names.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌─────────────┐   ┌─────────────┐   ┌─────────────┐
//! │  RowSource  │──▶│   Columns    │──▶│  Normalize  │──▶│  Aggregate  │──▶│    Build    │
//! │ (CSV, JSON) │   │ (gate+hints) │   │  (per row)  │   │ (dedupe)    │   │ (document)  │
//! └─────────────┘   └──────────────┘   └─────────────┘   └─────────────┘   └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use towerdoc::{convert, ConvertOptions, Row};
//!
//! let rows = vec![
//!     Row::new("Tower A", "1", "Company X, Company Y"),
//!     Row::new("Tower A", "2", "Company Z"),
//! ];
//! let doc = convert(&rows, &ConvertOptions::default()).unwrap();
//! assert_eq!(doc.towers[0].tower.as_str(), "Tower-Tower A");
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`models`] - Rows, keys and the output document
//! - [`parser`] - Row sources (CSV with auto-detection, JSON records)
//! - [`validation`] - Required column check and document schema
//! - [`transform`] - Normalize, aggregate, build, pipeline
//! - [`api`] - HTTP API server

pub mod error;
pub mod models;

pub mod parser;

pub mod transform;

pub mod validation;

pub mod api;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{
    ConvertError, ConvertResult, MissingField, RowProcessingError, SchemaError, ServerError,
    SourceReadError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    FloorEntry, FloorKey, OutputDocument, Row, TowerKey, TowerRecord, COMPANIES_COLUMN,
    FLOOR_COLUMN, REQUIRED_COLUMNS, TOWER_COLUMN,
};

// =============================================================================
// Re-exports - Row sources
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes_auto, parse_csv_file_auto,
    parse_str, ParseResult, RecordSource, RowSource,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{
    is_valid_document, suggest, validate_columns, validate_document, SimilarityConfig,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::pipeline::{
    convert, convert_bytes, convert_file, output_path, write_document, ConvertOptions,
    PipelineResult, SourceInfo, DEFAULT_OUTPUT_FILE,
};
pub use transform::{aggregate, build, normalize, AggregationTable, CompanySet};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}
