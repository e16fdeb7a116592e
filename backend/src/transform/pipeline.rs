//! High-level conversion API.
//!
//! [`convert`] is the core: validate columns, fold rows, build the
//! document. It never logs and keeps no state between calls. The
//! `convert_*` wrappers add a CSV row source and pipeline logging.
//!
//! # Example
//!
//! ```rust
//! use towerdoc::models::Row;
//! use towerdoc::transform::pipeline::{convert, ConvertOptions};
//!
//! let rows = vec![
//!     Row::new("A", "1", "X, Y"),
//!     Row::new("A", "1", "X"),
//! ];
//! let doc = convert(&rows, &ConvertOptions::default()).unwrap();
//!
//! assert_eq!(doc.towers[0].tower.as_str(), "Tower-A");
//! assert_eq!(doc.towers[0].data[0].name, vec!["X", "Y"]);
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::aggregate::{aggregate_with, AggregationTable};
use super::builder::build;
use crate::api::logs::{log_error, log_info, log_success, log_warning};
use crate::error::{ConvertError, ConvertResult};
use crate::models::{OutputDocument, REQUIRED_COLUMNS};
use crate::parser::{parse_bytes_auto, parse_csv_file_auto, ParseResult, RowSource};
use crate::validation::{validate_columns, SimilarityConfig, DEFAULT_SIMILARITY_THRESHOLD};

/// File name used when no output name is given.
pub const DEFAULT_OUTPUT_FILE: &str = "tower_data.json";

/// Options for a conversion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertOptions {
    /// Minimum similarity for column suggestions (0.0 to 1.0)
    pub similarity_threshold: f64,

    /// Compare column names case-insensitively when suggesting
    pub ignore_case: bool,

    /// Drop empty company names produced by stray commas
    pub skip_empty_companies: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            ignore_case: true,
            skip_empty_companies: false,
        }
    }
}

impl ConvertOptions {
    pub fn similarity(&self) -> SimilarityConfig {
        SimilarityConfig {
            threshold: self.similarity_threshold,
            ignore_case: self.ignore_case,
        }
    }
}

/// Convert any row source into the output document.
///
/// All-or-nothing: a schema or source failure returns an error and no
/// document. Each call builds its own aggregation table.
pub fn convert<S: RowSource + ?Sized>(
    source: &S,
    options: &ConvertOptions,
) -> ConvertResult<OutputDocument> {
    let columns = source.columns();
    validate_columns(&columns, &REQUIRED_COLUMNS, &options.similarity())?;

    let rows = source.rows()?;
    let table = AggregationTable::new().skip_empty_companies(options.skip_empty_companies);
    let table = aggregate_with(&rows, table);

    Ok(build(table))
}

/// Result of a logged pipeline run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    /// The converted document
    pub document: OutputDocument,

    /// Input file information
    pub source_info: SourceInfo,
}

/// Input file information
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

impl From<&ParseResult> for SourceInfo {
    fn from(parsed: &ParseResult) -> Self {
        Self {
            encoding: parsed.encoding.clone(),
            delimiter: parsed.delimiter,
            headers: parsed.headers.clone(),
            row_count: parsed.records.len(),
        }
    }
}

/// Convert a CSV file.
pub fn convert_file(path: &Path, options: &ConvertOptions) -> ConvertResult<PipelineResult> {
    log_info(format!("📖 Reading {}...", path.display()));
    let parsed = parse_csv_file_auto(path).map_err(|e| {
        log_error(format!("Error reading the file: {}", e));
        ConvertError::from(e)
    })?;
    convert_parsed(parsed, options)
}

/// Convert CSV bytes, e.g. from an upload.
pub fn convert_bytes(bytes: &[u8], options: &ConvertOptions) -> ConvertResult<PipelineResult> {
    log_info(format!("📖 Reading {} bytes...", bytes.len()));
    let parsed = parse_bytes_auto(bytes).map_err(|e| {
        log_error(format!("Error reading the input: {}", e));
        ConvertError::from(e)
    })?;
    convert_parsed(parsed, options)
}

fn convert_parsed(parsed: ParseResult, options: &ConvertOptions) -> ConvertResult<PipelineResult> {
    let source_info = SourceInfo::from(&parsed);

    log_success(format!("Detected encoding: {}", parsed.encoding));
    log_success(format!("Detected separator: '{}'", format_delimiter(parsed.delimiter)));
    log_success(format!("Read {} rows", parsed.records.len()));
    log_info(format!("📋 Columns: {}", parsed.headers.join(", ")));

    if parsed.records.is_empty() {
        log_warning("No data rows; the document will be empty");
    }

    log_info("🏢 Grouping companies by tower and floor...");
    let document = convert(&parsed, options).map_err(|e| {
        report_error(&e);
        e
    })?;

    log_success(format!(
        "{} towers, {} floors",
        document.len(),
        document.floor_count()
    ));

    Ok(PipelineResult {
        document,
        source_info,
    })
}

fn report_error(err: &ConvertError) {
    match err {
        ConvertError::Schema(schema) => {
            for missing in schema.missing() {
                match &missing.suggestion {
                    Some(s) => log_error(format!(
                        "Missing required column '{}' (did you mean '{}'?)",
                        missing.field, s
                    )),
                    None => log_error(format!("Missing required column '{}'", missing.field)),
                }
            }
        }
        other => log_error(other.to_string()),
    }
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

/// Resolve the output file name.
///
/// Blank names fall back to [`DEFAULT_OUTPUT_FILE`]; a `.json` extension
/// is added when missing.
pub fn output_path(name: Option<&str>) -> PathBuf {
    let name = name.map(str::trim).unwrap_or("");
    if name.is_empty() {
        return PathBuf::from(DEFAULT_OUTPUT_FILE);
    }

    let path = PathBuf::from(name);
    if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json")) {
        path
    } else {
        PathBuf::from(format!("{}.json", name))
    }
}

/// Write a document as pretty JSON (two-space indent).
pub fn write_document(document: &OutputDocument, path: &Path) -> ConvertResult<()> {
    let json = document.to_json()?;
    std::fs::write(path, json)?;
    log_success(format!("Data successfully saved to {}", path.display()));
    Ok(())
}
