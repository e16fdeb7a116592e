//! REST API types.
//!
//! `towers` carries the output document unchanged, so clients can save it
//! as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{ConvertError, MissingField};
use crate::models::OutputDocument;
use crate::transform::pipeline::{format_delimiter, PipelineResult};

/// Response sent after a successful conversion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    /// Unique job identifier
    pub job_id: String,

    /// "ready" or "empty"
    pub status: String,

    /// The converted document
    pub towers: OutputDocument,

    pub metadata: ResponseMetadata,
}

/// Metadata about the conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub file_name: Option<String>,
    pub total_towers: usize,
    pub total_floors: usize,
    pub converted_at: DateTime<Utc>,
    pub csv_info: CsvMetadata,
}

/// CSV file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvMetadata {
    pub encoding: String,
    pub delimiter: String,
    pub row_count: usize,
    pub columns: Vec<String>,
}

impl ConvertResponse {
    pub fn new(result: PipelineResult, file_name: Option<String>) -> Self {
        let document = result.document;
        let info = result.source_info;

        ConvertResponse {
            job_id: Uuid::new_v4().to_string(),
            status: if document.is_empty() { "empty" } else { "ready" }.to_string(),
            metadata: ResponseMetadata {
                file_name,
                total_towers: document.len(),
                total_floors: document.floor_count(),
                converted_at: Utc::now(),
                csv_info: CsvMetadata {
                    encoding: info.encoding,
                    delimiter: format_delimiter(info.delimiter),
                    row_count: info.row_count,
                    columns: info.headers,
                },
            },
            towers: document,
        }
    }
}

/// Create an error response body.
///
/// Schema errors also list the missing columns and their suggestions.
pub fn error_response(error: &ConvertError) -> Value {
    let missing: &[MissingField] = match error {
        ConvertError::Schema(schema) => schema.missing(),
        _ => &[],
    };
    error_body(&error.to_string(), missing)
}

/// Error body for failures outside the conversion itself.
pub fn request_error(message: &str) -> Value {
    error_body(message, &[])
}

fn error_body(message: &str, missing: &[MissingField]) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": message,
        "missingColumns": missing,
        "towers": []
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use crate::models::Row;
    use crate::parser::ParseResult;
    use crate::transform::pipeline::{convert, ConvertOptions, SourceInfo};

    #[test]
    fn test_response_shape() {
        let rows = vec![Row::new("A", "1", "X"), Row::new("B", "2", "Y")];
        let document = convert(&rows, &ConvertOptions::default()).unwrap();
        let parsed = ParseResult {
            records: vec![json!({}), json!({})],
            encoding: "utf-8".into(),
            delimiter: '\t',
            headers: vec!["Tower Name".into()],
        };
        let result = PipelineResult {
            document,
            source_info: SourceInfo::from(&parsed),
        };

        let response = ConvertResponse::new(result, Some("towers.csv".into()));
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["status"], "ready");
        assert_eq!(value["metadata"]["totalTowers"], 2);
        assert_eq!(value["metadata"]["csvInfo"]["delimiter"], "\\t");
        assert_eq!(value["towers"][0]["tower"], "Tower-A");
        assert!(Uuid::parse_str(value["jobId"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_schema_error_response() {
        let err = ConvertError::Schema(SchemaError::from_missing(vec![MissingField {
            field: "Tower Name".into(),
            suggestion: Some("Tower Nam".into()),
        }]));
        let body = error_response(&err);

        assert_eq!(body["status"], "error");
        assert_eq!(body["missingColumns"][0]["field"], "Tower Name");
        assert_eq!(body["missingColumns"][0]["suggestion"], "Tower Nam");
    }
}
