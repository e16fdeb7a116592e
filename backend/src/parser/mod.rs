//! Row sources: where the converter gets its rows from.
//!
//! The converter only needs column names and rows exposing the three
//! required fields. [`RowSource`] captures that; this module ships a CSV
//! reader with encoding and delimiter auto-detection, a JSON records
//! source, and in-memory rows.

use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{SourceReadError, SourceResult};
use crate::models::{Row, REQUIRED_COLUMNS};

/// Anything that can supply column names and rows.
pub trait RowSource {
    /// Column names as they appear in the input.
    fn columns(&self) -> Vec<String>;

    /// All rows. Only called after the columns passed validation.
    fn rows(&self) -> SourceResult<Vec<Row>>;
}

impl RowSource for [Row] {
    fn columns(&self) -> Vec<String> {
        REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    fn rows(&self) -> SourceResult<Vec<Row>> {
        Ok(self.to_vec())
    }
}

impl RowSource for Vec<Row> {
    fn columns(&self) -> Vec<String> {
        self.as_slice().columns()
    }

    fn rows(&self) -> SourceResult<Vec<Row>> {
        Ok(self.clone())
    }
}

// =============================================================================
// JSON records
// =============================================================================

/// Rows held as JSON objects keyed by column name.
#[derive(Debug, Clone, Default)]
pub struct RecordSource {
    pub headers: Vec<String>,
    pub records: Vec<Value>,
}

impl RecordSource {
    pub fn new(headers: Vec<String>, records: Vec<Value>) -> Self {
        Self { headers, records }
    }

    /// Build from a JSON array of objects.
    ///
    /// Headers are the union of object keys in first-seen order.
    pub fn from_json_array(value: Value) -> SourceResult<Self> {
        let records = match value {
            Value::Array(items) => items,
            _ => return Err(SourceReadError::NotAnArray),
        };

        let mut headers: Vec<String> = Vec::new();
        for (i, record) in records.iter().enumerate() {
            let obj = record.as_object().ok_or(SourceReadError::NotAnObject(i))?;
            for key in obj.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }

        Ok(Self { headers, records })
    }
}

impl RowSource for RecordSource {
    fn columns(&self) -> Vec<String> {
        self.headers.clone()
    }

    fn rows(&self) -> SourceResult<Vec<Row>> {
        records_to_rows(&self.records)
    }
}

fn records_to_rows(records: &[Value]) -> SourceResult<Vec<Row>> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| Row::from_record(i, r))
        .collect()
}

// =============================================================================
// CSV
// =============================================================================

/// Result of parsing a CSV with metadata.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed records as JSON objects
    pub records: Vec<Value>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// Column headers
    pub headers: Vec<String>,
}

impl RowSource for ParseResult {
    fn columns(&self) -> Vec<String> {
        self.headers.clone()
    }

    fn rows(&self) -> SourceResult<Vec<Row>> {
        records_to_rows(&self.records)
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
///
/// A leading byte-order mark is dropped so the first header matches.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };

    match decoded.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => decoded,
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text with an explicit delimiter.
///
/// Each row becomes a JSON object keyed by header. Cells and headers are
/// kept verbatim, surrounding whitespace included. Quoted fields may
/// contain the delimiter. Missing trailing cells read as empty strings,
/// extra cells are ignored, and blank rows are skipped. When a header
/// repeats, the first column with that name wins.
///
/// # Example
/// ```
/// use towerdoc::parser::parse_str;
///
/// let csv = "Tower Name,Floor Number,Company Name(s)\nA,1,\"X, Y\"";
/// let result = parse_str(csv, ',').unwrap();
///
/// assert_eq!(result.records.len(), 1);
/// assert_eq!(result.records[0]["Company Name(s)"], "X, Y");
/// ```
pub fn parse_str(content: &str, delimiter: char) -> SourceResult<ParseResult> {
    parse_string_with_metadata(content, delimiter, "utf-8".to_string())
}

/// Parse CSV string with explicit delimiter and return metadata.
pub fn parse_string_with_metadata(
    content: &str,
    delimiter: char,
    encoding: String,
) -> SourceResult<ParseResult> {
    if content.trim().is_empty() {
        return Err(SourceReadError::EmptyFile);
    }

    let delimiter_byte = u8::try_from(delimiter).map_err(|_| SourceReadError::ParseError {
        line: 1,
        message: format!("Delimiter '{}' is not a single byte", delimiter),
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(SourceReadError::NoHeaders);
    }

    let mut records = Vec::new();

    for result in reader.records() {
        let record = result.map_err(csv_error)?;

        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }

        let mut obj = Map::new();
        for (i, header) in headers.iter().enumerate() {
            let value = record.get(i).unwrap_or("");
            obj.entry(header.clone())
                .or_insert_with(|| Value::String(value.to_string()));
        }

        records.push(Value::Object(obj));
    }

    Ok(ParseResult {
        records,
        encoding,
        delimiter,
        headers,
    })
}

fn csv_error(e: csv::Error) -> SourceReadError {
    let line = e.position().map(|p| p.line() as usize).unwrap_or(0);
    SourceReadError::ParseError {
        line,
        message: e.to_string(),
    }
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> SourceResult<ParseResult> {
    if bytes.is_empty() {
        return Err(SourceReadError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);

    parse_string_with_metadata(&content, delimiter, encoding)
}

/// Parse CSV file with auto-detection of encoding and delimiter.
///
/// # Example
/// ```ignore
/// let result = parse_csv_file_auto("towers.csv")?;
/// println!("Encoding: {}, Delimiter: '{}'", result.encoding, result.delimiter);
/// ```
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> SourceResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let csv = "name;age\nAlice;30\nBob;25";
        let result = parse_str(csv, ';').unwrap();

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0]["name"], "Alice");
        assert_eq!(result.records[1]["age"], "25");
    }

    #[test]
    fn test_quoted_field_with_commas() {
        let csv = "Tower Name,Floor Number,Company Name(s)\n\"Tower A\",1,\"Company X, Company Y\"";
        let result = parse_str(csv, ',').unwrap();

        assert_eq!(result.records[0]["Tower Name"], "Tower A");
        assert_eq!(result.records[0]["Company Name(s)"], "Company X, Company Y");
    }

    #[test]
    fn test_blank_rows_skipped() {
        let csv = "a;b\n1;2\n\n;\n3;4\n";
        let result = parse_str(csv, ';').unwrap();
        assert_eq!(result.records.len(), 2);
    }

    #[test]
    fn test_missing_and_extra_values() {
        let csv = "a;b;c\n1;;3\n4\n5;6;7;8";
        let result = parse_str(csv, ';').unwrap();

        assert_eq!(result.records[0]["b"], "");
        assert_eq!(result.records[1]["c"], "");
        assert_eq!(result.records[2]["c"], "7");
        assert!(result.records[2].get("3").is_none());
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(parse_str("", ';'), Err(SourceReadError::EmptyFile)));
        assert!(matches!(parse_bytes_auto(b""), Err(SourceReadError::EmptyFile)));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_auto_parse() {
        let csv = "Tower Name;Floor Number;Company Name(s)\nA;1;X, Y\nB;2;Z";
        let result = parse_bytes_auto(csv.as_bytes()).unwrap();

        assert_eq!(result.delimiter, ';');
        assert_eq!(result.headers, vec!["Tower Name", "Floor Number", "Company Name(s)"]);
        assert_eq!(result.records.len(), 2);
    }

    #[test]
    fn test_bom_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"Tower Name,Floor Number\nA,1");
        let result = parse_bytes_auto(&bytes).unwrap();
        assert_eq!(result.headers[0], "Tower Name");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_parse_result_rows() {
        let csv = "Tower Name,Floor Number,Company Name(s),Notes\nA,1,\"X, Y\",n/a";
        let result = parse_str(csv, ',').unwrap();
        let rows = result.rows().unwrap();

        assert_eq!(rows, vec![Row::new("A", "1", "X, Y")]);
        assert_eq!(result.columns().len(), 4);
    }

    #[test]
    fn test_record_source_headers() {
        let value = serde_json::json!([
            { "Tower Name": "A", "Floor Number": 1 },
            { "Company Name(s)": "X", "Tower Name": "B" }
        ]);
        let source = RecordSource::from_json_array(value).unwrap();
        assert_eq!(source.columns(), vec!["Tower Name", "Floor Number", "Company Name(s)"]);

        let rows = source.rows().unwrap();
        assert_eq!(rows[0].floor_raw, "1");
        assert_eq!(rows[1].companies_raw, "X");
    }

    #[test]
    fn test_cells_kept_verbatim() {
        let csv = "Tower Name,Floor Number,Company Name(s)\nA,1,X\nA, 1 ,Y";
        let result = parse_str(csv, ',').unwrap();
        let rows = result.rows().unwrap();

        assert_eq!(rows[0].floor_raw, "1");
        assert_eq!(rows[1].floor_raw, " 1 ");
        assert_eq!(rows[1].companies_raw, "Y");
    }

    #[test]
    fn test_padded_header_not_trimmed() {
        let result = parse_str(" Tower Name ,Floor Number\nA,1", ',').unwrap();
        assert_eq!(result.headers[0], " Tower Name ");
        assert!(result.records[0].get("Tower Name").is_none());
    }

    #[test]
    fn test_duplicate_header_keeps_first() {
        let result = parse_str("Floor Number,Floor Number\n1,2", ',').unwrap();
        assert_eq!(result.records[0]["Floor Number"], "1");
    }

    #[test]
    fn test_record_source_rejects_non_array() {
        let value = serde_json::json!({ "Tower Name": "A" });
        let err = RecordSource::from_json_array(value).unwrap_err();
        assert!(matches!(err, SourceReadError::NotAnArray));
        assert!(!err.to_string().contains("Record 0"));
    }

    #[test]
    fn test_record_source_rejects_non_objects() {
        let value = serde_json::json!([{ "a": 1 }, 2]);
        assert!(matches!(
            RecordSource::from_json_array(value),
            Err(SourceReadError::NotAnObject(1))
        ));
    }

    #[test]
    fn test_typed_rows_source() {
        let rows = vec![Row::new("A", "1", "X")];
        assert_eq!(rows.columns(), vec!["Tower Name", "Floor Number", "Company Name(s)"]);
        assert_eq!(rows.rows().unwrap().len(), 1);
    }
}
