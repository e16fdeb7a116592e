//! Domain models for the tower conversion pipeline.
//!
//! - [`Row`] - One input record (tower, floor, companies)
//! - [`TowerKey`] - Normalized tower identifier
//! - [`FloorEntry`] - One floor and the companies on it
//! - [`TowerRecord`] - One tower with all its floors
//! - [`OutputDocument`] - The final ordered document

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SourceReadError;

/// Column holding the tower label.
pub const TOWER_COLUMN: &str = "Tower Name";
/// Column holding the floor label.
pub const FLOOR_COLUMN: &str = "Floor Number";
/// Column holding the comma-separated company names.
pub const COMPANIES_COLUMN: &str = "Company Name(s)";

/// Required columns, in reporting order.
pub const REQUIRED_COLUMNS: [&str; 3] = [TOWER_COLUMN, FLOOR_COLUMN, COMPANIES_COLUMN];

// =============================================================================
// Input
// =============================================================================

/// One input record.
///
/// Fields are raw text; nothing is normalized until aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub tower_raw: String,
    pub floor_raw: String,
    pub companies_raw: String,
}

impl Row {
    pub fn new(
        tower_raw: impl Into<String>,
        floor_raw: impl Into<String>,
        companies_raw: impl Into<String>,
    ) -> Self {
        Self {
            tower_raw: tower_raw.into(),
            floor_raw: floor_raw.into(),
            companies_raw: companies_raw.into(),
        }
    }

    /// Build a row from a JSON object keyed by column name.
    ///
    /// Non-string values are coerced with [`coerce_to_string`]; an absent
    /// key reads as an empty string since columns were validated upstream.
    pub fn from_record(index: usize, record: &Value) -> Result<Self, SourceReadError> {
        let obj = record
            .as_object()
            .ok_or(SourceReadError::NotAnObject(index))?;
        let field = |name: &str| obj.get(name).map(coerce_to_string).unwrap_or_default();

        Ok(Self {
            tower_raw: field(TOWER_COLUMN),
            floor_raw: field(FLOOR_COLUMN),
            companies_raw: field(COMPANIES_COLUMN),
        })
    }
}

/// String form of a cell value.
///
/// Strings pass through untouched, numbers and booleans use their JSON
/// text, null becomes empty, and nested values are serialized.
pub fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

// =============================================================================
// Keys
// =============================================================================

/// Normalized tower identifier, always starting with `Tower-`.
///
/// Only [`crate::transform::normalize`] constructs these from raw input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TowerKey(pub(crate) String);

impl TowerKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for TowerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// Hashes like the inner `String`, so `&str` lookups match.
impl std::borrow::Borrow<str> for TowerKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TowerKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Floor label, used verbatim.
pub type FloorKey = String;

// =============================================================================
// Output
// =============================================================================

/// One floor of a tower.
///
/// Field order is the wire order: `name` then `floor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorEntry {
    pub name: Vec<String>,
    pub floor: FloorKey,
}

/// One tower with its floors.
///
/// Field order is the wire order: `data` then `tower`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TowerRecord {
    pub data: Vec<FloorEntry>,
    pub tower: TowerKey,
}

impl TowerRecord {
    pub fn floor(&self, floor: &str) -> Option<&FloorEntry> {
        self.data.iter().find(|f| f.floor == floor)
    }
}

/// Final converted document: towers in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputDocument {
    pub towers: Vec<TowerRecord>,
}

impl OutputDocument {
    pub fn len(&self) -> usize {
        self.towers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.towers.is_empty()
    }

    pub fn tower(&self, key: &str) -> Option<&TowerRecord> {
        self.towers.iter().find(|t| t.tower.as_str() == key)
    }

    /// Total number of floor entries across all towers.
    pub fn floor_count(&self) -> usize {
        self.towers.iter().map(|t| t.data.len()).sum()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
