//! Required column check with fuzzy suggestions.
//!
//! Runs once per input, before any row is touched. A failure stops the
//! whole conversion.

use serde::{Deserialize, Serialize};

use crate::error::{MissingField, SchemaError};

/// Default minimum similarity for a suggestion.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;

/// How column names are compared when looking for a suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityConfig {
    /// Minimum ratio (0.0 to 1.0) a candidate must reach.
    pub threshold: f64,
    /// Compare lowercased names.
    #[serde(default = "default_ignore_case")]
    pub ignore_case: bool,
}

fn default_ignore_case() -> bool {
    true
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
            ignore_case: true,
        }
    }
}

impl SimilarityConfig {
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    /// Similarity ratio between two names under this config.
    pub fn ratio(&self, a: &str, b: &str) -> f64 {
        if self.ignore_case {
            similarity_ratio(&a.to_lowercase(), &b.to_lowercase())
        } else {
            similarity_ratio(a, b)
        }
    }
}

/// Check that every required column is present.
///
/// Returns every missing column at once, each with its best suggestion.
/// Columns that already satisfy another requirement are never suggested.
pub fn validate_columns<S: AsRef<str>>(
    actual: &[S],
    required: &[&str],
    config: &SimilarityConfig,
) -> Result<(), SchemaError> {
    let present = |name: &str| actual.iter().any(|c| c.as_ref() == name);

    let candidates: Vec<&str> = actual
        .iter()
        .map(|c| c.as_ref())
        .filter(|c| !required.contains(c))
        .collect();

    let missing: Vec<MissingField> = required
        .iter()
        .filter(|field| !present(field))
        .map(|field| MissingField {
            field: field.to_string(),
            suggestion: suggest(field, &candidates, config),
        })
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::from_missing(missing))
    }
}

/// Best fuzzy match for `missing` among `candidates`.
///
/// Ties keep the earliest candidate. Returns `None` when nothing reaches
/// the threshold.
pub fn suggest<S: AsRef<str>>(
    missing: &str,
    candidates: &[S],
    config: &SimilarityConfig,
) -> Option<String> {
    let mut best: Option<(&str, f64)> = None;

    for candidate in candidates {
        let candidate = candidate.as_ref();
        let ratio = config.ratio(missing, candidate);
        if ratio < config.threshold {
            continue;
        }
        if best.map_or(true, |(_, r)| ratio > r) {
            best = Some((candidate, ratio));
        }
    }

    best.map(|(c, _)| c.to_string())
}

/// Levenshtein distance ratio in `[0, 1]`; 1.0 means identical.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - (levenshtein(a, b) as f64 / max_len as f64)
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::REQUIRED_COLUMNS;

    #[test]
    fn test_all_columns_present() {
        let cols = ["Tower Name", "Floor Number", "Company Name(s)", "Notes"];
        assert!(validate_columns(&cols, &REQUIRED_COLUMNS, &SimilarityConfig::default()).is_ok());
    }

    #[test]
    fn test_typo_gets_suggestion() {
        let cols = ["Tower Nam", "Floor Number", "Company Name(s)"];
        let err = validate_columns(&cols, &REQUIRED_COLUMNS, &SimilarityConfig::default())
            .unwrap_err();

        assert!(err.has_suggestions());
        assert_eq!(err.missing_names(), vec!["Tower Name"]);
        assert_eq!(err.missing()[0].suggestion.as_deref(), Some("Tower Nam"));
    }

    #[test]
    fn test_missing_without_close_match() {
        let cols = ["Tower Name", "Floor Number"];
        let err = validate_columns(&cols, &REQUIRED_COLUMNS, &SimilarityConfig::default())
            .unwrap_err();

        assert!(!err.has_suggestions());
        assert_eq!(err.missing_names(), vec!["Company Name(s)"]);
        assert!(err.missing()[0].suggestion.is_none());
    }

    #[test]
    fn test_every_missing_field_reported() {
        let cols = ["Building", "Level"];
        let err = validate_columns(&cols, &REQUIRED_COLUMNS, &SimilarityConfig::default())
            .unwrap_err();
        assert_eq!(err.missing().len(), 3);
    }

    #[test]
    fn test_case_only_difference() {
        let cols = ["tower name", "Floor Number", "Company Name(s)"];
        let err = validate_columns(&cols, &REQUIRED_COLUMNS, &SimilarityConfig::default())
            .unwrap_err();
        assert_eq!(err.missing()[0].suggestion.as_deref(), Some("tower name"));

        let strict = SimilarityConfig { threshold: 0.95, ignore_case: false };
        let err = validate_columns(&cols, &REQUIRED_COLUMNS, &strict).unwrap_err();
        assert!(err.missing()[0].suggestion.is_none());
    }

    #[test]
    fn test_suggest_picks_best() {
        let candidates = ["Floor", "Floor Numbr", "Floor Num"];
        let best = suggest("Floor Number", &candidates, &SimilarityConfig::default());
        assert_eq!(best.as_deref(), Some("Floor Numbr"));
    }

    #[test]
    fn test_threshold_is_configurable() {
        let candidates = ["Tower"];
        assert!(suggest("Tower Name", &candidates, &SimilarityConfig::default()).is_none());
        let loose = SimilarityConfig::with_threshold(0.4);
        assert_eq!(suggest("Tower Name", &candidates, &loose).as_deref(), Some("Tower"));
    }

    #[test]
    fn test_present_required_column_not_suggested() {
        // "Floor Number" is taken; it must not be offered for "Tower Name".
        let cols = ["Floor Number", "Company Name(s)"];
        let loose = SimilarityConfig::with_threshold(0.0);
        let err = validate_columns(&cols, &REQUIRED_COLUMNS, &loose).unwrap_err();
        assert!(err.missing()[0].suggestion.is_none());
    }

    #[test]
    fn test_similarity_ratio() {
        assert_eq!(similarity_ratio("abc", "abc"), 1.0);
        assert_eq!(similarity_ratio("", ""), 1.0);
        assert!((similarity_ratio("Tower Nam", "Tower Name") - 0.9).abs() < 1e-9);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
    }
}
