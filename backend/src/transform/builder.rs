//! Turn a finished [`AggregationTable`] into the output document.

use super::aggregate::AggregationTable;
use crate::models::{FloorEntry, OutputDocument, TowerRecord};

/// Build the ordered document, consuming the table.
///
/// Towers and floors keep the order they were first seen in. Uniqueness
/// of towers and floors comes from the table itself.
pub fn build(table: AggregationTable) -> OutputDocument {
    let towers = table
        .into_entries()
        .into_iter()
        .map(|(tower, floors)| {
            let data = floors
                .into_entries()
                .into_iter()
                .map(|(floor, companies)| FloorEntry {
                    name: companies.into_vec(),
                    floor,
                })
                .collect();
            TowerRecord { data, tower }
        })
        .collect();

    OutputDocument { towers }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Row;
    use crate::transform::aggregate::aggregate;

    #[test]
    fn test_empty_table() {
        let doc = build(AggregationTable::new());
        assert!(doc.is_empty());
        assert_eq!(serde_json::to_string(&doc).unwrap(), "[]");
    }

    #[test]
    fn test_build_preserves_order() {
        let rows = vec![
            Row::new("B", "3", "X"),
            Row::new("A", "1", "Y"),
            Row::new("B", "1", "Z, X"),
        ];
        let doc = build(aggregate(&rows));

        assert_eq!(doc.len(), 2);
        assert_eq!(doc.towers[0].tower.as_str(), "Tower-B");
        assert_eq!(doc.towers[1].tower.as_str(), "Tower-A");

        let floors: Vec<&str> = doc.towers[0].data.iter().map(|f| f.floor.as_str()).collect();
        assert_eq!(floors, vec!["3", "1"]);
        assert_eq!(doc.towers[0].data[1].name, vec!["Z", "X"]);
    }

    #[test]
    fn test_build_is_stable() {
        let rows = vec![
            Row::new("A", "1", "C, B, A"),
            Row::new("A", "1", "D, A"),
        ];
        let first = build(aggregate(&rows));
        let second = build(aggregate(&rows));
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_duplicate_towers_or_floors() {
        let rows = vec![
            Row::new("A", "1", "X"),
            Row::new("Tower-A", "1", "Y"),
            Row::new(" A ", "2", "Z"),
            Row::new("A", "2", "Z"),
        ];
        let doc = build(aggregate(&rows));

        assert_eq!(doc.len(), 1);
        assert_eq!(doc.floor_count(), 2);
        assert_eq!(doc.towers[0].floor("2").unwrap().name, vec!["Z"]);
    }
}
