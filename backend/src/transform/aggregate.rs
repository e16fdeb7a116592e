//! Fold flat rows into a tower → floor → companies table.
//!
//! ```text
//! Flat rows                         AggregationTable
//! ┌──────────────────────────┐      ┌──────────────────────────────┐
//! │ Tower A │ 1 │ X, Y       │      │ Tower-Tower A                │
//! │ Tower A │ 1 │ Y, Z       │  →   │   1 → {X, Y, Z}              │
//! │ Tower A │ 2 │ W          │      │   2 → {W}                    │
//! │ Tower B │ 1 │ X          │      │ Tower-Tower B                │
//! └──────────────────────────┘      │   1 → {X}                    │
//!                                   └──────────────────────────────┘
//! ```
//!
//! Towers, floors and companies all keep first-seen order so the built
//! document is deterministic.

use std::collections::{HashMap, HashSet};

use super::normalize::normalize;
use crate::models::{FloorKey, Row, TowerKey};

/// Distinct company names for one (tower, floor), in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanySet {
    names: Vec<String>,
    seen: HashSet<String>,
}

impl CompanySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a name; returns `false` if it was already present.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.seen.contains(&name) {
            return false;
        }
        self.seen.insert(name.clone());
        self.names.push(name);
        true
    }

    pub fn extend<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.insert(name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.names
    }
}

/// Floors of one tower, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct FloorTable {
    floors: Vec<(FloorKey, CompanySet)>,
    index: HashMap<FloorKey, usize>,
}

impl FloorTable {
    fn entry(&mut self, floor: FloorKey) -> &mut CompanySet {
        let idx = match self.index.get(&floor) {
            Some(&idx) => idx,
            None => {
                self.index.insert(floor.clone(), self.floors.len());
                self.floors.push((floor, CompanySet::new()));
                self.floors.len() - 1
            }
        };
        &mut self.floors[idx].1
    }

    pub fn get(&self, floor: &str) -> Option<&CompanySet> {
        self.index.get(floor).map(|&idx| &self.floors[idx].1)
    }

    pub fn len(&self) -> usize {
        self.floors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.floors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FloorKey, &CompanySet)> {
        self.floors.iter().map(|(f, c)| (f, c))
    }

    pub fn into_entries(self) -> Vec<(FloorKey, CompanySet)> {
        self.floors
    }
}

/// Working table for one conversion run.
///
/// Owned by a single call; build a fresh one per input.
#[derive(Debug, Clone, Default)]
pub struct AggregationTable {
    towers: Vec<(TowerKey, FloorTable)>,
    index: HashMap<TowerKey, usize>,
    skip_empty_companies: bool,
}

impl AggregationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop empty company tokens (e.g. from a trailing comma) instead of
    /// keeping them as `""`.
    pub fn skip_empty_companies(mut self, skip: bool) -> Self {
        self.skip_empty_companies = skip;
        self
    }

    /// Merge one row into the table.
    pub fn add_row(&mut self, row: &Row) {
        let tower = normalize(&row.tower_raw);
        let floor: FloorKey = row.floor_raw.clone();
        let skip_empty = self.skip_empty_companies;

        let companies = split_companies(&row.companies_raw)
            .filter(|name| !(skip_empty && name.is_empty()));

        self.tower_entry(tower).entry(floor).extend(companies);
    }

    fn tower_entry(&mut self, tower: TowerKey) -> &mut FloorTable {
        let idx = match self.index.get(&tower) {
            Some(&idx) => idx,
            None => {
                self.index.insert(tower.clone(), self.towers.len());
                self.towers.push((tower, FloorTable::default()));
                self.towers.len() - 1
            }
        };
        &mut self.towers[idx].1
    }

    pub fn get(&self, tower: &str, floor: &str) -> Option<&CompanySet> {
        self.tower(tower).and_then(|floors| floors.get(floor))
    }

    pub fn tower(&self, tower: &str) -> Option<&FloorTable> {
        self.index.get(tower).map(|&idx| &self.towers[idx].1)
    }

    pub fn tower_count(&self) -> usize {
        self.towers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.towers.is_empty()
    }

    pub fn into_entries(self) -> Vec<(TowerKey, FloorTable)> {
        self.towers
    }
}

/// Split a comma-separated company cell into trimmed names.
///
/// Empty segments come through as `""`.
pub fn split_companies(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim)
}

/// Fold every row into a fresh table.
pub fn aggregate<'a, I>(rows: I) -> AggregationTable
where
    I: IntoIterator<Item = &'a Row>,
{
    aggregate_with(rows, AggregationTable::new())
}

/// Fold rows into the given (empty) table, keeping its settings.
pub fn aggregate_with<'a, I>(rows: I, mut table: AggregationTable) -> AggregationTable
where
    I: IntoIterator<Item = &'a Row>,
{
    for row in rows {
        table.add_row(row);
    }
    table
}
