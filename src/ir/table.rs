//! Long-format representation tables.
//!
//! A long-format table stores one `(feature, planning unit, amount)` triple
//! per row. Feature and planning-unit columns hold 1-based indices. Values
//! that are missing or failed to parse as numbers are stored as `None`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column holding the 1-based feature index.
pub const FEATURE_COLUMN: &str = "feature";
/// Column holding the 1-based planning-unit index.
pub const PLANNING_UNIT_COLUMN: &str = "pu";
/// Column holding the representation amount.
pub const AMOUNT_COLUMN: &str = "amount";

/// Required columns of a long-format representation table.
pub const REQUIRED_COLUMNS: [&str; 3] = [FEATURE_COLUMN, PLANNING_UNIT_COLUMN, AMOUNT_COLUMN];

/// A table of named numeric columns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl Table {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a column.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        self.columns.insert(name.into(), values);
        self
    }

    /// Builds a table with the three required columns from
    /// `(feature, planning_unit, amount)` triples of 1-based indices.
    pub fn from_triples(triples: impl IntoIterator<Item = (usize, usize, f64)>) -> Self {
        let mut features = Vec::new();
        let mut units = Vec::new();
        let mut amounts = Vec::new();
        for (feature, unit, amount) in triples {
            features.push(Some(feature as f64));
            units.push(Some(unit as f64));
            amounts.push(Some(amount));
        }
        Self::new()
            .with_column(FEATURE_COLUMN, features)
            .with_column(PLANNING_UNIT_COLUMN, units)
            .with_column(AMOUNT_COLUMN, amounts)
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Names of required columns that are absent.
    pub fn missing_columns(&self) -> Vec<&'static str> {
        REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| !self.columns.contains_key(*name))
            .collect()
    }
}
