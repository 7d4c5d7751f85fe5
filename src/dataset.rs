//! In-memory numeric table compared by the shift detector
//!
//! Rows are stored as `Vec<f64>` in column order; column names are kept once.
//! Categorical columns are expected to be encoded or dropped by the caller.

use crate::error::{NumericError, Result, Side, ValidationError};
use regex::Regex;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Ordered collection of numeric rows with named columns
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl Dataset {
    /// Create a dataset, rejecting duplicate column names and ragged rows
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(ValidationError::DuplicateColumn(name.clone()).into());
            }
        }

        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(ValidationError::RaggedRow {
                    row: i,
                    expected: columns.len(),
                    actual: row.len(),
                }
                .into());
            }
        }

        Ok(Self { columns, rows })
    }

    /// Build a dataset from name → value records
    ///
    /// Column order follows the sorted key order of the first record. Every
    /// record must carry exactly the same keys.
    pub fn from_records(records: &[BTreeMap<String, f64>]) -> Result<Self> {
        let Some(first) = records.first() else {
            return Self::new(Vec::new(), Vec::new());
        };
        let columns: Vec<String> = first.keys().cloned().collect();

        let mut rows: Vec<Vec<f64>> = Vec::with_capacity(records.len());
        for record in records {
            if record.len() != columns.len() || !columns.iter().all(|c| record.contains_key(c)) {
                let (missing_in_reference, missing_in_current) = column_difference(
                    &columns,
                    &record.keys().cloned().collect::<Vec<_>>(),
                );
                return Err(ValidationError::ColumnMismatch {
                    missing_in_reference,
                    missing_in_current,
                }
                .into());
            }
            rows.push(columns.iter().map(|c| record[c]).collect());
        }

        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Row `i` as a name → value map
    pub fn record(&self, i: usize) -> Option<HashMap<&str, f64>> {
        let row = self.rows.get(i)?;
        Some(
            self.columns
                .iter()
                .map(String::as_str)
                .zip(row.iter().copied())
                .collect(),
        )
    }

    /// Keep only `names`, in that order
    pub fn select(&self, names: &[&str]) -> Result<Self> {
        let indices = names
            .iter()
            .map(|name| {
                self.column_index(name)
                    .ok_or_else(|| ValidationError::UnknownColumn(name.to_string()))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i]).collect())
            .collect();

        Self::new(names.iter().map(|s| s.to_string()).collect(), rows)
    }

    /// Remove the named columns; unknown names are an error
    pub fn drop_columns(&self, names: &[&str]) -> Result<Self> {
        if let Some(unknown) = names.iter().find(|n| self.column_index(n).is_none()) {
            return Err(ValidationError::UnknownColumn(unknown.to_string()).into());
        }
        let keep: Vec<&str> = self
            .columns
            .iter()
            .map(String::as_str)
            .filter(|c| !names.contains(c))
            .collect();
        self.select(&keep)
    }

    /// Remove every column whose name matches `pattern`
    pub fn exclude_matching(&self, pattern: &Regex) -> Result<Self> {
        let keep: Vec<&str> = self
            .columns
            .iter()
            .map(String::as_str)
            .filter(|c| !pattern.is_match(c))
            .collect();
        self.select(&keep)
    }

    /// Partition rows into `column <= threshold` and `column > threshold`
    ///
    /// Rows whose value is NaN land in neither half.
    pub fn split_at_threshold(&self, column: &str, threshold: f64) -> Result<(Self, Self)> {
        let idx = self
            .column_index(column)
            .ok_or_else(|| ValidationError::UnknownColumn(column.to_string()))?;

        let (le, gt): (Vec<_>, Vec<_>) = self
            .rows
            .iter()
            .filter(|row| !row[idx].is_nan())
            .cloned()
            .partition(|row| row[idx] <= threshold);

        Ok((
            Self {
                columns: self.columns.clone(),
                rows: le,
            },
            Self {
                columns: self.columns.clone(),
                rows: gt,
            },
        ))
    }

    /// Return the first non-finite value as an error
    pub(crate) fn check_finite(&self, side: Side) -> std::result::Result<(), NumericError> {
        for (i, row) in self.rows.iter().enumerate() {
            if let Some(j) = row.iter().position(|v| !v.is_finite()) {
                return Err(NumericError::NonFinite {
                    side,
                    row: i,
                    column: self.columns[j].clone(),
                    value: row[j],
                });
            }
        }
        Ok(())
    }

    /// Rows in lexicographic `total_cmp` order
    pub(crate) fn canonical_rows(&self) -> Vec<&[f64]> {
        let mut rows: Vec<&[f64]> = self.rows.iter().map(Vec::as_slice).collect();
        rows.sort_by(|a, b| lexicographic(a, b));
        rows
    }
}

fn lexicographic(a: &[f64], b: &[f64]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.total_cmp(y))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Columns of `current` absent from `reference`, and vice versa
pub(crate) fn column_difference(
    reference: &[String],
    current: &[String],
) -> (Vec<String>, Vec<String>) {
    let missing_in_reference = current
        .iter()
        .filter(|c| !reference.contains(c))
        .cloned()
        .collect();
    let missing_in_current = reference
        .iter()
        .filter(|c| !current.contains(c))
        .cloned()
        .collect();
    (missing_in_reference, missing_in_current)
}
