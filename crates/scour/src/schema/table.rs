//! Column-major dataset.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScourError};
use crate::inference::parse_number;

use super::cell::{Cell, CellKey};
use super::column::Column;

/// An ordered set of equally long, uniquely named columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    /// Create a dataset, checking that columns are equally long and uniquely named.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let rows = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
                return Err(ScourError::Shape(format!(
                    "column '{}' has {} rows, expected {}",
                    bad.name,
                    bad.len(),
                    rows
                )));
            }
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(ScourError::Shape(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }

        Ok(Self { columns })
    }

    /// A dataset with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a dataset from raw string records.
    ///
    /// NA-like tokens become [`Cell::Missing`]. A column whose every present
    /// field parses as a number is stored as numbers; anything else stays text.
    /// Short rows are padded with missing cells and long rows truncated.
    pub fn from_records(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let columns = headers
            .into_iter()
            .enumerate()
            .map(|(index, name)| {
                let raw: Vec<Option<&str>> = rows
                    .iter()
                    .map(|row| {
                        row.get(index)
                            .map(String::as_str)
                            .filter(|v| !Self::is_null_token(v))
                    })
                    .collect();

                let numeric: Option<Vec<Option<f64>>> = raw
                    .iter()
                    .map(|v| match v {
                        Some(s) => parse_number(s).map(Some),
                        None => Some(None),
                    })
                    .collect();

                let has_values = raw.iter().any(Option::is_some);
                let cells = match numeric {
                    Some(values) if has_values => values.into_iter().map(Cell::from).collect(),
                    _ => raw.into_iter().map(Cell::from).collect(),
                };

                Column { name, cells }
            })
            .collect();

        Self::new(columns)
    }

    /// Check if a raw field represents a missing value.
    pub fn is_null_token(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("na")
            || trimmed.eq_ignore_ascii_case("n/a")
            || trimmed.eq_ignore_ascii_case("nan")
            || trimmed.eq_ignore_ascii_case("null")
            || trimmed.eq_ignore_ascii_case("none")
            || trimmed.eq_ignore_ascii_case("#n/a")
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.column_count())
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.row_count() == 0
    }

    /// All columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get all column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get the position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.columns.get(col).and_then(|c| c.cells.get(row))
    }

    /// Cells of one row, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&Cell>> {
        if index >= self.row_count() {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.cells[index]).collect())
    }

    /// Total number of missing cells.
    pub fn missing_count(&self) -> usize {
        self.columns.iter().map(Column::missing_count).sum()
    }

    /// Number of rows that exactly repeat an earlier row.
    pub fn duplicate_row_count(&self) -> usize {
        self.first_occurrence_mask()
            .iter()
            .filter(|keep| !**keep)
            .count()
    }

    /// Remove exact duplicate rows, keeping first occurrences. Returns the number removed.
    pub fn remove_duplicate_rows(&mut self) -> usize {
        let mask = self.first_occurrence_mask();
        let removed = mask.iter().filter(|keep| !**keep).count();
        if removed > 0 {
            for column in &mut self.columns {
                let mut keep = mask.iter();
                column.cells.retain(|_| *keep.next().unwrap_or(&true));
            }
        }
        removed
    }

    /// Remove a column by name. Returns it when present.
    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        let index = self.column_index(name)?;
        Some(self.columns.remove(index))
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    fn first_occurrence_mask(&self) -> Vec<bool> {
        let mut seen: HashSet<Vec<CellKey<'_>>> = HashSet::with_capacity(self.row_count());
        (0..self.row_count())
            .map(|row| {
                let key: Vec<CellKey<'_>> =
                    self.columns.iter().map(|c| c.cells[row].key()).collect();
                seen.insert(key)
            })
            .collect()
    }
}
