//! Named column of cells.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::cell::Cell;

/// A named, ordered sequence of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Values in row order.
    pub cells: Vec<Cell>,
}

impl Column {
    /// Create a column from anything convertible to cells.
    pub fn new<I, T>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Cell>,
    {
        Self {
            name: name.into(),
            cells: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Count of missing-marker cells.
    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_missing()).count()
    }

    /// Count of distinct non-blank values.
    pub fn distinct_count(&self) -> usize {
        distinct_non_blank(&self.cells)
    }

    /// True when every cell is a number or missing.
    pub fn is_numeric_typed(&self) -> bool {
        self.cells
            .iter()
            .all(|c| matches!(c, Cell::Number(_) | Cell::Missing))
    }

    /// Null percentage (0-100).
    pub fn missing_percentage(&self) -> f64 {
        if self.cells.is_empty() {
            0.0
        } else {
            (self.missing_count() as f64 / self.cells.len() as f64) * 100.0
        }
    }
}

/// Count distinct values among the non-blank cells of a slice.
pub(crate) fn distinct_non_blank(cells: &[Cell]) -> usize {
    cells
        .iter()
        .filter(|c| !c.is_blank())
        .map(Cell::key)
        .collect::<HashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_ignores_blanks() {
        let col = Column::new(
            "status",
            vec![Cell::text("a"), Cell::text(""), Cell::Missing, Cell::text("a")],
        );
        assert_eq!(col.distinct_count(), 1);
        assert_eq!(col.missing_count(), 1);
    }

    #[test]
    fn test_numeric_typed() {
        let col = Column::new("q", vec![Cell::Number(1.0), Cell::Missing]);
        assert!(col.is_numeric_typed());

        let col = Column::new("q", vec![Cell::Number(1.0), Cell::text("2")]);
        assert!(!col.is_numeric_typed());
    }
}
