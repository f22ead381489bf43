//! Individual post-cleaning checks.

use crate::cleaning::{IssueKind, IssueRecord};
use crate::inference::coerce_date;
use crate::schema::{Cell, Dataset};

/// Trait for checks run by the [`Validator`](super::Validator).
pub trait Check {
    /// Inspect the dataset and report what remains wrong.
    fn check(&self, dataset: &Dataset) -> Vec<IssueRecord>;
}

/// Reports the total number of missing cells.
pub struct MissingValueCheck;

impl Check for MissingValueCheck {
    fn check(&self, dataset: &Dataset) -> Vec<IssueRecord> {
        let missing = dataset.missing_count();
        if missing == 0 {
            return Vec::new();
        }
        vec![
            IssueRecord::validation(
                IssueKind::MissingValues,
                format!("Dataset contains {} missing values total.", missing),
            )
            .with_count(missing),
        ]
    }
}

/// Reports rows that still repeat an earlier row.
pub struct DuplicateRowCheck;

impl Check for DuplicateRowCheck {
    fn check(&self, dataset: &Dataset) -> Vec<IssueRecord> {
        let duplicates = dataset.duplicate_row_count();
        if duplicates == 0 {
            return Vec::new();
        }
        vec![
            IssueRecord::validation(
                IssueKind::DuplicateRows,
                format!("Dataset contains {} duplicate rows.", duplicates),
            )
            .with_count(duplicates),
        ]
    }
}

/// Checks that designated columns are numeric and non-negative.
pub struct NumericColumnCheck {
    pub columns: Vec<String>,
}

impl Check for NumericColumnCheck {
    fn check(&self, dataset: &Dataset) -> Vec<IssueRecord> {
        let mut issues = Vec::new();

        for name in &self.columns {
            let Some(column) = dataset.column(name) else {
                continue;
            };

            if !column.is_numeric_typed() {
                issues.push(
                    IssueRecord::validation(IssueKind::NotNumeric, format!("{} is not numeric.", name))
                        .with_column(name),
                );
                continue;
            }

            let negatives = column
                .cells
                .iter()
                .filter(|c| matches!(c, Cell::Number(n) if *n < 0.0))
                .count();
            if negatives > 0 {
                issues.push(
                    IssueRecord::validation(
                        IssueKind::NegativeValues,
                        format!("{} contains {} negative values.", name, negatives),
                    )
                    .with_column(name)
                    .with_count(negatives),
                );
            }
        }

        issues
    }
}

/// Counts missing or unparseable entries in the designated date column.
pub struct DateColumnCheck {
    pub column: String,
}

impl Check for DateColumnCheck {
    fn check(&self, dataset: &Dataset) -> Vec<IssueRecord> {
        let Some(column) = dataset.column(&self.column) else {
            return Vec::new();
        };

        let invalid = column
            .cells
            .iter()
            .filter(|c| coerce_date(c).is_none())
            .count();
        if invalid == 0 {
            return Vec::new();
        }
        vec![
            IssueRecord::validation(
                IssueKind::InvalidDateEntries,
                format!(
                    "{} contains {} invalid or missing dates.",
                    self.column, invalid
                ),
            )
            .with_column(&self.column)
            .with_count(invalid),
        ]
    }
}
