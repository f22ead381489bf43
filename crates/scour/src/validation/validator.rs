//! Post-cleaning sanity checks.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cleaning::{IssueKind, IssueRecord};
use crate::schema::Dataset;

use super::checks::{Check, DateColumnCheck, DuplicateRowCheck, MissingValueCheck, NumericColumnCheck};

/// Which columns the validator treats specially.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Columns that must be numeric and non-negative when present.
    pub numeric_columns: Vec<String>,
    /// Column whose entries must all be valid dates when present.
    pub date_column: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            numeric_columns: vec![
                "Quantity".to_string(),
                "Price Per Unit".to_string(),
                "Total Spent".to_string(),
            ],
            date_column: "Transaction Date".to_string(),
        }
    }
}

/// Runs every check against a dataset. Never modifies the data.
pub struct Validator {
    checks: Vec<Box<dyn Check>>,
}

impl Validator {
    /// Create a validator with the default column designations.
    pub fn new() -> Self {
        Self::with_config(ValidationConfig::default())
    }

    pub fn with_config(config: ValidationConfig) -> Self {
        Self {
            checks: vec![
                Box::new(MissingValueCheck),
                Box::new(DuplicateRowCheck),
                Box::new(NumericColumnCheck {
                    columns: config.numeric_columns,
                }),
                Box::new(DateColumnCheck {
                    column: config.date_column,
                }),
            ],
        }
    }

    /// Run all checks. An empty result means the dataset is clean.
    pub fn validate<'a>(&self, dataset: impl Into<Option<&'a Dataset>>) -> Vec<IssueRecord> {
        let Some(dataset) = dataset.into() else {
            warn!("no dataset provided to validate");
            return vec![IssueRecord::validation(
                IssueKind::NoData,
                "No dataset provided to validate.",
            )];
        };

        let issues: Vec<IssueRecord> = self
            .checks
            .iter()
            .flat_map(|check| check.check(dataset))
            .collect();
        debug!(issues = issues.len(), "validation finished");
        issues
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Cell, Column};

    fn sales(quantity: Vec<Cell>, dates: Vec<Cell>) -> Dataset {
        let rows = quantity.len();
        Dataset::new(vec![
            Column::new("Transaction ID", (0..rows).map(|i| format!("T{}", i))),
            Column::new("Quantity", quantity),
            Column::new("Transaction Date", dates),
        ])
        .unwrap()
    }

    #[test]
    fn test_clean_dataset_has_no_issues() {
        let ds = sales(
            vec![Cell::Number(1.0), Cell::Number(2.0)],
            vec![Cell::text("2023-01-01"), Cell::text("2023-01-02")],
        );
        assert!(Validator::new().validate(&ds).is_empty());
    }

    #[test]
    fn test_absent_dataset() {
        let issues = Validator::new().validate(None::<&Dataset>);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "No dataset provided to validate.");
    }

    #[test]
    fn test_all_checks_run() {
        let ds = sales(
            vec![Cell::Number(-1.0), Cell::Missing, Cell::Number(3.0)],
            vec![Cell::text("2023-01-01"), Cell::text("garbage"), Cell::Missing],
        );
        let messages: Vec<String> = Validator::new()
            .validate(&ds)
            .into_iter()
            .map(|i| i.message)
            .collect();

        assert_eq!(
            messages,
            vec![
                "Dataset contains 2 missing values total.",
                "Quantity contains 1 negative values.",
                "Transaction Date contains 2 invalid or missing dates.",
            ]
        );
    }

    #[test]
    fn test_text_in_numeric_column() {
        let ds = sales(
            vec![Cell::Number(1.0), Cell::text("two")],
            vec![Cell::text("2023-01-01"), Cell::text("2023-01-02")],
        );
        let issues = Validator::new().validate(&ds);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::NotNumeric);
        assert_eq!(issues[0].message, "Quantity is not numeric.");
    }

    #[test]
    fn test_duplicate_rows_reported() {
        let ds = Dataset::new(vec![Column::new("a", ["x", "x", "y"])]).unwrap();
        let issues = Validator::new().validate(&ds);
        assert_eq!(issues[0].message, "Dataset contains 1 duplicate rows.");
    }

    #[test]
    fn test_custom_columns() {
        let config = ValidationConfig {
            numeric_columns: vec!["Amount".into()],
            date_column: "When".into(),
        };
        let ds = Dataset::new(vec![
            Column::new("Amount", [-5.0, 2.0]),
            Column::new("When", ["yesterday", "2024-01-01"]),
        ])
        .unwrap();
        let issues = Validator::with_config(config).validate(&ds);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].column.as_deref(), Some("Amount"));
        assert_eq!(issues[1].count, Some(1));
    }
}
