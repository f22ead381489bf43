//! Issue records: the audit trail of a cleaning run.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Pipeline stage that produced an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Cleaning,
    Validation,
}

/// What an issue describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// No dataset was supplied.
    NoData,
    /// The dataset had no columns or no rows.
    EmptyDataset,
    /// Column names had surrounding whitespace.
    ColumnNamesNormalized,
    /// Columns removed by configuration.
    ColumnsDropped,
    /// Values rewritten by a configured mapping.
    ValuesReplaced,
    /// Exact duplicate rows removed.
    DuplicatesRemoved,
    /// Audit entry listing every column's detected type.
    ColumnTypes,
    /// Numbers clipped into a configured range.
    ValuesClamped,
    /// Dates outside a configured range set to missing.
    DatesOutOfRange,
    /// Outliers set to missing ahead of imputation.
    OutliersRemoved,
    /// Unparseable dates set to missing.
    InvalidDates,
    /// Missing numeric values imputed.
    MissingFilled,
    /// Negative quantities made positive.
    NegativesCorrected,
    /// Missing categorical values replaced by the placeholder label.
    UnknownFilled,
    /// Surrounding whitespace trimmed from free text.
    WhitespaceTrimmed,
    /// Validation: missing cells remain.
    MissingValues,
    /// Validation: duplicate rows remain.
    DuplicateRows,
    /// Validation: a numeric-critical column holds non-numbers.
    NotNumeric,
    /// Validation: a numeric-critical column holds negatives.
    NegativeValues,
    /// Validation: the date column holds missing or unparseable entries.
    InvalidDateEntries,
}

impl IssueKind {
    /// Get a human-readable label for the issue kind.
    pub fn label(&self) -> &'static str {
        match self {
            IssueKind::NoData => "No Data",
            IssueKind::EmptyDataset => "Empty Dataset",
            IssueKind::ColumnNamesNormalized => "Column Names Normalized",
            IssueKind::ColumnsDropped => "Columns Dropped",
            IssueKind::ValuesReplaced => "Values Replaced",
            IssueKind::DuplicatesRemoved => "Duplicates Removed",
            IssueKind::ColumnTypes => "Column Types",
            IssueKind::ValuesClamped => "Values Clamped",
            IssueKind::DatesOutOfRange => "Dates Out Of Range",
            IssueKind::OutliersRemoved => "Outliers Removed",
            IssueKind::InvalidDates => "Invalid Dates",
            IssueKind::MissingFilled => "Missing Filled",
            IssueKind::NegativesCorrected => "Negatives Corrected",
            IssueKind::UnknownFilled => "Unknown Filled",
            IssueKind::WhitespaceTrimmed => "Whitespace Trimmed",
            IssueKind::MissingValues => "Missing Values",
            IssueKind::DuplicateRows => "Duplicate Rows",
            IssueKind::NotNumeric => "Not Numeric",
            IssueKind::NegativeValues => "Negative Values",
            IssueKind::InvalidDateEntries => "Invalid Date Entries",
        }
    }
}

/// One entry in the issue log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub stage: Stage,
    pub kind: IssueKind,
    /// Affected column, when the issue concerns one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Number of affected values or rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// Human-readable description.
    pub message: String,
}

impl IssueRecord {
    /// Create an issue raised while cleaning.
    pub fn cleaning(kind: IssueKind, message: impl Into<String>) -> Self {
        Self::new(Stage::Cleaning, kind, message)
    }

    /// Create an issue raised while validating.
    pub fn validation(kind: IssueKind, message: impl Into<String>) -> Self {
        Self::new(Stage::Validation, kind, message)
    }

    fn new(stage: Stage, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            stage,
            kind,
            column: None,
            count: None,
            message: message.into(),
        }
    }

    /// Set the affected column.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Set the affected count.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

impl fmt::Display for IssueRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_builder() {
        let issue = IssueRecord::cleaning(
            IssueKind::MissingFilled,
            "Price: filled 1 missing/invalid values with median (10).",
        )
        .with_column("Price")
        .with_count(1);

        assert_eq!(issue.stage, Stage::Cleaning);
        assert_eq!(issue.column.as_deref(), Some("Price"));
        assert_eq!(issue.count, Some(1));
        assert_eq!(
            issue.to_string(),
            "Price: filled 1 missing/invalid values with median (10)."
        );
    }

    #[test]
    fn test_serializes_without_empty_fields() {
        let issue = IssueRecord::validation(IssueKind::MissingValues, "x");
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["stage"], "validation");
        assert_eq!(json["kind"], "missing_values");
        assert!(json.get("column").is_none());
    }
}
