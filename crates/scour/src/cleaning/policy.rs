//! Per-type cleaning policies.
//!
//! A policy takes one column and its detected type and returns the cleaned
//! cells together with the issues it raised. Policies are pure: the input
//! slice is never modified.

use tracing::debug;

use crate::inference::{
    ClassifierConfig, DateFormat, TypeClassifier, coerce_number, mean, median, most_frequent,
};
use crate::schema::{Cell, ColumnType, format_timestamp};

use super::config::{ImputationStrategy, PolicyConfig};
use super::issue::{IssueKind, IssueRecord};

/// Result of applying a policy to one column.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyOutcome {
    pub cells: Vec<Cell>,
    pub issues: Vec<IssueRecord>,
}

impl PolicyOutcome {
    fn unchanged(cells: &[Cell]) -> Self {
        Self {
            cells: cells.to_vec(),
            issues: Vec::new(),
        }
    }
}

/// Maps a column type to its cleaning rule.
#[derive(Debug, Clone, Default)]
pub struct CleaningPolicy {
    config: PolicyConfig,
    imputation: ImputationStrategy,
    classifier: TypeClassifier,
}

impl CleaningPolicy {
    /// Create a policy with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: PolicyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_imputation(mut self, imputation: ImputationStrategy) -> Self {
        self.imputation = imputation;
        self
    }

    /// Use these thresholds when re-detecting a date column's format.
    pub fn with_classifier_config(mut self, config: ClassifierConfig) -> Self {
        self.classifier = TypeClassifier::with_config(config);
        self
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Clean one column according to its type.
    pub fn apply(&self, name: &str, cells: &[Cell], column_type: ColumnType) -> PolicyOutcome {
        match column_type {
            ColumnType::Identifier => self.clean_identifier(cells),
            ColumnType::Date => self.clean_date(name, cells),
            ColumnType::Numeric => self.clean_numeric(name, cells),
            ColumnType::Categorical => self.clean_categorical(name, cells),
            ColumnType::Text => self.clean_text(name, cells),
            ColumnType::Unknown => PolicyOutcome::unchanged(cells),
        }
    }

    /// Trim text values. Nothing is filled and no issue is raised.
    fn clean_identifier(&self, cells: &[Cell]) -> PolicyOutcome {
        let cells = cells
            .iter()
            .map(|cell| match cell {
                Cell::Text(s) => Cell::Text(s.trim().to_string()),
                other => other.clone(),
            })
            .collect();
        PolicyOutcome {
            cells,
            issues: Vec::new(),
        }
    }

    /// Parse every value with the column's detected format; failures become missing.
    fn clean_date(&self, name: &str, cells: &[Cell]) -> PolicyOutcome {
        let format = self
            .classifier
            .detect_date_format(cells)
            .unwrap_or(DateFormat::Generic);
        debug!(column = name, format = format.label(), "parsing dates");

        let mut failed = 0;
        let cleaned = cells
            .iter()
            .map(|cell| match format.coerce(cell) {
                Some(ts) => Cell::Timestamp(ts),
                None => {
                    if !cell.is_blank() {
                        failed += 1;
                    }
                    Cell::Missing
                }
            })
            .collect();

        let mut issues = Vec::new();
        if failed > 0 {
            issues.push(
                IssueRecord::cleaning(
                    IssueKind::InvalidDates,
                    format!(
                        "{}: {} invalid/unparseable entries set to missing.",
                        name, failed
                    ),
                )
                .with_column(name)
                .with_count(failed),
            );
        }
        PolicyOutcome {
            cells: cleaned,
            issues,
        }
    }

    /// Coerce to numbers, fill gaps and fix negative quantities.
    ///
    /// Under nearest-neighbour imputation the gaps are left for the engine,
    /// which fills all numeric columns together.
    fn clean_numeric(&self, name: &str, cells: &[Cell]) -> PolicyOutcome {
        let mut values: Vec<Option<f64>> = cells.iter().map(coerce_number).collect();
        let mut issues = Vec::new();

        let gaps = values.iter().filter(|v| v.is_none()).count();
        if gaps > 0 {
            let present: Vec<f64> = values.iter().flatten().copied().collect();
            if let Some(fill) = self.fill_value(&present) {
                for value in values.iter_mut().filter(|v| v.is_none()) {
                    *value = Some(fill);
                }
                issues.push(
                    IssueRecord::cleaning(
                        IssueKind::MissingFilled,
                        format!(
                            "{}: filled {} missing/invalid values with {} ({}).",
                            name,
                            gaps,
                            self.imputation.label(),
                            fill
                        ),
                    )
                    .with_column(name)
                    .with_count(gaps),
                );
            }
        }

        if self.config.is_quantity_column(name) {
            let mut flipped = 0;
            for value in values.iter_mut().flatten().filter(|v| **v < 0.0) {
                *value = value.abs();
                flipped += 1;
            }
            if flipped > 0 {
                issues.push(
                    IssueRecord::cleaning(
                        IssueKind::NegativesCorrected,
                        format!("{}: converted {} negative values to positive.", name, flipped),
                    )
                    .with_column(name)
                    .with_count(flipped),
                );
            }
        }

        PolicyOutcome {
            cells: values.into_iter().map(Cell::from).collect(),
            issues,
        }
    }

    fn fill_value(&self, present: &[f64]) -> Option<f64> {
        match self.imputation {
            ImputationStrategy::Median => median(present),
            ImputationStrategy::Mean => mean(present),
            ImputationStrategy::MostFrequent => most_frequent(present),
            ImputationStrategy::Knn { .. } => None,
        }
    }

    /// Normalize whitespace and casing; missing-like values become the placeholder.
    fn clean_categorical(&self, name: &str, cells: &[Cell]) -> PolicyOutcome {
        let mut filled = 0;
        let cleaned = cells
            .iter()
            .map(|cell| {
                let text = match cell {
                    Cell::Missing => String::new(),
                    Cell::Text(s) => collapse_whitespace(s),
                    Cell::Number(n) => n.to_string(),
                    Cell::Timestamp(ts) => format_timestamp(ts),
                };
                if is_missing_label(&text) {
                    filled += 1;
                    Cell::Text(self.config.unknown_label.clone())
                } else if text == self.config.unknown_label {
                    Cell::Text(text)
                } else {
                    Cell::Text(title_case(&text))
                }
            })
            .collect();

        let mut issues = Vec::new();
        if filled > 0 {
            issues.push(
                IssueRecord::cleaning(
                    IssueKind::UnknownFilled,
                    format!(
                        "{}: filled {} missing values with '{}'.",
                        name, filled, self.config.unknown_label
                    ),
                )
                .with_column(name)
                .with_count(filled),
            );
        }
        PolicyOutcome {
            cells: cleaned,
            issues,
        }
    }

    /// Trim surrounding whitespace from free text.
    fn clean_text(&self, name: &str, cells: &[Cell]) -> PolicyOutcome {
        let mut trimmed = 0;
        let cleaned = cells
            .iter()
            .map(|cell| match cell {
                Cell::Text(s) if s.trim().len() != s.len() => {
                    trimmed += 1;
                    Cell::Text(s.trim().to_string())
                }
                other => other.clone(),
            })
            .collect();

        let mut issues = Vec::new();
        if trimmed > 0 {
            issues.push(
                IssueRecord::cleaning(
                    IssueKind::WhitespaceTrimmed,
                    format!(
                        "{}: stripped extra whitespace from {} text values.",
                        name, trimmed
                    ),
                )
                .with_column(name)
                .with_count(trimmed),
            );
        }
        PolicyOutcome {
            cells: cleaned,
            issues,
        }
    }
}

fn is_missing_label(text: &str) -> bool {
    text.is_empty() || text.eq_ignore_ascii_case("nan") || text.eq_ignore_ascii_case("none")
}

/// Trim and collapse internal whitespace runs to one space.
fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Uppercase the first letter of every word and lowercase the rest.
/// A word starts after any non-alphabetic character.
fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_word = false;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn texts(cells: &[Cell]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_numeric_median_fill() {
        let cells = vec![
            Cell::Number(10.0),
            Cell::Number(-5.0),
            Cell::text("abc"),
            Cell::Number(10.0),
            Cell::Number(10.0),
        ];
        let outcome = CleaningPolicy::new().apply("Price", &cells, ColumnType::Numeric);

        assert_eq!(
            outcome.cells,
            vec![
                Cell::Number(10.0),
                Cell::Number(-5.0),
                Cell::Number(10.0),
                Cell::Number(10.0),
                Cell::Number(10.0),
            ]
        );
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(
            outcome.issues[0].message,
            "Price: filled 1 missing/invalid values with median (10)."
        );
    }

    #[test]
    fn test_quantity_negatives_flipped() {
        let cells = vec![Cell::Number(-2.0), Cell::Number(3.0), Cell::Missing];
        let outcome = CleaningPolicy::new().apply("Quantity", &cells, ColumnType::Numeric);

        assert_eq!(
            outcome.cells,
            vec![Cell::Number(2.0), Cell::Number(3.0), Cell::Number(0.5)]
        );
        let kinds: Vec<IssueKind> = outcome.issues.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![IssueKind::MissingFilled, IssueKind::NegativesCorrected]
        );
        assert_eq!(
            outcome.issues[1].message,
            "Quantity: converted 1 negative values to positive."
        );
    }

    #[test]
    fn test_mean_and_most_frequent_fill() {
        let cells = vec![Cell::Number(1.0), Cell::Number(1.0), Cell::Number(4.0), Cell::Missing];

        let mean_fill = CleaningPolicy::new()
            .with_imputation(ImputationStrategy::Mean)
            .apply("x", &cells, ColumnType::Numeric);
        assert_eq!(mean_fill.cells[3], Cell::Number(2.0));
        assert!(mean_fill.issues[0].message.contains("with mean (2)"));

        let mode_fill = CleaningPolicy::new()
            .with_imputation(ImputationStrategy::MostFrequent)
            .apply("x", &cells, ColumnType::Numeric);
        assert_eq!(mode_fill.cells[3], Cell::Number(1.0));
    }

    #[test]
    fn test_knn_leaves_gaps() {
        let cells = vec![Cell::Number(1.0), Cell::Missing];
        let outcome = CleaningPolicy::new()
            .with_imputation(ImputationStrategy::Knn { neighbors: 3 })
            .apply("x", &cells, ColumnType::Numeric);
        assert_eq!(outcome.cells[1], Cell::Missing);
        assert!(outcome.issues.is_empty());
    }

    #[test]
    fn test_all_missing_numeric_stays_missing() {
        let cells = vec![Cell::Missing, Cell::text("oops")];
        let outcome = CleaningPolicy::new().apply("x", &cells, ColumnType::Numeric);
        assert_eq!(outcome.cells, vec![Cell::Missing, Cell::Missing]);
        assert!(outcome.issues.is_empty());
    }

    #[test]
    fn test_categorical_status_labels() {
        let cells = vec![
            Cell::text(" active "),
            Cell::text("INACTIVE"),
            Cell::text(""),
            Cell::text("active"),
        ];
        let outcome = CleaningPolicy::new().apply("Status", &cells, ColumnType::Categorical);

        assert_eq!(
            texts(&outcome.cells),
            vec!["Active", "Inactive", "Unknown", "Active"]
        );
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].count, Some(1));
        assert_eq!(
            outcome.issues[0].message,
            "Status: filled 1 missing values with 'Unknown'."
        );
    }

    #[test]
    fn test_categorical_nan_words_and_spacing() {
        let cells = vec![
            Cell::text("NaN"),
            Cell::text("none"),
            Cell::Missing,
            Cell::text("new   york  city"),
        ];
        let outcome = CleaningPolicy::new().apply("City", &cells, ColumnType::Categorical);
        assert_eq!(
            texts(&outcome.cells),
            vec!["Unknown", "Unknown", "Unknown", "New York City"]
        );
        assert_eq!(outcome.issues[0].count, Some(3));
    }

    #[test]
    fn test_custom_unknown_label_is_kept_verbatim() {
        let config = PolicyConfig {
            unknown_label: "n/a".into(),
            ..PolicyConfig::default()
        };
        let outcome = CleaningPolicy::new().with_config(config).apply(
            "x",
            &[Cell::Missing, Cell::text("a")],
            ColumnType::Categorical,
        );
        assert_eq!(texts(&outcome.cells), vec!["n/a", "A"]);

        let policy = CleaningPolicy::new().with_config(PolicyConfig {
            unknown_label: "n/a".into(),
            ..PolicyConfig::default()
        });
        let again = policy.apply("x", &outcome.cells, ColumnType::Categorical);
        assert_eq!(again.cells, outcome.cells);
    }

    #[test]
    fn test_title_case_word_boundaries() {
        assert_eq!(title_case("o'neil-smith"), "O'Neil-Smith");
        assert_eq!(title_case("ELECTRONICS"), "Electronics");
        assert_eq!(title_case("2nd floor"), "2Nd Floor");
        assert_eq!(title_case(&title_case("mIxEd case")), "Mixed Case");
    }

    #[test]
    fn test_date_column_parsing() {
        let cells = vec![
            Cell::text("2023-01-05"),
            Cell::text("2023-02-30"),
            Cell::text("2023-03-01"),
            Cell::text("2023-03-02"),
            Cell::text("2023-03-03"),
            Cell::Missing,
        ];
        let outcome = CleaningPolicy::new().apply("Joined", &cells, ColumnType::Date);

        let expected = NaiveDate::from_ymd_opt(2023, 1, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(outcome.cells[0], Cell::Timestamp(expected));
        assert_eq!(outcome.cells[1], Cell::Missing);
        assert_eq!(outcome.cells[5], Cell::Missing);
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(
            outcome.issues[0].message,
            "Joined: 1 invalid/unparseable entries set to missing."
        );
    }

    #[test]
    fn test_identifier_and_text_trimming() {
        let ids = CleaningPolicy::new().apply(
            "OrderID",
            &[Cell::text(" A1 "), Cell::Number(2.0)],
            ColumnType::Identifier,
        );
        assert_eq!(ids.cells, vec![Cell::text("A1"), Cell::Number(2.0)]);
        assert!(ids.issues.is_empty());

        let notes = CleaningPolicy::new().apply(
            "Notes",
            &[Cell::text("  great  "), Cell::text("fine"), Cell::Missing],
            ColumnType::Text,
        );
        assert_eq!(
            notes.cells,
            vec![Cell::text("great"), Cell::text("fine"), Cell::Missing]
        );
        assert_eq!(notes.issues[0].count, Some(1));
    }

    #[test]
    fn test_unknown_type_is_untouched() {
        let cells = vec![Cell::text(" x ")];
        let outcome = CleaningPolicy::new().apply("x", &cells, ColumnType::Unknown);
        assert_eq!(outcome.cells, cells);
        assert!(outcome.issues.is_empty());
    }

    #[test]
    fn test_policies_are_idempotent() {
        let policy = CleaningPolicy::new();
        let cells = vec![Cell::text(" a "), Cell::Missing, Cell::text("B  c")];
        let once = policy.apply("c", &cells, ColumnType::Categorical);
        let twice = policy.apply("c", &once.cells, ColumnType::Categorical);
        assert_eq!(once.cells, twice.cells);
        assert!(twice.issues.is_empty());
    }
}
