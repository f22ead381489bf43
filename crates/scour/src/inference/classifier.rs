//! Column type classification.
//!
//! One deterministic precedence chain decides a column's type:
//!
//! 1. **Identifier** - every row holds a distinct, non-blank value.
//! 2. **Numeric** - natively numeric, or enough values coerce to numbers.
//!    Checked before dates so large integers are never read as date serials.
//! 3. **Date** - enough values parse under one fixed pattern (or the generic
//!    parser) and enough of those land in a sane year range.
//! 4. **Text** - string values with many distinct labels.
//! 5. **Categorical** - everything else, including all-missing columns.
//!
//! Every ratio is computed over non-blank values only.

use std::collections::HashSet;

use chrono::Datelike;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::schema::{Cell, ColumnType, Dataset, distinct_non_blank};

use super::coerce::{DateFormat, coerce_number};

/// Thresholds used by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Minimum share of values that must coerce to numbers.
    pub numeric_ratio: f64,
    /// Minimum share of values that must parse under a date pattern.
    pub date_parse_ratio: f64,
    /// Minimum share of parsed dates that must fall in `[min_year, max_year]`.
    pub date_year_ratio: f64,
    pub min_year: i32,
    pub max_year: i32,
    /// Below this unique ratio a string column is always categorical.
    pub categorical_unique_ratio: f64,
    /// Distinct values needed before a string column counts as free text.
    pub text_min_distinct: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            numeric_ratio: 0.8,
            date_parse_ratio: 0.8,
            date_year_ratio: 0.8,
            min_year: 1900,
            max_year: 2100,
            categorical_unique_ratio: 0.05,
            text_min_distinct: 50,
        }
    }
}

/// Assigns a [`ColumnType`] to a column of cells.
#[derive(Debug, Clone, Default)]
pub struct TypeClassifier {
    config: ClassifierConfig,
}

impl TypeClassifier {
    /// Create a classifier with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a classifier with custom thresholds.
    pub fn with_config(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify one column. Never panics, including on empty input.
    pub fn classify(&self, column: &[Cell], total_row_count: usize) -> ColumnType {
        if column.is_empty() || total_row_count == 0 {
            return ColumnType::Unknown;
        }

        if distinct_non_blank(column) == total_row_count {
            return ColumnType::Identifier;
        }

        let observed: Vec<&Cell> = column.iter().filter(|c| !c.is_blank()).collect();
        if observed.is_empty() {
            return ColumnType::Categorical;
        }

        if self.looks_numeric(&observed) {
            return ColumnType::Numeric;
        }

        if self.detect_format(&observed).is_some() {
            return ColumnType::Date;
        }

        if self.looks_like_free_text(&observed) {
            return ColumnType::Text;
        }

        ColumnType::Categorical
    }

    /// Classify every column of a dataset, preserving column order.
    pub fn classify_dataset(&self, dataset: &Dataset) -> IndexMap<String, ColumnType> {
        let rows = dataset.row_count();
        dataset
            .columns()
            .iter()
            .map(|column| {
                let column_type = self.classify(&column.cells, rows);
                debug!(column = %column.name, %column_type, "classified column");
                (column.name.clone(), column_type)
            })
            .collect()
    }

    /// Find the date format a column's values follow, if any clears the thresholds.
    ///
    /// Fixed patterns are tried first, in [`DateFormat::FIXED`] order, then the
    /// generic parser.
    pub fn detect_date_format(&self, column: &[Cell]) -> Option<DateFormat> {
        let observed: Vec<&Cell> = column.iter().filter(|c| !c.is_blank()).collect();
        self.detect_format(&observed)
    }

    fn looks_numeric(&self, observed: &[&Cell]) -> bool {
        if observed.iter().all(|c| matches!(c, Cell::Number(_))) {
            return true;
        }
        let coerced = observed.iter().filter(|c| coerce_number(c).is_some()).count();
        ratio(coerced, observed.len()) >= self.config.numeric_ratio
    }

    fn detect_format(&self, observed: &[&Cell]) -> Option<DateFormat> {
        if observed.is_empty() {
            return None;
        }
        DateFormat::FIXED
            .into_iter()
            .chain(std::iter::once(DateFormat::Generic))
            .find(|format| self.format_clears(*format, observed))
    }

    fn format_clears(&self, format: DateFormat, observed: &[&Cell]) -> bool {
        let years: Vec<i32> = observed
            .iter()
            .filter_map(|c| format.coerce(c))
            .map(|ts| ts.year())
            .collect();

        if years.is_empty() || ratio(years.len(), observed.len()) < self.config.date_parse_ratio {
            return false;
        }

        let in_range = years
            .iter()
            .filter(|y| (self.config.min_year..=self.config.max_year).contains(*y))
            .count();
        ratio(in_range, years.len()) >= self.config.date_year_ratio
    }

    fn looks_like_free_text(&self, observed: &[&Cell]) -> bool {
        if !observed.iter().all(|c| matches!(c, Cell::Text(_))) {
            return false;
        }
        let distinct = observed.iter().map(|c| c.key()).collect::<HashSet<_>>().len();
        distinct >= self.config.text_min_distinct
            && ratio(distinct, observed.len()) >= self.config.categorical_unique_ratio
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<Cell> {
        values.iter().map(|v| Cell::text(*v)).collect()
    }

    fn classify(values: Vec<Cell>) -> ColumnType {
        let rows = values.len();
        TypeClassifier::new().classify(&values, rows)
    }

    #[test]
    fn test_empty_column_is_unknown() {
        assert_eq!(classify(Vec::new()), ColumnType::Unknown);
    }

    #[test]
    fn test_all_missing_is_categorical() {
        assert_eq!(
            classify(vec![Cell::Missing, Cell::Missing, Cell::text(" ")]),
            ColumnType::Categorical
        );
    }

    #[test]
    fn test_distinct_values_are_identifier() {
        assert_eq!(classify(cells(&["A1", "A2", "A3", "A4"])), ColumnType::Identifier);
        assert_eq!(
            classify(vec![Cell::Number(1.0), Cell::Number(2.0), Cell::Number(3.0)]),
            ColumnType::Identifier
        );
    }

    #[test]
    fn test_missing_value_prevents_identifier() {
        assert_eq!(
            classify(vec![Cell::text("A1"), Cell::text("A2"), Cell::Missing]),
            ColumnType::Categorical
        );
    }

    #[test]
    fn test_native_numbers_are_numeric() {
        assert_eq!(
            classify(vec![Cell::Number(1.0), Cell::Number(1.0), Cell::Missing]),
            ColumnType::Numeric
        );
    }

    #[test]
    fn test_mostly_numeric_text_is_numeric() {
        let column = vec![
            Cell::Number(10.0),
            Cell::Number(-5.0),
            Cell::text("abc"),
            Cell::Number(10.0),
            Cell::Number(10.0),
        ];
        assert_eq!(classify(column), ColumnType::Numeric);
    }

    #[test]
    fn test_numeric_threshold_boundary() {
        // 3 of 4 values coerce: 75% is below the 80% threshold.
        assert_eq!(
            classify(cells(&["1", "1", "2", "x"])),
            ColumnType::Categorical
        );
    }

    #[test]
    fn test_integers_are_not_dates() {
        assert_eq!(
            classify(cells(&["20230105", "20230105", "20230106"])),
            ColumnType::Numeric
        );
    }

    #[test]
    fn test_iso_dates() {
        assert_eq!(
            classify(cells(&["2023-01-05", "2023-01-05", "2023-02-01", "2023-03-09"])),
            ColumnType::Date
        );
    }

    #[test]
    fn test_regional_dates_pick_day_first() {
        let column = cells(&["25/12/2023", "25/12/2023", "01/02/2023"]);
        let classifier = TypeClassifier::new();
        assert_eq!(
            classifier.detect_date_format(&column),
            Some(DateFormat::DayFirstSlash)
        );
    }

    #[test]
    fn test_month_first_when_day_first_fails() {
        let column = cells(&["12/25/2023", "12/25/2023", "02/01/2023"]);
        let classifier = TypeClassifier::new();
        assert_eq!(
            classifier.detect_date_format(&column),
            Some(DateFormat::MonthFirstSlash)
        );
    }

    #[test]
    fn test_generic_fallback() {
        let column = cells(&["5 Jan 2023", "5 Jan 2023", "7 Feb 2023"]);
        assert_eq!(
            TypeClassifier::new().detect_date_format(&column),
            Some(DateFormat::Generic)
        );
        assert_eq!(classify(column), ColumnType::Date);
    }

    #[test]
    fn test_out_of_range_years_are_not_dates() {
        let column = cells(&["1066-10-14", "1066-10-14", "1215-06-15"]);
        assert_eq!(TypeClassifier::new().detect_date_format(&column), None);
        assert_eq!(classify(column), ColumnType::Categorical);
    }

    #[test]
    fn test_signup_dates_fail_threshold() {
        // "2023-02-30" is not a real date, so only one of three values parses.
        let column = cells(&["2023-01-05", "2023-02-30", "not a date"]);
        let classifier = TypeClassifier::new();
        assert_eq!(classifier.detect_date_format(&column), None);

        // All three values are distinct, so the identifier rule fires first.
        assert_eq!(classifier.classify(&column, 3), ColumnType::Identifier);

        // With a repeated value the column falls through to categorical.
        let repeated = cells(&["2023-01-05", "2023-02-30", "not a date", "not a date"]);
        assert_eq!(classifier.classify(&repeated, 4), ColumnType::Categorical);
    }

    #[test]
    fn test_status_labels_are_categorical() {
        assert_eq!(
            classify(cells(&[" active ", "INACTIVE", "", "active"])),
            ColumnType::Categorical
        );
    }

    #[test]
    fn test_high_cardinality_text() {
        let mut values: Vec<Cell> = (0..60)
            .map(|i| Cell::text(format!("customer comment number {}", i)))
            .collect();
        values.push(Cell::text("customer comment number 0"));
        assert_eq!(classify(values), ColumnType::Text);
    }

    #[test]
    fn test_low_unique_ratio_prefers_categorical() {
        let values: Vec<Cell> = (0..2000)
            .map(|i| Cell::text(format!("label {}", i % 60)))
            .collect();
        assert_eq!(classify(values), ColumnType::Categorical);
    }

    #[test]
    fn test_classify_dataset_preserves_order() {
        let ds = Dataset::from_records(
            vec!["b".into(), "a".into()],
            vec![
                vec!["x".into(), "1".into()],
                vec!["x".into(), "1".into()],
            ],
        )
        .unwrap();
        let types = TypeClassifier::new().classify_dataset(&ds);
        let names: Vec<&str> = types.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(types["a"], ColumnType::Numeric);
    }
}
