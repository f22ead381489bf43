//! Cleaning engine that runs the full pass over a dataset.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::inference::{ClassifierConfig, TypeClassifier, coerce_number};
use crate::schema::{Cell, Column, ColumnType, Dataset};

use super::config::{CleaningConfig, ImputationStrategy, PolicyConfig};
use super::impute::KnnImputer;
use super::issue::{IssueKind, IssueRecord};
use super::policy::CleaningPolicy;
use super::rules;

/// Everything the engine needs to know.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub classifier: ClassifierConfig,
    pub policy: PolicyConfig,
    /// User-supplied per-column rules.
    pub rules: CleaningConfig,
}

/// Output of one cleaning run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleaningResult {
    pub dataset: Dataset,
    /// Issues in the order they were raised.
    pub issues: Vec<IssueRecord>,
    /// Type detected for each column, in column order.
    pub column_types: IndexMap<String, ColumnType>,
}

impl CleaningResult {
    fn empty(dataset: Dataset, issue: IssueRecord) -> Self {
        Self {
            dataset,
            issues: vec![issue],
            column_types: IndexMap::new(),
        }
    }

    /// Number of exact duplicate rows removed from the input.
    pub fn duplicates_removed(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.kind == IssueKind::DuplicatesRemoved)
            .filter_map(|i| i.count)
            .sum()
    }
}

/// Runs the cleaning pass: names, configured rules, duplicates,
/// classification, per-type policies and joint imputation.
#[derive(Debug, Clone, Default)]
pub struct CleaningEngine {
    config: EngineConfig,
    classifier: TypeClassifier,
    policy: CleaningPolicy,
}

impl CleaningEngine {
    /// Create an engine with default settings and no configured rules.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let classifier = TypeClassifier::with_config(config.classifier.clone());
        let policy = CleaningPolicy::new()
            .with_config(config.policy.clone())
            .with_imputation(config.rules.imputation.clone())
            .with_classifier_config(config.classifier.clone());
        Self {
            config,
            classifier,
            policy,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Clean a dataset. The input is never modified; an absent dataset
    /// yields an empty result with one explanatory issue.
    pub fn clean<'a>(&self, dataset: impl Into<Option<&'a Dataset>>) -> CleaningResult {
        let Some(input) = dataset.into() else {
            warn!("no dataset provided to clean");
            return CleaningResult::empty(
                Dataset::empty(),
                IssueRecord::cleaning(IssueKind::NoData, "No dataset provided to clean."),
            );
        };

        if input.column_count() == 0 {
            return CleaningResult::empty(
                input.clone(),
                IssueRecord::cleaning(IssueKind::EmptyDataset, "Dataset has no columns to clean."),
            );
        }

        info!(
            rows = input.row_count(),
            columns = input.column_count(),
            "cleaning dataset"
        );

        let mut data = input.clone();
        let mut issues = Vec::new();

        // Trim column names
        issues.extend(normalize_column_names(data.columns_mut()));

        // Structural rules from configuration
        issues.extend(rules::drop_columns(&mut data, &self.config.rules.drop_columns));
        issues.extend(rules::replace_values(&mut data, &self.config.rules.replace_values));

        if data.row_count() == 0 {
            issues.push(IssueRecord::cleaning(
                IssueKind::EmptyDataset,
                "Dataset has no rows to clean.",
            ));
            return CleaningResult {
                dataset: data,
                issues,
                column_types: IndexMap::new(),
            };
        }

        // Exact duplicates
        let removed = data.remove_duplicate_rows();
        if removed > 0 {
            info!(removed, "removed duplicate rows");
            issues.push(
                IssueRecord::cleaning(
                    IssueKind::DuplicatesRemoved,
                    format!("Removed {} duplicate rows.", removed),
                )
                .with_count(removed),
            );
        }

        // Per-column rules from configuration
        issues.extend(rules::apply_column_rules(
            &mut data,
            &self.config.rules,
            &self.classifier,
        ));

        // Classify every column
        let column_types = self.classifier.classify_dataset(&data);
        issues.push(IssueRecord::cleaning(
            IssueKind::ColumnTypes,
            format!("Detected column types: {}", describe_types(&column_types)),
        ));

        // Per-type policies
        for column in data.columns_mut() {
            let column_type = column_types
                .get(&column.name)
                .copied()
                .unwrap_or_default();
            let outcome = self.policy.apply(&column.name, &column.cells, column_type);
            for issue in &outcome.issues {
                debug!(column = %column.name, "{}", issue);
            }
            column.cells = outcome.cells;
            issues.extend(outcome.issues);
        }

        // Joint imputation of numeric columns
        if let ImputationStrategy::Knn { neighbors } = self.config.rules.imputation {
            issues.extend(impute_knn(&mut data, &column_types, neighbors));
        }

        info!(
            rows = data.row_count(),
            issues = issues.len(),
            "cleaning finished"
        );

        CleaningResult {
            dataset: data,
            issues,
            column_types,
        }
    }
}

/// Trim names, suffixing any that collide after trimming.
fn normalize_column_names(columns: &mut [Column]) -> Option<IssueRecord> {
    let originals: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
    let mut taken: Vec<String> = Vec::with_capacity(columns.len());
    let mut changed = 0;

    for column in columns.iter_mut() {
        let trimmed = column.name.trim();
        if trimmed == column.name && !taken.contains(&column.name) {
            taken.push(column.name.clone());
            continue;
        }

        let mut candidate = trimmed.to_string();
        let mut suffix = 2;
        while taken.contains(&candidate)
            || (candidate != column.name && originals.contains(&candidate))
        {
            candidate = format!("{}_{}", trimmed, suffix);
            suffix += 1;
        }

        column.name = candidate.clone();
        taken.push(candidate);
        changed += 1;
    }

    (changed > 0).then(|| {
        IssueRecord::cleaning(
            IssueKind::ColumnNamesNormalized,
            "Stripped whitespace from column names.",
        )
        .with_count(changed)
    })
}

fn describe_types(types: &IndexMap<String, ColumnType>) -> String {
    let entries: Vec<String> = types
        .iter()
        .map(|(name, column_type)| format!("{}: {}", name, column_type.label()))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

fn impute_knn(
    data: &mut Dataset,
    column_types: &IndexMap<String, ColumnType>,
    neighbors: usize,
) -> Vec<IssueRecord> {
    let numeric: Vec<usize> = data
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, c)| column_types.get(&c.name) == Some(&ColumnType::Numeric))
        .map(|(i, _)| i)
        .collect();
    if numeric.is_empty() {
        return Vec::new();
    }

    let matrix: Vec<Vec<Option<f64>>> = numeric
        .iter()
        .map(|&i| data.columns()[i].cells.iter().map(coerce_number).collect())
        .collect();
    let imputer = KnnImputer::new(neighbors);
    let (filled, counts) = imputer.impute(&matrix);

    let mut issues = Vec::new();
    let columns = data.columns_mut();
    for ((&index, values), count) in numeric.iter().zip(filled).zip(counts) {
        if count == 0 {
            continue;
        }
        let column = &mut columns[index];
        column.cells = values.into_iter().map(Cell::from).collect();
        issues.push(
            IssueRecord::cleaning(
                IssueKind::MissingFilled,
                format!(
                    "{}: filled {} missing/invalid values with {}-nearest-neighbour imputation.",
                    column.name,
                    count,
                    imputer.neighbors()
                ),
            )
            .with_column(&column.name)
            .with_count(count),
        );
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Validator;

    fn dataset(columns: Vec<Column>) -> Dataset {
        Dataset::new(columns).unwrap()
    }

    #[test]
    fn test_absent_dataset() {
        let result = CleaningEngine::new().clean(None::<&Dataset>);
        assert!(result.dataset.is_empty());
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].message, "No dataset provided to clean.");
    }

    #[test]
    fn test_dataset_without_columns() {
        let result = CleaningEngine::new().clean(&Dataset::empty());
        assert_eq!(result.issues[0].kind, IssueKind::EmptyDataset);
    }

    #[test]
    fn test_dataset_without_rows_keeps_columns() {
        let ds = dataset(vec![Column::new("a", Vec::<f64>::new())]);
        let result = CleaningEngine::new().clean(&ds);
        assert_eq!(result.dataset.column_names(), vec!["a"]);
        assert_eq!(result.issues.last().unwrap().message, "Dataset has no rows to clean.");
    }

    #[test]
    fn test_input_is_not_modified() {
        let ds = dataset(vec![
            Column::new("Status", [" a ", "b", " a "]),
            Column::new("n", [1.0, 2.0, 1.0]),
        ]);
        let before = ds.clone();
        let result = CleaningEngine::new().clean(&ds);
        assert_eq!(ds, before);
        assert_eq!(result.dataset.row_count(), 2);
        assert_eq!(result.duplicates_removed(), 1);
    }

    #[test]
    fn test_column_names_trimmed_and_disambiguated() {
        let ds = dataset(vec![
            Column::new(" Price ", [1.0, 2.0]),
            Column::new("Price", [3.0, 4.0]),
            Column::new("Qty", [5.0, 6.0]),
        ]);
        let result = CleaningEngine::new().clean(&ds);
        assert_eq!(result.dataset.column_names(), vec!["Price_2", "Price", "Qty"]);
        assert_eq!(result.issues[0].message, "Stripped whitespace from column names.");
    }

    #[test]
    fn test_type_audit_issue() {
        let ds = dataset(vec![
            Column::new("OrderID", ["A1", "A2", "A3", "A4"]),
            Column::new("Price", [10.0, 10.0, 20.0, 10.0]),
        ]);
        let result = CleaningEngine::new().clean(&ds);
        let audit = result
            .issues
            .iter()
            .find(|i| i.kind == IssueKind::ColumnTypes)
            .unwrap();
        assert_eq!(
            audit.message,
            "Detected column types: {OrderID: identifier, Price: numeric}"
        );
        assert_eq!(result.column_types["Price"], ColumnType::Numeric);
    }

    #[test]
    fn test_configured_rules_run_before_policies() {
        let rules = CleaningConfig::from_json(
            r#"{"drop_columns": ["Notes"], "outlier_rules": {"Price": {"iqr": 1.5}}}"#,
        )
        .unwrap();
        let config = EngineConfig {
            rules,
            ..EngineConfig::default()
        };
        let ds = dataset(vec![
            Column::new("OrderID", ["A1", "A2", "A3", "A4", "A5"]),
            Column::new("Price", [1.0, 2.0, 3.0, 2.0, 500.0]),
            Column::new("Notes", ["x", "y", "z", "w", "v"]),
        ]);
        let result = CleaningEngine::with_config(config).clean(&ds);

        assert_eq!(result.dataset.column_names(), vec!["OrderID", "Price"]);
        // 500 is flagged, then filled with the median of [1, 2, 3, 2].
        assert_eq!(result.dataset.get(4, 1), Some(&Cell::Number(2.0)));
    }

    #[test]
    fn test_date_range_follows_detected_format() {
        let rules = CleaningConfig::from_json(r#"{"date_ranges": {"When": {"min": "2023-02-15"}}}"#)
            .unwrap();
        let config = EngineConfig {
            rules,
            ..EngineConfig::default()
        };
        let ds = dataset(vec![
            Column::new(
                "When",
                ["12/25/2023", "12/25/2023", "02/10/2023", "03/20/2023", "03/20/2023"],
            ),
            Column::new("Row", ["r1", "r2", "r3", "r4", "r5"]),
        ]);
        let result = CleaningEngine::with_config(config).clean(&ds);

        assert_eq!(result.column_types["When"], ColumnType::Date);
        let bound = chrono::NaiveDate::from_ymd_opt(2023, 2, 15).unwrap();
        let when = &result.dataset.column("When").unwrap().cells;
        assert_eq!(when[2], Cell::Missing);
        assert!(
            when.iter()
                .filter_map(Cell::as_timestamp)
                .all(|ts| ts.date() >= bound)
        );
        assert!(result.issues.iter().any(|i| i.kind == IssueKind::DatesOutOfRange
            && i.message == "When: 1 dates outside [2023-02-15, ..] set to missing."));
    }

    #[test]
    fn test_rows_equal_after_cleaning_are_kept() {
        let ds = dataset(vec![
            Column::new("Store", ["x", "x", "x", "y", "y"]),
            Column::new("Price", ["5", "abc", "7", "5", "5"]),
            Column::new("Region", ["north", "north", "north", "south", "South "]),
        ]);
        assert_eq!(ds.duplicate_row_count(), 0);

        let result = CleaningEngine::new().clean(&ds);
        assert_eq!(result.dataset.row_count(), 5);
        assert_eq!(result.duplicates_removed(), 0);
        assert!(result.issues.iter().all(|i| i.kind != IssueKind::DuplicatesRemoved));

        // The validator reports what normalization made identical.
        let findings = Validator::new().validate(&result.dataset);
        assert!(findings.iter().any(|i| i.message == "Dataset contains 2 duplicate rows."));
    }

    #[test]
    fn test_knn_imputation() {
        let rules = CleaningConfig::from_json(r#"{"imputation": {"knn": {"neighbors": 1}}}"#).unwrap();
        let config = EngineConfig {
            rules,
            ..EngineConfig::default()
        };
        let ds = dataset(vec![
            Column::new("Width", [1.0, 1.5, 9.0, 9.0]),
            Column::new("Height", [Some(2.0), None, Some(18.0), Some(17.0)]),
        ]);
        let result = CleaningEngine::with_config(config).clean(&ds);

        assert_eq!(result.dataset.get(1, 1), Some(&Cell::Number(2.0)));
        assert!(result.issues.iter().any(|i| i.message
            == "Height: filled 1 missing/invalid values with 1-nearest-neighbour imputation."));
    }
}
