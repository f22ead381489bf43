//! Main Scour struct and public API.

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::info;

use crate::advisory::{Advisory, AdvisoryProvider, AdvisoryRequest};
use crate::cleaning::{CleaningEngine, EngineConfig, IssueRecord};
use crate::error::Result;
use crate::input::{Parser, ParserConfig, SourceMetadata};
use crate::schema::{ColumnType, Dataset};
use crate::validation::{ValidationConfig, Validator};

/// Configuration for a Scour run.
#[derive(Debug, Clone, Default)]
pub struct ScourConfig {
    /// Parser configuration.
    pub parser: ParserConfig,
    /// Classifier thresholds, policy settings and configured rules.
    pub engine: EngineConfig,
    /// Columns the validator checks specially.
    pub validation: ValidationConfig,
}

/// Result of cleaning and validating one dataset.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// Metadata about the source file, when the data came from one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceMetadata>,
    /// `(rows, columns)` before cleaning.
    pub shape_before: (usize, usize),
    /// `(rows, columns)` after cleaning.
    pub shape_after: (usize, usize),
    /// Type detected for each column.
    pub column_types: IndexMap<String, ColumnType>,
    pub cleaning_issues: Vec<IssueRecord>,
    pub validation_issues: Vec<IssueRecord>,
    /// Advice, when an advisory provider is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<Advisory>,
    /// The cleaned data.
    #[serde(skip)]
    pub dataset: Dataset,
}

impl RunResult {
    /// True when validation found nothing left to fix.
    pub fn is_clean(&self) -> bool {
        self.validation_issues.is_empty()
    }
}

/// Loads, cleans and validates datasets.
pub struct Scour {
    parser: Parser,
    engine: CleaningEngine,
    validator: Validator,
    advisor: Option<Arc<dyn AdvisoryProvider>>,
}

impl Scour {
    /// Create a new Scour instance with default configuration.
    pub fn new() -> Self {
        Self::with_config(ScourConfig::default())
    }

    /// Create a Scour instance with custom configuration.
    pub fn with_config(config: ScourConfig) -> Self {
        Self {
            parser: Parser::with_config(config.parser),
            engine: CleaningEngine::with_config(config.engine),
            validator: Validator::with_config(config.validation),
            advisor: None,
        }
    }

    /// Add an advisory provider, consulted after validation.
    pub fn with_advisor(mut self, provider: impl AdvisoryProvider + 'static) -> Self {
        self.advisor = Some(Arc::new(provider));
        self
    }

    /// Load a file, then clean and validate it.
    ///
    /// Only a missing or unreadable source is an error; everything found in
    /// the data is reported as issues.
    pub fn run(&self, path: impl AsRef<Path>) -> Result<RunResult> {
        let (dataset, source) = self.parser.parse_file(path)?;
        let mut result = self.run_dataset(&dataset);
        result.source = Some(source);
        Ok(result)
    }

    /// Clean and validate an in-memory dataset.
    pub fn run_dataset(&self, dataset: &Dataset) -> RunResult {
        let shape_before = dataset.shape();

        let cleaned = self.engine.clean(dataset);
        let validation_issues = self.validator.validate(&cleaned.dataset);

        let advisory = self.advisor.as_ref().map(|advisor| {
            let request =
                AdvisoryRequest::new(&cleaned.dataset, &cleaned.issues, &validation_issues);
            Advisory::collect(advisor.as_ref(), &request)
        });

        info!(
            before = ?shape_before,
            after = ?cleaned.dataset.shape(),
            cleaning_issues = cleaned.issues.len(),
            validation_issues = validation_issues.len(),
            "run finished"
        );

        RunResult {
            source: None,
            shape_before,
            shape_after: cleaned.dataset.shape(),
            column_types: cleaned.column_types,
            cleaning_issues: cleaned.issues,
            validation_issues,
            advisory,
            dataset: cleaned.dataset,
        }
    }
}

impl Default for Scour {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::MockAdvisor;
    use crate::schema::Column;

    fn sales() -> Dataset {
        Dataset::new(vec![
            Column::new("Transaction ID", ["T1", "T2", "T3", "T4"]),
            Column::new("Quantity", [Some(2.0), Some(-1.0), None, Some(2.0)]),
            Column::new(
                "Transaction Date",
                ["2023-01-05", "2023-01-06", "2023-01-06", "bad"],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_run_dataset() {
        let result = Scour::new().run_dataset(&sales());
        assert_eq!(result.shape_before, (4, 3));
        assert_eq!(result.shape_after, (4, 3));
        assert_eq!(result.column_types["Quantity"], ColumnType::Numeric);
        assert!(result.advisory.is_none());

        let quantity = &result.dataset.column("Quantity").unwrap().cells;
        assert!(quantity.iter().all(|c| c.as_number().is_some_and(|n| n >= 0.0)));
    }

    #[test]
    fn test_failing_advisor_does_not_change_results() {
        let plain = Scour::new().run_dataset(&sales());
        let advised = Scour::new()
            .with_advisor(MockAdvisor::failing())
            .run_dataset(&sales());

        assert_eq!(plain.cleaning_issues, advised.cleaning_issues);
        assert_eq!(plain.validation_issues, advised.validation_issues);
        assert_eq!(plain.dataset, advised.dataset);
        assert!(!advised.advisory.unwrap().available);
    }
}
