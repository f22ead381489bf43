//! Local, rule-based advice.

use std::collections::HashSet;

use crate::error::Result;
use crate::inference::NumericStatistics;
use crate::schema::{Cell, Column};

use super::provider::{AdvisoryProvider, AdvisoryRequest};

/// Thresholds for [`RuleBasedAdvisor`].
#[derive(Debug, Clone)]
pub struct RuleConfig {
    /// Columns with more missing values than this percentage are flagged.
    pub missing_pct: f64,
    pub iqr_multiplier: f64,
    /// Spacing is only checked in text columns with fewer distinct values.
    pub max_categories: usize,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            missing_pct: 20.0,
            iqr_multiplier: 1.5,
            max_categories: 15,
        }
    }
}

/// Advises from simple checks on the cleaned data. Never fails.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedAdvisor {
    config: RuleConfig,
}

impl RuleBasedAdvisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RuleConfig) -> Self {
        Self { config }
    }

    fn missing_advice(&self, column: &Column) -> Option<String> {
        let pct = column.missing_percentage();
        (pct > self.config.missing_pct).then(|| {
            format!(
                "Column '{}' has {:.1}% missing values. Consider dropping or imputing.",
                column.name, pct
            )
        })
    }

    fn outlier_advice(&self, column: &Column) -> Option<String> {
        if !column.is_numeric_typed() {
            return None;
        }
        let values: Vec<f64> = column.cells.iter().filter_map(Cell::as_number).collect();
        let stats = NumericStatistics::from_values(&values)?;
        let outliers = values
            .iter()
            .filter(|v| stats.is_outlier_iqr(**v, self.config.iqr_multiplier))
            .count();
        (outliers > 0)
            .then(|| format!("Column '{}' has {} potential outliers.", column.name, outliers))
    }

    fn spacing_advice(&self, column: &Column) -> Option<String> {
        if !column.cells.iter().all(|c| matches!(c, Cell::Text(_) | Cell::Missing)) {
            return None;
        }
        let distinct: HashSet<&str> = column.cells.iter().filter_map(Cell::as_text).collect();
        if distinct.is_empty() || distinct.len() >= self.config.max_categories {
            return None;
        }
        distinct
            .iter()
            .any(|v| v.trim() != *v)
            .then(|| format!("Column '{}' may have inconsistent spacing in categories.", column.name))
    }
}

impl AdvisoryProvider for RuleBasedAdvisor {
    fn suggest(&self, request: &AdvisoryRequest<'_>) -> Result<Vec<String>> {
        let columns = request.dataset.columns();
        let mut suggestions: Vec<String> = columns
            .iter()
            .filter_map(|c| self.missing_advice(c))
            .collect();
        suggestions.extend(columns.iter().filter_map(|c| self.outlier_advice(c)));
        suggestions.extend(columns.iter().filter_map(|c| self.spacing_advice(c)));

        if suggestions.is_empty() {
            suggestions.push("No additional suggestions. Data looks good!".to_string());
        }
        Ok(suggestions)
    }

    fn name(&self) -> &str {
        "rules"
    }
}
