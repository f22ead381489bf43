//! Cleaning configuration.
//!
//! [`CleaningConfig`] holds the optional per-column rules a user can supply
//! as JSON. [`PolicyConfig`] holds the knobs of the automatic per-type
//! policies. Both have documented defaults, so an empty configuration runs
//! the automatic pass alone.

use std::path::Path;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{Result, ScourError};

/// Keys understood in a configuration document.
const RECOGNIZED_KEYS: &[&str] = &[
    "drop_columns",
    "replace_values",
    "clamp",
    "outlier_limits",
    "date_ranges",
    "outlier_rules",
    "imputation",
];

fn default_neighbors() -> usize {
    3
}

/// How missing numeric values are filled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputationStrategy {
    /// Fill with the column median.
    #[default]
    Median,
    /// Fill with the column mean.
    Mean,
    /// Fill with the most frequent value.
    MostFrequent,
    /// Fill jointly from the nearest rows across all numeric columns.
    Knn {
        #[serde(default = "default_neighbors")]
        neighbors: usize,
    },
}

impl ImputationStrategy {
    /// Label used in issue messages.
    pub fn label(&self) -> &'static str {
        match self {
            ImputationStrategy::Median => "median",
            ImputationStrategy::Mean => "mean",
            ImputationStrategy::MostFrequent => "most frequent value",
            ImputationStrategy::Knn { .. } => "nearest-neighbour imputation",
        }
    }
}

/// Rule for flagging numeric outliers. Flagged values become missing and are
/// then filled by the numeric policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlierRule {
    /// Flag values whose absolute z-score exceeds the threshold.
    Zscore(f64),
    /// Flag values outside `[Q1 - k*IQR, Q3 + k*IQR]`.
    Iqr(f64),
}

impl OutlierRule {
    pub fn describe(&self) -> String {
        match self {
            OutlierRule::Zscore(t) => format!("z-score above {}", t),
            OutlierRule::Iqr(k) => format!("outside {} x IQR", k),
        }
    }

    fn is_valid(&self) -> bool {
        match self {
            OutlierRule::Zscore(t) => t.is_finite() && *t > 0.0,
            OutlierRule::Iqr(k) => k.is_finite() && *k >= 0.0,
        }
    }
}

/// Inclusive date bounds. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub min: Option<NaiveDate>,
    #[serde(default)]
    pub max: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.min.is_none_or(|min| date >= min) && self.max.is_none_or(|max| date <= max)
    }

    pub fn describe(&self) -> String {
        let side = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "..".into());
        format!("[{}, {}]", side(self.min), side(self.max))
    }
}

/// User-supplied per-column rules, applied before the automatic policies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Columns removed outright.
    pub drop_columns: Vec<String>,
    /// Per-column value mappings. A `null` target makes the value missing.
    pub replace_values: IndexMap<String, IndexMap<String, Option<String>>>,
    /// Per-column `[min, max]` clipping bounds.
    #[serde(alias = "outlier_limits")]
    pub clamp: IndexMap<String, (f64, f64)>,
    /// Per-column date bounds; dates outside become missing.
    pub date_ranges: IndexMap<String, DateRange>,
    /// Per-column outlier rules.
    pub outlier_rules: IndexMap<String, OutlierRule>,
    /// Strategy for filling missing numeric values.
    pub imputation: ImputationStrategy,
}

/// A configuration parsed leniently, with the problems that were skipped.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoad {
    pub config: CleaningConfig,
    pub warnings: Vec<String>,
}

impl CleaningConfig {
    /// Parse a configuration strictly. Unknown keys and bad values are errors.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(map) = &value else {
            return Err(ScourError::Config(
                "configuration must be a JSON object".into(),
            ));
        };
        if let Some(key) = map.keys().find(|k| !RECOGNIZED_KEYS.contains(&k.as_str())) {
            return Err(ScourError::Config(format!("unknown key '{}'", key)));
        }

        let config: CleaningConfig = serde_json::from_value(value)?;
        if let Some(problem) = config.problems().into_iter().next() {
            return Err(ScourError::Config(problem));
        }
        Ok(config)
    }

    /// Parse a configuration, skipping anything malformed.
    ///
    /// Each top-level key is parsed on its own, so one bad entry does not
    /// discard the rest. Invalid values (an inverted clamp range, a
    /// non-positive z-score threshold, zero neighbours) are dropped too.
    pub fn parse_lenient(text: &str) -> ConfigLoad {
        let mut load = ConfigLoad::default();

        let map = match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                load.warn("configuration is not a JSON object; using defaults".into());
                return load;
            }
            Err(e) => {
                load.warn(format!("configuration is not valid JSON ({}); using defaults", e));
                return load;
            }
        };

        for (key, value) in map {
            if !RECOGNIZED_KEYS.contains(&key.as_str()) {
                load.warn(format!("ignoring unknown configuration key '{}'", key));
                continue;
            }

            let mut single = Map::new();
            single.insert(key.clone(), value);
            match serde_json::from_value::<CleaningConfig>(Value::Object(single)) {
                Ok(parsed) => load.config.merge_key(&key, parsed),
                Err(e) => load.warn(format!("ignoring malformed '{}': {}", key, e)),
            }
        }

        for problem in load.config.discard_invalid() {
            load.warn(problem);
        }
        load
    }

    /// Read and leniently parse a configuration file. A missing or unreadable
    /// file yields the defaults with a warning.
    pub fn load_lenient(path: impl AsRef<Path>) -> ConfigLoad {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse_lenient(&text),
            Err(e) => {
                let mut load = ConfigLoad::default();
                load.warn(format!(
                    "could not read configuration {}: {}; using defaults",
                    path.display(),
                    e
                ));
                load
            }
        }
    }

    /// True when at least one per-column rule is configured.
    pub fn has_rules(&self) -> bool {
        !(self.drop_columns.is_empty()
            && self.replace_values.is_empty()
            && self.clamp.is_empty()
            && self.date_ranges.is_empty()
            && self.outlier_rules.is_empty())
    }

    fn merge_key(&mut self, key: &str, parsed: CleaningConfig) {
        match key {
            "drop_columns" => self.drop_columns.extend(parsed.drop_columns),
            "replace_values" => self.replace_values.extend(parsed.replace_values),
            "clamp" | "outlier_limits" => self.clamp.extend(parsed.clamp),
            "date_ranges" => self.date_ranges.extend(parsed.date_ranges),
            "outlier_rules" => self.outlier_rules.extend(parsed.outlier_rules),
            "imputation" => self.imputation = parsed.imputation,
            _ => {}
        }
    }

    fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for (column, (min, max)) in &self.clamp {
            if min.is_nan() || max.is_nan() || min > max {
                problems.push(format!(
                    "clamp range for '{}' is invalid: [{}, {}]",
                    column, min, max
                ));
            }
        }
        for (column, range) in &self.date_ranges {
            if let (Some(min), Some(max)) = (range.min, range.max) {
                if min > max {
                    problems.push(format!(
                        "date range for '{}' is inverted: {}",
                        column,
                        range.describe()
                    ));
                }
            }
        }
        for (column, rule) in &self.outlier_rules {
            if !rule.is_valid() {
                problems.push(format!("outlier rule for '{}' is invalid: {:?}", column, rule));
            }
        }
        if let ImputationStrategy::Knn { neighbors: 0 } = self.imputation {
            problems.push("knn imputation needs at least one neighbour".into());
        }
        problems
    }

    fn discard_invalid(&mut self) -> Vec<String> {
        let problems = self.problems();
        if problems.is_empty() {
            return problems;
        }

        self.clamp.retain(|_, (min, max)| min <= max);
        self.date_ranges
            .retain(|_, r| !matches!((r.min, r.max), (Some(min), Some(max)) if min > max));
        self.outlier_rules.retain(|_, rule| rule.is_valid());
        if let ImputationStrategy::Knn { neighbors: 0 } = self.imputation {
            self.imputation = ImputationStrategy::Median;
        }
        problems.into_iter().map(|p| format!("ignoring {}", p)).collect()
    }
}

impl ConfigLoad {
    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }
}

/// Settings of the automatic per-type policies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Numeric columns whose lowercased name starts with one of these
    /// prefixes get negative values made positive.
    pub quantity_prefixes: Vec<String>,
    /// Placeholder for missing categorical values.
    pub unknown_label: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            quantity_prefixes: vec!["quant".to_string()],
            unknown_label: "Unknown".to_string(),
        }
    }
}

impl PolicyConfig {
    /// Check whether a column holds quantities.
    pub fn is_quantity_column(&self, name: &str) -> bool {
        let lowered = name.trim().to_lowercase();
        self.quantity_prefixes
            .iter()
            .any(|prefix| lowered.starts_with(&prefix.to_lowercase()))
    }
}
