//! User-configured rules applied ahead of the automatic policies.

use tracing::debug;

use indexmap::IndexMap;

use crate::inference::{DateFormat, NumericStatistics, TypeClassifier, coerce_number};
use crate::schema::{Cell, Dataset};

use super::config::{CleaningConfig, DateRange, OutlierRule};
use super::issue::{IssueKind, IssueRecord};

/// Remove configured columns that exist in the dataset.
pub(crate) fn drop_columns(dataset: &mut Dataset, names: &[String]) -> Option<IssueRecord> {
    let dropped: Vec<&str> = names
        .iter()
        .filter(|name| dataset.remove_column(name.trim()).is_some())
        .map(|name| name.trim())
        .collect();

    if dropped.is_empty() {
        return None;
    }
    Some(
        IssueRecord::cleaning(
            IssueKind::ColumnsDropped,
            format!(
                "Dropped {} configured columns: {}.",
                dropped.len(),
                dropped.join(", ")
            ),
        )
        .with_count(dropped.len()),
    )
}

/// Rewrite values through each column's mapping. Missing cells are left alone.
pub(crate) fn replace_values(
    dataset: &mut Dataset,
    mappings: &IndexMap<String, IndexMap<String, Option<String>>>,
) -> Vec<IssueRecord> {
    let mut issues = Vec::new();
    for column in dataset.columns_mut() {
        let Some(mapping) = mappings.get(&column.name) else {
            continue;
        };

        let mut replaced = 0;
        for cell in column.cells.iter_mut().filter(|c| !c.is_missing()) {
            if let Some(target) = mapping.get(&cell.to_string()) {
                *cell = match target {
                    Some(value) => Cell::text(value.as_str()),
                    None => Cell::Missing,
                };
                replaced += 1;
            }
        }

        if replaced > 0 {
            issues.push(
                IssueRecord::cleaning(
                    IssueKind::ValuesReplaced,
                    format!(
                        "{}: replaced {} values using the configured mapping.",
                        column.name, replaced
                    ),
                )
                .with_column(&column.name)
                .with_count(replaced),
            );
        }
    }
    issues
}

/// Apply clamp, date-range and outlier rules column by column.
///
/// Date ranges are checked under the format the classifier detects for the
/// column, so ambiguous day/month values read the same way the date policy
/// will read them.
pub(crate) fn apply_column_rules(
    dataset: &mut Dataset,
    config: &CleaningConfig,
    classifier: &TypeClassifier,
) -> Vec<IssueRecord> {
    for name in config
        .clamp
        .keys()
        .chain(config.date_ranges.keys())
        .chain(config.outlier_rules.keys())
    {
        if dataset.column(name).is_none() {
            debug!(column = %name, "configured column not present; rule skipped");
        }
    }

    let mut issues = Vec::new();
    for column in dataset.columns_mut() {
        let name = column.name.as_str();
        if let Some(&(min, max)) = config.clamp.get(name) {
            issues.extend(clamp(name, &mut column.cells, min, max));
        }
        if let Some(range) = config.date_ranges.get(name) {
            let format = classifier
                .detect_date_format(&column.cells)
                .unwrap_or(DateFormat::Generic);
            debug!(column = %name, format = format.label(), "checking date range");
            issues.extend(restrict_dates(name, &mut column.cells, range, format));
        }
        if let Some(rule) = config.outlier_rules.get(name) {
            issues.extend(remove_outliers(name, &mut column.cells, rule));
        }
    }
    issues
}

/// Clip numeric values into `[min, max]`.
pub(crate) fn clamp(name: &str, cells: &mut [Cell], min: f64, max: f64) -> Option<IssueRecord> {
    let mut clamped = 0;
    for cell in cells.iter_mut() {
        if let Some(value) = coerce_number(cell) {
            if value < min || value > max {
                *cell = Cell::Number(value.clamp(min, max));
                clamped += 1;
            }
        }
    }

    (clamped > 0).then(|| {
        IssueRecord::cleaning(
            IssueKind::ValuesClamped,
            format!("{}: clamped {} values into [{}, {}].", name, clamped, min, max),
        )
        .with_column(name)
        .with_count(clamped)
    })
}

/// Set dates outside the range to missing, reading values under `format`.
pub(crate) fn restrict_dates(
    name: &str,
    cells: &mut [Cell],
    range: &DateRange,
    format: DateFormat,
) -> Option<IssueRecord> {
    let mut removed = 0;
    for cell in cells.iter_mut() {
        if let Some(ts) = format.coerce(cell) {
            if !range.contains(ts.date()) {
                *cell = Cell::Missing;
                removed += 1;
            }
        }
    }

    (removed > 0).then(|| {
        IssueRecord::cleaning(
            IssueKind::DatesOutOfRange,
            format!(
                "{}: {} dates outside {} set to missing.",
                name,
                removed,
                range.describe()
            ),
        )
        .with_column(name)
        .with_count(removed)
    })
}

/// Set flagged outliers to missing so the numeric policy fills them.
pub(crate) fn remove_outliers(name: &str, cells: &mut [Cell], rule: &OutlierRule) -> Option<IssueRecord> {
    let values: Vec<f64> = cells.iter().filter_map(coerce_number).collect();
    let stats = NumericStatistics::from_values(&values)?;

    let mut removed = 0;
    for cell in cells.iter_mut() {
        let Some(value) = coerce_number(cell) else {
            continue;
        };
        let flagged = match rule {
            OutlierRule::Zscore(threshold) => stats.z_score(value).abs() > *threshold,
            OutlierRule::Iqr(multiplier) => stats.is_outlier_iqr(value, *multiplier),
        };
        if flagged {
            *cell = Cell::Missing;
            removed += 1;
        }
    }

    (removed > 0).then(|| {
        IssueRecord::cleaning(
            IssueKind::OutliersRemoved,
            format!(
                "{}: {} outliers ({}) set to missing for imputation.",
                name,
                removed,
                rule.describe()
            ),
        )
        .with_column(name)
        .with_count(removed)
    })
}
