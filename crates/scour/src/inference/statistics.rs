//! Descriptive statistics over coerced numeric values.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Statistics for numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStatistics {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    pub median: f64,
    /// First quartile (25th percentile).
    pub q1: f64,
    /// Third quartile (75th percentile).
    pub q3: f64,
}

impl NumericStatistics {
    /// Compute statistics; `None` for an empty slice.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let sorted = sorted(values);
        if sorted.is_empty() {
            return None;
        }

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

        Some(Self {
            count,
            min: sorted[0],
            max: sorted[count - 1],
            mean,
            std: variance.sqrt(),
            median: quantile(&sorted, 0.5),
            q1: quantile(&sorted, 0.25),
            q3: quantile(&sorted, 0.75),
        })
    }

    /// Calculate the interquartile range.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Check if a value is an outlier using the IQR method.
    pub fn is_outlier_iqr(&self, value: f64, multiplier: f64) -> bool {
        let iqr = self.iqr();
        let lower = self.q1 - multiplier * iqr;
        let upper = self.q3 + multiplier * iqr;
        value < lower || value > upper
    }

    /// Calculate the z-score for a value.
    pub fn z_score(&self, value: f64) -> f64 {
        if self.std == 0.0 {
            0.0
        } else {
            (value - self.mean) / self.std
        }
    }
}

/// Median with the midpoint rule for even counts.
pub fn median(values: &[f64]) -> Option<f64> {
    let sorted = sorted(values);
    (!sorted.is_empty()).then(|| quantile(&sorted, 0.5))
}

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

/// Most frequent value; ties resolve to the smallest value.
pub fn most_frequent(values: &[f64]) -> Option<f64> {
    let mut counts: HashMap<u64, (f64, usize)> = HashMap::new();
    for &v in values {
        let key = if v == 0.0 { 0f64.to_bits() } else { v.to_bits() };
        counts.entry(key).or_insert((v, 0)).1 += 1;
    }

    counts
        .into_values()
        .max_by(|(va, ca), (vb, cb)| ca.cmp(cb).then_with(|| vb.total_cmp(va)))
        .map(|(v, _)| v)
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

/// Linear-interpolated quantile of a sorted, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[10.0, -5.0, 10.0, 10.0]), Some(10.0));
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_most_frequent_ties_pick_smallest() {
        assert_eq!(most_frequent(&[3.0, 1.0, 3.0, 1.0, 2.0]), Some(1.0));
        assert_eq!(most_frequent(&[5.0, 5.0, 1.0]), Some(5.0));
        assert_eq!(most_frequent(&[]), None);
    }

    #[test]
    fn test_quartiles_and_outliers() {
        let stats = NumericStatistics::from_values(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.q3, 4.0);
        assert!(stats.is_outlier_iqr(100.0, 1.5));
        assert!(!stats.is_outlier_iqr(4.0, 1.5));
    }

    #[test]
    fn test_z_score_constant_column() {
        let stats = NumericStatistics::from_values(&[7.0, 7.0, 7.0]).unwrap();
        assert_eq!(stats.z_score(7.0), 0.0);
    }
}
