//! Core type definitions for column classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic type assigned to a column for one cleaning run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Every row holds a distinct value (order ids, keys).
    Identifier,
    /// Calendar dates or timestamps.
    Date,
    /// Numbers, possibly stored as text.
    Numeric,
    /// Short repeated labels.
    Categorical,
    /// High-cardinality free text.
    Text,
    /// Unable to determine type (e.g. no rows).
    #[default]
    Unknown,
}

impl ColumnType {
    /// Lowercase label used in issue messages and reports.
    pub fn label(&self) -> &'static str {
        match self {
            ColumnType::Identifier => "identifier",
            ColumnType::Date => "date",
            ColumnType::Numeric => "numeric",
            ColumnType::Categorical => "categorical",
            ColumnType::Text => "text",
            ColumnType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unknown() {
        assert_eq!(ColumnType::default(), ColumnType::Unknown);
        assert_eq!(ColumnType::default().to_string(), "unknown");
    }
}
