//! Cell values.

use std::fmt;

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A single value in a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Cell {
    /// No value. Distinct from an empty string and from zero.
    Missing,
    Number(f64),
    Text(String),
    Timestamp(NaiveDateTime),
}

impl Cell {
    /// Create a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Returns true for the missing marker.
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Returns true for missing cells and whitespace-only text.
    ///
    /// Blank cells carry no observation and are excluded from every ratio the
    /// classifier computes.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Missing => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// The numeric value, if this is a number cell.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The text value, if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The timestamp value, if this is a timestamp cell.
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Hashable identity used for distinct counts and duplicate detection.
    pub(crate) fn key(&self) -> CellKey<'_> {
        match self {
            Cell::Missing => CellKey::Missing,
            // -0.0 and 0.0 compare equal, so they must hash equal too.
            Cell::Number(n) if *n == 0.0 => CellKey::Number(0f64.to_bits()),
            Cell::Number(n) => CellKey::Number(n.to_bits()),
            Cell::Text(s) => CellKey::Text(s),
            Cell::Timestamp(ts) => CellKey::Timestamp(*ts),
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<NaiveDateTime> for Cell {
    fn from(value: NaiveDateTime) -> Self {
        Cell::Timestamp(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Cell::Missing)
    }
}

/// Renders the cell the way it is written to CSV. Missing renders as "".
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => Ok(()),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => f.write_str(s),
            Cell::Timestamp(ts) => f.write_str(&format_timestamp(ts)),
        }
    }
}

/// Format a timestamp as `YYYY-MM-DD`, adding the time only when it is not midnight.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    if ts.time() == NaiveTime::MIN {
        ts.format("%Y-%m-%d").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum CellKey<'a> {
    Missing,
    Number(u64),
    Text(&'a str),
    Timestamp(NaiveDateTime),
}
