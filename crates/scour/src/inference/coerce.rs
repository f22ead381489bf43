//! Value coercion: text to numbers and dates.
//!
//! Coercion never fails loudly. A value that does not convert yields `None`
//! and the caller decides whether that becomes a missing cell.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::Cell;

// =============================================================================
// LAZY STATIC PATTERNS
// =============================================================================
// Shape checks for the fixed date formats, compiled once on first use.

static ISO_DASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}$").unwrap());
static ISO_SLASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}/\d{1,2}/\d{1,2}$").unwrap());
static REGIONAL_DASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}-\d{1,2}-\d{4}$").unwrap());
static REGIONAL_SLASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").unwrap());

/// Date-only formats tried by the generic parser after the fixed ones.
const GENERIC_DATE_FORMATS: &[&str] = &[
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%Y.%m.%d",
    "%d.%m.%Y",
];

/// Date-time formats tried by the generic parser.
const GENERIC_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
];

/// Parse a number from text. Non-finite results (`NaN`, `inf`) are rejected.
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Coerce a cell to a number.
pub fn coerce_number(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) if n.is_finite() => Some(*n),
        Cell::Text(s) => parse_number(s),
        _ => None,
    }
}

/// A date format the classifier can lock onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateFormat {
    /// `YYYY-MM-DD`
    IsoDash,
    /// `YYYY/MM/DD`
    IsoSlash,
    /// `DD-MM-YYYY`
    DayFirstDash,
    /// `DD/MM/YYYY`
    DayFirstSlash,
    /// `MM-DD-YYYY`
    MonthFirstDash,
    /// `MM/DD/YYYY`
    MonthFirstSlash,
    /// Any format the generic parser understands.
    Generic,
}

impl DateFormat {
    /// Fixed formats in the order they are tried.
    pub const FIXED: [DateFormat; 6] = [
        DateFormat::IsoDash,
        DateFormat::IsoSlash,
        DateFormat::DayFirstDash,
        DateFormat::DayFirstSlash,
        DateFormat::MonthFirstDash,
        DateFormat::MonthFirstSlash,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            DateFormat::IsoDash => "YYYY-MM-DD",
            DateFormat::IsoSlash => "YYYY/MM/DD",
            DateFormat::DayFirstDash => "DD-MM-YYYY",
            DateFormat::DayFirstSlash => "DD/MM/YYYY",
            DateFormat::MonthFirstDash => "MM-DD-YYYY",
            DateFormat::MonthFirstSlash => "MM/DD/YYYY",
            DateFormat::Generic => "generic",
        }
    }

    fn shape_and_pattern(&self) -> Option<(&'static Regex, &'static str)> {
        match self {
            DateFormat::IsoDash => Some((&ISO_DASH, "%Y-%m-%d")),
            DateFormat::IsoSlash => Some((&ISO_SLASH, "%Y/%m/%d")),
            DateFormat::DayFirstDash => Some((&REGIONAL_DASH, "%d-%m-%Y")),
            DateFormat::DayFirstSlash => Some((&REGIONAL_SLASH, "%d/%m/%Y")),
            DateFormat::MonthFirstDash => Some((&REGIONAL_DASH, "%m-%d-%Y")),
            DateFormat::MonthFirstSlash => Some((&REGIONAL_SLASH, "%m/%d/%Y")),
            DateFormat::Generic => None,
        }
    }

    /// Parse text under this format.
    pub fn parse(&self, value: &str) -> Option<NaiveDateTime> {
        let trimmed = value.trim();
        match self.shape_and_pattern() {
            Some((shape, pattern)) => {
                if !shape.is_match(trimmed) {
                    return None;
                }
                NaiveDate::parse_from_str(trimmed, pattern)
                    .ok()
                    .map(|d| d.and_time(NaiveTime::MIN))
            }
            None => parse_date_generic(trimmed),
        }
    }

    /// Coerce a cell under this format. Timestamps pass through unchanged.
    pub fn coerce(&self, cell: &Cell) -> Option<NaiveDateTime> {
        match cell {
            Cell::Timestamp(ts) => Some(*ts),
            Cell::Text(s) => self.parse(s),
            _ => None,
        }
    }
}

/// Parse a date or date-time in any supported layout.
pub fn parse_date_generic(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in DateFormat::FIXED {
        if let Some(ts) = format.parse(trimmed) {
            return Some(ts);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local());
    }

    for pattern in GENERIC_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, pattern) {
            return Some(dt);
        }
    }

    for pattern in GENERIC_DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, pattern) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }

    None
}

/// Coerce a cell to a timestamp with the generic parser.
pub fn coerce_date(cell: &Cell) -> Option<NaiveDateTime> {
    DateFormat::Generic.coerce(cell)
}
