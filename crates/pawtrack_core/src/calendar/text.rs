//! Date text codec.
//!
//! # Responsibility
//! - Parse user-entered date text into a validated [`CalendarDate`].
//! - Render a date back into the active layout's text form.
//!
//! # Invariants
//! - `parse_date(format_date(d, layout), layout) == d` for every valid
//!   date and both layouts.
//! - Out-of-range components are rejected, never substituted.

use crate::model::date::{CalendarDate, DateValidationError};
use crate::model::settings::DateLayout;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static DATE_TEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{1,2})/(\d{1,2})/(\d{1,4})\s*$").expect("valid date regex"));

/// Error for date text parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateTextError {
    /// Text does not match the slash-separated numeric shape.
    Malformed { text: String, layout: DateLayout },
    /// Components parsed but do not form a real calendar date.
    OutOfRange {
        text: String,
        source: DateValidationError,
    },
}

impl Display for DateTextError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed { text, layout } => {
                write!(f, "unparseable date `{text}`; expected {}", layout.pattern())
            }
            Self::OutOfRange { text, source } => {
                write!(f, "date `{text}` is out of range: {source}")
            }
        }
    }
}

impl Error for DateTextError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed { .. } => None,
            Self::OutOfRange { source, .. } => Some(source),
        }
    }
}

/// Parses slash-separated date text in the given layout.
///
/// Day and month are one or two digits, the year up to four; surrounding
/// whitespace is tolerated.
///
/// # Errors
/// - `Malformed` when the text does not match the numeric shape.
/// - `OutOfRange` when the components do not form a real date.
pub fn parse_date(text: &str, layout: DateLayout) -> Result<CalendarDate, DateTextError> {
    let captures = DATE_TEXT_RE
        .captures(text)
        .ok_or_else(|| DateTextError::Malformed {
            text: text.to_string(),
            layout,
        })?;

    // One-to-four digit captures always fit u32.
    let first: u32 = captures[1].parse().expect("bounded numeric capture");
    let second: u32 = captures[2].parse().expect("bounded numeric capture");
    let year: u32 = captures[3].parse().expect("bounded numeric capture");

    let (month, day) = match layout {
        DateLayout::MonthDayYear => (first, second),
        DateLayout::DayMonthYear => (second, first),
    };

    CalendarDate::new(year as i32, month, day).map_err(|source| DateTextError::OutOfRange {
        text: text.to_string(),
        source,
    })
}

/// Renders a date as unpadded slash-separated text in the given layout.
///
/// Total: every valid date has a text form, and that form parses back to
/// the same date under the same layout.
pub fn format_date(date: CalendarDate, layout: DateLayout) -> String {
    match layout {
        DateLayout::MonthDayYear => format!("{}/{}/{}", date.month(), date.day(), date.year()),
        DateLayout::DayMonthYear => format!("{}/{}/{}", date.day(), date.month(), date.year()),
    }
}
