//! Calendar date and elapsed-age value types.
//!
//! # Responsibility
//! - Define the validated Gregorian date type shared by every core layer.
//! - Define the `Age` duration shape produced by the calendar engine.
//!
//! # Invariants
//! - A constructed `CalendarDate` is always a real Gregorian date
//!   (year >= 1, month 1-12, day within the leap-aware month length).
//! - `Age` components are normalized: `months` in 0-11, `days >= 0`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Returns whether `year` is a Gregorian leap year.
///
/// Divisible by 4, except century years, which leap only when divisible
/// by 400.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Returns the number of days in `month` of `year` (leap-aware).
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        // Callers only pass validated months; 30 keeps the function total.
        _ => 30,
    }
}

/// Validation error for calendar date components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateValidationError {
    /// Year is below 1.
    YearOutOfRange(i32),
    /// Month is outside 1-12.
    MonthOutOfRange(u32),
    /// Day is outside the month's leap-aware length.
    DayOutOfRange { year: i32, month: u32, day: u32 },
}

impl Display for DateValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::YearOutOfRange(year) => write!(f, "year out of range: {year}"),
            Self::MonthOutOfRange(month) => write!(f, "month out of range: {month}"),
            Self::DayOutOfRange { year, month, day } => {
                write!(f, "day {day} out of range for {month}/{year}")
            }
        }
    }
}

impl Error for DateValidationError {}

/// Plain serde shape for [`CalendarDate`].
///
/// Kept separate so deserialization runs the same validation as
/// [`CalendarDate::new`] instead of trusting external input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DateParts {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// A validated Gregorian calendar date.
///
/// Ordering is calendar order (year, then month, then day). The type is
/// `Copy` and immutable; there is no way to hold an invalid date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "DateParts", into = "DateParts")]
pub struct CalendarDate {
    year: i32,
    month: u32,
    day: u32,
}

impl CalendarDate {
    /// Creates a date after validating every component.
    ///
    /// # Errors
    /// - `YearOutOfRange` when `year < 1`.
    /// - `MonthOutOfRange` when `month` is not 1-12.
    /// - `DayOutOfRange` when `day` does not exist in that month.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, DateValidationError> {
        if year < 1 {
            return Err(DateValidationError::YearOutOfRange(year));
        }
        if !(1..=12).contains(&month) {
            return Err(DateValidationError::MonthOutOfRange(month));
        }
        if day < 1 || day > days_in_month(year, month) {
            return Err(DateValidationError::DayOutOfRange { year, month, day });
        }
        Ok(Self { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }
}

impl TryFrom<DateParts> for CalendarDate {
    type Error = DateValidationError;

    fn try_from(parts: DateParts) -> Result<Self, Self::Error> {
        Self::new(parts.year, parts.month, parts.day)
    }
}

impl From<CalendarDate> for DateParts {
    fn from(date: CalendarDate) -> Self {
        Self {
            year: date.year,
            month: date.month,
            day: date.day,
        }
    }
}

impl Display for CalendarDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Elapsed calendar time between two dates.
///
/// This is a duration, not a point in time: `months` is always 0-11 and
/// `days` is always smaller than the length of the month it was borrowed
/// from. Produced by the calendar age engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Age {
    pub years: i32,
    pub months: i32,
    pub days: i32,
}

impl Age {
    /// Zero elapsed time (equal dates).
    pub const ZERO: Self = Self {
        years: 0,
        months: 0,
        days: 0,
    };

    pub fn new(years: i32, months: i32, days: i32) -> Self {
        Self {
            years,
            months,
            days,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl Display for Age {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        fn plural(n: i32) -> &'static str {
            if n == 1 {
                ""
            } else {
                "s"
            }
        }

        write!(
            f,
            "{} year{}, {} month{}, {} day{}",
            self.years,
            plural(self.years),
            self.months,
            plural(self.months),
            self.days,
            plural(self.days)
        )
    }
}
