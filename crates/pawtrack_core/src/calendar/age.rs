//! Calendar age engine.
//!
//! # Responsibility
//! - Compute elapsed years/months/days between two dates with calendar
//!   borrow rules (variable month lengths, leap years).
//! - Scale an elapsed span into its "equivalent human age".
//!
//! # Invariants
//! - Borrowed month lengths are evaluated against the months adjacent to
//!   the reference date, never the birth year.
//! - Results are normalized: `months` in 0-11, `days >= 0` and smaller
//!   than the borrowed month's length.
//! - Pure functions only; no clock access anywhere in this module.

use crate::model::date::{days_in_month, Age, CalendarDate};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default dog-years-to-human-years scaling factor.
pub const DEFAULT_HUMAN_YEARS_FACTOR: u32 = 7;

/// Error for age computations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeError {
    /// Birth date lies after the reference date.
    InvalidRange {
        birth: CalendarDate,
        reference: CalendarDate,
    },
    /// Scaling factor must be at least 1.
    ZeroFactor,
}

impl Display for AgeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRange { birth, reference } => {
                write!(f, "birth date {birth} is after reference date {reference}")
            }
            Self::ZeroFactor => write!(f, "scaling factor must be at least 1"),
        }
    }
}

impl Error for AgeError {}

/// Computes the elapsed calendar age from `birth` to `reference`.
///
/// Calendar subtraction with borrow, not a day-count division: the day
/// deficit borrows the length of the month immediately before the
/// reference month (wrapping into December of the previous year), and a
/// month deficit borrows twelve months from the years.
///
/// # Errors
/// - `InvalidRange` when `birth > reference`.
pub fn age_between(birth: CalendarDate, reference: CalendarDate) -> Result<Age, AgeError> {
    if birth > reference {
        return Err(AgeError::InvalidRange { birth, reference });
    }
    Ok(diff_parts(
        birth.year(),
        birth.month(),
        birth.day(),
        reference,
    ))
}

/// Computes the equivalent human age for `birth` at `reference`.
///
/// The exact day count between the two dates is multiplied by `factor`, a
/// virtual start date is found that many days before the reference, and
/// the span is re-expressed with the same borrow rules as
/// [`age_between`], anchored at the same reference date. The years field
/// is never multiplied on its own.
///
/// # Errors
/// - `InvalidRange` when `birth > reference`.
/// - `ZeroFactor` when `factor == 0`.
pub fn equivalent_age(
    birth: CalendarDate,
    reference: CalendarDate,
    factor: u32,
) -> Result<Age, AgeError> {
    if factor == 0 {
        return Err(AgeError::ZeroFactor);
    }
    if birth > reference {
        return Err(AgeError::InvalidRange { birth, reference });
    }

    let reference_days = unix_days_from_date(reference.year(), reference.month(), reference.day());
    let birth_days = unix_days_from_date(birth.year(), birth.month(), birth.day());
    let scaled = (reference_days - birth_days) * i64::from(factor);

    // The virtual start may fall before year 1; the raw component triple
    // keeps the subtraction well-defined without widening CalendarDate.
    let (start_year, start_month, start_day) = date_from_unix_days(reference_days - scaled);
    Ok(diff_parts(start_year, start_month, start_day, reference))
}

/// Borrow subtraction from a raw start triple up to `reference`.
///
/// The start is chronologically at or before `reference`; its year may be
/// below 1 for virtual starts produced by scaling.
fn diff_parts(start_year: i32, start_month: u32, start_day: u32, reference: CalendarDate) -> Age {
    let mut years = reference.year() - start_year;
    let mut months = reference.month() as i32 - start_month as i32;
    let mut days = reference.day() as i32 - start_day as i32;

    // Day deficit borrows from the months stepping back from the
    // reference. One step suffices unless the deficit exceeds the borrowed
    // month's length (e.g. Jan 31 -> Mar 1); two steps always do.
    let mut cursor_year = reference.year();
    let mut cursor_month = reference.month();
    while days < 0 {
        if cursor_month == 1 {
            cursor_year -= 1;
            cursor_month = 12;
        } else {
            cursor_month -= 1;
        }
        days += days_in_month(cursor_year, cursor_month) as i32;
        months -= 1;
    }

    if months < 0 {
        months += 12;
        years -= 1;
    }

    Age {
        years,
        months,
        days,
    }
}

/// Days since 1970-01-01 for a proleptic-Gregorian date.
pub fn unix_days_from_date(year: i32, month: u32, day: u32) -> i64 {
    let adjusted_year = i64::from(year) - i64::from(month <= 2);
    let era = if adjusted_year >= 0 {
        adjusted_year
    } else {
        adjusted_year - 399
    } / 400;
    let year_of_era = adjusted_year - era * 400;
    let shifted_month = (i64::from(month) + 9) % 12;
    let day_of_year = (153 * shifted_month + 2) / 5 + i64::from(day) - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * 146097 + day_of_era - 719468
}

/// Proleptic-Gregorian date for a days-since-1970-01-01 count.
pub fn date_from_unix_days(days: i64) -> (i32, u32, u32) {
    let z = days + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let day_of_era = z - era * 146097;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36524 - day_of_era / 146096) / 365;
    let year = year_of_era + era * 400;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let shifted_month = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * shifted_month + 2) / 5 + 1;
    let month = if shifted_month < 10 {
        shifted_month + 3
    } else {
        shifted_month - 9
    };
    let final_year = if month <= 2 { year + 1 } else { year };
    (final_year as i32, month as u32, day as u32)
}

#[cfg(test)]
mod tests {
    use super::{age_between, date_from_unix_days, diff_parts, unix_days_from_date, Age};
    use crate::model::date::{days_in_month, CalendarDate};

    fn date(year: i32, month: u32, day: u32) -> CalendarDate {
        CalendarDate::new(year, month, day).unwrap()
    }

    /// Advances a start date by an age: whole months first (day overflow
    /// carries into the following month), then a day walk. This is the
    /// inverse the engine's outputs must satisfy.
    fn advance(start: CalendarDate, age: Age) -> (i32, u32, u32) {
        let total_months = (start.month() as i32 - 1) + age.years * 12 + age.months;
        let mut year = start.year() + total_months.div_euclid(12);
        let mut month = (total_months.rem_euclid(12) + 1) as u32;
        let mut day = start.day();

        while day > days_in_month(year, month) {
            day -= days_in_month(year, month);
            month += 1;
            if month == 13 {
                month = 1;
                year += 1;
            }
        }

        let landed = unix_days_from_date(year, month, day) + i64::from(age.days);
        date_from_unix_days(landed)
    }

    #[test]
    fn day_number_round_trips_across_eras() {
        assert_eq!(unix_days_from_date(1970, 1, 1), 0);
        assert_eq!(date_from_unix_days(0), (1970, 1, 1));
        assert_eq!(unix_days_from_date(2000, 3, 1), 11017);

        for days in (-900_000..900_000).step_by(263) {
            let (year, month, day) = date_from_unix_days(days);
            assert_eq!(unix_days_from_date(year, month, day), days);
        }
    }

    #[test]
    fn every_pair_in_window_normalizes_and_reconstructs() {
        // Window spans the 2000 century leap year.
        let first = unix_days_from_date(1999, 1, 1);
        let last = unix_days_from_date(2000, 12, 31);

        for birth_days in first..=last {
            let (by, bm, bd) = date_from_unix_days(birth_days);
            let birth = date(by, bm, bd);
            for reference_days in birth_days..=last {
                let (ry, rm, rd) = date_from_unix_days(reference_days);
                let reference = date(ry, rm, rd);

                let age = age_between(birth, reference).unwrap();
                assert!(age.years >= 0, "{birth} -> {reference}: {age:?}");
                assert!(
                    (0..=11).contains(&age.months),
                    "{birth} -> {reference}: {age:?}"
                );
                assert!(age.days >= 0, "{birth} -> {reference}: {age:?}");
                assert_eq!(
                    advance(birth, age),
                    (ry, rm, rd),
                    "{birth} -> {reference}: {age:?}"
                );
            }
        }
    }

    #[test]
    fn sampled_pairs_around_1900_century_boundary_reconstruct() {
        // 1900 is not a leap year; stride keeps the sweep affordable.
        let first = unix_days_from_date(1896, 1, 1);
        let last = unix_days_from_date(1904, 12, 31);

        for birth_days in (first..=last).step_by(11) {
            let (by, bm, bd) = date_from_unix_days(birth_days);
            let birth = date(by, bm, bd);
            for reference_days in (birth_days..=last).step_by(7) {
                let (ry, rm, rd) = date_from_unix_days(reference_days);
                let reference = date(ry, rm, rd);

                let age = age_between(birth, reference).unwrap();
                assert!((0..=11).contains(&age.months));
                assert!(age.days >= 0);
                assert_eq!(advance(birth, age), (ry, rm, rd));
            }
        }
    }

    #[test]
    fn diff_parts_accepts_pre_gregorian_virtual_starts() {
        // Virtual starts from scaling may precede year 1.
        let reference = date(10, 1, 1);
        let age = diff_parts(-5, 1, 1, reference);
        assert_eq!(age, Age::new(15, 0, 0));
    }
}
