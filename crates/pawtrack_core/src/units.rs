//! Weight unit conversion.
//!
//! # Responsibility
//! - Convert weights between pounds and kilograms.
//! - Round every result to two decimals with decimal half-up.
//!
//! # Invariants
//! - `1 kg = 2.20462 lb` exactly; kg to lb multiplies, lb to kg divides.
//! - Same-unit conversion still rounds (idempotent identity).
//! - Invalid input is rejected, never clamped.

use crate::model::settings::WeightUnit;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Pounds per kilogram.
pub const LB_PER_KG: f64 = 2.20462;

/// Error for weight conversion input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightError {
    /// NaN or infinite input.
    NotFinite,
    /// Negative input.
    Negative,
    /// Magnitude beyond the two-decimal integer range.
    OutOfRange,
}

impl Display for WeightError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFinite => write!(f, "weight is not a finite number"),
            Self::Negative => write!(f, "weight is negative"),
            Self::OutOfRange => write!(f, "weight magnitude exceeds the convertible range"),
        }
    }
}

impl Error for WeightError {}

/// Converts a weight between units and rounds to two decimals.
///
/// `from == to` performs no scaling but still rounds, so a stored raw
/// value and its displayed form agree.
///
/// # Errors
/// - `NotFinite` for NaN or infinite input.
/// - `Negative` for negative input; zero is accepted.
/// - `OutOfRange` when the scaled value cannot be expressed in cents.
pub fn convert_weight(value: f64, from: WeightUnit, to: WeightUnit) -> Result<f64, WeightError> {
    if !value.is_finite() {
        return Err(WeightError::NotFinite);
    }
    if value < 0.0 {
        return Err(WeightError::Negative);
    }
    let scaled = match (from, to) {
        (WeightUnit::Kilograms, WeightUnit::Pounds) => value * LB_PER_KG,
        (WeightUnit::Pounds, WeightUnit::Kilograms) => value / LB_PER_KG,
        _ => value,
    };
    round_to_hundredths(scaled)
}

/// Decimal round-half-up at two digits.
///
/// Operates on the shortest round-trip decimal rendering of the value,
/// so the half-up decision sees the decimal a user would read instead of
/// binary representation noise (`2.675` rounds up to `2.68` even though
/// its nearest f64 sits just below the tie).
fn round_to_hundredths(value: f64) -> Result<f64, WeightError> {
    // Scaling a finite value near f64::MAX can overflow to infinity.
    if !value.is_finite() {
        return Err(WeightError::OutOfRange);
    }
    // Negative zero renders with a sign; normalize before rendering.
    let value = if value == 0.0 { 0.0 } else { value };
    // `Display` for f64 is the shortest decimal that parses back to the
    // same bits, always in positional notation.
    let text = format!("{value}");
    let (int_text, frac_text) = match text.split_once('.') {
        Some((int_text, frac_text)) => (int_text, frac_text),
        None => (text.as_str(), ""),
    };

    let mut cents: i64 = 0;
    for digit in int_text.bytes() {
        cents = cents
            .checked_mul(10)
            .and_then(|c| c.checked_add(i64::from(digit - b'0')))
            .ok_or(WeightError::OutOfRange)?;
    }
    cents = cents.checked_mul(100).ok_or(WeightError::OutOfRange)?;

    let mut frac = frac_text.bytes();
    for place in [10, 1] {
        if let Some(digit) = frac.next() {
            cents = cents
                .checked_add(i64::from(digit - b'0') * place)
                .ok_or(WeightError::OutOfRange)?;
        }
    }
    // The tail is at least half a cent exactly when its first digit is 5+.
    if matches!(frac.next(), Some(digit) if digit >= b'5') {
        cents = cents.checked_add(1).ok_or(WeightError::OutOfRange)?;
    }

    Ok(cents as f64 / 100.0)
}
