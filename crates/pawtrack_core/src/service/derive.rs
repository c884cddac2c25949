//! Derived display projections.
//!
//! # Responsibility
//! - Recompute every `DogCard` field from the canonical record.
//!
//! # Invariants
//! - Derivation is pure: same record, settings, and reference date always
//!   produce the same card.
//! - No derived field is ever patched in place; cards are rebuilt whole.

use crate::calendar::age::{age_between, equivalent_age, AgeError, DEFAULT_HUMAN_YEARS_FACTOR};
use crate::calendar::text::format_date;
use crate::model::date::CalendarDate;
use crate::model::dog::{Dog, DogCard, DogId, Weight};
use crate::model::settings::DisplaySettings;
use crate::units::{convert_weight, WeightError};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error for card derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeriveError {
    Age(AgeError),
    Weight(WeightError),
}

impl Display for DeriveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Age(err) => write!(f, "{err}"),
            Self::Weight(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DeriveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Age(err) => Some(err),
            Self::Weight(err) => Some(err),
        }
    }
}

impl From<AgeError> for DeriveError {
    fn from(value: AgeError) -> Self {
        Self::Age(value)
    }
}

impl From<WeightError> for DeriveError {
    fn from(value: WeightError) -> Self {
        Self::Weight(value)
    }
}

/// Result of deriving a whole roster: cards for the records that derived
/// cleanly, failures for the ones that did not.
#[derive(Debug, Default)]
pub struct DeriveOutcome {
    pub cards: Vec<DogCard>,
    pub failures: Vec<(DogId, DeriveError)>,
}

/// Derives the display card for one dog.
///
/// Every field is recomputed from the canonical record. In particular the
/// displayed weight is always converted fresh from the stored weight, so
/// repeated unit flips cannot accumulate rounding drift.
///
/// # Errors
/// - `Age` when the birth date is after the reference date.
/// - `Weight` when the stored weight cannot be converted.
pub fn derive_card(
    dog: &Dog,
    settings: DisplaySettings,
    today: CalendarDate,
) -> Result<DogCard, DeriveError> {
    let age = age_between(dog.birth_date, today)?;
    let human_age = equivalent_age(dog.birth_date, today, DEFAULT_HUMAN_YEARS_FACTOR)?;
    let display_value = convert_weight(dog.weight.value, dog.weight.unit, settings.weight_unit)?;

    Ok(DogCard {
        id: dog.id,
        name: dog.name.clone(),
        birth_date_text: format_date(dog.birth_date, settings.date_layout),
        weight: Weight::new(display_value, settings.weight_unit),
        age,
        human_age,
        photo_uri: dog.photo_uri.clone(),
    })
}

/// Derives cards for a whole roster with per-record failure isolation.
///
/// A record that fails to derive is skipped and reported; it never blocks
/// the rest of the roster.
pub fn derive_cards(dogs: &[Dog], settings: DisplaySettings, today: CalendarDate) -> DeriveOutcome {
    let mut outcome = DeriveOutcome {
        cards: Vec::with_capacity(dogs.len()),
        failures: Vec::new(),
    };
    for dog in dogs {
        match derive_card(dog, settings, today) {
            Ok(card) => outcome.cards.push(card),
            Err(err) => outcome.failures.push((dog.id, err)),
        }
    }
    outcome
}
