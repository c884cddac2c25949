//! Reference-date provider seam.
//!
//! # Responsibility
//! - Define where "today" comes from without reading a clock in the core.
//!
//! # Invariants
//! - The core never consults the system clock; the embedding shell decides
//!   what the reference date is.

use crate::model::date::CalendarDate;

/// Source of the reference date used for age derivation.
///
/// Implemented by the embedding shell (system clock, test fixture).
pub trait ReferenceDateProvider: Send + Sync {
    /// Returns the current reference date.
    fn today(&self) -> CalendarDate;
}

/// Provider pinned to one date. Used by tests and deterministic replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDateProvider {
    date: CalendarDate,
}

impl FixedDateProvider {
    pub fn new(date: CalendarDate) -> Self {
        Self { date }
    }
}

impl ReferenceDateProvider for FixedDateProvider {
    fn today(&self) -> CalendarDate {
        self.date
    }
}
