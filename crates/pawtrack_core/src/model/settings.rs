//! Display preference enums and the process-wide settings value.
//!
//! # Responsibility
//! - Define the closed weight-unit and date-layout vocabularies.
//! - Map each variant to a stable integer index for storage columns.
//!
//! # Invariants
//! - Indices are append-only: existing variants never change index.
//! - Unknown indices are rejected, never defaulted.

use serde::{Deserialize, Serialize};

/// Mass unit used for canonical and displayed weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightUnit {
    Pounds,
    Kilograms,
}

impl WeightUnit {
    /// Stable storage index for this variant.
    pub fn to_index(self) -> i64 {
        match self {
            Self::Pounds => 0,
            Self::Kilograms => 1,
        }
    }

    /// Resolves a stored index back to a variant.
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Self::Pounds),
            1 => Some(Self::Kilograms),
            _ => None,
        }
    }

    /// Short unit label shown next to weight values.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::Pounds => "lb",
            Self::Kilograms => "kg",
        }
    }
}

/// Textual layout for birth dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateLayout {
    /// `month/day/year`, e.g. `4/19/2023`.
    MonthDayYear,
    /// `day/month/year`, e.g. `19/4/2023`.
    DayMonthYear,
}

impl DateLayout {
    /// Stable storage index for this variant.
    pub fn to_index(self) -> i64 {
        match self {
            Self::MonthDayYear => 0,
            Self::DayMonthYear => 1,
        }
    }

    /// Resolves a stored index back to a variant.
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Self::MonthDayYear),
            1 => Some(Self::DayMonthYear),
            _ => None,
        }
    }

    /// Human-readable pattern for settings pickers.
    pub fn pattern(self) -> &'static str {
        match self {
            Self::MonthDayYear => "MM/DD/YYYY",
            Self::DayMonthYear => "DD/MM/YYYY",
        }
    }
}

/// Process-wide display preferences.
///
/// The roster store owns the single authoritative copy; recomputations
/// receive it by value so no other component can hold onto stale settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    pub date_layout: DateLayout,
    pub weight_unit: WeightUnit,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            date_layout: DateLayout::MonthDayYear,
            weight_unit: WeightUnit::Pounds,
        }
    }
}
