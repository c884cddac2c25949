//! Dog domain model.
//!
//! # Responsibility
//! - Define the canonical dog record and its draft/display companions.
//! - Validate record shape before it enters the roster or storage.
//!
//! # Invariants
//! - `Dog` is the source of truth: display formatting never mutates it.
//! - `DogCard` is rebuilt wholesale from a `Dog` plus the active display
//!   settings; it is never patched field by field.

use crate::model::date::{Age, CalendarDate};
use crate::model::settings::WeightUnit;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier assigned by the roster when a dog is added.
pub type DogId = i64;

/// A weight value paired with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    pub value: f64,
    pub unit: WeightUnit,
}

impl Weight {
    pub fn new(value: f64, unit: WeightUnit) -> Self {
        Self { value, unit }
    }
}

/// Validation error for dog records and drafts.
#[derive(Debug, Clone, PartialEq)]
pub enum DogValidationError {
    /// Name is empty after trimming.
    BlankName,
    /// Weight value is NaN or infinite.
    NonFiniteWeight(f64),
    /// Weight value is below zero.
    NegativeWeight(f64),
}

impl Display for DogValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "dog name must not be blank"),
            Self::NonFiniteWeight(value) => write!(f, "weight must be finite, got {value}"),
            Self::NegativeWeight(value) => write!(f, "weight must not be negative, got {value}"),
        }
    }
}

impl Error for DogValidationError {}

/// Caller-supplied fields for adding a dog; the roster assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DogDraft {
    pub name: String,
    pub birth_date: CalendarDate,
    pub weight: Weight,
    pub photo_uri: Option<String>,
}

impl DogDraft {
    pub fn new(name: impl Into<String>, birth_date: CalendarDate, weight: Weight) -> Self {
        Self {
            name: name.into(),
            birth_date,
            weight,
            photo_uri: None,
        }
    }
}

/// Canonical record for one dog.
///
/// Created on add, changed only by explicit update operations, removed on
/// delete. Display-preference changes never touch this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dog {
    pub id: DogId,
    pub name: String,
    pub birth_date: CalendarDate,
    pub weight: Weight,
    /// Opaque handle to a profile photo owned by the UI shell.
    pub photo_uri: Option<String>,
}

impl Dog {
    /// Materializes a draft into a canonical record under a roster id.
    pub fn from_draft(id: DogId, draft: DogDraft) -> Self {
        Self {
            id,
            name: draft.name,
            birth_date: draft.birth_date,
            weight: draft.weight,
            photo_uri: draft.photo_uri,
        }
    }

    /// Checks record shape ahead of roster mutation or persistence.
    ///
    /// # Errors
    /// - `BlankName` when the trimmed name is empty.
    /// - `NonFiniteWeight` / `NegativeWeight` for unusable weight values.
    pub fn validate(&self) -> Result<(), DogValidationError> {
        if self.name.trim().is_empty() {
            return Err(DogValidationError::BlankName);
        }
        if !self.weight.value.is_finite() {
            return Err(DogValidationError::NonFiniteWeight(self.weight.value));
        }
        if self.weight.value < 0.0 {
            return Err(DogValidationError::NegativeWeight(self.weight.value));
        }
        Ok(())
    }
}

/// Fully display-formatted reconstruction of one dog.
///
/// Every field is a pure function of `(Dog, DisplaySettings, today)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DogCard {
    pub id: DogId,
    pub name: String,
    /// Birth date rendered in the active date layout.
    pub birth_date_text: String,
    /// Weight converted and rounded into the active unit.
    pub weight: Weight,
    /// Elapsed calendar age at the reference date.
    pub age: Age,
    /// Equivalent human age under the configured scaling factor.
    pub human_age: Age,
    pub photo_uri: Option<String>,
}

impl DogCard {
    /// Weight rendered for list rows, e.g. `12.50 lb`.
    pub fn weight_text(&self) -> String {
        format!("{:.2} {}", self.weight.value, self.weight.unit.abbreviation())
    }
}
