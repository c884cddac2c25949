//! Use-case services over the domain model.
//!
//! # Responsibility
//! - Derive display projections from canonical records.
//! - Hold the canonical roster and publish snapshots to observers.
//! - Keep UI shells decoupled from storage details.

pub mod clock;
pub mod derive;
pub mod roster;
