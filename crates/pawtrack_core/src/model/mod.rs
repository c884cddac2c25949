//! Canonical domain model for dog records and display preferences.
//!
//! # Responsibility
//! - Define the validated value types shared by every core layer.
//! - Keep one canonical record shape; display projections derive from it.
//!
//! # Invariants
//! - Canonical data never carries display formatting.
//! - Enum storage indices are append-only and never reused.

pub mod date;
pub mod dog;
pub mod settings;
