//! Persistence contracts and the SQLite-backed roster repository.
//!
//! # Responsibility
//! - Define the roster persistence contract.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes enforce `Dog::validate()` before persistence.
//! - Repository reads return semantic errors (`InvalidData`) in addition to
//!   DB transport errors.

pub mod roster_repo;
