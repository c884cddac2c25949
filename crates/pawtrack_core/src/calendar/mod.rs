//! Calendar arithmetic and date text.
//!
//! # Responsibility
//! - Compute elapsed calendar ages between validated dates.
//! - Convert user-entered date text to and from [`crate::model::date::CalendarDate`].

pub mod age;
pub mod text;
