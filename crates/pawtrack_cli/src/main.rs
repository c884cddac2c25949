//! Smoke binary for exercising the core crate end to end.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `pawtrack_core` linkage.
//! - Run one derive pass against the system date as a wiring check.

use pawtrack_core::calendar::age::{date_from_unix_days, unix_days_from_date};
use pawtrack_core::{
    derive_card, CalendarDate, DisplaySettings, Dog, DogDraft, ReferenceDateProvider, Weight,
    WeightUnit,
};
use std::time::{SystemTime, UNIX_EPOCH};

/// Reference date from the process clock, at UTC day resolution.
struct SystemDateProvider;

impl ReferenceDateProvider for SystemDateProvider {
    fn today(&self) -> CalendarDate {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0);
        let (year, month, day) = date_from_unix_days((seconds / 86_400) as i64);
        CalendarDate::new(year, month, day).expect("day-number conversion yields a valid date")
    }
}

fn main() {
    println!("pawtrack_core ping={}", pawtrack_core::ping());
    println!("pawtrack_core version={}", pawtrack_core::core_version());

    let today = SystemDateProvider.today();
    let birth_days = unix_days_from_date(today.year(), today.month(), today.day()) - 500;
    let (year, month, day) = date_from_unix_days(birth_days);
    let birth =
        CalendarDate::new(year, month, day).expect("day-number conversion yields a valid date");

    let draft = DogDraft::new("Rex", birth, Weight::new(30.25, WeightUnit::Pounds));
    let dog = Dog::from_draft(1, draft);

    match derive_card(&dog, DisplaySettings::default(), today) {
        Ok(card) => {
            println!(
                "card name={} born={} age=[{}] human_age=[{}] weight={}",
                card.name,
                card.birth_date_text,
                card.age,
                card.human_age,
                card.weight_text()
            );
        }
        Err(err) => {
            eprintln!("derive failed: {err}");
            std::process::exit(1);
        }
    }
}
