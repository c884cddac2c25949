//! Domain core for PawTrack.
//!
//! Age arithmetic, weight conversion, and the roster store live here. Layers
//! above this crate present what it computes and never re-derive it.

pub mod calendar;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod units;

pub use calendar::age::{age_between, equivalent_age, AgeError, DEFAULT_HUMAN_YEARS_FACTOR};
pub use calendar::text::{format_date, parse_date, DateTextError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::date::{Age, CalendarDate, DateValidationError};
pub use model::dog::{Dog, DogCard, DogDraft, DogId, DogValidationError, Weight};
pub use model::settings::{DateLayout, DisplaySettings, WeightUnit};
pub use repo::roster_repo::{
    PersistedRoster, RepoResult, RosterPersistence, RosterRepoError, SqliteRosterRepository,
};
pub use service::clock::{FixedDateProvider, ReferenceDateProvider};
pub use service::derive::{derive_card, derive_cards, DeriveError, DeriveOutcome};
pub use service::roster::{
    DogRoster, RosterError, RosterResult, RosterSnapshot, RosterSubscription, SubscriptionId,
};
pub use units::{convert_weight, WeightError, LB_PER_KG};

/// Liveness probe for embedders wiring the crate up.
pub fn ping() -> &'static str {
    "pong"
}

/// Version of the core crate baked in at compile time.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
