use pawtrack_core::db::DbError;
use pawtrack_core::{
    CalendarDate, DateLayout, DisplaySettings, Dog, DogDraft, DogRoster, FixedDateProvider,
    PersistedRoster, ReferenceDateProvider, RosterError, RosterPersistence, RosterRepoError,
    Weight, WeightUnit,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::TryRecvError;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

fn date(year: i32, month: u32, day: u32) -> CalendarDate {
    CalendarDate::new(year, month, day).unwrap()
}

fn fixed_today() -> Arc<dyn ReferenceDateProvider> {
    Arc::new(FixedDateProvider::new(date(2023, 4, 17)))
}

fn draft(name: &str, birth: CalendarDate, weight: Weight) -> DogDraft {
    DogDraft::new(name, birth, weight)
}

/// In-memory stand-in for the SQLite collaborator, with switchable save
/// failure.
#[derive(Default)]
struct MemoryPersistence {
    saved: Mutex<(Vec<Dog>, DisplaySettings)>,
    save_calls: AtomicUsize,
    fail_saves: AtomicBool,
}

impl MemoryPersistence {
    fn seeded(dogs: Vec<Dog>, settings: DisplaySettings) -> Self {
        Self {
            saved: Mutex::new((dogs, settings)),
            ..Self::default()
        }
    }

    fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    fn set_failing(&self, failing: bool) {
        self.fail_saves.store(failing, Ordering::SeqCst);
    }

    fn saved_dogs(&self) -> Vec<Dog> {
        self.saved.lock().unwrap().0.clone()
    }
}

impl RosterPersistence for MemoryPersistence {
    fn save(&self, dogs: &[Dog], settings: DisplaySettings) -> Result<(), RosterRepoError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(RosterRepoError::Db(DbError::Sqlite(
                rusqlite::Error::InvalidQuery,
            )));
        }
        *self.saved.lock().unwrap() = (dogs.to_vec(), settings);
        Ok(())
    }

    fn load(&self) -> Result<PersistedRoster, RosterRepoError> {
        let (dogs, settings) = self.saved.lock().unwrap().clone();
        Ok(PersistedRoster { dogs, settings })
    }
}

/// Shared handle the roster owns; the orphan rule forbids implementing
/// `RosterPersistence` for `Arc<MemoryPersistence>` outside the core crate.
struct SharedPersistence(Arc<MemoryPersistence>);

impl RosterPersistence for SharedPersistence {
    fn save(&self, dogs: &[Dog], settings: DisplaySettings) -> Result<(), RosterRepoError> {
        self.0.save(dogs, settings)
    }

    fn load(&self) -> Result<PersistedRoster, RosterRepoError> {
        self.0.load()
    }
}

fn new_roster() -> (DogRoster<SharedPersistence>, Arc<MemoryPersistence>) {
    let persistence = Arc::new(MemoryPersistence::default());
    let roster = DogRoster::new(SharedPersistence(Arc::clone(&persistence)), fixed_today());
    (roster, persistence)
}

#[test]
fn observe_replays_the_current_snapshot_immediately() {
    let (roster, _persistence) = new_roster();
    roster
        .add_dog(draft("Rex", date(2020, 1, 1), Weight::new(30.0, WeightUnit::Pounds)))
        .unwrap();

    let subscription = roster.observe();
    let first = subscription.recv().unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].name, "Rex");

    roster
        .add_dog(draft("Luna", date(2021, 6, 15), Weight::new(8.0, WeightUnit::Kilograms)))
        .unwrap();
    let second = subscription.recv().unwrap();
    assert_eq!(second.len(), 2);
}

#[test]
fn snapshots_arrive_in_mutation_order() {
    let (roster, _persistence) = new_roster();
    let subscription = roster.observe();

    let rex = roster
        .add_dog(draft("Rex", date(2020, 1, 1), Weight::new(30.0, WeightUnit::Pounds)))
        .unwrap();
    roster
        .add_dog(draft("Luna", date(2021, 6, 15), Weight::new(8.0, WeightUnit::Kilograms)))
        .unwrap();
    roster.remove_dog(rex).unwrap();

    let sizes: Vec<usize> = (0..4).map(|_| subscription.recv().unwrap().len()).collect();
    assert_eq!(sizes, vec![0, 1, 2, 1]);

    let last = roster.snapshot();
    assert_eq!(last[0].name, "Luna");
    assert!(matches!(subscription.try_recv(), Err(TryRecvError::Empty)));
}

#[test]
fn settings_change_reflects_in_every_later_emission() {
    let (roster, _persistence) = new_roster();
    roster
        .add_dog(draft("Maya", date(2020, 2, 29), Weight::new(10.0, WeightUnit::Kilograms)))
        .unwrap();

    let subscription = roster.observe();
    let before = subscription.recv().unwrap();
    assert_eq!(before[0].weight, Weight::new(22.05, WeightUnit::Pounds));
    assert_eq!(before[0].birth_date_text, "2/29/2020");

    roster
        .set_display_settings(DisplaySettings {
            date_layout: DateLayout::DayMonthYear,
            weight_unit: WeightUnit::Kilograms,
        })
        .unwrap();

    let after = subscription.recv().unwrap();
    assert_eq!(after[0].weight, Weight::new(10.0, WeightUnit::Kilograms));
    assert_eq!(after[0].birth_date_text, "29/2/2020");

    // Later mutations keep using the new settings.
    roster
        .add_dog(draft("Rex", date(2021, 1, 2), Weight::new(1.0, WeightUnit::Kilograms)))
        .unwrap();
    let later = subscription.recv().unwrap();
    assert!(later
        .iter()
        .all(|card| card.weight.unit == WeightUnit::Kilograms));
}

#[test]
fn identical_settings_still_publish_and_persist() {
    let (roster, persistence) = new_roster();
    let subscription = roster.observe();
    let _initial = subscription.recv().unwrap();

    let calls_before = persistence.save_calls();
    roster.set_display_settings(DisplaySettings::default()).unwrap();

    let emitted = subscription.recv().unwrap();
    assert!(emitted.is_empty());
    assert_eq!(persistence.save_calls(), calls_before + 1);
}

#[test]
fn update_replaces_the_record_and_recomputes() {
    let (roster, persistence) = new_roster();
    let id = roster
        .add_dog(draft("Rex", date(2020, 1, 1), Weight::new(30.0, WeightUnit::Pounds)))
        .unwrap();

    let mut updated = roster.dogs().into_iter().find(|dog| dog.id == id).unwrap();
    updated.name = "Rex Jr".to_string();
    updated.weight = Weight::new(12.5, WeightUnit::Kilograms);
    roster.update_dog(updated).unwrap();

    let snapshot = roster.snapshot();
    assert_eq!(snapshot[0].name, "Rex Jr");
    // 12.5 kg shown under the default pound display.
    assert_eq!(snapshot[0].weight.unit, WeightUnit::Pounds);
    assert_eq!(persistence.saved_dogs()[0].name, "Rex Jr");
}

#[test]
fn unknown_ids_are_not_found() {
    let (roster, _persistence) = new_roster();

    let missing = Dog::from_draft(
        42,
        draft("Ghost", date(2020, 1, 1), Weight::new(1.0, WeightUnit::Pounds)),
    );
    assert!(matches!(
        roster.update_dog(missing).unwrap_err(),
        RosterError::NotFound(42)
    ));
    assert!(matches!(
        roster.remove_dog(42).unwrap_err(),
        RosterError::NotFound(42)
    ));
}

#[test]
fn rejected_add_leaves_no_trace() {
    let (roster, persistence) = new_roster();
    let subscription = roster.observe();
    let _initial = subscription.recv().unwrap();
    let calls_before = persistence.save_calls();

    let err = roster
        .add_dog(draft("Nova", date(2023, 4, 18), Weight::new(1.0, WeightUnit::Pounds)))
        .unwrap_err();
    assert!(matches!(err, RosterError::Derive(_)));

    assert!(roster.dogs().is_empty());
    assert!(matches!(subscription.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(persistence.save_calls(), calls_before);

    // The failed attempt must not burn the id either.
    let id = roster
        .add_dog(draft("Rex", date(2020, 1, 1), Weight::new(30.0, WeightUnit::Pounds)))
        .unwrap();
    assert_eq!(id, 1);
}

#[test]
fn persistence_failure_keeps_memory_authoritative() {
    let (roster, persistence) = new_roster();
    let subscription = roster.observe();
    let _initial = subscription.recv().unwrap();

    persistence.set_failing(true);
    let err = roster
        .add_dog(draft("Rex", date(2020, 1, 1), Weight::new(30.0, WeightUnit::Pounds)))
        .unwrap_err();
    assert!(matches!(err, RosterError::Persistence(_)));

    // The add stands in memory and observers already saw it.
    assert_eq!(roster.dogs().len(), 1);
    assert_eq!(subscription.recv().unwrap().len(), 1);
    assert!(persistence.saved_dogs().is_empty());

    // The next successful write carries the full roster, including the
    // record whose own write failed.
    persistence.set_failing(false);
    roster
        .add_dog(draft("Luna", date(2021, 6, 15), Weight::new(8.0, WeightUnit::Kilograms)))
        .unwrap();
    let saved = persistence.saved_dogs();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].name, "Rex");
    assert_eq!(saved[1].name, "Luna");
}

#[test]
fn load_replaces_state_and_notifies_without_writing_back() {
    let seeded_dog = Dog::from_draft(
        7,
        draft("Koda", date(2016, 7, 4), Weight::new(45.9, WeightUnit::Pounds)),
    );
    let seeded_settings = DisplaySettings {
        date_layout: DateLayout::DayMonthYear,
        weight_unit: WeightUnit::Kilograms,
    };
    let persistence = Arc::new(MemoryPersistence::seeded(vec![seeded_dog], seeded_settings));
    let roster = DogRoster::new(SharedPersistence(Arc::clone(&persistence)), fixed_today());

    let subscription = roster.observe();
    let _initial = subscription.recv().unwrap();

    roster.load().unwrap();

    let loaded = subscription.recv().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name, "Koda");
    assert_eq!(loaded[0].birth_date_text, "4/7/2016");
    assert_eq!(loaded[0].weight.unit, WeightUnit::Kilograms);

    assert_eq!(roster.display_settings(), seeded_settings);
    assert_eq!(persistence.save_calls(), 0);

    // Id assignment resumes after the highest persisted id.
    let id = roster
        .add_dog(draft("Rex", date(2020, 1, 1), Weight::new(30.0, WeightUnit::Pounds)))
        .unwrap();
    assert_eq!(id, 8);
}

#[test]
fn clear_keeps_settings_and_never_reuses_ids() {
    let (roster, persistence) = new_roster();
    let kg = DisplaySettings {
        weight_unit: WeightUnit::Kilograms,
        ..DisplaySettings::default()
    };
    roster.set_display_settings(kg).unwrap();
    roster
        .add_dog(draft("Rex", date(2020, 1, 1), Weight::new(30.0, WeightUnit::Pounds)))
        .unwrap();

    roster.clear().unwrap();

    assert!(roster.dogs().is_empty());
    assert!(roster.snapshot().is_empty());
    assert_eq!(roster.display_settings(), kg);
    assert!(persistence.saved_dogs().is_empty());

    let next = roster
        .add_dog(draft("Luna", date(2021, 6, 15), Weight::new(8.0, WeightUnit::Kilograms)))
        .unwrap();
    assert_eq!(next, 2);
}

#[test]
fn dropped_subscriptions_are_pruned_and_others_keep_receiving() {
    let (roster, _persistence) = new_roster();

    let dropped = roster.observe();
    let kept = roster.observe();
    drop(dropped);

    roster
        .add_dog(draft("Rex", date(2020, 1, 1), Weight::new(30.0, WeightUnit::Pounds)))
        .unwrap();

    let _initial = kept.recv().unwrap();
    let after_add = kept.recv().unwrap();
    assert_eq!(after_add.len(), 1);
}

#[test]
fn observers_receive_across_threads() {
    let persistence = Arc::new(MemoryPersistence::default());
    let roster = Arc::new(DogRoster::new(
        SharedPersistence(Arc::clone(&persistence)),
        fixed_today(),
    ));

    let subscription = roster.observe();
    let _initial = subscription.recv().unwrap();

    let handle = thread::spawn(move || {
        subscription
            .recv_timeout(Duration::from_secs(5))
            .expect("snapshot should arrive")
    });

    roster
        .add_dog(draft("Rex", date(2020, 1, 1), Weight::new(30.0, WeightUnit::Pounds)))
        .unwrap();

    let snapshot = handle.join().unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].name, "Rex");
}
