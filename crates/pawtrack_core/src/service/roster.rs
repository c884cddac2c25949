//! Canonical roster store.
//!
//! # Responsibility
//! - Own the canonical dog records and the display settings.
//! - Publish full-replacement snapshots to observers on every change.
//! - Write the roster through to persistence after each mutation.
//!
//! # Invariants
//! - Mutations are serialized by the store mutex; observers receive
//!   snapshots in mutation order.
//! - The in-memory roster stays authoritative when a disk write fails.
//! - An older snapshot never overwrites a newer one on disk.

use crate::model::date::CalendarDate;
use crate::model::dog::{Dog, DogCard, DogDraft, DogId, DogValidationError};
use crate::model::settings::DisplaySettings;
use crate::repo::roster_repo::{RosterPersistence, RosterRepoError};
use crate::service::clock::ReferenceDateProvider;
use crate::service::derive::{derive_card, derive_cards, DeriveError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::{self, Receiver, RecvError, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Immutable snapshot of every derived card, shared with observers.
pub type RosterSnapshot = Arc<Vec<DogCard>>;

/// Stable identity of one observer subscription.
pub type SubscriptionId = Uuid;

pub type RosterResult<T> = Result<T, RosterError>;

/// Error surface of the roster store.
#[derive(Debug)]
pub enum RosterError {
    Validation(DogValidationError),
    Derive(DeriveError),
    NotFound(DogId),
    Persistence(RosterRepoError),
}

impl Display for RosterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Derive(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "dog not found: {id}"),
            Self::Persistence(err) => write!(f, "roster write-through failed: {err}"),
        }
    }
}

impl Error for RosterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Derive(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Persistence(err) => Some(err),
        }
    }
}

impl From<DogValidationError> for RosterError {
    fn from(value: DogValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DeriveError> for RosterError {
    fn from(value: DeriveError) -> Self {
        Self::Derive(value)
    }
}

impl From<RosterRepoError> for RosterError {
    fn from(value: RosterRepoError) -> Self {
        Self::Persistence(value)
    }
}

struct Observer {
    id: SubscriptionId,
    sender: Sender<RosterSnapshot>,
}

struct RosterState {
    dogs: Vec<Dog>,
    settings: DisplaySettings,
    next_id: DogId,
    snapshot: RosterSnapshot,
    observers: Vec<Observer>,
    mutation_seq: u64,
}

/// One observer's end of the snapshot channel.
///
/// Dropping the subscription detaches it; the store prunes it on the next
/// publish.
pub struct RosterSubscription {
    id: SubscriptionId,
    receiver: Receiver<RosterSnapshot>,
}

impl RosterSubscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Blocks until the next snapshot arrives.
    pub fn recv(&self) -> Result<RosterSnapshot, RecvError> {
        self.receiver.recv()
    }

    /// Returns the next snapshot if one is already queued.
    pub fn try_recv(&self) -> Result<RosterSnapshot, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Blocks up to `timeout` for the next snapshot.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<RosterSnapshot, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Canonical record store for the dog roster.
///
/// Holds the single authoritative copy of every record plus the display
/// settings; every derived card observers see is recomputed from here.
pub struct DogRoster<P: RosterPersistence> {
    persistence: P,
    clock: Arc<dyn ReferenceDateProvider>,
    state: Mutex<RosterState>,
    persisted_seq: Mutex<u64>,
}

impl<P: RosterPersistence> DogRoster<P> {
    /// Creates an empty roster with default display settings.
    pub fn new(persistence: P, clock: Arc<dyn ReferenceDateProvider>) -> Self {
        Self {
            persistence,
            clock,
            state: Mutex::new(RosterState {
                dogs: Vec::new(),
                settings: DisplaySettings::default(),
                next_id: 1,
                snapshot: Arc::new(Vec::new()),
                observers: Vec::new(),
                mutation_seq: 0,
            }),
            persisted_seq: Mutex::new(0),
        }
    }

    /// Registers an observer and immediately replays the current snapshot.
    ///
    /// # Contract
    /// - The first received snapshot is the state at subscription time.
    /// - Every later mutation delivers exactly one fresh snapshot, in
    ///   mutation order.
    pub fn observe(&self) -> RosterSubscription {
        let (sender, receiver) = mpsc::channel();
        let id = Uuid::new_v4();

        let mut state = self.lock_state();
        // The receiver is still in hand, so this send cannot fail.
        let _ = sender.send(state.snapshot.clone());
        state.observers.push(Observer { id, sender });
        drop(state);

        info!("event=roster_observe module=roster status=attach subscription={id}");
        RosterSubscription { id, receiver }
    }

    /// Adds a new dog and returns its assigned id.
    ///
    /// # Contract
    /// - The record is validated and derived before any state changes; a
    ///   dog born after the reference date is rejected whole.
    /// - Ids are assigned in increasing order and never reused.
    ///
    /// # Errors
    /// - `Validation` / `Derive` when the draft does not form a valid record.
    /// - `Persistence` when the write-through failed; the in-memory add
    ///   stands and observers already saw it.
    pub fn add_dog(&self, draft: DogDraft) -> RosterResult<DogId> {
        let today = self.clock.today();
        let (id, seq, dogs, settings) = {
            let mut state = self.lock_state();
            let dog = Dog::from_draft(state.next_id, draft);
            dog.validate()?;
            derive_card(&dog, state.settings, today)?;

            let id = dog.id;
            state.next_id += 1;
            state.dogs.push(dog);
            state.mutation_seq += 1;
            Self::recompute_and_publish(&mut state, today);
            (id, state.mutation_seq, state.dogs.clone(), state.settings)
        };

        self.persist_after(seq, &dogs, settings)?;
        Ok(id)
    }

    /// Replaces an existing dog record wholesale.
    ///
    /// # Errors
    /// - `NotFound` when no record carries the given id.
    /// - `Validation` / `Derive` when the replacement is not a valid record;
    ///   the stored record is untouched.
    /// - `Persistence` when the write-through failed; the in-memory update
    ///   stands.
    pub fn update_dog(&self, dog: Dog) -> RosterResult<()> {
        let today = self.clock.today();
        let (seq, dogs, settings) = {
            let mut state = self.lock_state();
            let Some(index) = state.dogs.iter().position(|existing| existing.id == dog.id)
            else {
                return Err(RosterError::NotFound(dog.id));
            };
            dog.validate()?;
            derive_card(&dog, state.settings, today)?;

            state.dogs[index] = dog;
            state.mutation_seq += 1;
            Self::recompute_and_publish(&mut state, today);
            (state.mutation_seq, state.dogs.clone(), state.settings)
        };

        self.persist_after(seq, &dogs, settings)
    }

    /// Removes one dog by id.
    ///
    /// # Errors
    /// - `NotFound` when no record carries the given id.
    /// - `Persistence` when the write-through failed; the in-memory removal
    ///   stands.
    pub fn remove_dog(&self, id: DogId) -> RosterResult<()> {
        let today = self.clock.today();
        let (seq, dogs, settings) = {
            let mut state = self.lock_state();
            let Some(index) = state.dogs.iter().position(|existing| existing.id == id) else {
                return Err(RosterError::NotFound(id));
            };

            state.dogs.remove(index);
            state.mutation_seq += 1;
            Self::recompute_and_publish(&mut state, today);
            (state.mutation_seq, state.dogs.clone(), state.settings)
        };

        self.persist_after(seq, &dogs, settings)
    }

    /// Removes every dog. Display settings and id assignment are untouched.
    pub fn clear(&self) -> RosterResult<()> {
        let today = self.clock.today();
        let (seq, settings) = {
            let mut state = self.lock_state();
            state.dogs.clear();
            state.mutation_seq += 1;
            Self::recompute_and_publish(&mut state, today);
            (state.mutation_seq, state.settings)
        };

        self.persist_after(seq, &[], settings)
    }

    /// Replaces the display settings and recomputes every card.
    ///
    /// # Contract
    /// - Setting identical settings still recomputes, publishes, and
    ///   persists; the outcome is idempotent, the work is not skipped.
    pub fn set_display_settings(&self, settings: DisplaySettings) -> RosterResult<()> {
        let today = self.clock.today();
        let (seq, dogs) = {
            let mut state = self.lock_state();
            state.settings = settings;
            state.mutation_seq += 1;
            Self::recompute_and_publish(&mut state, today);
            (state.mutation_seq, state.dogs.clone())
        };

        self.persist_after(seq, &dogs, settings)
    }

    /// Replaces in-memory state from persistence and publishes it.
    ///
    /// Does not write back; the loaded snapshot is marked persisted so a
    /// concurrent older write cannot clobber it.
    ///
    /// # Errors
    /// - `Persistence` when the stored roster cannot be read or contains
    ///   invalid rows. In-memory state is untouched in that case.
    pub fn load(&self) -> RosterResult<()> {
        let started_at = Instant::now();
        info!("event=roster_load module=roster status=start");

        let persisted = match self.persistence.load() {
            Ok(persisted) => persisted,
            Err(err) => {
                error!(
                    "event=roster_load module=roster status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(RosterError::Persistence(err));
            }
        };

        let today = self.clock.today();
        let (seq, count) = {
            let mut state = self.lock_state();
            state.next_id = persisted
                .dogs
                .iter()
                .map(|dog| dog.id)
                .max()
                .map_or(1, |max| max + 1);
            state.dogs = persisted.dogs;
            state.settings = persisted.settings;
            state.mutation_seq += 1;
            Self::recompute_and_publish(&mut state, today);
            (state.mutation_seq, state.dogs.len())
        };

        let mut last = self.lock_persisted_seq();
        if seq > *last {
            *last = seq;
        }
        drop(last);

        info!(
            "event=roster_load module=roster status=ok duration_ms={} dogs={}",
            started_at.elapsed().as_millis(),
            count
        );
        Ok(())
    }

    /// Returns a copy of the canonical records.
    pub fn dogs(&self) -> Vec<Dog> {
        self.lock_state().dogs.clone()
    }

    /// Returns the active display settings.
    pub fn display_settings(&self) -> DisplaySettings {
        self.lock_state().settings
    }

    /// Returns the current derived snapshot.
    pub fn snapshot(&self) -> RosterSnapshot {
        self.lock_state().snapshot.clone()
    }

    fn recompute_and_publish(state: &mut RosterState, today: CalendarDate) {
        let outcome = derive_cards(&state.dogs, state.settings, today);
        for (dog_id, err) in &outcome.failures {
            warn!("event=roster_derive module=roster status=skip dog={dog_id} error={err}");
        }
        state.snapshot = Arc::new(outcome.cards);

        let snapshot = state.snapshot.clone();
        state.observers.retain(|observer| {
            if observer.sender.send(snapshot.clone()).is_ok() {
                true
            } else {
                info!(
                    "event=roster_observe module=roster status=detach subscription={}",
                    observer.id
                );
                false
            }
        });
    }

    /// Writes one mutation's snapshot through to persistence.
    ///
    /// The gate holds the highest persisted sequence; a snapshot older than
    /// what is already on disk is dropped instead of written.
    fn persist_after(&self, seq: u64, dogs: &[Dog], settings: DisplaySettings) -> RosterResult<()> {
        let mut last = self.lock_persisted_seq();
        if seq <= *last {
            return Ok(());
        }

        match self.persistence.save(dogs, settings) {
            Ok(()) => {
                *last = seq;
                Ok(())
            }
            Err(err) => {
                error!("event=roster_persist module=roster status=error seq={seq} error={err}");
                Err(RosterError::Persistence(err))
            }
        }
    }

    // No code path panics while holding either lock; recover the guard
    // instead of cascading poison.
    fn lock_state(&self) -> MutexGuard<'_, RosterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_persisted_seq(&self) -> MutexGuard<'_, u64> {
        self.persisted_seq.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
