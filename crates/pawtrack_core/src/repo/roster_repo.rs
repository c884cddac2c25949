//! Roster persistence contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist the full roster (dogs plus display settings) as one snapshot.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `save` replaces the whole roster inside a single transaction.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::date::CalendarDate;
use crate::model::dog::{Dog, DogId, DogValidationError, Weight};
use crate::model::settings::{DateLayout, DisplaySettings, WeightUnit};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, PoisonError};

const DOG_SELECT_SQL: &str = "SELECT
    id,
    name,
    birth_year,
    birth_month,
    birth_day,
    weight_value,
    weight_unit,
    photo_uri
FROM dogs";

pub type RepoResult<T> = Result<T, RosterRepoError>;

/// Generic repository error for roster persistence operations.
#[derive(Debug)]
pub enum RosterRepoError {
    Validation(DogValidationError),
    Db(DbError),
    InvalidData(String),
}

impl Display for RosterRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted roster data: {message}"),
        }
    }
}

impl Error for RosterRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DogValidationError> for RosterRepoError {
    fn from(value: DogValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RosterRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RosterRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Everything a persisted roster contains.
#[derive(Debug, Clone, Default)]
pub struct PersistedRoster {
    pub dogs: Vec<Dog>,
    pub settings: DisplaySettings,
}

/// Persistence interface for the roster store.
///
/// Implementations are shared across threads by the store, so they
/// serialize their own access.
pub trait RosterPersistence: Send + Sync {
    /// Replaces the persisted roster with the given snapshot.
    ///
    /// # Errors
    /// - `Validation` when a dog fails validation before any SQL runs.
    /// - `Db` when the underlying write fails.
    fn save(&self, dogs: &[Dog], settings: DisplaySettings) -> RepoResult<()>;

    /// Loads the persisted roster, or defaults when nothing was saved yet.
    ///
    /// # Errors
    /// - `Db` when the underlying read fails.
    /// - `InvalidData` when a persisted row does not form a valid record.
    fn load(&self) -> RepoResult<PersistedRoster>;
}

/// SQLite-backed roster persistence.
///
/// Owns its connection behind a mutex; `rusqlite::Connection` is not
/// `Sync`, and the store calls in from multiple threads.
pub struct SqliteRosterRepository {
    conn: Mutex<Connection>,
}

impl SqliteRosterRepository {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

impl RosterPersistence for SqliteRosterRepository {
    fn save(&self, dogs: &[Dog], settings: DisplaySettings) -> RepoResult<()> {
        for dog in dogs {
            dog.validate()?;
        }

        // A panicked writer cannot leave a torn snapshot behind: the
        // interrupted transaction rolls back on drop.
        let mut conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM dogs;", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO dogs (
                    id,
                    name,
                    birth_year,
                    birth_month,
                    birth_day,
                    weight_value,
                    weight_unit,
                    photo_uri
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            )?;
            for dog in dogs {
                stmt.execute(params![
                    dog.id,
                    dog.name.as_str(),
                    dog.birth_date.year(),
                    dog.birth_date.month(),
                    dog.birth_date.day(),
                    dog.weight.value,
                    dog.weight.unit.to_index(),
                    dog.photo_uri.as_deref(),
                ])?;
            }
        }

        tx.execute(
            "INSERT INTO display_settings (id, date_layout, weight_unit)
             VALUES (0, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET
                date_layout = excluded.date_layout,
                weight_unit = excluded.weight_unit;",
            params![
                settings.date_layout.to_index(),
                settings.weight_unit.to_index(),
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn load(&self) -> RepoResult<PersistedRoster> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);

        let settings = load_settings(&conn)?;

        let mut stmt = conn.prepare(&format!("{DOG_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut dogs = Vec::new();
        while let Some(row) = rows.next()? {
            dogs.push(parse_dog_row(row)?);
        }

        Ok(PersistedRoster { dogs, settings })
    }
}

fn load_settings(conn: &Connection) -> RepoResult<DisplaySettings> {
    let mut stmt =
        conn.prepare("SELECT date_layout, weight_unit FROM display_settings WHERE id = 0;")?;
    let mut rows = stmt.query([])?;

    let Some(row) = rows.next()? else {
        return Ok(DisplaySettings::default());
    };

    let layout_index: i64 = row.get("date_layout")?;
    let date_layout = DateLayout::from_index(layout_index).ok_or_else(|| {
        RosterRepoError::InvalidData(format!(
            "invalid layout index `{layout_index}` in display_settings.date_layout"
        ))
    })?;

    let unit_index: i64 = row.get("weight_unit")?;
    let weight_unit = WeightUnit::from_index(unit_index).ok_or_else(|| {
        RosterRepoError::InvalidData(format!(
            "invalid unit index `{unit_index}` in display_settings.weight_unit"
        ))
    })?;

    Ok(DisplaySettings {
        date_layout,
        weight_unit,
    })
}

fn parse_dog_row(row: &Row<'_>) -> RepoResult<Dog> {
    let id: DogId = row.get("id")?;

    let year: i64 = row.get("birth_year")?;
    let month: i64 = row.get("birth_month")?;
    let day: i64 = row.get("birth_day")?;
    let birth_date = calendar_date_from_columns(id, year, month, day)?;

    let unit_index: i64 = row.get("weight_unit")?;
    let unit = WeightUnit::from_index(unit_index).ok_or_else(|| {
        RosterRepoError::InvalidData(format!(
            "invalid unit index `{unit_index}` in dogs.weight_unit (id {id})"
        ))
    })?;

    let dog = Dog {
        id,
        name: row.get("name")?,
        birth_date,
        weight: Weight::new(row.get("weight_value")?, unit),
        photo_uri: row.get("photo_uri")?,
    };
    dog.validate()?;
    Ok(dog)
}

fn calendar_date_from_columns(id: DogId, year: i64, month: i64, day: i64) -> RepoResult<CalendarDate> {
    let out_of_range = || {
        RosterRepoError::InvalidData(format!(
            "invalid birth date `{year}-{month}-{day}` in dogs (id {id})"
        ))
    };

    let year = i32::try_from(year).map_err(|_| out_of_range())?;
    let month = u32::try_from(month).map_err(|_| out_of_range())?;
    let day = u32::try_from(day).map_err(|_| out_of_range())?;

    CalendarDate::new(year, month, day).map_err(|_| out_of_range())
}
