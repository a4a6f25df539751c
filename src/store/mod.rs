//! Persistence seams for identities and events
//!
//! Services depend on the `UserStore` and `EventStore` traits only; the
//! SQLite implementation lives in [`sqlite`].

pub mod sqlite;

use chrono::{DateTime, Utc};
use rusqlite::{ffi, ErrorCode};

use crate::auth::models::Identity;
use crate::events::models::Event;

pub use sqlite::SqliteStore;

/// Storage-layer errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(rusqlite::Error),

    /// A unique or primary key constraint rejected the write
    #[error("Constraint violation: {0}")]
    Duplicate(String),

    #[error("Database connection lock poisoned")]
    Poisoned,
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(err, msg)
                if err.code == ErrorCode::ConstraintViolation
                    && (err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                        || err.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY) =>
            {
                StoreError::Duplicate(msg.clone().unwrap_or_else(|| err.to_string()))
            }
            _ => StoreError::Sqlite(e),
        }
    }
}

/// Identity persistence
pub trait UserStore: Send + Sync {
    /// Insert a new identity. Fails with `Duplicate` when the email is taken.
    fn insert_user(&self, identity: &Identity) -> Result<(), StoreError>;

    /// Overwrite the profile attributes of an existing identity
    fn update_user(&self, identity: &Identity) -> Result<(), StoreError>;

    fn find_user_by_id(&self, id: &str) -> Result<Option<Identity>, StoreError>;

    /// Case-insensitive lookup
    fn find_user_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError>;

    fn email_exists(&self, email: &str) -> Result<bool, StoreError>;

    fn list_users(&self) -> Result<Vec<Identity>, StoreError>;
}

/// Event and membership persistence
pub trait EventStore: Send + Sync {
    fn insert_event(&self, event: &Event) -> Result<(), StoreError>;

    fn find_event(&self, id: &str) -> Result<Option<Event>, StoreError>;

    fn event_exists(&self, id: &str) -> Result<bool, StoreError>;

    /// All events ordered by start time
    fn list_events(&self) -> Result<Vec<Event>, StoreError>;

    /// Returns `false` when no event had this id
    fn delete_event(&self, id: &str) -> Result<bool, StoreError>;

    /// Atomically add `user_id` to the event's participants.
    ///
    /// `Ok(false)` when the event does not exist, `Err(Duplicate)` when the
    /// pair is already present.
    fn add_participant(
        &self,
        event_id: &str,
        user_id: &str,
        joined_at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Returns whether a membership row was removed
    fn remove_participant(&self, event_id: &str, user_id: &str) -> Result<bool, StoreError>;

    fn list_events_for_participant(&self, user_id: &str) -> Result<Vec<Event>, StoreError>;
}
