//! SQLite database operations for identities, events and memberships

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{EventStore, StoreError, UserStore};
use crate::auth::models::{Gender, Identity, MemberStatus, Profile, Role};
use crate::events::models::{Event, EventCategory};

const USER_COLUMNS: &str = "id, email, password_hash, role, first_name, last_name, phone, gender, \
     bac_year, bac_track, status, specialty, avatar, created_at, updated_at";

const EVENT_COLUMNS: &str =
    "id, title, description, starts_at, location, category, created_by, created_at";

/// Database connection wrapper
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a database file and initialize tables
    pub fn new(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Create in-memory database (for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_tables()?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Initialize database tables
    fn init_tables(&self) -> Result<(), StoreError> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'MEMBER',
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                phone TEXT NOT NULL,
                gender TEXT,
                bac_year INTEGER,
                bac_track TEXT,
                status TEXT,
                specialty TEXT,
                avatar TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS events (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                starts_at TEXT NOT NULL,
                location TEXT NOT NULL,
                category TEXT NOT NULL,
                created_by TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (created_by) REFERENCES users(id)
            );

            CREATE TABLE IF NOT EXISTS event_participants (
                event_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                joined_at TEXT NOT NULL,
                PRIMARY KEY (event_id, user_id),
                FOREIGN KEY (event_id) REFERENCES events(id) ON DELETE CASCADE,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_events_starts_at ON events(starts_at);
            CREATE INDEX IF NOT EXISTS idx_participants_user ON event_participants(user_id);
            "#,
        )?;

        Ok(())
    }

    fn load_participants(conn: &Connection, event_id: &str) -> Result<Vec<String>, StoreError> {
        let mut stmt = conn.prepare(
            "SELECT user_id FROM event_participants
             WHERE event_id = ?1 ORDER BY joined_at, rowid",
        )?;
        let ids = stmt
            .query_map(params![event_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }

    fn attach_participants(conn: &Connection, mut events: Vec<Event>) -> Result<Vec<Event>, StoreError> {
        for event in &mut events {
            event.participants = Self::load_participants(conn, &event.id)?;
        }
        Ok(events)
    }
}

fn format_time(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_time(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_column<T>(idx: usize, raw: &str, parse: fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    parse(raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unrecognized value {:?}", raw).into(),
        )
    })
}

fn parse_optional<T>(
    idx: usize,
    raw: Option<String>,
    parse: fn(&str) -> Option<T>,
) -> rusqlite::Result<Option<T>> {
    raw.map(|s| parse_column(idx, &s, parse)).transpose()
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<Identity> {
    let role: String = row.get(3)?;
    Ok(Identity {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        role: parse_column(3, &role, Role::parse)?,
        profile: Profile {
            first_name: row.get(4)?,
            last_name: row.get(5)?,
            phone: row.get(6)?,
            gender: parse_optional(7, row.get(7)?, Gender::parse)?,
            bac_year: row.get(8)?,
            bac_track: row.get(9)?,
            status: parse_optional(10, row.get(10)?, MemberStatus::parse)?,
            specialty: row.get(11)?,
            avatar: row.get(12)?,
        },
        created_at: parse_time(13, row.get(13)?)?,
        updated_at: parse_time(14, row.get(14)?)?,
    })
}

/// Event row without its participants
fn event_from_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    let category: String = row.get(5)?;
    Ok(Event {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        starts_at: parse_time(3, row.get(3)?)?,
        location: row.get(4)?,
        category: parse_column(5, &category, EventCategory::parse)?,
        created_by: row.get(6)?,
        created_at: parse_time(7, row.get(7)?)?,
        participants: Vec::new(),
    })
}

impl UserStore for SqliteStore {
    fn insert_user(&self, identity: &Identity) -> Result<(), StoreError> {
        let conn = self.conn()?;
        let p = &identity.profile;
        conn.execute(
            &format!(
                "INSERT INTO users ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                USER_COLUMNS
            ),
            params![
                identity.id,
                identity.email,
                identity.password_hash,
                identity.role.as_str(),
                p.first_name,
                p.last_name,
                p.phone,
                p.gender.map(|g| g.as_str()),
                p.bac_year,
                p.bac_track,
                p.status.map(|s| s.as_str()),
                p.specialty,
                p.avatar,
                format_time(&identity.created_at),
                format_time(&identity.updated_at),
            ],
        )?;
        Ok(())
    }

    fn update_user(&self, identity: &Identity) -> Result<(), StoreError> {
        let conn = self.conn()?;
        let p = &identity.profile;
        conn.execute(
            "UPDATE users SET first_name = ?1, last_name = ?2, phone = ?3, gender = ?4,
                 bac_year = ?5, bac_track = ?6, status = ?7, specialty = ?8, avatar = ?9,
                 updated_at = ?10
             WHERE id = ?11",
            params![
                p.first_name,
                p.last_name,
                p.phone,
                p.gender.map(|g| g.as_str()),
                p.bac_year,
                p.bac_track,
                p.status.map(|s| s.as_str()),
                p.specialty,
                p.avatar,
                format_time(&identity.updated_at),
                identity.id,
            ],
        )?;
        Ok(())
    }

    fn find_user_by_id(&self, id: &str) -> Result<Option<Identity>, StoreError> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
                params![id],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS),
                params![email.trim()],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let exists = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)",
            params![email.trim()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn list_users(&self) -> Result<Vec<Identity>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users ORDER BY created_at, rowid",
            USER_COLUMNS
        ))?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }
}

impl EventStore for SqliteStore {
    fn insert_event(&self, event: &Event) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            &format!(
                "INSERT INTO events ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                EVENT_COLUMNS
            ),
            params![
                event.id,
                event.title,
                event.description,
                format_time(&event.starts_at),
                event.location,
                event.category.as_str(),
                event.created_by,
                format_time(&event.created_at),
            ],
        )?;
        Ok(())
    }

    fn find_event(&self, id: &str) -> Result<Option<Event>, StoreError> {
        let conn = self.conn()?;
        let event = conn
            .query_row(
                &format!("SELECT {} FROM events WHERE id = ?1", EVENT_COLUMNS),
                params![id],
                event_from_row,
            )
            .optional()?;

        match event {
            Some(mut event) => {
                event.participants = Self::load_participants(&conn, &event.id)?;
                Ok(Some(event))
            }
            None => Ok(None),
        }
    }

    fn event_exists(&self, id: &str) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let exists = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM events WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        let conn = self.conn()?;
        let events = {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM events ORDER BY starts_at, rowid",
                EVENT_COLUMNS
            ))?;
            let rows = stmt.query_map([], event_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        };
        Self::attach_participants(&conn, events)
    }

    fn delete_event(&self, id: &str) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM events WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    fn add_participant(
        &self,
        event_id: &str,
        user_id: &str,
        joined_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        // existence check and insert are one statement; the primary key rejects duplicates
        let inserted = conn.execute(
            "INSERT INTO event_participants (event_id, user_id, joined_at)
             SELECT ?1, ?2, ?3 WHERE EXISTS (SELECT 1 FROM events WHERE id = ?1)",
            params![event_id, user_id, format_time(&joined_at)],
        )?;
        Ok(inserted > 0)
    }

    fn remove_participant(&self, event_id: &str, user_id: &str) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM event_participants WHERE event_id = ?1 AND user_id = ?2",
            params![event_id, user_id],
        )?;
        Ok(removed > 0)
    }

    fn list_events_for_participant(&self, user_id: &str) -> Result<Vec<Event>, StoreError> {
        let conn = self.conn()?;
        let events = {
            let mut stmt = conn.prepare(
                "SELECT e.id, e.title, e.description, e.starts_at, e.location, e.category,
                        e.created_by, e.created_at
                 FROM events e
                 JOIN event_participants p ON p.event_id = e.id
                 WHERE p.user_id = ?1
                 ORDER BY e.starts_at, e.rowid",
            )?;
            let rows = stmt.query_map(params![user_id], event_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        };
        Self::attach_participants(&conn, events)
    }
}
