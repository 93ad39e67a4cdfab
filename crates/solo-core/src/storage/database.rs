//! SQLite-backed ledger and user store.
//!
//! One database file holds three tables:
//! - `users` -- one row per user; habit state is stored as JSON blobs
//! - `checkins` -- the append-only ledger, `UNIQUE(email, date)`
//! - `ideas` -- the community habit idea board
//!
//! The `UNIQUE(email, date)` index backs the ledger's one-check-in-per-day
//! invariant at the schema level; the engine checks `has_checked_in`
//! first, the index is the backstop.

use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::error::{ConflictError, CoreError, Result, StorageError};
use crate::habit::ladder::{ActiveHabit, GraduatedHabit, User};
use crate::habit::ledger::{CheckinRecord, Ledger};
use crate::habit::store::UserStore;

use super::data_dir;

/// SQLite database for users and check-ins.
pub struct Database {
    conn: Connection,
}

/// Raw `users` row before the JSON habit blobs are deserialized.
struct UserRow {
    id: String,
    email: String,
    reminder_time: String,
    active_json: Option<String>,
    graduated_json: String,
    created_at: String,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/solo/solo.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("solo.db");
        let conn = Connection::open(&path).map_err(|source| StorageError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS users (
                    id               TEXT PRIMARY KEY,
                    email            TEXT NOT NULL UNIQUE,
                    reminder_time    TEXT NOT NULL DEFAULT '08:00',
                    active_habit     TEXT,
                    graduated_habits TEXT NOT NULL DEFAULT '[]',
                    created_at       TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS checkins (
                    id         INTEGER PRIMARY KEY AUTOINCREMENT,
                    email      TEXT NOT NULL,
                    date       TEXT NOT NULL,
                    habit_name TEXT NOT NULL,
                    level      INTEGER NOT NULL,
                    task       TEXT NOT NULL,
                    UNIQUE(email, date)
                );

                CREATE TABLE IF NOT EXISTS ideas (
                    id         TEXT PRIMARY KEY,
                    text       TEXT NOT NULL,
                    author     TEXT NOT NULL DEFAULT 'Anonymous',
                    votes      INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL
                );

                -- Ledger queries are always keyed by user, often by habit.
                CREATE INDEX IF NOT EXISTS idx_checkins_email ON checkins(email);
                CREATE INDEX IF NOT EXISTS idx_checkins_email_habit
                    ON checkins(email, habit_name);",
            )
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
        Ok(UserRow {
            id: row.get(0)?,
            email: row.get(1)?,
            reminder_time: row.get(2)?,
            active_json: row.get(3)?,
            graduated_json: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn hydrate_user(row: UserRow) -> Result<User> {
        let created_at = row.created_at.parse().map_err(|_| {
            StorageError::QueryFailed(format!("bad created_at for user: {}", row.created_at))
        })?;
        Ok(User {
            id: row.id,
            email: row.email,
            reminder_time: row.reminder_time,
            active_habit: row
                .active_json
                .as_deref()
                .map(serde_json::from_str::<ActiveHabit>)
                .transpose()?,
            graduated_habits: serde_json::from_str(&row.graduated_json)?,
            created_at,
        })
    }

    fn write_user(&self, user: &User) -> Result<()> {
        let active_json = user
            .active_habit
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let graduated_json = serde_json::to_string(&user.graduated_habits)?;
        self.conn.execute(
            "UPDATE users
             SET reminder_time = ?2, active_habit = ?3, graduated_habits = ?4
             WHERE email = ?1",
            params![user.email, user.reminder_time, active_json, graduated_json],
        )?;
        Ok(())
    }
}

impl Ledger for Database {
    fn append(&mut self, record: CheckinRecord) -> Result<CheckinRecord> {
        let result = self.conn.execute(
            "INSERT INTO checkins (email, date, habit_name, level, task)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.email,
                record.date.to_string(),
                record.habit_name,
                record.level,
                record.task,
            ],
        );
        match result {
            Ok(_) => Ok(record),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(ConflictError::AlreadyCheckedIn { date: record.date }.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn has_checked_in(&self, email: &str, date: NaiveDate) -> Result<bool> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM checkins WHERE email = ?1 AND date = ?2",
            params![email, date.to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn all_for(&self, email: &str) -> Result<Vec<CheckinRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT email, date, habit_name, level, task FROM checkins WHERE email = ?1",
        )?;
        let rows = stmt.query_map(params![email], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (email, date, habit_name, level, task) = row?;
            let date = date
                .parse()
                .map_err(|_| StorageError::QueryFailed(format!("bad date in ledger: {date}")))?;
            records.push(CheckinRecord {
                email,
                date,
                habit_name,
                level,
                task,
            });
        }
        Ok(records)
    }

    fn count_for(&self, email: &str, habit_name: &str, level: u32) -> Result<u32> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM checkins
             WHERE email = ?1 AND habit_name = ?2 AND level = ?3",
            params![email, habit_name, level],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn count_for_habit(&self, email: &str, habit_name: &str) -> Result<u32> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM checkins WHERE email = ?1 AND habit_name = ?2",
            params![email, habit_name],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

impl UserStore for Database {
    fn get(&self, email: &str) -> Result<Option<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, email, reminder_time, active_habit, graduated_habits, created_at
             FROM users WHERE email = ?1",
        )?;
        let result = stmt.query_row(params![email], Self::row_to_user);
        match result {
            Ok(parts) => Ok(Some(Self::hydrate_user(parts)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn create(&mut self, user: &User) -> Result<()> {
        let active_json = user
            .active_habit
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let graduated_json = serde_json::to_string(&user.graduated_habits)?;
        let result = self.conn.execute(
            "INSERT INTO users (id, email, reminder_time, active_habit, graduated_habits, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id,
                user.email,
                user.reminder_time,
                active_json,
                graduated_json,
                user.created_at.to_string(),
            ],
        );
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(ConflictError::AlreadyExists {
                    email: user.email.clone(),
                }
                .into())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn update(&mut self, email: &str, mutate: &mut dyn FnMut(&mut User)) -> Result<User> {
        let mut user = self.get(email)?.ok_or_else(|| CoreError::NotFound {
            email: email.to_string(),
        })?;
        mutate(&mut user);
        self.write_user(&user)?;
        Ok(user)
    }

    fn count(&self) -> Result<u32> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }

    fn all(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, email, reminder_time, active_habit, graduated_habits, created_at
             FROM users ORDER BY id",
        )?;
        let rows = stmt.query_map([], Self::row_to_user)?;
        let mut users = Vec::new();
        for row in rows {
            users.push(Self::hydrate_user(row?)?);
        }
        Ok(users)
    }
}
