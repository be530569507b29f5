//! Storage layer for timecapture.
//!
//! Provides persistence for subjects and punches using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! This means a `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization. A subject's punches are read
//! with a single statement, so parity is always computed over one consistent snapshot.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 format with millisecond precision
//! (e.g., `2024-01-15T10:30:00.000Z`). The fixed width keeps lexicographic
//! ordering identical to chronological ordering.
//!
//! ## Punch Uniqueness
//!
//! `punches` carries `UNIQUE (subject_id, timestamp)`. A subject's state is
//! derived from the parity of their punches, so two punches at the same instant
//! would make the order ambiguous; the write path rejects them with
//! [`DbError::DuplicatePunch`].

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tc_core::{
    HoursBounds, NewSubject, Punch, PunchId, PunchSource, Subject, SubjectId, ValidationError,
};
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// No subject has the given ID or username.
    #[error("could not find subject {0}")]
    SubjectNotFound(String),
    /// No punch has the given ID.
    #[error("could not find punch with id {0}")]
    PunchNotFound(PunchId),
    /// The subject already has a punch at this instant.
    #[error("punch for time {timestamp} already exists for subject {subject_id}")]
    DuplicatePunch {
        subject_id: SubjectId,
        timestamp: DateTime<Utc>,
    },
    /// Another subject already uses this username.
    #[error("username {0} is already taken")]
    DuplicateUsername(String),
    /// Failed to parse a stored punch timestamp.
    #[error("invalid timestamp for punch {punch_id}: {timestamp}")]
    TimestampParse {
        punch_id: i64,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored subject failed validation.
    #[error("invalid stored subject: {0}")]
    Validation(#[from] ValidationError),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

const SUBJECT_COLUMNS: &str =
    "id, username, first_name, last_name, week_hours_min, week_hours_max";

/// A subject row before its bounds are validated.
struct SubjectRow {
    id: i64,
    username: String,
    first_name: String,
    last_name: String,
    week_hours_min: f64,
    week_hours_max: f64,
}

impl SubjectRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            week_hours_min: row.get(4)?,
            week_hours_max: row.get(5)?,
        })
    }

    fn into_subject(self) -> Result<Subject, DbError> {
        Ok(Subject {
            id: SubjectId::new(self.id),
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            bounds: HoursBounds::new(self.week_hours_min, self.week_hours_max)?,
        })
    }
}

/// A punch row before its timestamp is parsed.
struct PunchRow {
    id: i64,
    subject_id: i64,
    timestamp: String,
}

impl PunchRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            subject_id: row.get(1)?,
            timestamp: row.get(2)?,
        })
    }

    fn into_punch(self) -> Result<Punch, DbError> {
        Ok(Punch {
            id: PunchId::new(self.id),
            subject_id: SubjectId::new(self.subject_id),
            timestamp: parse_timestamp(&self.timestamp, self.id)?,
        })
    }
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS subjects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE COLLATE NOCASE,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                week_hours_min REAL NOT NULL DEFAULT 0,
                week_hours_max REAL NOT NULL DEFAULT 168
            );

            -- Punches carry no IN/OUT column: state is the parity of a subject's punches
            -- timestamp: RFC 3339 with milliseconds (e.g., '2024-01-15T10:30:00.000Z')
            CREATE TABLE IF NOT EXISTS punches (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                subject_id INTEGER NOT NULL,
                timestamp TEXT NOT NULL,
                UNIQUE (subject_id, timestamp),
                FOREIGN KEY (subject_id) REFERENCES subjects(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_punches_timestamp ON punches(timestamp);
            ",
        )?;
        Ok(())
    }

    // ========== Subjects ==========

    /// Inserts a subject and returns it with its assigned ID.
    pub fn add_subject(&mut self, subject: &NewSubject) -> Result<Subject, DbError> {
        self.conn
            .execute(
                "
                INSERT INTO subjects (username, first_name, last_name, week_hours_min, week_hours_max)
                VALUES (?, ?, ?, ?, ?)
                ",
                params![
                    subject.username,
                    subject.first_name,
                    subject.last_name,
                    subject.bounds.min(),
                    subject.bounds.max(),
                ],
            )
            .map_err(|err| username_conflict(err, &subject.username))?;
        let id = SubjectId::new(self.conn.last_insert_rowid());
        tracing::debug!(%id, username = %subject.username, "added subject");
        self.get_subject(id)
    }

    /// Looks up a subject by ID.
    pub fn get_subject(&self, id: SubjectId) -> Result<Subject, DbError> {
        self.conn
            .query_row(
                &format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = ?"),
                [id.get()],
                SubjectRow::read,
            )
            .optional()?
            .ok_or_else(|| DbError::SubjectNotFound(format!("with id {id}")))?
            .into_subject()
    }

    /// Looks up a subject by username, ignoring case.
    pub fn find_subject_by_username(&self, username: &str) -> Result<Subject, DbError> {
        self.conn
            .query_row(
                &format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE username = ?"),
                [username],
                SubjectRow::read,
            )
            .optional()?
            .ok_or_else(|| DbError::SubjectNotFound(format!("with username {username}")))?
            .into_subject()
    }

    /// Lists subjects ordered by ID.
    pub fn list_subjects(&self) -> Result<Vec<Subject>, DbError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {SUBJECT_COLUMNS} FROM subjects ORDER BY id ASC"))?;
        let rows = stmt.query_map([], SubjectRow::read)?;
        let mut subjects = Vec::new();
        for row in rows {
            subjects.push(row?.into_subject()?);
        }
        Ok(subjects)
    }

    /// Replaces a subject's profile.
    pub fn update_subject(
        &mut self,
        id: SubjectId,
        subject: &NewSubject,
    ) -> Result<Subject, DbError> {
        let updated = self
            .conn
            .execute(
                "
                UPDATE subjects
                SET username = ?, first_name = ?, last_name = ?, week_hours_min = ?, week_hours_max = ?
                WHERE id = ?
                ",
                params![
                    subject.username,
                    subject.first_name,
                    subject.last_name,
                    subject.bounds.min(),
                    subject.bounds.max(),
                    id.get(),
                ],
            )
            .map_err(|err| username_conflict(err, &subject.username))?;
        if updated == 0 {
            return Err(DbError::SubjectNotFound(format!("with id {id}")));
        }
        self.get_subject(id)
    }

    /// Deletes a subject and all of their punches.
    pub fn delete_subject(&mut self, id: SubjectId) -> Result<Subject, DbError> {
        let subject = self.get_subject(id)?;
        self.conn
            .execute("DELETE FROM subjects WHERE id = ?", [id.get()])?;
        tracing::debug!(%id, "deleted subject");
        Ok(subject)
    }

    // ========== Punches ==========

    /// Records a punch for a subject.
    ///
    /// The timestamp is stored with millisecond precision; the returned punch
    /// carries the stored value.
    pub fn add_punch(
        &mut self,
        subject_id: SubjectId,
        timestamp: DateTime<Utc>,
    ) -> Result<Punch, DbError> {
        self.get_subject(subject_id)?;
        let stored = format_timestamp(timestamp);
        self.conn
            .execute(
                "INSERT INTO punches (subject_id, timestamp) VALUES (?, ?)",
                params![subject_id.get(), stored],
            )
            .map_err(|err| punch_conflict(err, subject_id, timestamp))?;
        let id = PunchId::new(self.conn.last_insert_rowid());
        tracing::debug!(%id, %subject_id, timestamp = %stored, "added punch");
        self.get_punch(id)
    }

    /// Looks up a punch by ID.
    pub fn get_punch(&self, id: PunchId) -> Result<Punch, DbError> {
        self.conn
            .query_row(
                "SELECT id, subject_id, timestamp FROM punches WHERE id = ?",
                [id.get()],
                PunchRow::read,
            )
            .optional()?
            .ok_or(DbError::PunchNotFound(id))?
            .into_punch()
    }

    /// Moves a punch to a new subject and/or time.
    pub fn update_punch(
        &mut self,
        id: PunchId,
        subject_id: SubjectId,
        timestamp: DateTime<Utc>,
    ) -> Result<Punch, DbError> {
        self.get_punch(id)?;
        self.get_subject(subject_id)?;
        self.conn
            .execute(
                "UPDATE punches SET subject_id = ?, timestamp = ? WHERE id = ?",
                params![subject_id.get(), format_timestamp(timestamp), id.get()],
            )
            .map_err(|err| punch_conflict(err, subject_id, timestamp))?;
        tracing::debug!(%id, %subject_id, "moved punch");
        self.get_punch(id)
    }

    /// Deletes a punch, returning what was removed.
    pub fn delete_punch(&mut self, id: PunchId) -> Result<Punch, DbError> {
        let punch = self.get_punch(id)?;
        self.conn
            .execute("DELETE FROM punches WHERE id = ?", [id.get()])?;
        tracing::debug!(%id, subject_id = %punch.subject_id, "deleted punch");
        Ok(punch)
    }

    /// Lists a subject's punches ordered by timestamp.
    ///
    /// Returns an empty list for a subject with no punches, including one that
    /// does not exist.
    pub fn list_punches(&self, subject_id: SubjectId) -> Result<Vec<Punch>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, subject_id, timestamp
            FROM punches
            WHERE subject_id = ?
            ORDER BY timestamp ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([subject_id.get()], PunchRow::read)?;
        let mut punches = Vec::new();
        for row in rows {
            punches.push(row?.into_punch()?);
        }
        Ok(punches)
    }
}

impl PunchSource for Database {
    type Error = DbError;

    fn subject(&self, id: SubjectId) -> Result<Subject, DbError> {
        self.get_subject(id)
    }

    fn punches(&self, id: SubjectId) -> Result<Vec<Punch>, DbError> {
        self.get_subject(id)?;
        self.list_punches(id)
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn username_conflict(err: rusqlite::Error, username: &str) -> DbError {
    if is_unique_violation(&err) {
        DbError::DuplicateUsername(username.to_string())
    } else {
        DbError::Sqlite(err)
    }
}

fn punch_conflict(
    err: rusqlite::Error,
    subject_id: SubjectId,
    timestamp: DateTime<Utc>,
) -> DbError {
    if is_unique_violation(&err) {
        tracing::warn!(%subject_id, %timestamp, "rejected duplicate punch");
        DbError::DuplicatePunch {
            subject_id,
            timestamp,
        }
    } else {
        DbError::Sqlite(err)
    }
}

fn parse_timestamp(timestamp: &str, punch_id: i64) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            punch_id,
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
