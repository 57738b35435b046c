//! SQLite-backed event recorder for Waymark.
//!
//! Writes one row per event into a `user_events` table. Meant to sit behind a
//! [`QueueingRecorder`](waymark_recorder::QueueingRecorder), which keeps the
//! blocking inserts off the producers' threads.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::{debug, error, info};
use waymark_common_config::ConfigSource;
use waymark_event_types::{EventKind, SubjectId, UserEvent};
use waymark_recorder::{Recorder, RecorderError, CONFIG_SECTION};

/// Key holding the database path, or `:memory:`.
pub const CONNECTION_STRING_KEY: &str = "ConnectionString";

const IN_MEMORY: &str = ":memory:";

/// Records user events into SQLite.
#[derive(Debug, Default)]
pub struct SqliteRecorder {
    conn: Option<Connection>,
}

impl SqliteRecorder {
    /// Create an unopened recorder. `initialise` opens the database.
    pub fn new() -> Self {
        Self::default()
    }

    fn conn(&self) -> Result<&Connection, RecorderError> {
        self.conn.as_ref().ok_or(RecorderError::NotInitialised)
    }

    fn create_schema(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS user_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                subject_id TEXT NOT NULL,
                subject_name TEXT NOT NULL,
                kind TEXT NOT NULL,
                location TEXT NOT NULL,
                occurred_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_user_events_subject
             ON user_events(subject_id)",
            [],
        )?;

        Ok(())
    }

    /// Read back every stored event in insertion order.
    pub fn events(&self) -> Result<Vec<UserEvent>, RecorderError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT subject_id, subject_name, kind, location, occurred_at
                 FROM user_events
                 ORDER BY id",
            )
            .map_err(|e| RecorderError::write(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                let subject_id: String = row.get(0)?;
                let subject_id: SubjectId = subject_id.parse().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
                })?;
                let kind: String = row.get(2)?;
                let occurred_at: DateTime<Utc> = row.get(4)?;

                Ok(UserEvent::builder(subject_id, EventKind::from(kind))
                    .subject_name(row.get::<_, String>(1)?)
                    .location(row.get::<_, String>(3)?)
                    .timestamp(occurred_at)
                    .build())
            })
            .map_err(|e| RecorderError::write(e.to_string()))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| RecorderError::write(e.to_string()))
    }
}

impl Recorder for SqliteRecorder {
    fn initialise(&mut self, config: &dyn ConfigSource) -> Result<(), RecorderError> {
        let target = config.require_string(CONFIG_SECTION, CONNECTION_STRING_KEY)?;

        let conn = if target == IN_MEMORY {
            Connection::open_in_memory()
        } else {
            Connection::open(&target)
        }
        .and_then(|conn| Self::create_schema(&conn).map(|()| conn))
        .map_err(|e| {
            error!(database = %target, error = %e, "failed to open event database");
            RecorderError::write(e.to_string())
        })?;

        info!(database = %target, "event database ready");
        self.conn = Some(conn);
        Ok(())
    }

    fn record(&mut self, event: &UserEvent) -> Result<(), RecorderError> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO user_events (subject_id, subject_name, kind, location, occurred_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                event.subject_id().to_string(),
                event.subject_name(),
                event.kind().as_str(),
                event.location(),
                event.timestamp(),
            ],
        )
        .map_err(|e| {
            error!(
                kind = %event.kind(),
                subject = %event.subject_id(),
                error = %e,
                "failed to record user event"
            );
            RecorderError::write(e.to_string())
        })?;

        debug!(kind = %event.kind(), subject = %event.subject_id(), "user event recorded");
        Ok(())
    }
}
