//! SQLite-backed checkpoint store.
//!
//! One row per (subject, period kind), overwritten in place on save.
//! Migrations are embedded and tracked via `PRAGMA user_version`.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

use super::CheckpointStore;
use crate::error::Result;
use crate::types::{PeriodKind, StreakCheckpoint, Subject};

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: checkpoint table
    r#"
    CREATE TABLE IF NOT EXISTS streak_checkpoints (
        subject      TEXT NOT NULL,
        period_kind  TEXT NOT NULL,
        count        INTEGER NOT NULL,
        anchor_date  TEXT NOT NULL,
        updated_at   DATETIME NOT NULL,

        PRIMARY KEY (subject, period_kind)
    );
    "#,
];

/// Durable checkpoint store over a single SQLite connection.
pub struct SqliteCheckpointStore {
    conn: Mutex<Connection>,
}

impl SqliteCheckpointStore {
    /// Open or create a store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;
        run_migrations(&conn)?;

        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Current schema version of the underlying database.
    pub fn schema_version(&self) -> Result<i32> {
        let conn = self.conn.lock().unwrap();
        let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
        Ok(version)
    }
}

impl CheckpointStore for SqliteCheckpointStore {
    fn load(&self, subject: &Subject, kind: PeriodKind) -> Result<StreakCheckpoint> {
        let conn = self.conn.lock().unwrap();
        let row: Option<(i64, String)> = conn
            .query_row(
                "SELECT count, anchor_date FROM streak_checkpoints
                 WHERE subject = ?1 AND period_kind = ?2",
                params![subject.storage_key(), kind.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((count, anchor_str)) = row else {
            return Ok(StreakCheckpoint::sentinel());
        };

        // A row we cannot make sense of degrades to the sentinel; a metrics
        // computation must never fail on bad persisted state.
        let anchor = match NaiveDate::parse_from_str(&anchor_str, "%Y-%m-%d") {
            Ok(anchor) => anchor,
            Err(_) => {
                tracing::warn!(
                    subject = %subject,
                    kind = %kind,
                    anchor = %anchor_str,
                    "Stored checkpoint has an unparseable anchor; using sentinel"
                );
                return Ok(StreakCheckpoint::sentinel());
            }
        };
        let Ok(count) = u32::try_from(count) else {
            tracing::warn!(
                subject = %subject,
                kind = %kind,
                count,
                "Stored checkpoint has an out-of-range count; using sentinel"
            );
            return Ok(StreakCheckpoint::sentinel());
        };

        Ok(StreakCheckpoint::new(count, anchor))
    }

    fn save(
        &self,
        subject: &Subject,
        kind: PeriodKind,
        checkpoint: &StreakCheckpoint,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO streak_checkpoints (subject, period_kind, count, anchor_date, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(subject, period_kind) DO UPDATE SET
                count = excluded.count,
                anchor_date = excluded.anchor_date,
                updated_at = excluded.updated_at
            "#,
            params![
                subject.storage_key(),
                kind.as_str(),
                checkpoint.count,
                checkpoint.anchor.format("%Y-%m-%d").to_string(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

/// Run all pending migrations
fn run_migrations(conn: &Connection) -> Result<()> {
    let current_version: i32 = conn
        .query_row("PRAGMA user_version", [], |r| r.get(0))
        .unwrap_or(0);

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i32;
        if version > current_version {
            tracing::info!(version, "Running checkpoint store migration");
            conn.execute_batch(migration)?;
            conn.execute(&format!("PRAGMA user_version = {}", version), [])?;
        }
    }

    Ok(())
}
