//! SQLite persistence.
//!
//! `Database` wraps a single `rusqlite::Connection` behind a mutex
//! (rusqlite is not Sync) and exposes synchronous operations grouped by
//! entity in the submodules. Transports clone the handle freely.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::Connection;
use uuid::Uuid;

use crate::error::StoreError;

mod persons;
mod projects;
mod schema;
mod settings;
mod tasks;

/// Default label recognized as "completed" until the user configures
/// another one.
pub const DEFAULT_DONE_LABEL: &str = "Done";

pub struct Database {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            path: self.path.clone(),
        }
    }
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        tracing::info!(path = %path.display(), "database opened");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: path.to_owned(),
        })
    }

    /// Open the database at the standard per-user location, honoring a
    /// `TASKLINE_DB` override.
    pub fn open_default() -> Result<Self, StoreError> {
        if let Ok(path) = std::env::var("TASKLINE_DB") {
            return Self::open(Path::new(&path));
        }
        let dirs = directories::ProjectDirs::from("com", "taskline", "taskline")
            .ok_or(StoreError::DataDir)?;
        Self::open(&dirs.data_dir().join("taskline.db"))
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: PathBuf::from(":memory:"),
        })
    }

    /// Apply the schema and seed the default enumerations. Idempotent.
    pub fn migrate(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute_batch(schema::SCHEMA)?;

            conn.execute(
                "INSERT OR IGNORE INTO config (key, value) VALUES ('done_label', ?1)",
                [DEFAULT_DONE_LABEL],
            )?;

            let types: i64 = conn.query_row("SELECT COUNT(*) FROM task_types", [], |row| row.get(0))?;
            if types == 0 {
                for (i, (name, color)) in [("Urgent", "#e06c75"), ("Regular", "#61afef")]
                    .iter()
                    .enumerate()
                {
                    conn.execute(
                        "INSERT INTO task_types (id, name, color, ord) VALUES (?1, ?2, ?3, ?4)",
                        rusqlite::params![Uuid::new_v4().to_string(), name, color, i as i64],
                    )?;
                }
                tracing::debug!("seeded default task types");
            }

            let statuses: i64 =
                conn.query_row("SELECT COUNT(*) FROM task_statuses", [], |row| row.get(0))?;
            if statuses == 0 {
                for (i, (name, color)) in [
                    ("Must do", "#e5c07b"),
                    ("My action", "#61afef"),
                    ("Waiting for", "#c678dd"),
                    (DEFAULT_DONE_LABEL, "#98c379"),
                ]
                .iter()
                .enumerate()
                {
                    conn.execute(
                        "INSERT INTO task_statuses (id, name, color, ord) VALUES (?1, ?2, ?3, ?4)",
                        rusqlite::params![Uuid::new_v4().to_string(), name, color, i as i64],
                    )?;
                }
                tracing::debug!("seeded default task statuses");
            }

            Ok(())
        })
    }

    /// Execute a closure with the database connection.
    pub(crate) fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError>,
    {
        let mut conn = self.conn.lock();
        f(&mut conn)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// Row conversion helpers: ids and timestamps are stored as TEXT.

pub(crate) fn parse_uuid(idx: usize, s: String) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(&s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub(crate) fn parse_datetime(idx: usize, s: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}
