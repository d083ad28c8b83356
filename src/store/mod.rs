//! SQLite persistence for tasks and progress history.
//!
//! Sub-modules:
//! - `schema`: DDL definitions.
//! - `types`: Shared row types, validation, and time helpers.
//! - `tasks`: Task store (CRUD over `study_tasks`).
//! - `progress`: Progress store (append-only history over `task_progress`).

pub(crate) mod schema;
pub mod progress;
pub mod tasks;
pub mod types;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::error::{PlannerError, Result};

pub use progress::ProgressStore;
pub use tasks::TaskStore;
pub use types::{ProgressRecord, Task, TaskFields};

/// Shared handle to the SQLite database.
///
/// Thread-safe via an internal `Mutex<Connection>`. Every store operation
/// acquires the mutex for its bounded sequence of statements and releases it
/// on return; writes are serialized, and WAL mode keeps concurrent readers
/// cheap on the SQLite side.
#[derive(Clone)]
pub struct Db {
    conn: Arc<Mutex<Connection>>,
}

impl Db {
    /// Open (or create) the database file at `path` and apply the schema.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        schema::apply_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open a fresh in-memory database with the schema applied.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::apply_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Acquire the connection mutex.
    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| PlannerError::Lock(e.to_string()))
    }
}

/// True for SQLite errors worth one retry (busy/locked).
pub(crate) fn is_transient(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::DatabaseBusy
                || e.code == rusqlite::ErrorCode::DatabaseLocked
    )
}

/// Run a read, retrying exactly once on a transient failure.
///
/// Writes must not go through here: a retried write could double-append a
/// progress row.
pub(crate) fn retry_read<T, F>(mut read: F) -> rusqlite::Result<T>
where
    F: FnMut() -> rusqlite::Result<T>,
{
    match read() {
        Err(e) if is_transient(&e) => read(),
        other => other,
    }
}
