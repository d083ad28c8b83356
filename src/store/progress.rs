//! Progress store: append-only history over the `task_progress` table.
//!
//! Every progress-change request appends one row; nothing here updates in
//! place. "Current progress" is derived as the row with the greatest
//! `updated_at` (ties broken by greatest `rowid`), so the history doubles as
//! an audit trail and the completion time stays well-defined.

use rusqlite::{OptionalExtension, params};

use crate::error::Result;

use super::types::{ProgressRecord, now_epoch_secs, validate_progress};
use super::{Db, retry_read};

/// Store for per-task progress history.
#[derive(Clone)]
pub struct ProgressStore {
    db: Db,
}

impl ProgressStore {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Append a progress row stamped with the current time.
    pub fn record(&self, task_id: i64, progress: u32) -> Result<()> {
        self.record_at(task_id, progress, now_epoch_secs())
    }

    /// Append a progress row with an explicit timestamp.
    pub fn record_at(&self, task_id: i64, progress: u32, at: i64) -> Result<()> {
        validate_progress(progress)?;
        let conn = self.db.lock()?;
        conn.execute(
            "INSERT INTO task_progress (task_id, progress, updated_at) VALUES (?1, ?2, ?3)",
            params![task_id, progress, at],
        )?;
        Ok(())
    }

    /// Current progress for a task: the most recently stamped row, 0 if none.
    pub fn latest(&self, task_id: i64) -> Result<u32> {
        let conn = self.db.lock()?;
        let progress = retry_read(|| {
            conn.query_row(
                "SELECT progress FROM task_progress WHERE task_id = ?1 \
                 ORDER BY updated_at DESC, rowid DESC LIMIT 1",
                params![task_id],
                |row| row.get::<_, u32>(0),
            )
            .optional()
        })?;
        Ok(progress.unwrap_or(0))
    }

    /// Timestamp of the earliest row that reached 100, if the task ever
    /// completed. Later re-writes of 100 do not move it.
    pub fn first_completed_at(&self, task_id: i64) -> Result<Option<i64>> {
        let conn = self.db.lock()?;
        let at = retry_read(|| {
            conn.query_row(
                "SELECT MIN(updated_at) FROM task_progress \
                 WHERE task_id = ?1 AND progress = 100",
                params![task_id],
                |row| row.get::<_, Option<i64>>(0),
            )
        })?;
        Ok(at)
    }

    /// Full history for a task, newest first.
    pub fn history(&self, task_id: i64) -> Result<Vec<ProgressRecord>> {
        let conn = self.db.lock()?;
        let records = retry_read(|| {
            let mut stmt = conn.prepare(
                "SELECT task_id, progress, updated_at FROM task_progress \
                 WHERE task_id = ?1 ORDER BY updated_at DESC, rowid DESC",
            )?;
            let rows = stmt.query_map(params![task_id], |row| {
                Ok(ProgressRecord {
                    task_id: row.get(0)?,
                    progress: row.get(1)?,
                    updated_at: row.get(2)?,
                })
            })?;
            rows.collect::<rusqlite::Result<Vec<ProgressRecord>>>()
        })?;
        Ok(records)
    }

    /// Remove every progress row for a task; returns the count deleted.
    pub fn delete_all_for_task(&self, task_id: i64) -> Result<usize> {
        let conn = self.db.lock()?;
        let rows = conn.execute(
            "DELETE FROM task_progress WHERE task_id = ?1",
            params![task_id],
        )?;
        Ok(rows)
    }
}
