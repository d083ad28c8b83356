//! Task service: the one component allowed to compose the task and progress
//! stores, so cross-store consistency (the delete cascade) lives in exactly
//! one place.

use chrono::NaiveDate;
use rusqlite::params;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{PlannerError, Result};
use crate::store::{Db, ProgressStore, Task, TaskFields, TaskStore};

/// A task joined with its current progress, as served to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskWithProgress {
    #[serde(flatten)]
    pub task: Task,
    /// Latest recorded progress, 0 when no record exists.
    pub progress: u32,
}

/// Composes [`TaskStore`] and [`ProgressStore`].
#[derive(Clone)]
pub struct TaskService {
    db: Db,
    tasks: TaskStore,
    progress: ProgressStore,
}

impl TaskService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            tasks: TaskStore::new(db.clone()),
            progress: ProgressStore::new(db.clone()),
            db,
        }
    }

    /// Create a task; returns the new id.
    pub fn add_task(&self, fields: &TaskFields) -> Result<i64> {
        let id = self.tasks.create(fields)?;
        info!(id, subject = %fields.subject, "task created");
        Ok(id)
    }

    /// Fetch one task with its current progress attached.
    pub fn get_task_with_progress(&self, id: i64) -> Result<TaskWithProgress> {
        let task = self.tasks.get(id)?;
        let progress = self.progress.latest(id)?;
        Ok(TaskWithProgress { task, progress })
    }

    /// List tasks in the inclusive date range, each with current progress.
    ///
    /// Ordering matches the task store: `task_date` descending.
    pub fn list_tasks_with_progress(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<TaskWithProgress>> {
        let tasks = self.tasks.list_in_range(start, end)?;
        tasks
            .into_iter()
            .map(|task| {
                let progress = self.progress.latest(task.id)?;
                Ok(TaskWithProgress { task, progress })
            })
            .collect()
    }

    /// Full-replace update of a task's mutable fields.
    pub fn update_task(&self, id: i64, fields: &TaskFields) -> Result<()> {
        self.tasks.update(id, fields)?;
        info!(id, "task updated");
        Ok(())
    }

    /// Append a progress record for an existing task.
    pub fn update_progress(&self, id: i64, progress: u32) -> Result<()> {
        // Verify the task exists first so orphan rows can't appear.
        self.tasks.get(id)?;
        self.progress.record(id, progress)?;
        debug!(id, progress, "progress recorded");
        Ok(())
    }

    /// Progress history for an existing task, newest first.
    pub fn progress_history(&self, id: i64) -> Result<Vec<crate::store::ProgressRecord>> {
        self.tasks.get(id)?;
        self.progress.history(id)
    }

    /// Delete a task and all of its progress rows in one transaction.
    ///
    /// The cascade must not be split across transactions: progress rows
    /// without their task (or the reverse) would corrupt the statistics.
    pub fn delete_task(&self, id: i64) -> Result<()> {
        let conn = self.db.lock()?;
        let tx = conn.unchecked_transaction()?;
        let progress_rows = tx.execute(
            "DELETE FROM task_progress WHERE task_id = ?1",
            params![id],
        )?;
        let task_rows = tx.execute("DELETE FROM study_tasks WHERE id = ?1", params![id])?;
        if task_rows == 0 {
            // Dropping the uncommitted transaction rolls everything back.
            return Err(PlannerError::NotFound(format!("task {id}")));
        }
        tx.commit()?;
        info!(id, progress_rows, "task deleted");
        Ok(())
    }

    /// The underlying task store (shared with the statistics service).
    #[must_use]
    pub fn task_store(&self) -> &TaskStore {
        &self.tasks
    }

    /// The underlying progress store (shared with the statistics service).
    #[must_use]
    pub fn progress_store(&self) -> &ProgressStore {
        &self.progress
    }
}
