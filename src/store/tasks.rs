//! Task store: CRUD over the `study_tasks` table.

use chrono::NaiveDate;
use rusqlite::{OptionalExtension, params};

use crate::error::{PlannerError, Result};

use super::types::{Task, TaskFields, row_to_task};
use super::{Db, retry_read};

const TASK_COLUMNS: &str = "id, subject, duration, task_date, notes, confidence_level";

/// Store for durable [`Task`] records.
#[derive(Clone)]
pub struct TaskStore {
    db: Db,
}

impl TaskStore {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Insert a new task and return its server-assigned id.
    pub fn create(&self, fields: &TaskFields) -> Result<i64> {
        fields.validate()?;
        let conn = self.db.lock()?;
        conn.execute(
            "INSERT INTO study_tasks (subject, duration, task_date, notes, confidence_level) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                fields.subject,
                fields.duration,
                fields.task_date.to_string(),
                fields.notes,
                fields.confidence_level,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Fetch a task by id.
    pub fn get(&self, id: i64) -> Result<Task> {
        let conn = self.db.lock()?;
        let task = retry_read(|| {
            conn.query_row(
                &format!("SELECT {TASK_COLUMNS} FROM study_tasks WHERE id = ?1"),
                params![id],
                row_to_task,
            )
            .optional()
        })?;
        task.ok_or_else(|| PlannerError::NotFound(format!("task {id}")))
    }

    /// List tasks with `task_date` inside the inclusive `[start, end]` range.
    ///
    /// Absent bounds are open; no bounds returns every task. Ordered by
    /// `task_date` descending; calendar callers re-sort client-side.
    pub fn list_in_range(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Task>> {
        let conn = self.db.lock()?;
        let tasks = retry_read(|| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM study_tasks \
                 WHERE (?1 IS NULL OR task_date >= ?1) AND (?2 IS NULL OR task_date <= ?2) \
                 ORDER BY task_date DESC, id DESC"
            ))?;
            let rows = stmt.query_map(
                params![
                    start.map(|d| d.to_string()),
                    end.map(|d| d.to_string())
                ],
                row_to_task,
            )?;
            rows.collect::<rusqlite::Result<Vec<Task>>>()
        })?;
        Ok(tasks)
    }

    /// Full-replace update of the five mutable fields.
    pub fn update(&self, id: i64, fields: &TaskFields) -> Result<()> {
        fields.validate()?;
        let conn = self.db.lock()?;
        let rows = conn.execute(
            "UPDATE study_tasks SET subject = ?1, duration = ?2, task_date = ?3, \
             notes = ?4, confidence_level = ?5 WHERE id = ?6",
            params![
                fields.subject,
                fields.duration,
                fields.task_date.to_string(),
                fields.notes,
                fields.confidence_level,
                id,
            ],
        )?;
        if rows == 0 {
            return Err(PlannerError::NotFound(format!("task {id}")));
        }
        Ok(())
    }

    /// Delete the task row only; the progress cascade is the service's job.
    pub fn delete(&self, id: i64) -> Result<()> {
        let conn = self.db.lock()?;
        let rows = conn.execute("DELETE FROM study_tasks WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(PlannerError::NotFound(format!("task {id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    fn store() -> TaskStore {
        TaskStore::new(Db::open_in_memory().expect("open in-memory db"))
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn fields(subject: &str, day: &str) -> TaskFields {
        TaskFields {
            subject: subject.to_owned(),
            duration: 60,
            task_date: date(day),
            notes: Some("chapter 3".to_owned()),
            confidence_level: Some(70.0),
        }
    }

    #[test]
    fn create_then_get_returns_same_fields() {
        let store = store();
        let f = fields("Math", "2024-01-10");
        let id = store.create(&f).unwrap();

        let task = store.get(id).unwrap();
        assert_eq!(task.subject, "Math");
        assert_eq!(task.duration, 60);
        assert_eq!(task.task_date, date("2024-01-10"));
        assert_eq!(task.notes.as_deref(), Some("chapter 3"));
        assert_eq!(task.confidence_level, Some(70.0));
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let store = store();
        let a = store.create(&fields("Math", "2024-01-10")).unwrap();
        let b = store.create(&fields("Physics", "2024-01-11")).unwrap();
        assert!(b > a);
    }

    #[test]
    fn get_missing_is_not_found() {
        let store = store();
        assert!(matches!(store.get(42), Err(PlannerError::NotFound(_))));
    }

    #[test]
    fn create_rejects_invalid_fields() {
        let store = store();
        let mut f = fields("Math", "2024-01-10");
        f.duration = 0;
        assert!(matches!(
            store.create(&f),
            Err(PlannerError::Validation(_))
        ));
    }

    #[test]
    fn list_orders_by_date_descending() {
        let store = store();
        store.create(&fields("Oldest", "2024-01-01")).unwrap();
        store.create(&fields("Newest", "2024-01-20")).unwrap();
        store.create(&fields("Middle", "2024-01-10")).unwrap();

        let tasks = store.list_in_range(None, None).unwrap();
        let subjects: Vec<&str> = tasks.iter().map(|t| t.subject.as_str()).collect();
        assert_eq!(subjects, ["Newest", "Middle", "Oldest"]);
    }

    #[test]
    fn list_range_bounds_are_inclusive() {
        let store = store();
        store.create(&fields("Before", "2024-01-01")).unwrap();
        store.create(&fields("OnStart", "2024-01-05")).unwrap();
        store.create(&fields("OnEnd", "2024-01-15")).unwrap();
        store.create(&fields("After", "2024-01-20")).unwrap();

        let tasks = store
            .list_in_range(Some(date("2024-01-05")), Some(date("2024-01-15")))
            .unwrap();
        let subjects: Vec<&str> = tasks.iter().map(|t| t.subject.as_str()).collect();
        assert_eq!(subjects, ["OnEnd", "OnStart"]);
    }

    #[test]
    fn list_with_only_start_bound() {
        let store = store();
        store.create(&fields("Old", "2024-01-01")).unwrap();
        store.create(&fields("New", "2024-02-01")).unwrap();

        let tasks = store.list_in_range(Some(date("2024-01-15")), None).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].subject, "New");
    }

    #[test]
    fn update_is_full_replace() {
        let store = store();
        let id = store.create(&fields("Math", "2024-01-10")).unwrap();

        // Resend with notes and confidence cleared; they must clear, not skip.
        let replacement = TaskFields {
            subject: "Maths".to_owned(),
            duration: 90,
            task_date: date("2024-01-12"),
            notes: None,
            confidence_level: None,
        };
        store.update(id, &replacement).unwrap();

        let task = store.get(id).unwrap();
        assert_eq!(task.subject, "Maths");
        assert_eq!(task.duration, 90);
        assert_eq!(task.task_date, date("2024-01-12"));
        assert!(task.notes.is_none());
        assert!(task.confidence_level.is_none());
    }

    #[test]
    fn update_missing_is_not_found() {
        let store = store();
        let result = store.update(42, &fields("Math", "2024-01-10"));
        assert!(matches!(result, Err(PlannerError::NotFound(_))));
    }

    #[test]
    fn update_rejects_out_of_range_confidence() {
        let store = store();
        let id = store.create(&fields("Math", "2024-01-10")).unwrap();
        let mut f = fields("Math", "2024-01-10");
        f.confidence_level = Some(150.0);
        assert!(matches!(
            store.update(id, &f),
            Err(PlannerError::Validation(_))
        ));
    }

    #[test]
    fn delete_removes_the_row() {
        let store = store();
        let id = store.create(&fields("Math", "2024-01-10")).unwrap();
        store.delete(id).unwrap();
        assert!(matches!(store.get(id), Err(PlannerError::NotFound(_))));
        assert!(matches!(store.delete(id), Err(PlannerError::NotFound(_))));
    }
}
