//! Shared row types, validation, and time helpers for the store.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

/// A persisted study task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Server-assigned, immutable identifier.
    pub id: i64,
    pub subject: String,
    /// Planned duration in minutes.
    pub duration: u32,
    /// Scheduled calendar date.
    pub task_date: NaiveDate,
    pub notes: Option<String>,
    pub confidence_level: Option<f64>,
}

/// The five mutable fields of a task.
///
/// Used whole for both create and update: updates are full-replace, so
/// callers resend every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskFields {
    pub subject: String,
    pub duration: u32,
    pub task_date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub confidence_level: Option<f64>,
}

impl TaskFields {
    /// Validate field invariants: non-empty subject, positive duration,
    /// confidence in [0, 100] when present.
    pub fn validate(&self) -> Result<()> {
        if self.subject.trim().is_empty() {
            return Err(PlannerError::Validation(
                "subject must not be empty".to_owned(),
            ));
        }
        if self.duration == 0 {
            return Err(PlannerError::Validation(
                "duration must be a positive number of minutes".to_owned(),
            ));
        }
        if let Some(confidence) = self.confidence_level {
            if !(0.0..=100.0).contains(&confidence) {
                return Err(PlannerError::Validation(format!(
                    "confidence_level must be between 0 and 100 (got {confidence})"
                )));
            }
        }
        Ok(())
    }
}

/// One entry in a task's progress history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub task_id: i64,
    pub progress: u32,
    /// Epoch seconds, server-assigned at write time.
    pub updated_at: i64,
}

/// Validate a progress value: integer in [0, 100].
///
/// Negative values never reach here; they fail `u32` deserialization at the
/// boundary.
pub fn validate_progress(progress: u32) -> Result<()> {
    if progress > 100 {
        return Err(PlannerError::Validation(format!(
            "progress must be between 0 and 100 (got {progress})"
        )));
    }
    Ok(())
}

/// Current UTC time as epoch seconds.
#[must_use]
pub fn now_epoch_secs() -> i64 {
    Utc::now().timestamp()
}

/// UTC calendar date of an epoch-seconds timestamp.
///
/// The time component is dropped: on-time comparisons are date-only.
#[must_use]
pub fn epoch_date(secs: i64) -> NaiveDate {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.date_naive())
        .unwrap_or(NaiveDate::MIN)
}

/// Parse a `YYYY-MM-DD` column value.
pub(crate) fn parse_date_column(idx: usize, value: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Map a `study_tasks` row in column order:
/// `[id, subject, duration, task_date, notes, confidence_level]`.
pub(crate) fn row_to_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    let date_str: String = row.get(3)?;
    Ok(Task {
        id: row.get(0)?,
        subject: row.get(1)?,
        duration: row.get(2)?,
        task_date: parse_date_column(3, &date_str)?,
        notes: row.get(4)?,
        confidence_level: row.get(5)?,
    })
}
