//! Dashboard statistics: aggregates tasks and progress history into the
//! snapshot the dashboard renders.
//!
//! The database work is limited to collecting one standing row per task; the
//! actual metric arithmetic is a pure function over those rows so it can be
//! tested without a store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::types::epoch_date;
use crate::store::{Db, ProgressStore, TaskStore};

/// Aggregate metrics served by `GET /api/stats`.
///
/// Field names are the wire names the dashboard binds to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
    /// Mean confidence over tasks that have one, 2 decimals, 0 if none do.
    pub avg_confidence: f64,
    /// Whole-percent share of completed tasks, 0 when there are no tasks.
    pub completion_rate: u32,
    /// Percentage of completed tasks that reached 100 on or before their
    /// scheduled date, 2 decimals.
    pub on_time_completion: f64,
    /// Percentage of completed tasks that reached 100 late, 2 decimals.
    /// Always `100.00 - on_time_completion` when anything is completed.
    pub delayed_tasks: f64,
}

/// One task's standing, as the summarization sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskStanding {
    pub task_date: NaiveDate,
    pub confidence_level: Option<f64>,
    /// Latest recorded progress, 0 when no record exists.
    pub latest_progress: u32,
    /// UTC date the task first reached 100, if it ever did.
    pub completed_on: Option<NaiveDate>,
}

impl TaskStanding {
    fn is_completed(&self) -> bool {
        self.latest_progress == 100
    }

    fn is_on_time(&self) -> bool {
        self.completed_on.is_some_and(|done| done <= self.task_date)
    }
}

/// Round to two decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compute the snapshot from per-task standings.
#[must_use]
pub fn summarize(standings: &[TaskStanding]) -> StatsSnapshot {
    let total_tasks = standings.len();
    let completed_tasks = standings.iter().filter(|s| s.is_completed()).count();
    let pending_tasks = total_tasks - completed_tasks;

    let confidences: Vec<f64> = standings
        .iter()
        .filter_map(|s| s.confidence_level)
        .collect();
    let avg_confidence = if confidences.is_empty() {
        0.0
    } else {
        round2(confidences.iter().sum::<f64>() / confidences.len() as f64)
    };

    let completion_rate = if total_tasks == 0 {
        0
    } else {
        (100.0 * completed_tasks as f64 / total_tasks as f64).round() as u32
    };

    let on_time_count = standings
        .iter()
        .filter(|s| s.is_completed() && s.is_on_time())
        .count();
    let (on_time_completion, delayed_tasks) = if completed_tasks == 0 {
        (0.0, 0.0)
    } else {
        let on_time = round2(100.0 * on_time_count as f64 / completed_tasks as f64);
        // Derived, not independently rounded: the pair must partition the
        // completed tasks exactly (sum to 100.00).
        (on_time, round2(100.0 - on_time))
    };

    StatsSnapshot {
        total_tasks,
        completed_tasks,
        pending_tasks,
        avg_confidence,
        completion_rate,
        on_time_completion,
        delayed_tasks,
    }
}

/// Computes [`StatsSnapshot`] from the live store.
#[derive(Clone)]
pub struct StatsService {
    tasks: TaskStore,
    progress: ProgressStore,
}

impl StatsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            tasks: TaskStore::new(db.clone()),
            progress: ProgressStore::new(db),
        }
    }

    /// Collect one standing row per task and summarize.
    pub fn compute(&self) -> Result<StatsSnapshot> {
        let tasks = self.tasks.list_in_range(None, None)?;
        let mut standings = Vec::with_capacity(tasks.len());
        for task in tasks {
            let latest_progress = self.progress.latest(task.id)?;
            let completed_on = self
                .progress
                .first_completed_at(task.id)?
                .map(epoch_date);
            standings.push(TaskStanding {
                task_date: task.task_date,
                confidence_level: task.confidence_level,
                latest_progress,
                completed_on,
            });
        }
        Ok(summarize(&standings))
    }
}
