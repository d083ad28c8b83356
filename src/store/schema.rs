//! SQLite DDL definitions for the planner database.
//!
//! All `CREATE TABLE` / `CREATE INDEX` statements live here so they are
//! reviewable and testable in isolation.

use rusqlite::Connection;

/// Complete DDL for the planner database.
///
/// Uses `IF NOT EXISTS` throughout so `apply_schema` is idempotent. There is
/// deliberately no foreign key from `task_progress` to `study_tasks`: the
/// service layer owns the delete cascade.
pub(crate) const SCHEMA_SQL: &str = r#"
-- Enable WAL mode for concurrent reads during writes.
PRAGMA journal_mode = WAL;

-- Study tasks: one row per planned activity.
CREATE TABLE IF NOT EXISTS study_tasks (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    subject          TEXT NOT NULL,
    duration         INTEGER NOT NULL,   -- minutes
    task_date        TEXT NOT NULL,      -- YYYY-MM-DD
    notes            TEXT,
    confidence_level REAL
);

CREATE INDEX IF NOT EXISTS idx_tasks_date ON study_tasks(task_date);

-- Append-only progress history: one row per progress-change request.
CREATE TABLE IF NOT EXISTS task_progress (
    task_id    INTEGER NOT NULL,
    progress   INTEGER NOT NULL,         -- 0..=100
    updated_at INTEGER NOT NULL DEFAULT 0  -- epoch seconds
);

CREATE INDEX IF NOT EXISTS idx_progress_task ON task_progress(task_id, updated_at);
"#;

/// Apply the full schema to an open connection.
///
/// Safe to call multiple times — all statements use `IF NOT EXISTS`.
pub(crate) fn apply_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
