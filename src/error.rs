//! Error types for the planner backend.

/// Top-level error type for the task planner.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    /// A request field failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Underlying SQLite failure.
    #[error("store error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The store connection mutex was poisoned.
    #[error("lock poisoned: {0}")]
    Lock(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, PlannerError>;
