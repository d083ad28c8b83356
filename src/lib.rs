//! Studyplan: a personal study-task planner backend.
//!
//! A REST/JSON API over an embedded SQLite database. Tasks carry a subject,
//! duration, scheduled date, optional notes, and an optional confidence
//! level; progress is tracked as an append-only per-task history from which
//! "current progress" and the dashboard statistics are derived.
//!
//! # Architecture
//!
//! - **store**: SQLite persistence for tasks and progress history.
//! - **service**: composes the two stores; owns the delete cascade.
//! - **stats**: aggregates tasks + progress into the dashboard snapshot.
//! - **server**: the axum HTTP surface.
//! - **config**: TOML configuration with platform-default paths.

pub mod config;
pub mod error;
pub mod server;
pub mod service;
pub mod stats;
pub mod store;

pub use config::PlannerConfig;
pub use error::{PlannerError, Result};
pub use server::{AppState, PlannerServer};
pub use service::{TaskService, TaskWithProgress};
pub use stats::{StatsService, StatsSnapshot};
pub use store::{Db, ProgressStore, Task, TaskFields, TaskStore};
