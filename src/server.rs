//! REST/JSON API for the planner.
//!
//! ## Endpoints
//!
//! - `GET /health` — liveness probe
//! - `GET /api/tasks?start&end` — tasks (with progress) in a date range
//! - `GET /api/tasks/{id}` — one task with progress
//! - `GET /api/tasks/{id}/history` — progress history, newest first
//! - `POST /study_tasks` — create a task
//! - `PUT /api/tasks/{id}` — full-replace update
//! - `PUT /api/tasks/{id}/progress` — record progress
//! - `DELETE /api/tasks/{id}` — delete a task and its history
//! - `GET /api/stats` — dashboard snapshot

use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post, put};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

use crate::error::{PlannerError, Result};
use crate::service::{TaskService, TaskWithProgress};
use crate::stats::{StatsService, StatsSnapshot};
use crate::store::{Db, ProgressRecord, TaskFields};

// ---------------------------------------------------------------------------
// Request/response types
// ---------------------------------------------------------------------------

/// Body of `PUT /api/tasks/{id}/progress`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressPayload {
    /// Percentage complete, 0–100.
    pub progress: u32,
}

/// Response to a successful `POST /study_tasks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedResponse {
    /// Server-assigned id of the new task.
    pub id: i64,
}

/// Query string of `GET /api/tasks`.
///
/// Dates arrive as `YYYY-MM-DD`; empty values are treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RangeQuery {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

/// Error body returned on every failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
}

// ---------------------------------------------------------------------------
// Shared application state
// ---------------------------------------------------------------------------

/// Shared state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    service: Arc<TaskService>,
    stats: Arc<StatsService>,
}

impl AppState {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            service: Arc::new(TaskService::new(db.clone())),
            stats: Arc::new(StatsService::new(db)),
        }
    }
}

/// Build the API router over the given state.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/study_tasks", post(handle_create_task))
        .route("/api/tasks", get(handle_list_tasks))
        .route(
            "/api/tasks/{id}",
            get(handle_get_task)
                .put(handle_update_task)
                .delete(handle_delete_task),
        )
        .route("/api/tasks/{id}/progress", put(handle_update_progress))
        .route("/api/tasks/{id}/history", get(handle_history))
        .route("/api/stats", get(handle_stats))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

impl IntoResponse for PlannerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            PlannerError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            PlannerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            _ => {
                // Store internals are logged, never echoed to the client.
                tracing::error!(error = %self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database error".to_owned(),
                )
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Unwrap a JSON body, turning extractor rejections (missing/mistyped
/// fields, wrong content type) into a 400 validation error.
fn require_body<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(PlannerError::Validation(rejection.body_text())),
    }
}

/// Parse an optional `YYYY-MM-DD` query parameter.
fn parse_date_param(name: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    match value {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| {
            PlannerError::Validation(format!("{name} must be a YYYY-MM-DD date (got {raw:?})"))
        }),
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// `GET /health` — liveness probe.
async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `GET /api/tasks?start&end` — tasks with progress, date descending.
async fn handle_list_tasks(
    State(state): State<AppState>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Vec<TaskWithProgress>>> {
    let start = parse_date_param("start", range.start.as_deref())?;
    let end = parse_date_param("end", range.end.as_deref())?;
    let tasks = state.service.list_tasks_with_progress(start, end)?;
    Ok(Json(tasks))
}

/// `GET /api/tasks/{id}` — one task with progress.
async fn handle_get_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TaskWithProgress>> {
    Ok(Json(state.service.get_task_with_progress(id)?))
}

/// `POST /study_tasks` — create a task.
async fn handle_create_task(
    State(state): State<AppState>,
    body: std::result::Result<Json<TaskFields>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let fields = require_body(body)?;
    let id = state.service.add_task(&fields)?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// `PUT /api/tasks/{id}` — full-replace update.
async fn handle_update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: std::result::Result<Json<TaskFields>, JsonRejection>,
) -> Result<StatusCode> {
    let fields = require_body(body)?;
    state.service.update_task(id, &fields)?;
    Ok(StatusCode::OK)
}

/// `PUT /api/tasks/{id}/progress` — append a progress record.
async fn handle_update_progress(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: std::result::Result<Json<ProgressPayload>, JsonRejection>,
) -> Result<StatusCode> {
    let payload = require_body(body)?;
    state.service.update_progress(id, payload.progress)?;
    Ok(StatusCode::OK)
}

/// `GET /api/tasks/{id}/history` — progress history, newest first.
async fn handle_history(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ProgressRecord>>> {
    Ok(Json(state.service.progress_history(id)?))
}

/// `DELETE /api/tasks/{id}` — delete the task and its history.
async fn handle_delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    state.service.delete_task(id)?;
    Ok(StatusCode::OK)
}

/// `GET /api/stats` — dashboard snapshot.
async fn handle_stats(State(state): State<AppState>) -> Result<Json<StatsSnapshot>> {
    Ok(Json(state.stats.compute()?))
}

// ---------------------------------------------------------------------------
// PlannerServer
// ---------------------------------------------------------------------------

/// HTTP server lifecycle handle.
///
/// Binds, serves in a background tokio task, and exposes the bound address
/// (bind port 0 for auto-assign; the integration tests rely on this).
pub struct PlannerServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl PlannerServer {
    /// Bind `{host}:{port}` and start serving in the background.
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP listener cannot bind.
    pub async fn start(state: AppState, host: &str, port: u16) -> Result<Self> {
        let app = router(state);
        let listener = TcpListener::bind(format!("{host}:{port}")).await?;
        let addr = listener.local_addr()?;

        info!("planner API listening on http://{addr}");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("planner API server error: {e}");
            }
        });

        Ok(Self { addr, handle })
    }

    /// Returns the address the server is listening on.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the port the server is listening on.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Abort the server task.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for PlannerServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
