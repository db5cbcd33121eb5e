//! HTTP route handlers.
//!
//! A thin request layer over the workflow engine: it parses the step id,
//! forwards to the driver, and maps the outcome onto HTTP statuses.
//! Precondition and unknown-step failures are client errors; stage failures
//! are server errors.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use promptforge_core::{StepId, WorkflowEngine, WorkflowError, WorkflowRun};
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Shared application state: the engine plus the single run this process
/// drives. The run is an explicit context object, not a global.
pub struct AppState {
    /// The workflow engine.
    pub engine: WorkflowEngine,
    /// The process's workflow run.
    pub run: Mutex<WorkflowRun>,
}

/// Liveness check.
pub async fn health() -> Response {
    Json(json!({
        "status": "healthy",
        "message": "PromptForge backend is running",
        "timestamp": Utc::now(),
    }))
    .into_response()
}

/// Resets the workflow run and arms the first step.
pub async fn start_workflow(State(state): State<Arc<AppState>>) -> Response {
    let mut run = state.run.lock().await;
    state.engine.start(&mut run);

    Json(json!({
        "success": true,
        "message": "Workflow started",
        "currentStep": run.current_step,
        "timestamp": Utc::now(),
    }))
    .into_response()
}

/// Executes one workflow step.
pub async fn execute_step(
    State(state): State<Arc<AppState>>,
    Path(step_id): Path<String>,
) -> Response {
    let Ok(step) = StepId::from_str(&step_id) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            &WorkflowError::UnknownStep(step_id).to_string(),
        );
    };

    let mut run = state.run.lock().await;
    match state.engine.execute_step(&mut run, step).await {
        Ok(report) if report.success => {
            info!(step = %step, "Workflow step completed");
            Json(json!({
                "success": true,
                "message": report.message,
                "currentStep": run.current_step,
                "completedSteps": run.completed_steps,
                "data": report.data,
                "timestamp": report.timestamp,
            }))
            .into_response()
        }
        Ok(report) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &report.message),
        Err(err) => error_response(status_for(&err), &err.to_string()),
    }
}

/// Read-only workflow status snapshot.
pub async fn get_status(State(state): State<Arc<AppState>>) -> Response {
    let run = state.run.lock().await;
    let snapshot = state.engine.status(&run);

    Json(json!({
        "success": true,
        "data": snapshot,
        "timestamp": Utc::now(),
    }))
    .into_response()
}

/// Maps a workflow error onto an HTTP status.
fn status_for(err: &WorkflowError) -> StatusCode {
    match err {
        WorkflowError::Precondition { .. } | WorkflowError::UnknownStep(_) => {
            StatusCode::BAD_REQUEST
        }
        WorkflowError::Template(_) | WorkflowError::Model(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "success": false,
            "error": message,
            "timestamp": Utc::now(),
        })),
    )
        .into_response()
}
