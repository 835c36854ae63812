use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::orchestrator::{Task, TaskHistoryEntry, TaskResult};
use crate::state::AppState;

#[derive(Serialize)]
pub struct TaskHistoryResponse {
    pub tasks: Vec<TaskHistoryEntry>,
}

/// POST /api/v1/tasks
/// A task that runs but fails still answers 200 with `success: false`.
pub async fn handle_submit_task(
    State(state): State<AppState>,
    Json(task): Json<Task>,
) -> Result<Json<TaskResult>, AppError> {
    if task.task_type.trim().is_empty() {
        return Err(AppError::Validation("task type must not be empty".to_string()));
    }
    Ok(Json(state.orchestrator.execute(task).await))
}

/// GET /api/v1/tasks/history
pub async fn handle_task_history(State(state): State<AppState>) -> Json<TaskHistoryResponse> {
    Json(TaskHistoryResponse {
        tasks: state.orchestrator.history(),
    })
}
