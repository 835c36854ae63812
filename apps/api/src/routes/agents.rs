use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::agents::{AgentHistoryEntry, AgentRequest, AgentSummary};
use crate::errors::{AppError, ErrorKind};
use crate::state::AppState;

#[derive(Serialize)]
pub struct AgentListResponse {
    pub agents: Vec<AgentSummary>,
}

#[derive(Serialize)]
pub struct AgentDetailResponse {
    #[serde(flatten)]
    pub summary: AgentSummary,
    pub history: Vec<AgentHistoryEntry>,
}

/// GET /api/v1/agents
pub async fn handle_list_agents(State(state): State<AppState>) -> Json<AgentListResponse> {
    Json(AgentListResponse {
        agents: state.registry.list().await,
    })
}

/// GET /api/v1/agents/:id
pub async fn handle_get_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AgentDetailResponse>, AppError> {
    let agent = state
        .registry
        .get(&id)
        .await
        .ok_or(AppError::AgentNotFound(id))?;
    Ok(Json(AgentDetailResponse {
        summary: agent.summary(),
        history: agent.history(),
    }))
}

/// POST /api/v1/agents/:id/execute
/// Answers with the agent envelope. Failed actions still answer 200 unless
/// the agent itself does not exist.
pub async fn handle_execute_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AgentRequest>,
) -> (StatusCode, Json<Value>) {
    let response = state.registry.delegate(&id, request).await;
    let status = match &response.error {
        Some(failure) if failure.kind == ErrorKind::AgentNotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::OK,
    };
    (status, Json(response.to_json()))
}
