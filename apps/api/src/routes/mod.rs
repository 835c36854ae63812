pub mod agents;
pub mod health;
pub mod tasks;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Orchestrator
        .route("/api/v1/tasks", post(tasks::handle_submit_task))
        .route("/api/v1/tasks/history", get(tasks::handle_task_history))
        // Agents
        .route("/api/v1/agents", get(agents::handle_list_agents))
        .route("/api/v1/agents/:id", get(agents::handle_get_agent))
        .route("/api/v1/agents/:id/execute", post(agents::handle_execute_agent))
        .with_state(state)
}
