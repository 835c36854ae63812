//! Agent registry.
//!
//! One instance per process, built by `AppState::build` and shared by the
//! orchestrator and the HTTP layer.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::agents::{Agent, AgentRequest, AgentResponse, AgentStatus, AgentSummary};
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Critical,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub idle: usize,
    pub busy: usize,
    pub error: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistryHealth {
    pub status: HealthStatus,
    pub counts: StatusCounts,
}

impl RegistryHealth {
    fn from_counts(counts: StatusCounts) -> Self {
        let status = if counts.error == 0 {
            HealthStatus::Healthy
        } else if counts.error * 2 >= counts.total {
            HealthStatus::Critical
        } else {
            HealthStatus::Degraded
        };
        Self { status, counts }
    }
}

pub struct AgentRegistry {
    agents: RwLock<HashMap<String, Arc<dyn Agent>>>,
    initialized: AtomicBool,
}

impl fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("agent_count", &self.agents.try_read().map(|a| a.len()).unwrap_or(0))
            .field("initialized", &self.initialized.load(Ordering::SeqCst))
            .finish()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            agents: RwLock::new(HashMap::new()),
            initialized: AtomicBool::new(false),
        }
    }

    /// Registers the standard agent set once. Later calls change nothing and
    /// return `Ok(false)`.
    pub async fn initialize(&self, agents: Vec<Arc<dyn Agent>>) -> Result<bool, AppError> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            debug!("registry already initialized");
            return Ok(false);
        }
        for agent in agents {
            self.register(agent).await?;
        }
        let count = self.count().await;
        info!(count, "agent registry initialized");
        Ok(true)
    }

    /// Fails with `DuplicateAgent` if the id is taken; never replaces.
    pub async fn register(&self, agent: Arc<dyn Agent>) -> Result<(), AppError> {
        let id = agent.id().to_string();
        let mut agents = self.agents.write().await;
        if agents.contains_key(&id) {
            warn!(agent_id = %id, "rejected duplicate agent registration");
            return Err(AppError::DuplicateAgent(id));
        }
        debug!(agent_id = %id, "registering agent");
        agents.insert(id, agent);
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Option<Arc<dyn Agent>> {
        self.agents.read().await.get(id).cloned()
    }

    /// Summaries sorted by id.
    pub async fn list(&self) -> Vec<AgentSummary> {
        let agents = self.agents.read().await;
        let mut summaries: Vec<AgentSummary> = agents.values().map(|a| a.summary()).collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        summaries
    }

    pub async fn count(&self) -> usize {
        self.agents.read().await.len()
    }

    pub async fn health(&self) -> RegistryHealth {
        let agents = self.agents.read().await;
        let mut counts = StatusCounts {
            total: agents.len(),
            ..StatusCounts::default()
        };
        for agent in agents.values() {
            match agent.status() {
                AgentStatus::Idle => counts.idle += 1,
                AgentStatus::Busy => counts.busy += 1,
                AgentStatus::Error => counts.error += 1,
            }
        }
        RegistryHealth::from_counts(counts)
    }

    /// Runs `request` on agent `id`. An unknown id comes back as a failed
    /// response with kind `agent_not_found`.
    pub async fn delegate(&self, id: &str, request: AgentRequest) -> AgentResponse {
        match self.get(id).await {
            Some(agent) => agent.execute(request).await,
            None => {
                warn!(agent_id = %id, action = %request.action, "delegation to unknown agent");
                AgentResponse::failed(
                    &request.action,
                    "result",
                    &AppError::AgentNotFound(id.to_string()),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{AgentCore, Capability};
    use crate::errors::ErrorKind;
    use async_trait::async_trait;
    use serde_json::json;

    struct StubAgent {
        core: AgentCore,
    }

    impl StubAgent {
        fn new(id: &str) -> Arc<dyn Agent> {
            Arc::new(Self {
                core: AgentCore::new(id, id, "result", vec![Capability::Analytics], 5),
            })
        }
    }

    #[async_trait]
    impl Agent for StubAgent {
        fn core(&self) -> &AgentCore {
            &self.core
        }

        async fn execute(&self, request: AgentRequest) -> AgentResponse {
            let fail = request.action == "fail";
            self.core
                .run(&request.action, async move {
                    if fail {
                        Err(AppError::DependencyUnavailable("backing store down".to_string()))
                    } else {
                        Ok(json!({"ok": true}))
                    }
                })
                .await
        }
    }

    fn standard() -> Vec<Arc<dyn Agent>> {
        vec![StubAgent::new("b_agent"), StubAgent::new("a_agent"), StubAgent::new("c_agent")]
    }

    #[tokio::test]
    async fn test_initialize_twice_keeps_one_set() {
        let registry = AgentRegistry::new();
        assert!(registry.initialize(standard()).await.unwrap());
        assert!(!registry.initialize(standard()).await.unwrap());

        let ids: Vec<String> = registry.list().await.into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["a_agent", "b_agent", "c_agent"]);
    }

    #[tokio::test]
    async fn test_duplicate_register_is_error() {
        let registry = AgentRegistry::new();
        registry.register(StubAgent::new("a_agent")).await.unwrap();
        let err = registry.register(StubAgent::new("a_agent")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateAgent(id) if id == "a_agent"));
        assert_eq!(registry.count().await, 1);
    }

    #[tokio::test]
    async fn test_delegate_unknown_agent() {
        let registry = AgentRegistry::new();
        let response = registry
            .delegate("ghost_agent", AgentRequest::new("ping", json!({})))
            .await;
        assert!(!response.success);
        assert_eq!(response.error.unwrap().kind, ErrorKind::AgentNotFound);
    }

    #[tokio::test]
    async fn test_health_degrades_with_errors() {
        let registry = AgentRegistry::new();
        registry.initialize(standard()).await.unwrap();
        assert_eq!(registry.health().await.status, HealthStatus::Healthy);

        registry.delegate("a_agent", AgentRequest::new("fail", json!({}))).await;
        let health = registry.health().await;
        assert_eq!(health.status, HealthStatus::Degraded);
        assert_eq!(health.counts.error, 1);
        assert_eq!(health.counts.idle, 2);

        registry.delegate("b_agent", AgentRequest::new("fail", json!({}))).await;
        assert_eq!(registry.health().await.status, HealthStatus::Critical);

        registry.delegate("a_agent", AgentRequest::new("ok", json!({}))).await;
        assert_eq!(registry.health().await.status, HealthStatus::Degraded);
    }

    #[tokio::test]
    async fn test_empty_registry_is_healthy() {
        let registry = AgentRegistry::new();
        let health = registry.health().await;
        assert_eq!(health.status, HealthStatus::Healthy);
        assert_eq!(health.counts.total, 0);
    }
}
