use std::sync::Arc;

use tracing::info;

use crate::agents::{
    Agent, AnalyticsAgent, DataAgent, MatchingAgent, NotificationAgent, NotificationSender, SkillAgent,
    VerificationAgent,
};
use crate::cache::Cache;
use crate::config::Config;
use crate::data::{DataProvider, DataSource};
use crate::errors::AppError;
use crate::llm_client::LanguageModel;
use crate::orchestrator::Orchestrator;
use crate::registry::AgentRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<AgentRegistry>,
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    /// Wires the data provider, the six capability agents, the registry and the
    /// orchestrator. Nothing here is global; every handle is passed in.
    pub async fn build(
        config: &Config,
        source: Arc<dyn DataSource>,
        cache: Cache,
        llm: Arc<dyn LanguageModel>,
        notifier: Arc<dyn NotificationSender>,
    ) -> Result<Self, AppError> {
        let data = Arc::new(DataProvider::new(source, cache));

        let registry = Arc::new(AgentRegistry::new());
        registry
            .initialize(standard_agents(
                llm.clone(),
                data,
                notifier,
                config.agent_history_limit,
            ))
            .await?;

        let orchestrator = Arc::new(Orchestrator::new(
            registry.clone(),
            llm,
            config.task_history_limit,
            config.ai_task_analysis,
        ));
        let agents = registry.count().await;
        info!(
            agents,
            ai_task_analysis = config.ai_task_analysis,
            "application state ready"
        );

        Ok(Self {
            registry,
            orchestrator,
        })
    }
}

/// The standard agent set, one instance each.
pub fn standard_agents(
    llm: Arc<dyn LanguageModel>,
    data: Arc<DataProvider>,
    notifier: Arc<dyn NotificationSender>,
    history_limit: usize,
) -> Vec<Arc<dyn Agent>> {
    vec![
        Arc::new(DataAgent::new(data.clone(), history_limit)),
        Arc::new(SkillAgent::new(llm.clone(), data.clone(), history_limit)),
        Arc::new(MatchingAgent::new(llm.clone(), data.clone(), history_limit)),
        Arc::new(VerificationAgent::new(llm.clone(), history_limit)),
        Arc::new(NotificationAgent::new(notifier, history_limit)),
        Arc::new(AnalyticsAgent::new(llm, data, history_limit)),
    ]
}
