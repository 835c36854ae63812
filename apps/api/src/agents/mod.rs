//! Capability agents.
//!
//! Every agent exposes the same `execute({action, parameters})` contract. The
//! action string is parsed into the agent's own enum of typed actions before
//! any work starts; unknown names and malformed parameters are rejected up
//! front and never move the agent out of its current status.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::errors::{AppError, ErrorKind};

pub mod analytics;
pub mod data;
pub mod fallback;
pub mod matching;
pub mod notification;
pub mod prompts;
pub mod skill;
pub mod verification;

pub use analytics::AnalyticsAgent;
pub use data::DataAgent;
pub use matching::MatchingAgent;
pub use notification::{LogNotifier, NotificationAgent, NotificationSender};
pub use skill::SkillAgent;
pub use verification::VerificationAgent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    DataAccess,
    SkillAnalysis,
    JobMatching,
    Verification,
    Notification,
    Analytics,
}

/// Diagnostic status. Last writer wins under concurrent use; never a lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Idle,
    Busy,
    Error,
}

/// `{action, parameters}` as submitted by the orchestrator or an API caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRequest {
    pub action: String,
    #[serde(default)]
    pub parameters: Value,
}

impl AgentRequest {
    pub fn new(action: impl Into<String>, parameters: Value) -> Self {
        Self {
            action: action.into(),
            parameters,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&AppError> for AgentFailure {
    fn from(e: &AppError) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

/// `{success, action, <domain_key>: payload, timestamp, error?}`.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    pub success: bool,
    pub action: String,
    pub domain_key: &'static str,
    pub payload: Option<Value>,
    pub error: Option<AgentFailure>,
    pub timestamp: DateTime<Utc>,
}

impl AgentResponse {
    pub fn ok(action: &str, domain_key: &'static str, payload: Value) -> Self {
        Self {
            success: true,
            action: action.to_string(),
            domain_key,
            payload: Some(payload),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn failed(action: &str, domain_key: &'static str, error: &AppError) -> Self {
        Self {
            success: false,
            action: action.to_string(),
            domain_key,
            payload: None,
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }

    /// Wire form with the payload under the agent family's domain key.
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("success".to_string(), Value::Bool(self.success));
        body.insert("action".to_string(), Value::String(self.action.clone()));
        if let Some(payload) = &self.payload {
            body.insert(self.domain_key.to_string(), payload.clone());
        }
        if let Some(error) = &self.error {
            body.insert(
                "error".to_string(),
                serde_json::to_value(error).unwrap_or(Value::Null),
            );
        }
        body.insert(
            "timestamp".to_string(),
            Value::String(self.timestamp.to_rfc3339()),
        );
        Value::Object(body)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentHistoryEntry {
    pub action: String,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentSummary {
    pub id: String,
    pub name: String,
    pub capabilities: Vec<Capability>,
    pub status: AgentStatus,
    pub tasks_executed: usize,
}

#[async_trait]
pub trait Agent: Send + Sync {
    fn core(&self) -> &AgentCore;

    /// Runs one action. Never returns `Err`: failures come back as
    /// `success = false` with a typed error.
    async fn execute(&self, request: AgentRequest) -> AgentResponse;

    fn id(&self) -> &str {
        self.core().id()
    }

    fn name(&self) -> &str {
        self.core().name()
    }

    fn capabilities(&self) -> &[Capability] {
        self.core().capabilities()
    }

    fn status(&self) -> AgentStatus {
        self.core().status()
    }

    /// Most recent last.
    fn history(&self) -> Vec<AgentHistoryEntry> {
        self.core().history()
    }

    fn summary(&self) -> AgentSummary {
        AgentSummary {
            id: self.id().to_string(),
            name: self.name().to_string(),
            capabilities: self.capabilities().to_vec(),
            status: self.status(),
            tasks_executed: self.history().len(),
        }
    }
}

/// Parses a request into an agent's action enum.
///
/// `names` is the agent's dispatch table. The enum must be
/// `#[serde(tag = "action", content = "parameters")]`.
pub fn parse_action<A: DeserializeOwned>(
    agent_id: &str,
    names: &[&str],
    request: &AgentRequest,
) -> Result<A, AppError> {
    if !names.contains(&request.action.as_str()) {
        return Err(AppError::UnknownAction {
            agent: agent_id.to_string(),
            action: request.action.clone(),
        });
    }

    let parameters = match &request.parameters {
        Value::Null => Value::Object(Map::new()),
        other => other.clone(),
    };
    let tagged = serde_json::json!({ "action": request.action, "parameters": parameters });
    serde_json::from_value(tagged).map_err(|e| {
        AppError::Validation(format!("invalid parameters for '{}': {e}", request.action))
    })
}

/// Identity, status and bounded history shared by every agent.
pub struct AgentCore {
    id: String,
    name: String,
    domain_key: &'static str,
    capabilities: Vec<Capability>,
    status: Mutex<AgentStatus>,
    history: Mutex<VecDeque<AgentHistoryEntry>>,
    history_limit: usize,
}

impl AgentCore {
    pub fn new(
        id: &str,
        name: &str,
        domain_key: &'static str,
        capabilities: Vec<Capability>,
        history_limit: usize,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            domain_key,
            capabilities,
            status: Mutex::new(AgentStatus::Idle),
            history: Mutex::new(VecDeque::new()),
            history_limit: history_limit.max(1),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    pub fn status(&self) -> AgentStatus {
        self.status
            .lock()
            .map(|s| *s)
            .unwrap_or(AgentStatus::Error)
    }

    pub fn history(&self) -> Vec<AgentHistoryEntry> {
        self.history
            .lock()
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn set_status(&self, status: AgentStatus) {
        if let Ok(mut current) = self.status.lock() {
            *current = status;
        }
    }

    fn record(&self, action: &str, success: bool) {
        if let Ok(mut history) = self.history.lock() {
            if history.len() == self.history_limit {
                history.pop_front();
            }
            history.push_back(AgentHistoryEntry {
                action: action.to_string(),
                success,
                timestamp: Utc::now(),
            });
        }
    }

    /// Rejection before dispatch: no status change, no history entry.
    pub fn reject(&self, action: &str, error: &AppError) -> AgentResponse {
        debug!(agent = %self.id, action, "rejected request: {error}");
        AgentResponse::failed(action, self.domain_key, error)
    }

    /// Runs an already-parsed action through `idle → busy → {idle, error}`.
    pub async fn run<F>(&self, action: &str, work: F) -> AgentResponse
    where
        F: std::future::Future<Output = Result<Value, AppError>>,
    {
        self.set_status(AgentStatus::Busy);
        debug!(agent = %self.id, action, "executing");

        let outcome = work.await;
        let response = match &outcome {
            Ok(payload) => {
                self.set_status(AgentStatus::Idle);
                AgentResponse::ok(action, self.domain_key, payload.clone())
            }
            // A bad request is recorded but does not mark the agent unhealthy.
            Err(e) if e.kind().is_caller_error() => {
                self.set_status(AgentStatus::Idle);
                debug!(agent = %self.id, action, "request refused: {e}");
                AgentResponse::failed(action, self.domain_key, e)
            }
            Err(e) => {
                self.set_status(AgentStatus::Error);
                warn!(agent = %self.id, action, "action failed: {e}");
                AgentResponse::failed(action, self.domain_key, e)
            }
        };
        self.record(action, response.success);
        response
    }
}

/// Serializes a typed result into a JSON payload.
pub fn to_payload<T: Serialize>(value: &T) -> Result<Value, AppError> {
    serde_json::to_value(value)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to serialize result: {e}")))
}
