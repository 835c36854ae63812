use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::agents::fallback::ResultSource;
use crate::agents::{AgentFailure, AgentResponse};

/// A unit of work submitted to the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    #[serde(default = "new_task_id")]
    pub task_id: String,
    #[serde(rename = "type")]
    pub task_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "empty_object")]
    pub parameters: Value,
    #[serde(default = "empty_object")]
    pub context: Value,
}

impl Task {
    pub fn new(task_type: &str, parameters: Value) -> Self {
        Self {
            task_id: new_task_id(),
            task_type: task_type.to_string(),
            description: String::new(),
            parameters,
            context: empty_object(),
        }
    }
}

fn new_task_id() -> String {
    Uuid::new_v4().to_string()
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

impl Complexity {
    /// Estimated duration in seconds when nothing more specific is known.
    pub fn default_duration(&self) -> f64 {
        match self {
            Complexity::Simple => 2.0,
            Complexity::Moderate => 5.0,
            Complexity::Complex => 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaskAnalysis {
    pub complexity: Complexity,
    pub estimated_duration: f64,
    pub source: ResultSource,
}

/// Feeds a value from an earlier subtask's payload into a parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Binding {
    pub param: &'static str,
    /// Id of the subtask that produces the value.
    pub from: &'static str,
    /// JSON pointer into that subtask's payload. Empty means the whole payload.
    pub pointer: &'static str,
    /// Optional bindings are skipped when the value is missing.
    pub optional: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Subtask {
    pub id: String,
    pub action: String,
    pub owning_agent: String,
    pub parameters: Map<String, Value>,
    pub bindings: Vec<Binding>,
    /// Subtasks that must have succeeded before this one runs.
    pub depends_on: Vec<String>,
    /// A failed required subtask fails the whole task.
    pub required: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubtaskResult {
    pub subtask_id: String,
    pub agent: String,
    pub action: String,
    pub success: bool,
    /// False when no agent was registered and the call was echoed back.
    pub handled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<AgentFailure>,
}

impl SubtaskResult {
    pub fn from_response(subtask: &Subtask, response: AgentResponse) -> Self {
        Self {
            subtask_id: subtask.id.clone(),
            agent: subtask.owning_agent.clone(),
            action: subtask.action.clone(),
            success: response.success,
            handled: true,
            payload: response.payload,
            error: response.error,
        }
    }

    pub fn skipped(subtask: &Subtask, error: AgentFailure) -> Self {
        Self {
            subtask_id: subtask.id.clone(),
            agent: subtask.owning_agent.clone(),
            action: subtask.action.clone(),
            success: false,
            handled: false,
            payload: None,
            error: Some(error),
        }
    }

    /// The agent was called but did not return a response.
    pub fn aborted(subtask: &Subtask, error: AgentFailure) -> Self {
        Self {
            handled: true,
            ..Self::skipped(subtask, error)
        }
    }

    pub fn simulated(subtask: &Subtask, parameters: Value) -> Self {
        Self {
            subtask_id: subtask.id.clone(),
            agent: subtask.owning_agent.clone(),
            action: subtask.action.clone(),
            success: true,
            handled: false,
            payload: Some(parameters),
            error: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskMetadata {
    pub subtasks_count: usize,
    /// Seconds.
    pub execution_time: f64,
    pub complexity: Complexity,
    pub estimated_duration: f64,
    pub analysis_source: ResultSource,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskResult {
    pub success: bool,
    pub task_id: String,
    pub task_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Serialized as the message alone; the typed kind stays on the failing
    /// entry in `subtask_results`.
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "failure_message")]
    pub error: Option<AgentFailure>,
    pub metadata: TaskMetadata,
    pub subtask_results: Vec<SubtaskResult>,
}

fn failure_message<S: Serializer>(error: &Option<AgentFailure>, serializer: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(failure) => serializer.serialize_str(&failure.message),
        None => serializer.serialize_none(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskHistoryEntry {
    pub task_id: String,
    pub task_type: String,
    pub status: TaskStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
