//! Task orchestrator.
//!
//! `execute` runs one task through analyze → decompose → dispatch →
//! aggregate and records the outcome in a bounded history. Subtasks run
//! sequentially in decomposition order; later subtasks read earlier payloads
//! through explicit bindings.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::agents::{AgentFailure, AgentRequest};
use crate::errors::{AppError, ErrorKind};
use crate::llm_client::LanguageModel;
use crate::registry::AgentRegistry;

pub mod aggregate;
pub mod analysis;
pub mod decompose;
pub mod history;
pub mod models;

pub use models::{Task, TaskHistoryEntry, TaskResult};

use self::decompose::SUPPORTED_TASK_TYPES;
use self::history::TaskHistory;
use self::models::{Subtask, SubtaskResult, TaskMetadata};

pub struct Orchestrator {
    registry: Arc<AgentRegistry>,
    llm: Arc<dyn LanguageModel>,
    history: TaskHistory,
    ai_task_analysis: bool,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<AgentRegistry>,
        llm: Arc<dyn LanguageModel>,
        history_limit: usize,
        ai_task_analysis: bool,
    ) -> Self {
        Self {
            registry,
            llm,
            history: TaskHistory::new(history_limit),
            ai_task_analysis,
        }
    }

    /// Runs a task to completion. Never fails: problems are reported in the
    /// returned `TaskResult`.
    pub async fn execute(&self, task: Task) -> TaskResult {
        let started = Instant::now();
        info!(task_id = %task.task_id, task_type = %task.task_type, "task received");
        if !SUPPORTED_TASK_TYPES.contains(&task.task_type.as_str()) {
            warn!(task_type = %task.task_type, "unsupported task type, routing to default agent");
        }

        let analysis = analysis::analyze(self.llm.as_ref(), &task, self.ai_task_analysis).await;
        let subtasks = decompose::decompose(&task);

        let mut results: Vec<SubtaskResult> = Vec::with_capacity(subtasks.len());
        for subtask in &subtasks {
            let result = self.dispatch(subtask, &results).await;
            results.push(result);
        }

        let execution_time = started.elapsed().as_secs_f64();
        let outcome = self.combine(&task, &subtasks, &results, execution_time);

        let (success, result, error) = match outcome {
            Ok(value) => (true, Some(value), None),
            Err(failure) => (false, None, Some(failure)),
        };
        let task_result = TaskResult {
            success,
            task_id: task.task_id.clone(),
            task_type: task.task_type.clone(),
            result,
            error,
            metadata: TaskMetadata {
                subtasks_count: subtasks.len(),
                execution_time,
                complexity: analysis.complexity,
                estimated_duration: analysis.estimated_duration,
                analysis_source: analysis.source,
            },
            subtask_results: results,
        };

        self.history.record(&task_result);
        if task_result.success {
            info!(task_id = %task.task_id, execution_time, "task completed");
        } else {
            warn!(
                task_id = %task.task_id,
                error = ?task_result.error.as_ref().map(|e| &e.message),
                "task failed"
            );
        }
        task_result
    }

    pub fn history(&self) -> Vec<TaskHistoryEntry> {
        self.history.snapshot()
    }

    async fn dispatch(&self, subtask: &Subtask, earlier: &[SubtaskResult]) -> SubtaskResult {
        let parameters = match resolve_parameters(subtask, earlier) {
            Ok(parameters) => parameters,
            Err(e) => {
                debug!(subtask = %subtask.id, "not dispatched: {e}");
                return SubtaskResult::skipped(subtask, AgentFailure::from(&e));
            }
        };

        match self.registry.get(&subtask.owning_agent).await {
            Some(agent) => {
                debug!(subtask = %subtask.id, agent = %subtask.owning_agent, action = %subtask.action, "dispatching");
                let request = AgentRequest::new(subtask.action.clone(), parameters);
                // A panicking agent fails its subtask, not the whole task loop.
                match tokio::spawn(async move { agent.execute(request).await }).await {
                    Ok(response) => SubtaskResult::from_response(subtask, response),
                    Err(e) => {
                        warn!(subtask = %subtask.id, agent = %subtask.owning_agent, "agent aborted: {e}");
                        SubtaskResult::aborted(
                            subtask,
                            AgentFailure {
                                kind: ErrorKind::Internal,
                                message: format!("agent '{}' aborted: {e}", subtask.owning_agent),
                            },
                        )
                    }
                }
            }
            None => {
                debug!(subtask = %subtask.id, agent = %subtask.owning_agent, "no agent registered, echoing parameters");
                SubtaskResult::simulated(subtask, parameters)
            }
        }
    }

    fn combine(
        &self,
        task: &Task,
        subtasks: &[Subtask],
        results: &[SubtaskResult],
        execution_time: f64,
    ) -> Result<Value, AgentFailure> {
        for (subtask, result) in subtasks.iter().zip(results) {
            if subtask.required && !result.success {
                let cause = result.error.clone().unwrap_or(AgentFailure {
                    kind: ErrorKind::Internal,
                    message: "unknown failure".to_string(),
                });
                return Err(AgentFailure {
                    kind: cause.kind,
                    message: format!("required subtask '{}' failed: {}", subtask.id, cause.message),
                });
            }
        }
        aggregate::aggregate(task, results, execution_time).map_err(|e| AgentFailure::from(&e))
    }
}

/// Static parameters plus bound values from earlier payloads.
fn resolve_parameters(subtask: &Subtask, earlier: &[SubtaskResult]) -> Result<Value, AppError> {
    for dependency in &subtask.depends_on {
        let ok = earlier
            .iter()
            .any(|r| &r.subtask_id == dependency && r.success);
        if !ok {
            return Err(AppError::DependencyUnavailable(format!(
                "subtask '{}' needs '{dependency}', which did not succeed",
                subtask.id
            )));
        }
    }

    let mut parameters = subtask.parameters.clone();
    for binding in &subtask.bindings {
        let value = earlier
            .iter()
            .find(|r| r.subtask_id == binding.from && r.success)
            .and_then(|r| r.payload.as_ref())
            .and_then(|p| p.pointer(binding.pointer))
            .filter(|v| !v.is_null());
        match value {
            Some(value) => {
                parameters.insert(binding.param.to_string(), value.clone());
            }
            None if binding.optional => {}
            None => {
                return Err(AppError::DependencyUnavailable(format!(
                    "subtask '{}' parameter '{}' has no value at {}:{}",
                    subtask.id, binding.param, binding.from, binding.pointer
                )))
            }
        }
    }
    Ok(Value::Object(parameters))
}
