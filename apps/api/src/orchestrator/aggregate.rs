//! Per-task-type combiners that turn subtask payloads into one task result.
//!
//! Callers check required subtasks first; combiners only shape data. A
//! successful, agent-handled subtask whose payload lacks a field the combiner
//! reads is an aggregation error naming that subtask. Failed or simulated
//! subtasks read as absent.

use serde_json::{json, Value};

use super::models::{SubtaskResult, Task};
use crate::errors::AppError;

pub fn aggregate(task: &Task, results: &[SubtaskResult], duration_secs: f64) -> Result<Value, AppError> {
    let view = Results(results);
    match task.task_type.as_str() {
        "job_matching" => job_matching(task, &view),
        "skill_verification" => skill_verification(task, &view),
        "career_analysis" => career_analysis(task, &view),
        "candidate_search" => candidate_search(task, &view),
        _ => Ok(generic(results, duration_secs)),
    }
}

struct Results<'a>(&'a [SubtaskResult]);

impl<'a> Results<'a> {
    /// `None` if the subtask failed, was simulated or did not run.
    fn payload(&self, subtask_id: &str) -> Option<&'a Value> {
        self.0
            .iter()
            .find(|r| r.subtask_id == subtask_id)
            .filter(|r| r.success && r.handled)
            .and_then(|r| r.payload.as_ref())
    }

    /// Field at `pointer` in a subtask's payload.
    fn field(&self, subtask_id: &str, pointer: &str) -> Result<Option<&'a Value>, AppError> {
        match self.payload(subtask_id) {
            None => Ok(None),
            Some(payload) => payload
                .pointer(pointer)
                .map(Some)
                .ok_or_else(|| AppError::Aggregation {
                    subtask_id: subtask_id.to_string(),
                    message: format!("payload has no '{pointer}'"),
                }),
        }
    }

    fn field_or_null(&self, subtask_id: &str, pointer: &str) -> Result<Value, AppError> {
        Ok(self.field(subtask_id, pointer)?.cloned().unwrap_or(Value::Null))
    }

    fn delivered(&self, subtask_id: &str) -> Result<bool, AppError> {
        Ok(self
            .field(subtask_id, "/delivered")?
            .and_then(Value::as_bool)
            .unwrap_or(false))
    }
}

fn job_matching(task: &Task, results: &Results) -> Result<Value, AppError> {
    Ok(json!({
        "user_id": task.parameters.get("user_id"),
        "profile": results.field_or_null("profile", "/profile")?,
        "skills_analysis": results.field_or_null("analysis", "")?,
        "matches": results.field_or_null("matches", "/matches")?,
        "total_considered": results.field_or_null("matches", "/total_considered")?,
        "notification_sent": results.delivered("notify")?,
    }))
}

fn skill_verification(task: &Task, results: &Results) -> Result<Value, AppError> {
    results.field("verification", "/confidence")?;
    results.field("verification", "/decision")?;
    Ok(json!({
        "user_id": task.parameters.get("user_id"),
        "skill_name": task.parameters.get("skill_name"),
        "verification": results.field_or_null("verification", "")?,
        "notification_sent": results.delivered("notify")?,
    }))
}

fn career_analysis(task: &Task, results: &Results) -> Result<Value, AppError> {
    let positions = results.field("experience", "/positions")?;
    results.field("recommendation", "/next_roles")?;
    Ok(json!({
        "user_id": task.parameters.get("user_id"),
        "positions_count": positions.and_then(Value::as_array).map(Vec::len),
        "current_title": positions.and_then(|p| p.pointer("/0/title")),
        "progression": results.field_or_null("progression", "")?,
        "recommendation": results.field_or_null("recommendation", "")?,
    }))
}

fn candidate_search(task: &Task, results: &Results) -> Result<Value, AppError> {
    Ok(json!({
        "job_id": task.parameters.get("job_id"),
        "job_title": results.field_or_null("job", "/job/title")?,
        "candidates": results.field_or_null("candidates", "/candidates")?,
        "total_considered": results.field_or_null("candidates", "/total_considered")?,
        "skill_demand": results.field_or_null("demand", "/skills")?,
        "notification_sent": results.delivered("notify")?,
    }))
}

fn generic(results: &[SubtaskResult], duration_secs: f64) -> Value {
    let subtask_results: Vec<Value> = results
        .iter()
        .map(|r| {
            json!({
                "subtask_id": r.subtask_id,
                "agent": r.agent,
                "success": r.success,
                "handled": r.handled,
                "payload": r.payload,
            })
        })
        .collect();
    json!({
        "subtask_results": subtask_results,
        "duration_secs": duration_secs,
    })
}
