//! Fixed decomposition templates, one per supported task type.

use serde_json::{json, Map, Value};

use super::models::{Binding, Subtask, Task};
use crate::agents::analytics::ANALYTICS_AGENT_ID;
use crate::agents::data::DATA_AGENT_ID;
use crate::agents::matching::MATCHING_AGENT_ID;
use crate::agents::notification::NOTIFICATION_AGENT_ID;
use crate::agents::skill::SKILL_AGENT_ID;
use crate::agents::verification::VERIFICATION_AGENT_ID;

/// Agent id given to subtasks of unsupported task types.
pub const DEFAULT_AGENT: &str = "default";

pub const SUPPORTED_TASK_TYPES: &[&str] = &[
    "job_matching",
    "skill_verification",
    "career_analysis",
    "candidate_search",
];

/// Splits a task into subtasks in dispatch order. Unsupported types become a
/// single subtask for the `default` agent carrying the original parameters.
pub fn decompose(task: &Task) -> Vec<Subtask> {
    let params = &task.parameters;
    match task.task_type.as_str() {
        "job_matching" => job_matching(params),
        "skill_verification" => skill_verification(params),
        "career_analysis" => career_analysis(params),
        "candidate_search" => candidate_search(params),
        other => vec![Subtask {
            id: other.to_string(),
            action: other.to_string(),
            owning_agent: DEFAULT_AGENT.to_string(),
            parameters: params.as_object().cloned().unwrap_or_default(),
            bindings: Vec::new(),
            depends_on: Vec::new(),
            required: true,
        }],
    }
}

fn job_matching(params: &Value) -> Vec<Subtask> {
    vec![
        step("profile", DATA_AGENT_ID, "get_profile").copy(params, &["user_id"]).build(),
        step("skills", DATA_AGENT_ID, "get_skills").copy(params, &["user_id"]).build(),
        step("analysis", SKILL_AGENT_ID, "analyze_skills")
            .copy(params, &["user_id"])
            .bind("skills", "skills", "/skills")
            .build(),
        step("matches", MATCHING_AGENT_ID, "find_job_matches")
            .copy(params, &["user_id", "limit", "min_score", "location"])
            .bind("skills", "skills", "/skills")
            .build(),
        step("notify", NOTIFICATION_AGENT_ID, "send_notification")
            .set("subject", json!("Your latest job matches"))
            .set("body", json!("We found new roles that fit your skills."))
            .bind("to", "profile", "/profile/email")
            .bind("context", "matches", "/matches")
            .optional()
            .build(),
    ]
}

fn skill_verification(params: &Value) -> Vec<Subtask> {
    vec![
        step("verification", VERIFICATION_AGENT_ID, "verify_skill")
            .copy(params, &["user_id", "skill_name", "evidence", "years_experience"])
            .build(),
        step("profile", DATA_AGENT_ID, "get_profile")
            .copy(params, &["user_id"])
            .optional()
            .build(),
        step("notify", NOTIFICATION_AGENT_ID, "send_notification")
            .set("subject", json!("Skill verification result"))
            .set("body", json!("Your skill claim has been reviewed."))
            .bind("to", "profile", "/profile/email")
            .bind("context", "verification", "")
            .optional()
            .build(),
    ]
}

fn career_analysis(params: &Value) -> Vec<Subtask> {
    vec![
        step("experience", DATA_AGENT_ID, "get_experience").copy(params, &["user_id"]).build(),
        step("skills", DATA_AGENT_ID, "get_skills").copy(params, &["user_id"]).build(),
        step("progression", ANALYTICS_AGENT_ID, "career_progression")
            .copy(params, &["user_id"])
            .bind("positions", "experience", "/positions")
            .build(),
        step("recommendation", SKILL_AGENT_ID, "recommend_career")
            .bind("skills", "skills", "/skills")
            .bind_optional("current_title", "experience", "/positions/0/title")
            .bind_optional("progression_score", "progression", "/score")
            .build(),
    ]
}

fn candidate_search(params: &Value) -> Vec<Subtask> {
    vec![
        step("job", DATA_AGENT_ID, "get_job_posting").copy(params, &["job_id"]).build(),
        step("candidates", MATCHING_AGENT_ID, "find_candidates")
            .copy(params, &["job_id", "limit"])
            .bind("required_skills", "job", "/job/required_skills")
            .bind("preferred_skills", "job", "/job/preferred_skills")
            .build(),
        step("demand", ANALYTICS_AGENT_ID, "skill_demand")
            .bind("skills", "job", "/job/required_skills")
            .optional()
            .build(),
        step("notify", NOTIFICATION_AGENT_ID, "send_notification")
            .set("subject", json!("Candidates for your posting"))
            .set("body", json!("New candidates match your job posting."))
            .bind("to", "job", "/job/contact_email")
            .bind("context", "candidates", "/candidates")
            .optional()
            .build(),
    ]
}

struct StepBuilder {
    subtask: Subtask,
}

fn step(id: &str, agent: &str, action: &str) -> StepBuilder {
    StepBuilder {
        subtask: Subtask {
            id: id.to_string(),
            action: action.to_string(),
            owning_agent: agent.to_string(),
            parameters: Map::new(),
            bindings: Vec::new(),
            depends_on: Vec::new(),
            required: true,
        },
    }
}

impl StepBuilder {
    /// Copies the named task parameters that are present.
    fn copy(mut self, params: &Value, keys: &[&str]) -> Self {
        for key in keys {
            if let Some(value) = params.get(*key).filter(|v| !v.is_null()) {
                self.subtask.parameters.insert(key.to_string(), value.clone());
            }
        }
        self
    }

    fn set(mut self, key: &str, value: Value) -> Self {
        self.subtask.parameters.insert(key.to_string(), value);
        self
    }

    fn bind(mut self, param: &'static str, from: &'static str, pointer: &'static str) -> Self {
        self.subtask.bindings.push(Binding {
            param,
            from,
            pointer,
            optional: false,
        });
        self
    }

    fn bind_optional(mut self, param: &'static str, from: &'static str, pointer: &'static str) -> Self {
        self.subtask.bindings.push(Binding {
            param,
            from,
            pointer,
            optional: true,
        });
        self
    }

    fn optional(mut self) -> Self {
        self.subtask.required = false;
        self
    }

    fn build(mut self) -> Subtask {
        for binding in self.subtask.bindings.iter().filter(|b| !b.optional) {
            if !self.subtask.depends_on.iter().any(|d| d == binding.from) {
                self.subtask.depends_on.push(binding.from.to_string());
            }
        }
        self.subtask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(subtasks: &[Subtask]) -> Vec<&str> {
        subtasks.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_unsupported_type_is_single_default_subtask() {
        let task = Task::new("bake_cake", json!({"flavor": "lemon"}));
        let subtasks = decompose(&task);
        assert_eq!(subtasks.len(), 1);
        assert_eq!(subtasks[0].id, "bake_cake");
        assert_eq!(subtasks[0].owning_agent, DEFAULT_AGENT);
        assert_eq!(subtasks[0].parameters.get("flavor"), Some(&json!("lemon")));
    }

    #[test]
    fn test_job_matching_template() {
        let task = Task::new("job_matching", json!({"user_id": "u1", "limit": 3}));
        let subtasks = decompose(&task);
        assert_eq!(ids(&subtasks), vec!["profile", "skills", "analysis", "matches", "notify"]);

        let matches = &subtasks[3];
        assert_eq!(matches.owning_agent, MATCHING_AGENT_ID);
        assert_eq!(matches.parameters.get("limit"), Some(&json!(3)));
        assert_eq!(matches.depends_on, vec!["skills".to_string()]);

        let notify = &subtasks[4];
        assert!(!notify.required);
        assert_eq!(notify.depends_on, vec!["profile".to_string(), "matches".to_string()]);
    }

    #[test]
    fn test_optional_bindings_are_not_dependencies() {
        let task = Task::new("career_analysis", json!({"user_id": "u1"}));
        let subtasks = decompose(&task);
        let recommendation = subtasks.last().unwrap();
        assert_eq!(recommendation.id, "recommendation");
        assert_eq!(recommendation.depends_on, vec!["skills".to_string()]);
        assert_eq!(recommendation.bindings.len(), 3);
    }

    #[test]
    fn test_candidate_search_required_steps() {
        let task = Task::new("candidate_search", json!({"job_id": "j1"}));
        let subtasks = decompose(&task);
        let required: Vec<&str> = subtasks
            .iter()
            .filter(|s| s.required)
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(required, vec!["job", "candidates"]);
    }

    #[test]
    fn test_missing_task_params_are_not_copied() {
        let task = Task::new("skill_verification", json!({"skill_name": "Rust"}));
        let verification = &decompose(&task)[0];
        assert!(verification.parameters.contains_key("skill_name"));
        assert!(!verification.parameters.contains_key("user_id"));
    }
}
