//! Analytics agent: career-progression scoring and skill demand across open
//! postings.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use super::fallback::{remote_or_local, RemoteAttempt};
use super::prompts::{ANALYTICS_SYSTEM, CAREER_PROGRESSION_PROMPT};
use super::{parse_action, to_payload, Agent, AgentCore, AgentRequest, AgentResponse, Capability};
use crate::data::DataProvider;
use crate::errors::AppError;
use crate::llm_client::{FieldType, LanguageModel, OutputSchema};
use crate::models::{Experience, JobSearch};
use crate::scoring::career_progression_score;

pub const ANALYTICS_AGENT_ID: &str = "analytics_agent";

const ACTIONS: &[&str] = &["career_progression", "skill_demand"];
const RELATED_SKILLS_SHOWN: usize = 5;

#[derive(Debug, Deserialize)]
#[serde(tag = "action", content = "parameters", rename_all = "snake_case")]
enum AnalyticsAction {
    CareerProgression(ProgressionParams),
    SkillDemand(DemandParams),
}

#[derive(Debug, Deserialize)]
struct ProgressionParams {
    user_id: Option<Uuid>,
    positions: Option<Vec<Experience>>,
}

#[derive(Debug, Deserialize)]
struct DemandParams {
    #[serde(default)]
    skills: Vec<String>,
    #[serde(default = "default_demand_limit")]
    limit: u32,
}

fn default_demand_limit() -> u32 {
    100
}

fn lowered(names: &[String]) -> HashSet<String> {
    names.iter().map(|n| n.to_lowercase()).collect()
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub struct AnalyticsAgent {
    core: AgentCore,
    llm: Arc<dyn LanguageModel>,
    data: Arc<DataProvider>,
    clock: fn() -> NaiveDate,
}

impl AnalyticsAgent {
    pub fn new(llm: Arc<dyn LanguageModel>, data: Arc<DataProvider>, history_limit: usize) -> Self {
        Self {
            core: AgentCore::new(
                ANALYTICS_AGENT_ID,
                "Career Analytics Agent",
                "analytics",
                vec![Capability::Analytics],
                history_limit,
            ),
            llm,
            data,
            clock: today,
        }
    }

    /// Replaces the date used to close open-ended positions.
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    async fn dispatch(&self, action: AnalyticsAction) -> Result<Value, AppError> {
        match action {
            AnalyticsAction::CareerProgression(p) => self.career_progression(p).await,
            AnalyticsAction::SkillDemand(p) => self.skill_demand(p).await,
        }
    }

    async fn career_progression(&self, params: ProgressionParams) -> Result<Value, AppError> {
        let positions = match (params.positions, params.user_id) {
            (Some(positions), _) => positions,
            (None, Some(user_id)) => self.data.experience(user_id).await?,
            (None, None) => {
                return Err(AppError::Validation(
                    "career_progression needs either user_id or positions".to_string(),
                ))
            }
        };

        let attempt = RemoteAttempt {
            prompt: CAREER_PROGRESSION_PROMPT
                .replace("{positions_json}", &to_payload(&positions)?.to_string()),
            system: ANALYTICS_SYSTEM,
            schema: OutputSchema::new()
                .field("score", FieldType::Number, "progression from 0 to 10")
                .field("trajectory", FieldType::String, "accelerating, steady, lateral or early_career")
                .field("insights", FieldType::Array, "key observations"),
        };

        let today = (self.clock)();
        remote_or_local(self.llm.as_ref(), attempt, || {
            let result = career_progression_score(&positions, today);
            let trajectory = match result.score {
                _ if positions.len() <= 1 => "early_career",
                s if s >= 8.0 => "accelerating",
                s if s >= 6.5 => "steady",
                _ => "lateral",
            };
            let mut value = to_payload(&result)?;
            if let Value::Object(map) = &mut value {
                map.insert("trajectory".to_string(), json!(trajectory));
                map.insert("insights".to_string(), json!(result.factors));
            }
            Ok(value)
        })
        .await
    }

    async fn skill_demand(&self, params: DemandParams) -> Result<Value, AppError> {
        let mut seen = HashSet::new();
        let skills: Vec<String> = params
            .skills
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
            .collect();
        if skills.is_empty() {
            return Err(AppError::Validation("skill_demand needs at least one skill".to_string()));
        }

        let jobs = self
            .data
            .search_jobs(&JobSearch {
                skills: skills.clone(),
                location: None,
                limit: params.limit,
            })
            .await?;
        debug!(skills = skills.len(), jobs = jobs.len(), "computing skill demand");

        let mut demand: Vec<Value> = Vec::with_capacity(skills.len());
        let mut related: BTreeMap<String, usize> = BTreeMap::new();
        for skill in &skills {
            let key = skill.to_lowercase();
            let required_in = jobs
                .iter()
                .filter(|j| lowered(&j.required_skills).contains(&key))
                .count();
            let preferred_in = jobs
                .iter()
                .filter(|j| lowered(&j.preferred_skills).contains(&key))
                .count();
            let total = required_in + preferred_in;
            let share = if jobs.is_empty() {
                0.0
            } else {
                total as f64 / jobs.len() as f64
            };
            demand.push(json!({
                "skill": skill,
                "required_in": required_in,
                "preferred_in": preferred_in,
                "total": total,
                "share": share,
            }));
        }
        demand.sort_by(|a, b| b["total"].as_u64().cmp(&a["total"].as_u64()));

        for job in &jobs {
            for name in job.required_skills.iter().chain(job.preferred_skills.iter()) {
                let key = name.to_lowercase();
                if !seen.contains(&key) {
                    *related.entry(key).or_insert(0) += 1;
                }
            }
        }
        let mut related: Vec<(String, usize)> = related.into_iter().collect();
        related.sort_by(|a, b| b.1.cmp(&a.1));
        related.truncate(RELATED_SKILLS_SHOWN);
        let related: Vec<Value> = related
            .into_iter()
            .map(|(skill, count)| json!({ "skill": skill, "count": count }))
            .collect();

        Ok(json!({
            "skills": demand,
            "related_skills": related,
            "jobs_considered": jobs.len(),
        }))
    }
}

#[async_trait]
impl Agent for AnalyticsAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    async fn execute(&self, request: AgentRequest) -> AgentResponse {
        match parse_action::<AnalyticsAction>(self.id(), ACTIONS, &request) {
            Ok(action) => self.core.run(&request.action, self.dispatch(action)).await,
            Err(e) => self.core.reject(&request.action, &e),
        }
    }
}
