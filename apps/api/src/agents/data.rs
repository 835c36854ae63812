//! Data agent — exposes the data provider as agent actions so the
//! orchestrator can wire profile, skill and job records into later subtasks.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{parse_action, Agent, AgentCore, AgentRequest, AgentResponse, Capability};
use crate::data::DataProvider;
use crate::errors::AppError;
use crate::models::JobSearch;

pub const DATA_AGENT_ID: &str = "data_agent";

const ACTIONS: &[&str] = &[
    "get_profile",
    "get_skills",
    "get_experience",
    "get_job_posting",
    "search_jobs",
    "invalidate_user",
    "invalidate_job",
];

#[derive(Debug, Deserialize)]
#[serde(tag = "action", content = "parameters", rename_all = "snake_case")]
enum DataAction {
    GetProfile(UserParams),
    GetSkills(UserParams),
    GetExperience(UserParams),
    GetJobPosting(JobParams),
    SearchJobs(JobSearch),
    InvalidateUser(UserParams),
    InvalidateJob(JobParams),
}

#[derive(Debug, Deserialize)]
struct UserParams {
    user_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct JobParams {
    job_id: Uuid,
}

pub struct DataAgent {
    core: AgentCore,
    data: Arc<DataProvider>,
}

impl DataAgent {
    pub fn new(data: Arc<DataProvider>, history_limit: usize) -> Self {
        Self {
            core: AgentCore::new(
                DATA_AGENT_ID,
                "Data Agent",
                "data",
                vec![Capability::DataAccess],
                history_limit,
            ),
            data,
        }
    }

    async fn dispatch(&self, action: DataAction) -> Result<Value, AppError> {
        match action {
            DataAction::GetProfile(p) => {
                let profile = self
                    .data
                    .profile(p.user_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", p.user_id)))?;
                Ok(json!({ "user_id": p.user_id, "profile": profile }))
            }
            DataAction::GetSkills(p) => {
                let skills = self.data.skills(p.user_id).await?;
                Ok(json!({ "user_id": p.user_id, "skills": skills }))
            }
            DataAction::GetExperience(p) => {
                let positions = self.data.experience(p.user_id).await?;
                Ok(json!({ "user_id": p.user_id, "positions": positions }))
            }
            DataAction::GetJobPosting(p) => {
                let job = self
                    .data
                    .job_posting(p.job_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Job posting {} not found", p.job_id)))?;
                Ok(json!({ "job": job }))
            }
            DataAction::SearchJobs(query) => {
                let jobs = self.data.search_jobs(&query).await?;
                Ok(json!({ "count": jobs.len(), "jobs": jobs }))
            }
            DataAction::InvalidateUser(p) => {
                let invalidated = self.data.invalidate_user(p.user_id).await;
                Ok(json!({ "user_id": p.user_id, "invalidated": invalidated }))
            }
            DataAction::InvalidateJob(p) => {
                let invalidated = self.data.invalidate_job(p.job_id).await;
                Ok(json!({ "job_id": p.job_id, "invalidated": invalidated }))
            }
        }
    }
}

#[async_trait]
impl Agent for DataAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    async fn execute(&self, request: AgentRequest) -> AgentResponse {
        match parse_action::<DataAction>(self.id(), ACTIONS, &request) {
            Ok(action) => self.core.run(&request.action, self.dispatch(action)).await,
            Err(e) => self.core.reject(&request.action, &e),
        }
    }
}
