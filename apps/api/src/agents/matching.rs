//! Matching agent: ranks open postings for a user and candidates for a
//! posting with the skill-match formula. `assess_match` asks the language
//! model for a single pairing and falls back to the same formula.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use super::fallback::{remote_or_local, RemoteAttempt};
use super::prompts::{ASSESS_MATCH_PROMPT, MATCHING_SYSTEM};
use super::{parse_action, Agent, AgentCore, AgentRequest, AgentResponse, Capability};
use crate::data::DataProvider;
use crate::errors::AppError;
use crate::llm_client::{FieldType, LanguageModel, OutputSchema};
use crate::models::{default_search_limit, skill_names, JobPosting, JobSearch, SkillRef};
use crate::scoring::{skill_match_score, SkillMatchScore};

pub const MATCHING_AGENT_ID: &str = "matching_agent";

/// How many candidates are pulled from storage before scoring.
const CANDIDATE_POOL: u32 = 200;

const ACTIONS: &[&str] = &["find_job_matches", "find_candidates", "assess_match"];

#[derive(Debug, Deserialize)]
#[serde(tag = "action", content = "parameters", rename_all = "snake_case")]
enum MatchingAction {
    FindJobMatches(JobMatchParams),
    FindCandidates(CandidateParams),
    AssessMatch(AssessParams),
}

#[derive(Debug, Deserialize)]
struct JobMatchParams {
    user_id: Uuid,
    skills: Option<Vec<SkillRef>>,
    #[serde(default = "default_result_limit")]
    limit: usize,
    #[serde(default)]
    min_score: u32,
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateParams {
    #[serde(default)]
    required_skills: Vec<String>,
    #[serde(default)]
    preferred_skills: Vec<String>,
    #[serde(default = "default_result_limit")]
    limit: usize,
    job_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
struct AssessParams {
    user_id: Uuid,
    job_id: Uuid,
}

fn default_result_limit() -> usize {
    10
}

pub struct MatchingAgent {
    core: AgentCore,
    llm: Arc<dyn LanguageModel>,
    data: Arc<DataProvider>,
}

impl MatchingAgent {
    pub fn new(llm: Arc<dyn LanguageModel>, data: Arc<DataProvider>, history_limit: usize) -> Self {
        Self {
            core: AgentCore::new(
                MATCHING_AGENT_ID,
                "Job Matching Agent",
                "matches",
                vec![Capability::JobMatching],
                history_limit,
            ),
            llm,
            data,
        }
    }

    async fn dispatch(&self, action: MatchingAction) -> Result<Value, AppError> {
        match action {
            MatchingAction::FindJobMatches(p) => self.find_job_matches(p).await,
            MatchingAction::FindCandidates(p) => self.find_candidates(p).await,
            MatchingAction::AssessMatch(p) => self.assess_match(p).await,
        }
    }

    async fn user_skill_names(&self, user_id: Uuid, given: Option<Vec<SkillRef>>) -> Result<Vec<String>, AppError> {
        match given {
            Some(skills) => Ok(skill_names(&skills)),
            None => Ok(self
                .data
                .skills(user_id)
                .await?
                .into_iter()
                .map(|s| s.name)
                .collect()),
        }
    }

    async fn find_job_matches(&self, params: JobMatchParams) -> Result<Value, AppError> {
        let skills = self.user_skill_names(params.user_id, params.skills).await?;
        let jobs = self
            .data
            .search_jobs(&JobSearch {
                skills: skills.clone(),
                location: params.location,
                limit: default_search_limit(),
            })
            .await?;
        let total_considered = jobs.len();

        let mut scored: Vec<(JobPosting, SkillMatchScore)> = jobs
            .into_iter()
            .map(|job| {
                let score = skill_match_score(&skills, &job.required_skills, &job.preferred_skills);
                (job, score)
            })
            .filter(|(_, score)| score.score >= params.min_score)
            .collect();
        scored.sort_by(|(a_job, a), (b_job, b)| b.score.cmp(&a.score).then_with(|| a_job.title.cmp(&b_job.title)));
        scored.truncate(params.limit);
        debug!(user_id = %params.user_id, total_considered, kept = scored.len(), "ranked job matches");

        let matches: Vec<Value> = scored
            .iter()
            .map(|(job, score)| {
                json!({
                    "job_id": job.id,
                    "title": job.title,
                    "company": job.company,
                    "score": score.score,
                    "tier": score.tier.label(),
                    "recommendation": score.tier.recommendation(),
                    "matched_skills": matched(score),
                    "missing_skills": missing(score),
                })
            })
            .collect();

        Ok(json!({
            "user_id": params.user_id,
            "matches": matches,
            "total_considered": total_considered,
        }))
    }

    async fn find_candidates(&self, params: CandidateParams) -> Result<Value, AppError> {
        if params.required_skills.is_empty() && params.preferred_skills.is_empty() {
            return Err(AppError::Validation(
                "find_candidates needs required_skills or preferred_skills".to_string(),
            ));
        }

        let wanted: Vec<String> = params
            .required_skills
            .iter()
            .chain(params.preferred_skills.iter())
            .cloned()
            .collect();
        let pool = self.data.search_candidates(&wanted, CANDIDATE_POOL).await?;
        let total_considered = pool.len();

        let mut ranked: Vec<(u32, String, Uuid, Value)> = pool
            .into_iter()
            .map(|candidate| {
                let score = skill_match_score(
                    &candidate.skills,
                    &params.required_skills,
                    &params.preferred_skills,
                );
                let entry = json!({
                    "user_id": candidate.user_id,
                    "full_name": candidate.full_name,
                    "email": candidate.email,
                    "score": score.score,
                    "tier": score.tier.label(),
                    "recommendation": score.tier.recommendation(),
                    "matched_skills": matched(&score),
                    "missing_skills": missing(&score),
                });
                (score.score, candidate.full_name, candidate.user_id, entry)
            })
            .collect();
        // Score descending; ties by name, then id, so source order never shows through.
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)).then_with(|| a.2.cmp(&b.2)));
        ranked.truncate(params.limit);

        let candidates: Vec<Value> = ranked.into_iter().map(|(_, _, _, entry)| entry).collect();
        Ok(json!({
            "job_id": params.job_id,
            "candidates": candidates,
            "total_considered": total_considered,
        }))
    }

    async fn assess_match(&self, params: AssessParams) -> Result<Value, AppError> {
        let job = self
            .data
            .job_posting(params.job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job posting {} not found", params.job_id)))?;
        let skills = self.user_skill_names(params.user_id, None).await?;

        let attempt = RemoteAttempt {
            prompt: ASSESS_MATCH_PROMPT
                .replace("{job_json}", &serde_json::to_string(&job).unwrap_or_default())
                .replace("{skills_json}", &json!(skills).to_string()),
            system: MATCHING_SYSTEM,
            schema: OutputSchema::new()
                .field("score", FieldType::Integer, "fit from 0 to 100")
                .field("matched_skills", FieldType::Array, "skills the candidate has")
                .field("missing_skills", FieldType::Array, "skills the candidate lacks")
                .field("recommendation", FieldType::String, "recommendation label")
                .field("reasoning", FieldType::String, "two-sentence explanation"),
        };

        let value = remote_or_local(self.llm.as_ref(), attempt, || {
            let score = skill_match_score(&skills, &job.required_skills, &job.preferred_skills);
            Ok(json!({
                "score": score.score,
                "matched_skills": matched(&score),
                "missing_skills": missing(&score),
                "recommendation": score.tier.recommendation(),
                "tier": score.tier.label(),
                "reasoning": format!(
                    "Covers {:.0}% of required and {:.0}% of preferred skills.",
                    score.required_ratio * 100.0,
                    score.preferred_ratio * 100.0
                ),
            }))
        })
        .await?;

        let mut body = json!({ "user_id": params.user_id, "job_id": job.id, "title": job.title });
        if let (Value::Object(out), Value::Object(assessment)) = (&mut body, value) {
            out.extend(assessment);
        }
        Ok(body)
    }
}

#[async_trait]
impl Agent for MatchingAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    async fn execute(&self, request: AgentRequest) -> AgentResponse {
        match parse_action::<MatchingAction>(self.id(), ACTIONS, &request) {
            Ok(action) => self.core.run(&request.action, self.dispatch(action)).await,
            Err(e) => self.core.reject(&request.action, &e),
        }
    }
}

fn matched(score: &SkillMatchScore) -> Vec<&str> {
    score
        .matched_required
        .iter()
        .chain(score.matched_preferred.iter())
        .map(String::as_str)
        .collect()
}

fn missing(score: &SkillMatchScore) -> Vec<&str> {
    score
        .missing_required
        .iter()
        .chain(score.missing_preferred.iter())
        .map(String::as_str)
        .collect()
}
