//! Skill agent: profile analysis, skill-to-job comparison and next-role
//! suggestions. All three actions ask the language model first and fall back
//! to rule-based answers of the same shape.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use super::fallback::{remote_or_local, RemoteAttempt};
use super::prompts::{
    ANALYZE_SKILLS_PROMPT, MATCH_SKILLS_PROMPT, RECOMMEND_CAREER_PROMPT, SKILL_ANALYST_SYSTEM,
};
use super::{parse_action, Agent, AgentCore, AgentRequest, AgentResponse, Capability};
use crate::data::DataProvider;
use crate::errors::AppError;
use crate::llm_client::{FieldType, LanguageModel, OutputSchema};
use crate::models::{skill_names, SkillRef, UserSkill};
use crate::scoring::skill_match_score;

pub const SKILL_AGENT_ID: &str = "skill_agent";

const ACTIONS: &[&str] = &["analyze_skills", "match_skills", "recommend_career"];

const STRONG_PROFICIENCIES: &[&str] = &["expert", "advanced"];
const WEAK_PROFICIENCIES: &[&str] = &["beginner", "novice", "basic"];

/// Title marker → (suggested next roles, focus areas). First match wins.
const CAREER_LADDER: &[(&str, &[&str], &[&str])] = &[
    ("director", &["VP of Engineering"], &["organization design", "budgeting"]),
    ("principal", &["Distinguished Engineer", "Director of Engineering"], &["technical strategy", "organization design"]),
    ("manager", &["Senior Engineering Manager", "Director of Engineering"], &["hiring", "organization design"]),
    ("staff", &["Principal Engineer", "Engineering Manager"], &["technical strategy", "mentoring"]),
    ("lead", &["Staff Engineer", "Engineering Manager"], &["system design", "mentoring", "people leadership"]),
    ("senior", &["Lead Engineer", "Staff Engineer"], &["system design", "mentoring"]),
    ("junior", &["Engineer"], &["testing", "code review"]),
];
const DEFAULT_NEXT_ROLES: &[&str] = &["Senior Engineer"];
const DEFAULT_FOCUS: &[&str] = &["system design", "code review"];

#[derive(Debug, Deserialize)]
#[serde(tag = "action", content = "parameters", rename_all = "snake_case")]
enum SkillAction {
    AnalyzeSkills(AnalyzeParams),
    MatchSkills(MatchParams),
    RecommendCareer(CareerParams),
}

#[derive(Debug, Deserialize)]
struct AnalyzeParams {
    user_id: Option<Uuid>,
    skills: Option<Vec<SkillRef>>,
}

#[derive(Debug, Deserialize)]
struct MatchParams {
    candidate_skills: Vec<SkillRef>,
    required_skills: Vec<String>,
    #[serde(default)]
    preferred_skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CareerParams {
    #[serde(default)]
    skills: Vec<SkillRef>,
    current_title: Option<String>,
    progression_score: Option<f64>,
}

pub struct SkillAgent {
    core: AgentCore,
    llm: Arc<dyn LanguageModel>,
    data: Arc<DataProvider>,
}

impl SkillAgent {
    pub fn new(llm: Arc<dyn LanguageModel>, data: Arc<DataProvider>, history_limit: usize) -> Self {
        Self {
            core: AgentCore::new(
                SKILL_AGENT_ID,
                "Skill Analysis Agent",
                "analysis",
                vec![Capability::SkillAnalysis],
                history_limit,
            ),
            llm,
            data,
        }
    }

    async fn dispatch(&self, action: SkillAction) -> Result<Value, AppError> {
        match action {
            SkillAction::AnalyzeSkills(p) => self.analyze_skills(p).await,
            SkillAction::MatchSkills(p) => self.match_skills(p).await,
            SkillAction::RecommendCareer(p) => self.recommend_career(p).await,
        }
    }

    async fn analyze_skills(&self, params: AnalyzeParams) -> Result<Value, AppError> {
        let skills: Vec<UserSkill> = match (params.skills, params.user_id) {
            (Some(skills), _) => skills.into_iter().map(SkillRef::into_user_skill).collect(),
            (None, Some(user_id)) => self.data.skills(user_id).await?,
            (None, None) => {
                return Err(AppError::Validation(
                    "analyze_skills needs either user_id or skills".to_string(),
                ))
            }
        };
        debug!(count = skills.len(), "analyzing skills");

        let skills_json = serde_json::to_string(&skills).unwrap_or_default();
        let attempt = RemoteAttempt {
            prompt: ANALYZE_SKILLS_PROMPT.replace("{skills_json}", &skills_json),
            system: SKILL_ANALYST_SYSTEM,
            schema: OutputSchema::new()
                .field("strengths", FieldType::Array, "strongest skill names")
                .field("development_areas", FieldType::Array, "skills that need work")
                .field("skill_level", FieldType::String, "junior, intermediate or senior")
                .field("summary", FieldType::String, "one-paragraph assessment"),
        };
        remote_or_local(self.llm.as_ref(), attempt, || Ok(analyze_locally(&skills))).await
    }

    async fn match_skills(&self, params: MatchParams) -> Result<Value, AppError> {
        let candidate = skill_names(&params.candidate_skills);
        let attempt = RemoteAttempt {
            prompt: MATCH_SKILLS_PROMPT
                .replace("{candidate_json}", &json!(candidate).to_string())
                .replace("{required_json}", &json!(params.required_skills).to_string())
                .replace("{preferred_json}", &json!(params.preferred_skills).to_string()),
            system: SKILL_ANALYST_SYSTEM,
            schema: OutputSchema::new()
                .field("score", FieldType::Integer, "fit from 0 to 100")
                .field("matched_skills", FieldType::Array, "skills the candidate has")
                .field("missing_skills", FieldType::Array, "skills the candidate lacks")
                .field("recommendation", FieldType::String, "recommendation label"),
        };
        remote_or_local(self.llm.as_ref(), attempt, || {
            Ok(match_locally(&candidate, &params.required_skills, &params.preferred_skills))
        })
        .await
    }

    async fn recommend_career(&self, params: CareerParams) -> Result<Value, AppError> {
        let names = skill_names(&params.skills);
        let title = params.current_title.as_deref().unwrap_or("unknown");
        let score = params
            .progression_score
            .map(|s| format!("{s:.1}"))
            .unwrap_or_else(|| "not assessed".to_string());
        let attempt = RemoteAttempt {
            prompt: RECOMMEND_CAREER_PROMPT
                .replace("{current_title}", title)
                .replace("{skills_json}", &json!(names).to_string())
                .replace("{progression_score}", &score),
            system: SKILL_ANALYST_SYSTEM,
            schema: OutputSchema::new()
                .field("next_roles", FieldType::Array, "two or three realistic next roles")
                .field("skills_to_develop", FieldType::Array, "skills to build for those roles")
                .field("readiness", FieldType::String, "ready, developing or early")
                .field("summary", FieldType::String, "short readiness summary"),
        };
        remote_or_local(self.llm.as_ref(), attempt, || {
            Ok(recommend_locally(
                params.current_title.as_deref(),
                &names,
                params.progression_score,
            ))
        })
        .await
    }
}

#[async_trait]
impl Agent for SkillAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    async fn execute(&self, request: AgentRequest) -> AgentResponse {
        match parse_action::<SkillAction>(self.id(), ACTIONS, &request) {
            Ok(action) => self.core.run(&request.action, self.dispatch(action)).await,
            Err(e) => self.core.reject(&request.action, &e),
        }
    }
}

fn analyze_locally(skills: &[UserSkill]) -> Value {
    let proficiency = |s: &UserSkill| s.proficiency.as_deref().unwrap_or("").to_lowercase();
    let years = |s: &UserSkill| s.years_experience.unwrap_or(0.0);

    let strengths: Vec<&str> = skills
        .iter()
        .filter(|s| STRONG_PROFICIENCIES.contains(&proficiency(*s).as_str()) || years(*s) >= 3.0)
        .map(|s| s.name.as_str())
        .collect();
    let development_areas: Vec<&str> = skills
        .iter()
        .filter(|s| !strengths.contains(&s.name.as_str()))
        .filter(|s| WEAK_PROFICIENCIES.contains(&proficiency(*s).as_str()) || years(*s) < 2.0)
        .map(|s| s.name.as_str())
        .collect();

    let average_years = if skills.is_empty() {
        0.0
    } else {
        skills.iter().map(years).sum::<f64>() / skills.len() as f64
    };
    let skill_level = match average_years {
        y if y >= 5.0 => "senior",
        y if y >= 2.0 => "intermediate",
        _ => "junior",
    };

    let summary = if skills.is_empty() {
        "No skills on record.".to_string()
    } else {
        format!(
            "{} skills on record averaging {average_years:.1} years; {} strong, {} to develop.",
            skills.len(),
            strengths.len(),
            development_areas.len()
        )
    };

    json!({
        "strengths": strengths,
        "development_areas": development_areas,
        "skill_level": skill_level,
        "average_years": average_years,
        "summary": summary,
    })
}

fn match_locally(candidate: &[String], required: &[String], preferred: &[String]) -> Value {
    let result = skill_match_score(candidate, required, preferred);
    let matched: Vec<&String> = result
        .matched_required
        .iter()
        .chain(result.matched_preferred.iter())
        .collect();
    let missing: Vec<&String> = result
        .missing_required
        .iter()
        .chain(result.missing_preferred.iter())
        .collect();

    json!({
        "score": result.score,
        "matched_skills": matched,
        "missing_skills": missing,
        "recommendation": result.tier.recommendation(),
        "tier": result.tier.label(),
        "required_ratio": result.required_ratio,
        "preferred_ratio": result.preferred_ratio,
    })
}

fn recommend_locally(current_title: Option<&str>, skills: &[String], progression: Option<f64>) -> Value {
    let title = current_title.unwrap_or("").to_lowercase();
    let (next_roles, focus) = CAREER_LADDER
        .iter()
        .find(|(marker, _, _)| title.contains(marker))
        .map(|(_, roles, focus)| (*roles, *focus))
        .unwrap_or((DEFAULT_NEXT_ROLES, DEFAULT_FOCUS));

    let held: HashSet<String> = skills.iter().map(|s| s.to_lowercase()).collect();
    let skills_to_develop: Vec<&str> = focus
        .iter()
        .copied()
        .filter(|f| !held.contains(*f))
        .collect();

    let readiness = match progression {
        Some(s) if s >= 8.0 => "ready",
        Some(s) if s >= 6.0 => "developing",
        Some(_) => "early",
        None => "unassessed",
    };

    let summary = format!(
        "From {} the natural next steps are {}. Readiness: {readiness}.",
        current_title.unwrap_or("the current role"),
        next_roles.join(" or ")
    );

    json!({
        "next_roles": next_roles,
        "skills_to_develop": skills_to_develop,
        "readiness": readiness,
        "summary": summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentStatus;
    use crate::cache::Cache;
    use crate::data::memory::InMemorySource;
    use crate::errors::ErrorKind;
    use crate::llm_client::testing::ScriptedModel;
    use crate::llm_client::DisabledModel;

    fn agent_with(llm: Arc<dyn LanguageModel>) -> (SkillAgent, Uuid) {
        let source = Arc::new(InMemorySource::sample());
        let user = source.sample_user_id();
        let provider = Arc::new(DataProvider::new(source, Cache::in_memory()));
        (SkillAgent::new(llm, provider, 10), user)
    }

    #[tokio::test]
    async fn test_analyze_loads_skills_and_falls_back() {
        let (agent, user) = agent_with(Arc::new(DisabledModel));
        let response = agent
            .execute(AgentRequest::new("analyze_skills", json!({"user_id": user})))
            .await;
        assert!(response.success);
        let payload = response.payload.unwrap();
        assert_eq!(payload["source"], json!("fallback"));
        assert_eq!(payload["strengths"], json!(["Python", "SQL"]));
        assert_eq!(payload["development_areas"], json!(["Docker"]));
        assert_eq!(payload["skill_level"], json!("intermediate"));
    }

    #[tokio::test]
    async fn test_analyze_uses_model_reply() {
        let reply = r#"{"strengths": ["Python"], "development_areas": [], "skill_level": "senior", "summary": "Solid."}"#;
        let (agent, user) = agent_with(Arc::new(ScriptedModel::repeating(reply, 1)));
        let response = agent
            .execute(AgentRequest::new("analyze_skills", json!({"user_id": user})))
            .await;
        let payload = response.payload.unwrap();
        assert_eq!(payload["source"], json!("ai"));
        assert_eq!(payload["skill_level"], json!("senior"));
    }

    #[tokio::test]
    async fn test_analyze_without_inputs_is_validation() {
        let (agent, _) = agent_with(Arc::new(DisabledModel));
        let response = agent.execute(AgentRequest::new("analyze_skills", json!({}))).await;
        assert!(!response.success);
        assert_eq!(response.error.unwrap().kind, ErrorKind::Validation);
        assert_eq!(agent.status(), AgentStatus::Idle);
    }

    #[tokio::test]
    async fn test_match_skills_fallback_uses_formula() {
        let (agent, _) = agent_with(Arc::new(DisabledModel));
        let response = agent
            .execute(AgentRequest::new(
                "match_skills",
                json!({
                    "candidate_skills": ["python", "sql"],
                    "required_skills": ["python", "sql", "aws"],
                    "preferred_skills": ["docker"]
                }),
            ))
            .await;
        let payload = response.payload.unwrap();
        assert_eq!(payload["score"], json!(47));
        assert_eq!(payload["recommendation"], json!("Consider"));
        assert_eq!(payload["missing_skills"], json!(["aws", "docker"]));
    }

    #[tokio::test]
    async fn test_match_skills_off_schema_reply_falls_back() {
        let (agent, _) = agent_with(Arc::new(ScriptedModel::repeating(r#"{"score": "high"}"#, 1)));
        let response = agent
            .execute(AgentRequest::new(
                "match_skills",
                json!({"candidate_skills": ["rust"], "required_skills": ["rust"]}),
            ))
            .await;
        let payload = response.payload.unwrap();
        assert_eq!(payload["source"], json!("fallback"));
        assert_eq!(payload["score"], json!(85));
    }

    #[tokio::test]
    async fn test_recommend_career_from_senior_title() {
        let (agent, _) = agent_with(Arc::new(DisabledModel));
        let response = agent
            .execute(AgentRequest::new(
                "recommend_career",
                json!({
                    "skills": [{"name": "System Design", "proficiency": "advanced", "years_experience": 3.0}],
                    "current_title": "Senior Engineer",
                    "progression_score": 8.5
                }),
            ))
            .await;
        let payload = response.payload.unwrap();
        assert_eq!(payload["next_roles"], json!(["Lead Engineer", "Staff Engineer"]));
        assert_eq!(payload["skills_to_develop"], json!(["mentoring"]));
        assert_eq!(payload["readiness"], json!("ready"));
    }

    #[test]
    fn test_recommend_without_title_uses_default_ladder() {
        let value = recommend_locally(None, &[], None);
        assert_eq!(value["next_roles"], json!(["Senior Engineer"]));
        assert_eq!(value["readiness"], json!("unassessed"));
    }

    #[test]
    fn test_analyze_empty_profile() {
        let value = analyze_locally(&[]);
        assert_eq!(value["skill_level"], json!("junior"));
        assert_eq!(value["strengths"], json!([]));
    }
}
