//! Verification agent: confidence that a claimed skill is genuine.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use super::fallback::{remote_or_local, RemoteAttempt};
use super::prompts::{VERIFICATION_SYSTEM, VERIFY_SKILL_PROMPT};
use super::{parse_action, to_payload, Agent, AgentCore, AgentRequest, AgentResponse, Capability};
use crate::errors::AppError;
use crate::llm_client::{FieldType, LanguageModel, OutputSchema};
use crate::scoring::{verification_confidence, SkillEvidence};

pub const VERIFICATION_AGENT_ID: &str = "verification_agent";

const ACTIONS: &[&str] = &["verify_skill", "batch_verify"];

#[derive(Debug, Deserialize)]
#[serde(tag = "action", content = "parameters", rename_all = "snake_case")]
enum VerificationAction {
    VerifySkill(VerifyParams),
    BatchVerify(BatchParams),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillClaim {
    pub skill_name: String,
    #[serde(default)]
    pub evidence: SkillEvidence,
    #[serde(default)]
    pub years_experience: f64,
}

#[derive(Debug, Deserialize)]
struct VerifyParams {
    user_id: Option<Uuid>,
    #[serde(flatten)]
    claim: SkillClaim,
}

#[derive(Debug, Deserialize)]
struct BatchParams {
    user_id: Option<Uuid>,
    skills: Vec<SkillClaim>,
}

pub struct VerificationAgent {
    core: AgentCore,
    llm: Arc<dyn LanguageModel>,
}

impl VerificationAgent {
    pub fn new(llm: Arc<dyn LanguageModel>, history_limit: usize) -> Self {
        Self {
            core: AgentCore::new(
                VERIFICATION_AGENT_ID,
                "Skill Verification Agent",
                "verification",
                vec![Capability::Verification],
                history_limit,
            ),
            llm,
        }
    }

    async fn dispatch(&self, action: VerificationAction) -> Result<Value, AppError> {
        match action {
            VerificationAction::VerifySkill(p) => {
                let mut result = self.verify(&p.claim).await?;
                if let Value::Object(map) = &mut result {
                    map.insert("user_id".to_string(), json!(p.user_id));
                }
                Ok(result)
            }
            VerificationAction::BatchVerify(p) => {
                if p.skills.is_empty() {
                    return Err(AppError::Validation("batch_verify needs at least one skill".to_string()));
                }
                let mut results = Vec::with_capacity(p.skills.len());
                for claim in &p.skills {
                    results.push(self.verify(claim).await?);
                }
                let approved_count = results
                    .iter()
                    .filter(|r| r["decision"] == json!("approved"))
                    .count();
                info!(total = results.len(), approved_count, "batch verification finished");
                Ok(json!({
                    "user_id": p.user_id,
                    "results": results,
                    "approved_count": approved_count,
                    "total": p.skills.len(),
                }))
            }
        }
    }

    async fn verify(&self, claim: &SkillClaim) -> Result<Value, AppError> {
        let attempt = RemoteAttempt {
            prompt: VERIFY_SKILL_PROMPT
                .replace("{skill_name}", &claim.skill_name)
                .replace("{years}", &claim.years_experience.to_string())
                .replace("{evidence_json}", &to_payload(&claim.evidence)?.to_string()),
            system: VERIFICATION_SYSTEM,
            schema: OutputSchema::new()
                .field("confidence", FieldType::Integer, "0 to 100")
                .field("decision", FieldType::String, "approved, requires_more_info or pending")
                .field("reasoning", FieldType::String, "short justification"),
        };

        let mut value = remote_or_local(self.llm.as_ref(), attempt, || {
            to_payload(&verification_confidence(&claim.evidence, claim.years_experience))
        })
        .await?;
        if let Value::Object(map) = &mut value {
            map.insert("skill_name".to_string(), json!(claim.skill_name));
        }
        Ok(value)
    }
}

#[async_trait]
impl Agent for VerificationAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    async fn execute(&self, request: AgentRequest) -> AgentResponse {
        match parse_action::<VerificationAction>(self.id(), ACTIONS, &request) {
            Ok(action) => self.core.run(&request.action, self.dispatch(action)).await,
            Err(e) => self.core.reject(&request.action, &e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::llm_client::testing::ScriptedModel;
    use crate::llm_client::DisabledModel;

    #[tokio::test]
    async fn test_verify_fallback_scores_eighty_approved() {
        let agent = VerificationAgent::new(Arc::new(DisabledModel), 10);
        let response = agent
            .execute(AgentRequest::new(
                "verify_skill",
                json!({
                    "skill_name": "Python",
                    "evidence": {"certificates": true, "projects": ["etl-pipeline"]},
                    "years_experience": 6
                }),
            ))
            .await;
        assert!(response.success);
        let payload = response.payload.unwrap();
        assert_eq!(payload["confidence"], json!(80));
        assert_eq!(payload["decision"], json!("approved"));
        assert_eq!(payload["skill_name"], json!("Python"));
        assert_eq!(payload["source"], json!("fallback"));
    }

    #[tokio::test]
    async fn test_verify_uses_model_reply() {
        let reply = r#"{"confidence": 55, "decision": "requires_more_info", "reasoning": "No certificates."}"#;
        let agent = VerificationAgent::new(Arc::new(ScriptedModel::repeating(reply, 1)), 10);
        let response = agent
            .execute(AgentRequest::new("verify_skill", json!({"skill_name": "Go"})))
            .await;
        let payload = response.payload.unwrap();
        assert_eq!(payload["source"], json!("ai"));
        assert_eq!(payload["decision"], json!("requires_more_info"));
    }

    #[tokio::test]
    async fn test_verify_without_skill_name_is_validation() {
        let agent = VerificationAgent::new(Arc::new(DisabledModel), 10);
        let response = agent
            .execute(AgentRequest::new("verify_skill", json!({"years_experience": 3})))
            .await;
        assert_eq!(response.error.unwrap().kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_batch_counts_approvals() {
        let agent = VerificationAgent::new(Arc::new(DisabledModel), 10);
        let response = agent
            .execute(AgentRequest::new(
                "batch_verify",
                json!({
                    "skills": [
                        {"skill_name": "Python", "evidence": {"certificates": true, "projects": true}, "years_experience": 6},
                        {"skill_name": "Rust", "evidence": {"references": true}, "years_experience": 1}
                    ]
                }),
            ))
            .await;
        let payload = response.payload.unwrap();
        assert_eq!(payload["total"], json!(2));
        assert_eq!(payload["approved_count"], json!(1));
        assert_eq!(payload["results"][1]["decision"], json!("pending"));
    }

    #[tokio::test]
    async fn test_empty_batch_is_validation() {
        let agent = VerificationAgent::new(Arc::new(DisabledModel), 10);
        let response = agent
            .execute(AgentRequest::new("batch_verify", json!({"skills": []})))
            .await;
        assert_eq!(response.error.unwrap().kind, ErrorKind::Validation);
    }
}
