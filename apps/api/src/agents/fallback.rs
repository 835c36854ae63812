//! Remote-else-local execution.
//!
//! Every AI-backed action builds a prompt and an output schema, asks the
//! language model, and on any failure (unavailable, timeout, unparseable or
//! off-schema reply) computes the same-shaped result with a deterministic
//! local function. The payload is tagged with where it came from.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::llm_client::{LanguageModel, OutputSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    Ai,
    Fallback,
}

impl ResultSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultSource::Ai => "ai",
            ResultSource::Fallback => "fallback",
        }
    }
}

/// What to ask the model.
pub struct RemoteAttempt<'a> {
    pub prompt: String,
    pub system: &'a str,
    pub schema: OutputSchema,
}

/// Asks the model; on any failure returns `local()` instead.
///
/// Only an error from `local` itself propagates.
pub async fn remote_or_local<F>(
    llm: &dyn LanguageModel,
    attempt: RemoteAttempt<'_>,
    local: F,
) -> Result<Value, AppError>
where
    F: FnOnce() -> Result<Value, AppError>,
{
    match llm
        .generate_structured_output(&attempt.prompt, attempt.system, &attempt.schema)
        .await
    {
        Ok(value) => {
            debug!("structured output accepted");
            Ok(tag_source(value, ResultSource::Ai))
        }
        Err(e) => {
            warn!("language model unavailable or unusable, using rule-based fallback: {e}");
            local().map(|value| tag_source(value, ResultSource::Fallback))
        }
    }
}

/// Adds `"source"` to object payloads; other shapes pass through untouched.
pub fn tag_source(mut value: Value, source: ResultSource) -> Value {
    if let Value::Object(map) = &mut value {
        map.insert("source".to_string(), Value::String(source.as_str().to_string()));
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedModel;
    use crate::llm_client::{FieldType, LlmError};
    use serde_json::json;
    use std::time::Duration;

    fn attempt() -> RemoteAttempt<'static> {
        RemoteAttempt {
            prompt: "score this".to_string(),
            system: "You score things.",
            schema: OutputSchema::new().field("score", FieldType::Integer, "0-100"),
        }
    }

    #[tokio::test]
    async fn test_ai_reply_is_used_and_tagged() {
        let model = ScriptedModel::repeating(r#"{"score": 91}"#, 1);
        let value = remote_or_local(&model, attempt(), || Ok(json!({"score": 10})))
            .await
            .unwrap();
        assert_eq!(value, json!({"score": 91, "source": "ai"}));
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let model = ScriptedModel::new(vec![Err(LlmError::Timeout(Duration::from_secs(30)))]);
        let value = remote_or_local(&model, attempt(), || Ok(json!({"score": 10})))
            .await
            .unwrap();
        assert_eq!(value, json!({"score": 10, "source": "fallback"}));
    }

    #[tokio::test]
    async fn test_off_schema_reply_falls_back() {
        let model = ScriptedModel::repeating(r#"{"rating": "great"}"#, 1);
        let value = remote_or_local(&model, attempt(), || Ok(json!({"score": 10})))
            .await
            .unwrap();
        assert_eq!(value["source"], json!("fallback"));
    }

    #[tokio::test]
    async fn test_fallback_error_propagates() {
        let model = ScriptedModel::new(vec![]);
        let err = remote_or_local(&model, attempt(), || {
            Err(AppError::Validation("no inputs".to_string()))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_tag_source_ignores_non_objects() {
        assert_eq!(tag_source(json!([1, 2]), ResultSource::Ai), json!([1, 2]));
    }
}
