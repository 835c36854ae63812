//! Test doubles for `LanguageModel`.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{LanguageModel, LlmError};

/// Replays canned replies in order. Once the script runs out every call fails
/// as unavailable.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    system_prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            system_prompts: Mutex::new(Vec::new()),
        }
    }

    /// Answers the first `times` calls with the same text.
    pub fn repeating(reply: &str, times: usize) -> Self {
        Self::new((0..times).map(|_| Ok(reply.to_string())).collect())
    }

    pub fn calls(&self) -> usize {
        self.system_prompts.lock().unwrap().len()
    }

    pub fn last_system_prompt(&self) -> Option<String> {
        self.system_prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate_completion(
        &self,
        _prompt: &str,
        system_prompt: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> Result<String, LlmError> {
        self.system_prompts
            .lock()
            .unwrap()
            .push(system_prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Unavailable("script exhausted".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_repeating_runs_out_after_count() {
        let model = ScriptedModel::repeating("ok", 2);
        for _ in 0..2 {
            assert_eq!(model.generate_completion("p", "s", 8, 0.0).await.unwrap(), "ok");
        }
        let err = model.generate_completion("p", "s", 8, 0.0).await.unwrap_err();
        assert!(matches!(err, LlmError::Unavailable(_)));
        assert_eq!(model.calls(), 3);
    }
}
