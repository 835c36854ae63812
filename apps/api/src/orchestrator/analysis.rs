use tracing::{debug, warn};

use super::models::{Complexity, Task, TaskAnalysis};
use crate::agents::fallback::ResultSource;
use crate::llm_client::prompts::{TASK_ANALYSIS_PROMPT, TASK_ANALYSIS_SYSTEM};
use crate::llm_client::LanguageModel;

const ANALYSIS_MAX_TOKENS: u32 = 256;
const ANALYSIS_TEMPERATURE: f32 = 0.2;

/// Estimates complexity and duration for a task.
///
/// With `use_model` the model's free-text answer is scanned for the words
/// "complex" and "simple"; otherwise, or on any model failure, a static table
/// keyed by task type is used.
pub async fn analyze(llm: &dyn LanguageModel, task: &Task, use_model: bool) -> TaskAnalysis {
    if use_model {
        let prompt = TASK_ANALYSIS_PROMPT
            .replace("{task_type}", &task.task_type)
            .replace("{description}", &task.description)
            .replace("{parameters}", &task.parameters.to_string());
        match llm
            .generate_completion(&prompt, TASK_ANALYSIS_SYSTEM, ANALYSIS_MAX_TOKENS, ANALYSIS_TEMPERATURE)
            .await
        {
            Ok(text) => {
                let complexity = scan_complexity(&text);
                debug!(task_id = %task.task_id, ?complexity, "model task analysis");
                return TaskAnalysis {
                    complexity,
                    estimated_duration: complexity.default_duration(),
                    source: ResultSource::Ai,
                };
            }
            Err(e) => warn!(task_id = %task.task_id, "task analysis unavailable, using table: {e}"),
        }
    }
    table_analysis(&task.task_type)
}

/// Whole-word scan: "complex" wins over "simple"; neither means moderate.
pub fn scan_complexity(text: &str) -> Complexity {
    let words: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();
    if words.iter().any(|w| w == "complex") {
        Complexity::Complex
    } else if words.iter().any(|w| w == "simple") {
        Complexity::Simple
    } else {
        Complexity::Moderate
    }
}

pub fn table_analysis(task_type: &str) -> TaskAnalysis {
    let (complexity, estimated_duration) = match task_type {
        "job_matching" => (Complexity::Moderate, 4.0),
        "skill_verification" => (Complexity::Simple, 2.0),
        "career_analysis" => (Complexity::Complex, 8.0),
        "candidate_search" => (Complexity::Moderate, 5.0),
        _ => (Complexity::Moderate, 5.0),
    };
    TaskAnalysis {
        complexity,
        estimated_duration,
        source: ResultSource::Fallback,
    }
}
