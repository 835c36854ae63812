// Shared prompt fragments. Each agent keeps its own prompts next to it;
// this file only holds what every structured call needs.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// System prompt for the orchestrator's free-text task analysis.
pub const TASK_ANALYSIS_SYSTEM: &str = "You are a workflow planner for a career platform. \
    Assess how much work a task involves. State plainly whether the task is \
    simple, moderate or complex, then explain in at most three sentences.";

/// Task analysis prompt. Replace `{task_type}`, `{description}` and `{parameters}`.
pub const TASK_ANALYSIS_PROMPT: &str = "Task type: {task_type}\n\
    Description: {description}\n\
    Parameters: {parameters}\n\n\
    How complex is this task?";

/// Joins a caller system prompt with schema instructions and the JSON-only rule.
pub fn structured_system_prompt(system: &str, schema_instructions: &str) -> String {
    format!("{system}\n\n{schema_instructions}\n\n{JSON_ONLY_SYSTEM}")
}
