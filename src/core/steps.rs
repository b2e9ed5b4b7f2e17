use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single step in the revision trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentStep {
    /// Plan handed to the agent for revision
    Task { content: String },
    /// Reasoning text the model produced before its action
    Thought { thought: String },
    /// Parsed tool invocation
    Action { tool_name: String, arguments: Value },
    /// Observation fed back to the model
    Observation { result: String, is_error: bool },
    /// Validated final plan
    FinalAnswer { plan: Value },
}

impl AgentStep {
    /// Get a human-readable description of the step
    pub fn describe(&self) -> String {
        match self {
            AgentStep::Task { content } => format!("🧭 Task: {}", truncate(content, 120)),
            AgentStep::Thought { thought } => format!("💭 Thought: {}", thought),
            AgentStep::Action {
                tool_name,
                arguments,
            } => format!(
                "🔧 Action: {}({})",
                tool_name,
                truncate(&arguments.to_string(), 160)
            ),
            AgentStep::Observation { result, is_error } => {
                if *is_error {
                    format!("❌ Error: {}", result)
                } else {
                    format!("👁 Observation: {}", truncate(result, 200))
                }
            }
            AgentStep::FinalAnswer { plan } => {
                let days = plan
                    .get("itinerary_days")
                    .and_then(Value::as_array)
                    .map_or(0, Vec::len);
                format!("✅ Final Answer: travel plan with {} day(s)", days)
            }
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{}…", head)
}

/// Extract the THOUGHT section of a model response, if any.
pub fn extract_thought(response: &str) -> Option<String> {
    let start = response.find("THOUGHT:")? + "THOUGHT:".len();
    let rest = &response[start..];
    let end = rest.find("ACTION:").unwrap_or(rest.len());
    let thought = rest[..end].trim();
    (!thought.is_empty()).then(|| thought.to_string())
}
