use thiserror::Error;

/// Main error type for the itinerary agent.
///
/// Only fatal conditions are represented here. Malformed model actions and
/// failing tool calls never surface as `AgentError` to the loop's caller; they
/// are rendered into observations instead.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Language model provider error: {0}")]
    Provider(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Tool `{0}` is already registered")]
    DuplicateTool(String),

    #[error("Invalid function call: {0}")]
    InvalidFunctionCall(String),

    #[error("Unexpected judgment from the model: {0}")]
    Judgment(String),

    #[error("Revision loop did not complete within {max_steps} steps. Last response: {last_response}")]
    StepBudgetExhausted {
        max_steps: usize,
        last_response: String,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AgentError>;

impl AgentError {
    /// Stable code used in logs and CLI output
    pub fn error_code(&self) -> &'static str {
        match self {
            AgentError::Config(_) => "CONFIG_ERROR",
            AgentError::Provider(_) => "PROVIDER_ERROR",
            AgentError::Serialization(_) => "SERIALIZATION_ERROR",
            AgentError::Io(_) => "IO_ERROR",
            AgentError::Validation(_) => "VALIDATION_ERROR",
            AgentError::ToolExecution(_) => "TOOL_EXECUTION_ERROR",
            AgentError::ToolNotFound(_) => "TOOL_NOT_FOUND",
            AgentError::DuplicateTool(_) => "DUPLICATE_TOOL",
            AgentError::InvalidFunctionCall(_) => "INVALID_FUNCTION_CALL",
            AgentError::Judgment(_) => "JUDGMENT_ERROR",
            AgentError::StepBudgetExhausted { .. } => "STEP_BUDGET_EXHAUSTED",
        }
    }

    /// Whether the error ends the current operation when raised inside the
    /// revision loop. Tool-level errors are turned into observations.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            AgentError::ToolExecution(_)
                | AgentError::ToolNotFound(_)
                | AgentError::InvalidFunctionCall(_)
                | AgentError::Validation(_)
        )
    }

    /// Message used when the error is shown to the model as an observation.
    pub fn observation_message(&self) -> String {
        match self {
            AgentError::ToolExecution(message)
            | AgentError::Validation(message)
            | AgentError::InvalidFunctionCall(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhaustion_message_carries_last_response() {
        let err = AgentError::StepBudgetExhausted {
            max_steps: 3,
            last_response: "THOUGHT: still thinking".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("3 steps"));
        assert!(message.contains("THOUGHT: still thinking"));
        assert_eq!(err.error_code(), "STEP_BUDGET_EXHAUSTED");
        assert!(err.is_fatal());
    }

    #[test]
    fn tool_errors_are_not_fatal() {
        let err = AgentError::ToolExecution("division by zero".to_string());
        assert!(!err.is_fatal());
        assert_eq!(err.observation_message(), "division by zero");
    }
}
