use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::{Duration, Instant};

/// Prefix carried by every message fed back to the model after an action.
pub const OBSERVATION_PREFIX: &str = "OBSERVATION: ";

/// A tool invocation extracted from a parsed action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to execute
    pub name: String,
    /// Arguments to pass to the tool
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Build a call from an action object of the form
    /// `{"tool_name": string, "arguments": object}`.
    ///
    /// Checks run in a fixed order and the first failure wins; the error is the
    /// observation text (without prefix) to show the model.
    pub fn from_action(action: &Value) -> Result<Self, String> {
        let Some(object) = action.as_object() else {
            return Err("No tool name specified.".to_string());
        };
        let Some(tool_name) = object.get("tool_name") else {
            return Err("No tool name specified.".to_string());
        };
        let Some(arguments) = object.get("arguments") else {
            return Err("No arguments specified.".to_string());
        };
        let Value::Object(arguments) = arguments else {
            return Err(format!(
                "Arguments should be a dictionary, got {} instead.",
                json_type_name(arguments)
            ));
        };
        let Value::String(tool_name) = tool_name else {
            return Err(format!(
                "Tool name should be a string, got {} instead.",
                json_type_name(tool_name)
            ));
        };

        Ok(Self::new(tool_name.clone(), arguments.clone()))
    }

    pub fn arguments_value(&self) -> Value {
        Value::Object(self.arguments.clone())
    }

    /// Get a human-readable description
    pub fn describe(&self) -> String {
        format!("{}({})", self.name, self.arguments_value())
    }
}

/// Name of a JSON value's type as it appears in observations
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Text fed back to the model after an action, with its error flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub text: String,
    pub is_error: bool,
}

impl Observation {
    pub fn success(text: impl AsRef<str>) -> Self {
        Self {
            text: format!("{}{}", OBSERVATION_PREFIX, text.as_ref()),
            is_error: false,
        }
    }

    pub fn error(text: impl AsRef<str>) -> Self {
        Self {
            text: format!("{}{}", OBSERVATION_PREFIX, text.as_ref()),
            is_error: true,
        }
    }
}

/// Result of running one tool call
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub tool_name: String,
    pub result: Result<Value, String>,
    pub duration: Duration,
}

impl ToolOutput {
    pub fn is_error(&self) -> bool {
        self.result.is_err()
    }

    /// Render the outcome as the observation shown to the model.
    pub fn to_observation(&self) -> Observation {
        match &self.result {
            Ok(value) => Observation::success(format!(
                "Tool {} called successfully with response: {}",
                self.tool_name,
                render_value(value)
            )),
            Err(message) => Observation::error(format!(
                "Error occurred while calling tool {}: {}",
                self.tool_name, message
            )),
        }
    }
}

/// Render a tool result for an observation. Strings are shown bare, every
/// other value as compact JSON, which keeps floats like `2.0` intact.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Tracks the execution of a tool call with timing information
#[derive(Debug)]
pub struct ToolExecution {
    tool_name: String,
    start_time: Instant,
}

impl ToolExecution {
    pub fn start(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            start_time: Instant::now(),
        }
    }

    pub fn complete(self, result: Result<Value, String>) -> ToolOutput {
        ToolOutput {
            tool_name: self.tool_name,
            result,
            duration: self.start_time.elapsed(),
        }
    }
}
