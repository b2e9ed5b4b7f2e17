use super::validation::validate_against_schema;
use crate::{AgentError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

/// Validation strategies for tool arguments
#[derive(Debug, Clone)]
pub enum Validator {
    /// Deserialize directly, reporting the failing path
    SerdeFirst,
    /// Check against a JSON Schema first, then deserialize
    Schema(Value),
}

impl Validator {
    /// Validate and deserialize parameters into type T
    pub fn validate<T: DeserializeOwned>(&self, params: Value) -> Result<T> {
        match self {
            Validator::SerdeFirst => serde_first_validate(params),
            Validator::Schema(schema) => {
                validate_against_schema("arguments", schema, &params)
                    .map_err(|err| AgentError::ToolExecution(err.observation_message()))?;
                serde_first_validate(params)
            }
        }
    }
}

fn serde_first_validate<T: DeserializeOwned>(params: Value) -> Result<T> {
    serde_path_to_error::deserialize(params).map_err(|e| {
        let path = e.path().to_string();
        AgentError::ToolExecution(format!(
            "invalid arguments at {}: {}",
            if path == "." { "<root>" } else { path.as_str() },
            e.inner()
        ))
    })
}

/// JSON Schema validator keyed by tool name.
///
/// The dispatcher registers every tool's argument schema here and checks
/// arguments before the tool body runs.
#[derive(Debug, Clone, Default)]
pub struct StrictValidator {
    schemas: HashMap<String, Value>,
}

impl StrictValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema for a tool
    pub fn register_schema(&mut self, tool_name: &str, schema: Value) {
        self.schemas.insert(tool_name.to_string(), schema);
    }

    /// Check `params` against the schema registered for `tool_name`.
    /// Tools without a registered schema accept any arguments.
    pub fn check(&self, tool_name: &str, params: &Value) -> Result<()> {
        match self.schemas.get(tool_name) {
            Some(schema) => validate_against_schema(tool_name, schema, params)
                .map_err(|err| AgentError::ToolExecution(err.observation_message())),
            None => Ok(()),
        }
    }

    pub fn is_registered(&self, tool_name: &str) -> bool {
        self.schemas.contains_key(tool_name)
    }
}
