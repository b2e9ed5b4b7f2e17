use super::{tool::ToolRegistry, Tool};
use crate::{
    core::tool_call::{Observation, ToolCall, ToolExecution},
    error::Result,
    schemas::validator::StrictValidator,
};
use serde_json::Value;
use tracing::{debug, warn};

/// Turns parsed actions into observations. Every failure, from a malformed
/// action to a tool error, is reported as an observation instead of an `Err`.
#[derive(Debug, Default)]
pub struct ToolDispatcher {
    registry: ToolRegistry,
    validator: StrictValidator,
}

impl ToolDispatcher {
    pub fn new(registry: ToolRegistry) -> Self {
        let mut validator = StrictValidator::new();
        for tool in registry.list() {
            validator.register_schema(tool.name(), tool.parameters_schema());
        }
        Self {
            registry,
            validator,
        }
    }

    /// Register a tool and its argument schema
    pub fn register_tool<T: Tool + 'static>(&mut self, tool: T) -> Result<()> {
        let name = tool.name();
        let schema = tool.parameters_schema();
        self.registry.register(tool)?;
        self.validator.register_schema(name, schema);
        Ok(())
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Validate and run one action.
    pub async fn dispatch(&self, action: &Value) -> Observation {
        let call = match ToolCall::from_action(action) {
            Ok(call) => call,
            Err(message) => {
                warn!(target: "itinerary::dispatch", reason = %message, "malformed action");
                return Observation::error(message);
            }
        };

        let Some(tool) = self.registry.get(&call.name) else {
            warn!(target: "itinerary::dispatch", tool = %call.name, "unknown tool");
            return Observation::error(format!(
                "Unknown tool name '{}' in action string.",
                call.name
            ));
        };

        let arguments = call.arguments_value();
        let execution = ToolExecution::start(call.name.as_str());
        let result = match self.validator.check(&call.name, &arguments) {
            Ok(()) => tool
                .execute(arguments)
                .await
                .map_err(|err| err.observation_message()),
            Err(err) => Err(err.observation_message()),
        };
        let output = execution.complete(result);

        debug!(
            target: "itinerary::dispatch",
            tool = %output.tool_name,
            is_error = output.is_error(),
            duration_ms = output.duration.as_millis() as u64,
            "tool call finished"
        );
        output.to_observation()
    }
}
