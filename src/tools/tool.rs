use crate::error::{AgentError, Result};
use serde_json::Value;

/// A tool that can be executed by the agent
pub trait Tool: Send + Sync + std::fmt::Debug {
    /// The name of the tool, matched exactly against `tool_name` in actions
    fn name(&self) -> &'static str;

    /// A description of what the tool does, shown to the model
    fn description(&self) -> &'static str;

    /// JSON Schema for the tool's arguments
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with given arguments
    fn execute(
        &self,
        parameters: Value,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Value, AgentError>> + Send + '_>,
    >;
}

/// Ordered registry of available tools. Listing order is registration order.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Names must be unique.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<()> {
        if self.contains(tool.name()) {
            return Err(AgentError::DuplicateTool(tool.name().to_string()));
        }
        self.tools.push(Box::new(tool));
        Ok(())
    }

    /// Get a tool by exact, case-sensitive name
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|tool| tool.name() == name)
            .map(|tool| tool.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn list(&self) -> impl Iterator<Item = &dyn Tool> {
        self.tools.iter().map(|tool| tool.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Capability listing for a system prompt: one bullet per tool with its
    /// description followed by its argument schema.
    pub fn describe_tools(&self) -> String {
        self.tools
            .iter()
            .map(|tool| {
                format!(
                    "* `{}`: {}\n  Arguments schema: {}\n",
                    tool.name(),
                    tool.description(),
                    tool.parameters_schema()
                )
            })
            .collect()
    }
}
