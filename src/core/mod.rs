pub mod agent;
pub mod conversation;
pub mod model;
pub mod steps;
pub mod tool_call;

pub use agent::{RevisionAgent, DEFAULT_MAX_STEPS};
pub use conversation::{Conversation, Message, Role};
pub use model::{LanguageModel, ScriptedModel};
pub use steps::AgentStep;
pub use tool_call::{Observation, ToolCall, ToolExecution, ToolOutput};
