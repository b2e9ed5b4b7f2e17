//! Tool abstractions, the dispatcher and the built-in tools

pub mod activities;
pub mod calculator;
pub mod dispatcher;
pub mod evals_tool;
pub mod final_answer;
pub mod tool;
pub mod weather;

pub use activities::ActivitiesTool;
pub use calculator::CalculatorTool;
pub use dispatcher::ToolDispatcher;
pub use evals_tool::RunEvalsTool;
pub use final_answer::FinalAnswerTool;
pub use tool::{Tool, ToolRegistry};
pub use weather::WeatherTool;
