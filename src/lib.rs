//! itinerary-agent: plans a trip, then revises it from traveler feedback
//! through a bounded THOUGHT/ACTION tool-calling loop.
//!
//! The initial itinerary comes from a single planning call. The revision agent
//! then talks to the model step by step, dispatching each parsed action to a
//! registered tool and feeding the result back as an observation, until the
//! model submits a plan that passes schema validation or the step budget runs
//! out. Evaluators check plans independently of the loop.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use itinerary_agent::{
//!     data::{demo_vacation_info, weather_context, MockTravelData},
//!     services::{ItineraryPlanner, OpenAIClient},
//!     tools::{CalculatorTool, FinalAnswerTool, ToolDispatcher, ToolRegistry},
//!     RevisionAgent,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let model = Arc::new(OpenAIClient::from_env()?);
//!     let source = Arc::new(MockTravelData::load()?);
//!     let vacation = demo_vacation_info()?;
//!
//!     let plan = ItineraryPlanner::new(model.clone(), source.clone())
//!         .plan(&vacation)
//!         .await?;
//!
//!     let mut registry = ToolRegistry::new();
//!     registry.register(CalculatorTool)?;
//!     registry.register(FinalAnswerTool)?;
//!
//!     let agent = RevisionAgent::for_vacation(
//!         model,
//!         ToolDispatcher::new(registry),
//!         &vacation,
//!         &weather_context(source.as_ref(), &vacation),
//!         "I want to have at least two activities per day.",
//!     );
//!     let result = agent.revise(&plan).await?;
//!     println!("{}", result.explain());
//!     Ok(())
//! }
//! ```

extern crate self as itinerary_agent;

pub mod core;
pub mod data;
pub mod error;
pub mod evals;
pub mod schemas;
pub mod services;
pub mod storage;
pub mod tools;
pub mod types;

pub use core::{
    AgentStep, Conversation, LanguageModel, RevisionAgent, ScriptedModel, ToolCall, ToolExecution,
    ToolOutput,
};
pub use error::{AgentError, Result};
pub use itinerary_macros::{completion_schema, tool};
pub use schemas::validator::Validator;
pub use schemas::{schema_type_name, CompletionSchema, SchemaHandle};
pub use tools::{Tool, ToolDispatcher, ToolRegistry};
pub use types::response::deserialize_structured_response;
pub use types::result::RevisionResult;

pub use core as agent;
pub use schemas as schema;
pub use schemas::validator;
pub use types::response;
pub use types::vacation_types;

#[cfg(feature = "cli")]
pub mod cli;
