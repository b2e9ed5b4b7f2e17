pub mod action_parser;
mod execution;
pub mod openai_client;
pub mod planning;
pub mod prompts;
mod response_handler;

pub use openai_client::OpenAIClient;
pub use planning::ItineraryPlanner;
