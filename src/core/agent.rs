use super::model::LanguageModel;
use crate::{
    services::prompts::revision_system_prompt,
    tools::ToolDispatcher,
    vacation_types::VacationInfo,
};
use std::sync::Arc;

pub const DEFAULT_MAX_STEPS: usize = 15;

/// Revises a travel plan from traveler feedback through a THOUGHT/ACTION
/// tool-calling loop. See [`RevisionAgent::revise`].
pub struct RevisionAgent {
    model: Arc<dyn LanguageModel>,
    dispatcher: ToolDispatcher,
    max_steps: usize,
    system_prompt: String,
}

impl RevisionAgent {
    /// Create an agent with an explicit system prompt.
    pub fn new(
        model: Arc<dyn LanguageModel>,
        dispatcher: ToolDispatcher,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            model,
            dispatcher,
            max_steps: DEFAULT_MAX_STEPS,
            system_prompt: system_prompt.into(),
        }
    }

    /// Create an agent whose system prompt lists the dispatcher's tools and
    /// carries the vacation request, the weather context and the feedback.
    pub fn for_vacation(
        model: Arc<dyn LanguageModel>,
        dispatcher: ToolDispatcher,
        vacation: &VacationInfo,
        weather_context: &str,
        feedback: &str,
    ) -> Self {
        let system_prompt =
            revision_system_prompt(feedback, dispatcher.registry(), weather_context, vacation);
        Self::new(model, dispatcher, system_prompt)
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub(crate) fn model(&self) -> &dyn LanguageModel {
        self.model.as_ref()
    }

    pub(crate) fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }
}

impl std::fmt::Debug for RevisionAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevisionAgent")
            .field("model", &self.model.name())
            .field("tools", &self.dispatcher.registry().names())
            .field("max_steps", &self.max_steps)
            .finish()
    }
}
