use super::{
    action_parser::parse_action,
    response_handler::{handle_final_answer, HandlerOutcome, ObservationSink},
};
use crate::{
    core::{
        agent::RevisionAgent,
        conversation::Conversation,
        steps::{extract_thought, AgentStep},
        tool_call::render_value,
    },
    error::{AgentError, Result},
    schemas::validation::FINAL_ANSWER_TOOL_NAME,
    types::result::RevisionResult,
    vacation_types::TravelPlan,
};
use serde_json::Value;
use std::time::Instant;
use tracing::{info, warn};

/// Conversation and step trace owned by a single run
struct RunTrace {
    conversation: Conversation,
    steps: Vec<AgentStep>,
}

impl RunTrace {
    fn record(&mut self, step: AgentStep) {
        info!(target: "itinerary::steps", "{}", step.describe());
        self.steps.push(step);
    }
}

impl ObservationSink for RunTrace {
    fn report(&mut self, text: String, is_error: bool) {
        self.conversation.push_user(text.clone());
        self.record(AgentStep::Observation {
            result: text,
            is_error,
        });
    }
}

impl RevisionAgent {
    /// Revise `plan` until the model submits a valid final answer.
    ///
    /// Each step asks the model for a THOUGHT/ACTION response over the full
    /// history. Missing or unparseable actions, rejected final answers and
    /// tool failures are fed back as user messages and cost one step. Only a
    /// schema-valid `final_answer_tool` call ends the loop successfully;
    /// running out of steps is an error carrying the last response.
    pub async fn revise(&self, plan: &TravelPlan) -> Result<RevisionResult> {
        let max_steps = self.max_steps();
        if max_steps == 0 {
            return Err(AgentError::Config(
                "max_steps must be at least 1".to_string(),
            ));
        }

        let start_time = Instant::now();
        let task = format!(
            "Here is the itinerary for revision:\n{}",
            serde_json::to_string_pretty(plan)?
        );

        let mut trace = RunTrace {
            conversation: Conversation::with_system_prompt(self.system_prompt()),
            steps: Vec::new(),
        };
        trace.conversation.push_user(task.clone());
        trace.record(AgentStep::Task { content: task });

        info!(
            target: "itinerary::loop",
            model = self.model().name(),
            max_steps,
            "revision loop started"
        );

        let mut last_response = String::new();

        for step in 1..=max_steps {
            info!(target: "itinerary::loop", step, max_steps, "awaiting model response");

            let response = self.model().complete(&trace.conversation).await?;
            trace.conversation.push_assistant(response.clone());
            if let Some(thought) = extract_thought(&response) {
                trace.record(AgentStep::Thought { thought });
            }

            let action = match parse_action(&response) {
                Ok(action) => action,
                Err(failure) => {
                    warn!(target: "itinerary::loop", step, error = %failure, "unusable response");
                    trace.report(failure.to_string(), true);
                    last_response = response;
                    continue;
                }
            };
            last_response = response;

            let tool_name = action.get("tool_name");
            trace.record(AgentStep::Action {
                tool_name: tool_name.map(render_value).unwrap_or_default(),
                arguments: action.get("arguments").cloned().unwrap_or(Value::Null),
            });

            if tool_name.and_then(Value::as_str) == Some(FINAL_ANSWER_TOOL_NAME) {
                match handle_final_answer(action.get("arguments"), &mut trace) {
                    HandlerOutcome::Continue => continue,
                    HandlerOutcome::Complete(revised) => {
                        trace.record(AgentStep::FinalAnswer {
                            plan: serde_json::to_value(&revised)?,
                        });
                        info!(
                            target: "itinerary::loop",
                            steps_used = step,
                            "revision loop completed"
                        );
                        return Ok(RevisionResult::new(
                            revised,
                            trace.steps,
                            start_time.elapsed(),
                            step,
                        ));
                    }
                }
            }

            let observation = self.dispatcher().dispatch(&action).await;
            trace.report(observation.text, observation.is_error);
        }

        warn!(target: "itinerary::loop", max_steps, "step budget exhausted");
        Err(AgentError::StepBudgetExhausted {
            max_steps,
            last_response,
        })
    }
}
