use super::prompts::itinerary_system_prompt;
use crate::{
    core::{conversation::Conversation, model::LanguageModel},
    data::{activities_context, weather_context, TravelDataSource},
    error::{AgentError, Result},
    schemas::validation::validate_completion,
    vacation_types::{TravelPlan, VacationInfo},
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Produces the first itinerary for a vacation in a single model call.
pub struct ItineraryPlanner {
    model: Arc<dyn LanguageModel>,
    source: Arc<dyn TravelDataSource>,
    structured_output: bool,
}

impl ItineraryPlanner {
    pub fn new(model: Arc<dyn LanguageModel>, source: Arc<dyn TravelDataSource>) -> Self {
        Self {
            model,
            source,
            structured_output: false,
        }
    }

    /// Ask the provider for schema-constrained output through `response_format`.
    pub fn with_structured_output(mut self, enabled: bool) -> Self {
        self.structured_output = enabled;
        self
    }

    /// Plan the trip described by `vacation`.
    ///
    /// There is no feedback loop here: a response without a schema-valid
    /// TravelPlan is returned as `AgentError::Validation`.
    pub async fn plan(&self, vacation: &VacationInfo) -> Result<TravelPlan> {
        vacation.validate()?;

        let source = self.source.as_ref();
        let system_prompt = itinerary_system_prompt(
            &weather_context(source, vacation),
            &activities_context(source, vacation),
        );

        let mut conversation = Conversation::with_system_prompt(&system_prompt);
        conversation.push_user(serde_json::to_string_pretty(vacation)?);
        if self.structured_output {
            conversation.set_schema::<TravelPlan>();
        }

        info!(
            target: "itinerary::planning",
            model = self.model.name(),
            destination = %vacation.destination,
            days = vacation.trip_dates().len(),
            "planning itinerary"
        );

        let response = self.model.complete(&conversation).await?;
        let plan = parse_plan_response(&response)?;

        info!(
            target: "itinerary::planning",
            days = plan.itinerary_days.len(),
            total_cost = plan.total_cost,
            "itinerary planned"
        );
        Ok(plan)
    }
}

impl std::fmt::Debug for ItineraryPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItineraryPlanner")
            .field("model", &self.model.name())
            .field("structured_output", &self.structured_output)
            .finish()
    }
}

/// Read a TravelPlan out of a planning response.
pub fn parse_plan_response(response: &str) -> Result<TravelPlan> {
    let block = extract_json_block(response);
    let payload: Value = serde_json::from_str(block).map_err(|err| {
        warn!(target: "itinerary::planning", error = %err, "planning response is not JSON");
        debug!(target: "itinerary::schema", response = %response);
        AgentError::Validation(format!("planning response does not contain valid JSON: {err}"))
    })?;

    validate_completion::<TravelPlan>(&payload).map_err(|err| match err {
        AgentError::Validation(_) => err,
        other => AgentError::Validation(other.to_string()),
    })
}

/// Contents of the first ```json fenced block, or the whole text when there is none.
pub fn extract_json_block(text: &str) -> &str {
    let Some(start) = text.find(JSON_FENCE) else {
        return text.trim();
    };
    let body = &text[start + JSON_FENCE.len()..];
    match body.find(FENCE) {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}
