use super::Tool;
use crate::{
    evals::{run_evaluations, EvalContext, Evaluator},
    schemas::validation::validate_completion,
    vacation_types::{TravelPlan, VacationInfo},
    AgentError,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::pin::Pin;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RunEvalsParams {
    /// The travel plan to evaluate
    pub travel_plan: TravelPlan,
}

/// Runs the evaluation suite against the agent's vacation request and the
/// traveler's feedback.
pub struct RunEvalsTool {
    vacation: VacationInfo,
    feedback: Option<String>,
    evaluators: Vec<Box<dyn Evaluator>>,
}

impl RunEvalsTool {
    pub fn new(
        vacation: VacationInfo,
        feedback: Option<String>,
        evaluators: Vec<Box<dyn Evaluator>>,
    ) -> Self {
        Self {
            vacation,
            feedback,
            evaluators,
        }
    }
}

impl std::fmt::Debug for RunEvalsTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunEvalsTool")
            .field("destination", &self.vacation.destination)
            .field(
                "evaluators",
                &self.evaluators.iter().map(|e| e.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Tool for RunEvalsTool {
    fn name(&self) -> &'static str {
        "run_evals_tool"
    }

    fn description(&self) -> &'static str {
        "Runs all evaluation tools on the provided travel plan and vacation info. Arguments: travel_plan (TravelPlan), the itinerary to evaluate. Returns success (bool) and the list of failures."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::to_value(schemars::schema_for!(RunEvalsParams)).unwrap_or(Value::Null)
    }

    fn execute(
        &self,
        parameters: Value,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Value, AgentError>> + Send + '_>> {
        Box::pin(async move {
            let payload = parameters.get("travel_plan").ok_or_else(|| {
                AgentError::ToolExecution("missing argument `travel_plan`".to_string())
            })?;
            let plan: TravelPlan = validate_completion(payload)
                .map_err(|err| AgentError::ToolExecution(err.observation_message()))?;

            let ctx = EvalContext::new(&self.vacation, &plan).with_feedback(self.feedback.as_deref());
            let results = run_evaluations(&self.evaluators, &ctx)
                .await
                .map_err(|err| AgentError::ToolExecution(err.to_string()))?;

            Ok(json!({
                "success": results.success,
                "failures": results.failures,
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::{MockTravelData, TravelDataSource},
        evals::{deterministic_evaluators, fixtures},
    };
    use std::sync::Arc;

    fn tool() -> RunEvalsTool {
        let source: Arc<dyn TravelDataSource> = Arc::new(MockTravelData::load().unwrap());
        RunEvalsTool::new(fixtures::vacation(), None, deterministic_evaluators(source))
    }

    #[tokio::test]
    async fn test_reports_failures() {
        let plan = serde_json::to_value(fixtures::plan()).unwrap();
        let result = tool().execute(json!({ "travel_plan": plan })).await.unwrap();
        assert_eq!(result["success"], false);
        let failures = result["failures"].as_array().unwrap();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].as_str().unwrap().contains("Hiro"));
    }

    #[tokio::test]
    async fn test_huge_prices_are_reported_not_panicked() {
        let mut plan = fixtures::plan();
        plan.itinerary_days[0].activity_recommendations[0].activity.price = i64::MAX;
        plan.itinerary_days[1].activity_recommendations[0].activity.price = i64::MAX;
        let plan = serde_json::to_value(plan).unwrap();

        let result = tool().execute(json!({ "travel_plan": plan })).await.unwrap();
        assert_eq!(result["success"], false);
        let failures: Vec<&str> = result["failures"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert!(failures.iter().any(|failure| failure.contains("overflows")));
    }

    #[tokio::test]
    async fn test_malformed_plan_is_tool_error() {
        let err = tool()
            .execute(json!({ "travel_plan": {"city": "AgentsVille"} }))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::ToolExecution(_)));
    }
}
