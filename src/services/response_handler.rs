use crate::{
    schemas::validation::{final_answer_payload, validate_completion},
    vacation_types::TravelPlan,
};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Destination for messages fed back to the model
pub(super) trait ObservationSink {
    fn report(&mut self, text: String, is_error: bool);
}

/// What the loop should do after handling a final answer
#[derive(Debug)]
pub(super) enum HandlerOutcome {
    /// Keep looping; the failure has been reported
    Continue,
    /// A validated plan ends the run
    Complete(TravelPlan),
}

/// Validate the arguments of a `final_answer_tool` action.
///
/// The plan is read from `final_output`, falling back to the whole argument
/// mapping, then checked against the TravelPlan schema and deserialized.
pub(super) fn handle_final_answer(
    arguments: Option<&Value>,
    sink: &mut dyn ObservationSink,
) -> HandlerOutcome {
    let arguments = arguments.unwrap_or(&Value::Null);
    let payload = final_answer_payload(arguments);

    match validate_completion::<TravelPlan>(payload) {
        Ok(plan) => {
            info!(
                target: "itinerary::loop",
                days = plan.itinerary_days.len(),
                total_cost = plan.total_cost,
                "final answer accepted"
            );
            HandlerOutcome::Complete(plan)
        }
        Err(err) => {
            warn!(target: "itinerary::loop", error = %err, "final answer rejected");
            debug!(target: "itinerary::schema", payload = %payload);
            sink.report(format!("Error validating final answer: {}", err), true);
            HandlerOutcome::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct Collected(Vec<(String, bool)>);

    impl ObservationSink for Collected {
        fn report(&mut self, text: String, is_error: bool) {
            self.0.push((text, is_error));
        }
    }

    fn plan_json() -> Value {
        json!({
            "city": "AgentsVille",
            "start_date": "2025-06-10",
            "end_date": "2025-06-10",
            "total_cost": 0,
            "itinerary_days": []
        })
    }

    #[test]
    fn test_accepts_wrapped_and_bare_plans() {
        let mut sink = Collected::default();
        let wrapped = json!({ "final_output": plan_json() });
        assert!(matches!(
            handle_final_answer(Some(&wrapped), &mut sink),
            HandlerOutcome::Complete(_)
        ));
        assert!(matches!(
            handle_final_answer(Some(&plan_json()), &mut sink),
            HandlerOutcome::Complete(_)
        ));
        assert!(sink.0.is_empty());
    }

    #[test]
    fn test_invalid_plan_is_reported() {
        let mut sink = Collected::default();
        let mut plan = plan_json();
        plan.as_object_mut().unwrap().remove("total_cost");

        let outcome = handle_final_answer(Some(&json!({ "final_output": plan })), &mut sink);
        assert!(matches!(outcome, HandlerOutcome::Continue));
        assert_eq!(sink.0.len(), 1);
        assert!(sink.0[0].0.starts_with("Error validating final answer: "));
        assert!(sink.0[0].0.contains("total_cost"));
        assert!(sink.0[0].1);

        handle_final_answer(None, &mut sink);
        assert_eq!(sink.0.len(), 2);
    }
}
