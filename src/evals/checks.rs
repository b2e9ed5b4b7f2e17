use super::{EvalContext, EvalError, Evaluator};
use crate::data::TravelDataSource;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Plan dates equal the arrival and departure dates, in order.
#[derive(Debug, Default)]
pub struct StartEndDatesMatch;

#[async_trait]
impl Evaluator for StartEndDatesMatch {
    fn name(&self) -> &'static str {
        "eval_start_end_dates_match"
    }

    async fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<(), EvalError> {
        let (vacation, plan) = (ctx.vacation, ctx.plan);
        if vacation.date_of_arrival != plan.start_date
            || vacation.date_of_departure != plan.end_date
        {
            return Err(EvalError::Failed(format!(
                "Dates do not match: {} != {} or {} != {}",
                vacation.date_of_arrival, plan.start_date, vacation.date_of_departure, plan.end_date
            )));
        }
        if plan.start_date > plan.end_date {
            return Err(EvalError::Failed(format!(
                "Start date is after end date: {} > {}",
                plan.start_date, plan.end_date
            )));
        }
        Ok(())
    }
}

/// Stated total equals the sum of activity prices exactly.
#[derive(Debug, Default)]
pub struct TotalCostIsAccurate;

#[async_trait]
impl Evaluator for TotalCostIsAccurate {
    fn name(&self) -> &'static str {
        "eval_total_cost_is_accurate"
    }

    async fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<(), EvalError> {
        let stated = ctx.plan.total_cost;
        let Some(actual) = ctx.plan.scheduled_cost() else {
            return Err(EvalError::Failed(format!(
                "Calculated total cost overflows; stated total cost is {}",
                stated
            )));
        };
        if actual != stated {
            return Err(EvalError::Failed(format!(
                "Stated total cost does not match calculated total cost: {} != {}",
                actual, stated
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct TotalCostWithinBudget;

#[async_trait]
impl Evaluator for TotalCostWithinBudget {
    fn name(&self) -> &'static str {
        "eval_total_cost_is_within_budget"
    }

    async fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<(), EvalError> {
        let stated = ctx.plan.total_cost;
        if stated > ctx.vacation.budget {
            return Err(EvalError::Failed(format!(
                "Total cost exceeds budget: {} > {}",
                stated, ctx.vacation.budget
            )));
        }
        Ok(())
    }
}

/// Every scheduled activity exists in the reference calendar and is copied
/// field for field.
pub struct EventsMatchReference {
    source: Arc<dyn TravelDataSource>,
}

impl EventsMatchReference {
    pub fn new(source: Arc<dyn TravelDataSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Evaluator for EventsMatchReference {
    fn name(&self) -> &'static str {
        "eval_itinerary_events_match_actual_events"
    }

    async fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<(), EvalError> {
        let mut missing = Vec::new();
        let mut not_matching = Vec::new();

        for activity in ctx.plan.activities() {
            match self.source.activity_by_id(&activity.activity_id) {
                None => missing.push(activity.activity_id.clone()),
                Some(reference) if reference != *activity => {
                    debug!(
                        target: "itinerary::evals",
                        activity_id = %activity.activity_id,
                        reference = ?reference,
                        scheduled = ?activity,
                        "activity differs from reference"
                    );
                    not_matching.push(activity.activity_id.clone());
                }
                Some(_) => {}
            }
        }

        if !missing.is_empty() || !not_matching.is_empty() {
            return Err(EvalError::Failed(format!(
                "Event IDs missing: {:?}\nEvent IDs not matching: {:?}",
                missing, not_matching
            )));
        }
        Ok(())
    }
}

/// Every traveler has at least one activity sharing one of their interests.
#[derive(Debug, Default)]
pub struct InterestsSatisfied;

#[async_trait]
impl Evaluator for InterestsSatisfied {
    fn name(&self) -> &'static str {
        "eval_itinerary_satisfies_interests"
    }

    async fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<(), EvalError> {
        let unmatched: Vec<&str> = ctx
            .vacation
            .travelers
            .iter()
            .filter(|traveler| {
                !ctx.plan
                    .activities()
                    .any(|activity| activity.shares_interest_with(&traveler.interests))
            })
            .map(|traveler| traveler.name.as_str())
            .collect();

        if !unmatched.is_empty() {
            return Err(EvalError::Failed(format!(
                "Travelers {:?} have no matches with the itinerary.",
                unmatched
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{date, plan, vacation};
    use super::*;
    use crate::data::MockTravelData;

    async fn failure(evaluator: &dyn Evaluator, ctx: &EvalContext<'_>) -> Option<String> {
        match evaluator.evaluate(ctx).await {
            Ok(()) => None,
            Err(EvalError::Failed(message)) => Some(message),
            Err(EvalError::Fatal(err)) => panic!("unexpected fatal error: {err}"),
        }
    }

    #[tokio::test]
    async fn test_dates_match() {
        let vacation = vacation();
        let mut plan = plan();
        assert!(failure(&StartEndDatesMatch, &EvalContext::new(&vacation, &plan))
            .await
            .is_none());

        plan.end_date = date(12);
        let message = failure(&StartEndDatesMatch, &EvalContext::new(&vacation, &plan))
            .await
            .unwrap();
        assert!(message.starts_with("Dates do not match"));
    }

    #[tokio::test]
    async fn test_reversed_dates_fail_even_when_request_matches() {
        let mut vacation = vacation();
        vacation.date_of_arrival = date(12);
        vacation.date_of_departure = date(11);
        let mut plan = plan();
        plan.start_date = date(12);
        plan.end_date = date(11);
        let message = failure(&StartEndDatesMatch, &EvalContext::new(&vacation, &plan))
            .await
            .unwrap();
        assert!(message.starts_with("Start date is after end date"));
    }

    #[tokio::test]
    async fn test_cost_accuracy_is_exact() {
        let vacation = vacation();
        let mut plan = plan();
        assert!(failure(&TotalCostIsAccurate, &EvalContext::new(&vacation, &plan))
            .await
            .is_none());

        for stated in [54, 56] {
            plan.total_cost = stated;
            let message = failure(&TotalCostIsAccurate, &EvalContext::new(&vacation, &plan))
                .await
                .unwrap();
            assert!(message.contains("55"));
            assert!(message.contains(&stated.to_string()));
        }
    }

    #[tokio::test]
    async fn test_cost_overflow_is_a_failure() {
        let vacation = vacation();
        let mut plan = plan();
        plan.itinerary_days[0].activity_recommendations[0].activity.price = i64::MAX;
        plan.itinerary_days[1].activity_recommendations[0].activity.price = i64::MAX;
        assert_eq!(plan.scheduled_cost(), None);

        let message = failure(&TotalCostIsAccurate, &EvalContext::new(&vacation, &plan))
            .await
            .unwrap();
        assert!(message.contains("overflows"));
    }

    #[tokio::test]
    async fn test_budget() {
        let mut vacation = vacation();
        let plan = plan();
        vacation.budget = 55;
        assert!(failure(&TotalCostWithinBudget, &EvalContext::new(&vacation, &plan))
            .await
            .is_none());
        vacation.budget = 54;
        assert_eq!(
            failure(&TotalCostWithinBudget, &EvalContext::new(&vacation, &plan)).await,
            Some("Total cost exceeds budget: 55 > 54".to_string())
        );
    }

    #[tokio::test]
    async fn test_events_report_missing_and_altered_together() {
        let vacation = vacation();
        let mut plan = plan();
        let evaluator = EventsMatchReference::new(Arc::new(MockTravelData::load().unwrap()));
        assert!(failure(&evaluator, &EvalContext::new(&vacation, &plan))
            .await
            .is_none());

        plan.itinerary_days[0].activity_recommendations[0]
            .activity
            .activity_id = "event-made-up".to_string();
        plan.itinerary_days[1].activity_recommendations[0].activity.price = 1;
        let message = failure(&evaluator, &EvalContext::new(&vacation, &plan))
            .await
            .unwrap();
        assert_eq!(
            message,
            "Event IDs missing: [\"event-made-up\"]\nEvent IDs not matching: [\"event-2025-06-11-0\"]"
        );
    }

    #[tokio::test]
    async fn test_interests_names_exactly_unmatched_travelers() {
        let vacation = vacation();
        let plan = plan();
        let message = failure(&InterestsSatisfied, &EvalContext::new(&vacation, &plan))
            .await
            .unwrap();
        assert!(message.contains("Hiro"));
        assert!(!message.contains("Yuri"));
    }
}
