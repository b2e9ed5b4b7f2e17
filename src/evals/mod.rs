//! Plan evaluators.
//!
//! Each evaluator checks one property of a `TravelPlan` against the vacation
//! request. Failures are collected and reported together; a fatal error (an
//! unreadable model judgment, a provider failure) aborts the whole run.

pub mod checks;
pub mod judgments;

use crate::{
    core::model::LanguageModel,
    data::TravelDataSource,
    error::{AgentError, Result},
    vacation_types::{TravelPlan, VacationInfo},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

pub use checks::{
    EventsMatchReference, InterestsSatisfied, StartEndDatesMatch, TotalCostIsAccurate,
    TotalCostWithinBudget,
};
pub use judgments::{
    parse_compatibility_judgment, parse_feedback_judgment, FeedbackIncorporated, FeedbackJudgment,
    FeedbackVerdict, WeatherCompatibility,
};

/// Outcome of one evaluator
#[derive(Debug, Error)]
pub enum EvalError {
    /// The plan does not satisfy the property
    #[error("{0}")]
    Failed(String),
    /// The evaluation itself could not be carried out
    #[error(transparent)]
    Fatal(#[from] AgentError),
}

/// Inputs shared by every evaluator
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub vacation: &'a VacationInfo,
    pub plan: &'a TravelPlan,
    pub feedback: Option<&'a str>,
}

impl<'a> EvalContext<'a> {
    pub fn new(vacation: &'a VacationInfo, plan: &'a TravelPlan) -> Self {
        Self {
            vacation,
            plan,
            feedback: None,
        }
    }

    pub fn with_feedback(mut self, feedback: Option<&'a str>) -> Self {
        self.feedback = feedback;
        self
    }
}

#[async_trait]
pub trait Evaluator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn evaluate(&self, ctx: &EvalContext<'_>) -> std::result::Result<(), EvalError>;
}

/// Aggregate result of an evaluation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResults {
    pub success: bool,
    pub failures: Vec<String>,
    pub eval_functions: Vec<String>,
}

/// Run evaluators in order, collecting every failure. The first fatal error
/// stops the run and is returned.
pub async fn run_evaluations(
    evaluators: &[Box<dyn Evaluator>],
    ctx: &EvalContext<'_>,
) -> Result<EvaluationResults> {
    let mut failures = Vec::new();

    for evaluator in evaluators {
        match evaluator.evaluate(ctx).await {
            Ok(()) => {
                info!(target: "itinerary::evals", evaluator = evaluator.name(), "✅ passed");
            }
            Err(EvalError::Failed(message)) => {
                warn!(
                    target: "itinerary::evals",
                    evaluator = evaluator.name(),
                    failure = %message,
                    "❌ failed"
                );
                failures.push(message);
            }
            Err(EvalError::Fatal(err)) => return Err(err),
        }
    }

    Ok(EvaluationResults {
        success: failures.is_empty(),
        failures,
        eval_functions: evaluators
            .iter()
            .map(|evaluator| evaluator.name().to_string())
            .collect(),
    })
}

/// Checks that need neither a model nor feedback.
pub fn deterministic_evaluators(source: Arc<dyn TravelDataSource>) -> Vec<Box<dyn Evaluator>> {
    vec![
        Box::new(StartEndDatesMatch),
        Box::new(TotalCostIsAccurate),
        Box::new(EventsMatchReference::new(source)),
        Box::new(InterestsSatisfied),
        Box::new(TotalCostWithinBudget),
    ]
}

/// Checks run on a freshly planned itinerary: the deterministic set plus the
/// weather judgment.
pub fn initial_evaluators(
    source: Arc<dyn TravelDataSource>,
    weather_judge: Arc<dyn LanguageModel>,
) -> Vec<Box<dyn Evaluator>> {
    let mut evaluators = deterministic_evaluators(source.clone());
    evaluators.push(Box::new(WeatherCompatibility::new(weather_judge, source)));
    evaluators
}

/// Every check, traveler feedback included.
pub fn all_evaluators(
    source: Arc<dyn TravelDataSource>,
    weather_judge: Arc<dyn LanguageModel>,
    feedback_judge: Arc<dyn LanguageModel>,
) -> Vec<Box<dyn Evaluator>> {
    let mut evaluators = initial_evaluators(source, weather_judge);
    evaluators.push(Box::new(FeedbackIncorporated::new(feedback_judge)));
    evaluators
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::{
        data::{MockTravelData, TravelDataSource},
        vacation_types::{
            ActivityRecommendation, Interest, ItineraryDay, TravelPlan, Traveler, VacationInfo,
        },
    };
    use chrono::NaiveDate;

    pub fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    pub fn vacation() -> VacationInfo {
        VacationInfo {
            travelers: vec![
                Traveler {
                    name: "Yuri".to_string(),
                    age: 30,
                    interests: vec![Interest::Technology, Interest::Comedy],
                },
                Traveler {
                    name: "Hiro".to_string(),
                    age: 25,
                    interests: vec![Interest::Writing],
                },
            ],
            destination: "AgentsVille".to_string(),
            date_of_arrival: date(10),
            date_of_departure: date(11),
            budget: 100,
        }
    }

    /// Two-day plan built from the bundled calendar: the tech expo on the
    /// 10th and the comedy night on the 11th, total 55.
    pub fn plan() -> TravelPlan {
        let data = MockTravelData::load().unwrap();
        let day = |d: u32, ids: &[&str]| ItineraryDay {
            date: date(d),
            weather: data
                .weather_for(&date(d).to_string(), "AgentsVille")
                .unwrap(),
            activity_recommendations: ids
                .iter()
                .map(|id| ActivityRecommendation {
                    activity: data.activity_by_id(id).unwrap(),
                    reasons_for_recommendation: vec!["matches interests".to_string()],
                })
                .collect(),
        };
        TravelPlan {
            city: "AgentsVille".to_string(),
            start_date: date(10),
            end_date: date(11),
            total_cost: 55,
            itinerary_days: vec![
                day(10, &["event-2025-06-10-1"]),
                day(11, &["event-2025-06-11-0"]),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{plan, vacation};
    use super::*;
    use crate::{core::model::ScriptedModel, data::MockTravelData};

    fn source() -> Arc<dyn TravelDataSource> {
        Arc::new(MockTravelData::load().unwrap())
    }

    #[tokio::test]
    async fn test_failures_are_collected_independently() {
        let vacation = vacation();
        let mut plan = plan();
        plan.total_cost = 500;

        let results = run_evaluations(
            &deterministic_evaluators(source()),
            &EvalContext::new(&vacation, &plan),
        )
        .await
        .unwrap();

        assert!(!results.success);
        // cost accuracy, interests (Hiro) and budget all fail
        assert_eq!(results.failures.len(), 3);
        assert_eq!(
            results.eval_functions,
            vec![
                "eval_start_end_dates_match",
                "eval_total_cost_is_accurate",
                "eval_itinerary_events_match_actual_events",
                "eval_itinerary_satisfies_interests",
                "eval_total_cost_is_within_budget",
            ]
        );
    }

    #[tokio::test]
    async fn test_fatal_judgment_aborts_run() {
        let vacation = vacation();
        let plan = plan();
        let judge = Arc::new(ScriptedModel::repeating("I am not sure."));

        let err = run_evaluations(
            &initial_evaluators(source(), judge),
            &EvalContext::new(&vacation, &plan),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AgentError::Judgment(_)));
    }

    #[tokio::test]
    async fn test_all_evaluators_pass_with_agreeable_judges() {
        let mut vacation = vacation();
        vacation.travelers.truncate(1);
        let plan = plan();
        let weather = Arc::new(ScriptedModel::repeating(
            "REASONING:\nIndoor event.\nFINAL ANSWER:\nIS_COMPATIBLE",
        ));
        let feedback = Arc::new(ScriptedModel::repeating(
            "ANALYSIS:\n* ok\nFINAL OUTPUT:\nFULLY_INCORPORATED\nREASON: two activities a day",
        ));

        let evaluators = all_evaluators(source(), weather.clone(), feedback.clone());
        let ctx = EvalContext::new(&vacation, &plan).with_feedback(Some("more activities"));
        let results = run_evaluations(&evaluators, &ctx).await.unwrap();

        assert!(results.success, "{:?}", results.failures);
        assert_eq!(results.eval_functions.len(), 7);
        assert_eq!(weather.call_count(), 2);
        assert_eq!(feedback.call_count(), 1);
    }
}
