use super::{EvalContext, EvalError, Evaluator};
use crate::{
    core::{conversation::Conversation, model::LanguageModel},
    data::{activities_context, weather_context, TravelDataSource},
    error::{AgentError, Result},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use tracing::{debug, info};

const WEATHER_ANSWER_MARKER: &str = "FINAL ANSWER:";
const FEEDBACK_OUTPUT_MARKER: &str = "FINAL OUTPUT:";
const REASON_MARKER: &str = "REASON:";

const WEATHER_COMPATIBILITY_PROMPT: &str = r#"
You are a skilled travel agent making sure that proposed activities are compatible with the weather.

## Task
You are given a proposed travel itinerary. Check that the weather is compatible with each recommended activity scheduled.
When there is not enough information, assume the activity IS_COMPATIBLE with the weather.
For outdoor activities during bad weather, answer IS_COMPATIBLE if an indoor backup option is mentioned in the detailed activity description (example: an outdoor activity description indicates an indoor backup in case of rain).

## Output format

    REASONING:
    one-liner summary explaining your reasoning.

    FINAL ANSWER:
    [IS_COMPATIBLE, IS_INCOMPATIBLE]

## Examples

Activity: "Trail Tales"
Activity type: Outdoor
Weather forecast: Rainy
REASONING:
The activity "Trail Tales" is outdoor while the weather is rainy. Therefore the activity is not compatible.
FINAL ANSWER:
IS_INCOMPATIBLE

---
Activity: "Soundtrack Picnic"
Activity type: Outdoor
Weather forecast: Rainy
REASONING:
The activity "Soundtrack Picnic" is outdoor while the weather is rainy. The activity description mentions an indoor backup. Therefore the activity is compatible.
FINAL ANSWER:
IS_COMPATIBLE

---
Activity: "Soundtrack Picnic"
Activity type: Outdoor
Weather forecast: Sunny
REASONING:
The activity "Soundtrack Picnic" is outdoor while the weather is sunny. Therefore the activity is compatible.
FINAL ANSWER:
IS_COMPATIBLE

---

## Context
"#;

const FEEDBACK_PROMPT: &str = r#"
You are an expert in evaluating whether a travel plan incorporates traveler feedback.

## Output Format

Respond using two sections (ANALYSIS AND FINAL OUTPUT) in the following format:

    ANALYSIS:
    * [step-by-step analysis]

    FINAL OUTPUT:
    [FULLY_INCORPORATED, PARTIALLY_INCORPORATED, NOT_INCORPORATED, or UNKNOWN]
    REASON: [reasoning for the final output]
"#;

/// Text following the last occurrence of `marker`.
fn section_after<'a>(response: &'a str, marker: &str) -> Option<&'a str> {
    response
        .rfind(marker)
        .map(|position| response[position + marker.len()..].trim())
}

/// Read a weather judgment. Returns whether the activity is compatible.
///
/// The label is only looked for in the text after the last `FINAL ANSWER:`
/// marker; a label elsewhere in the response is not enough, and a response
/// without the marker is an `AgentError::Judgment`. Prompts must ask for that
/// section. Within it the first label found wins.
pub fn parse_compatibility_judgment(response: &str) -> Result<bool> {
    let section = section_after(response, WEATHER_ANSWER_MARKER).ok_or_else(|| {
        AgentError::Judgment(format!(
            "expected a '{}' section in: {}",
            WEATHER_ANSWER_MARKER, response
        ))
    })?;

    // common misspellings are accepted alongside the canonical labels
    let labels = [
        ("IS_COMPATIBLE", true),
        ("IS_COMPATIBILE", true),
        ("IS_INCOMPATIBLE", false),
        ("IS_INCOMPATIBILE", false),
    ];
    labels
        .iter()
        .filter_map(|(label, compatible)| section.find(label).map(|pos| (pos, *compatible)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, compatible)| compatible)
        .ok_or_else(|| {
            AgentError::Judgment(format!(
                "expected IS_COMPATIBLE or IS_INCOMPATIBLE, got: {}",
                response
            ))
        })
}

/// How completely a revision took the traveler's feedback into account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackVerdict {
    FullyIncorporated,
    PartiallyIncorporated,
    NotIncorporated,
    Unknown,
}

impl FeedbackVerdict {
    const ALL: [FeedbackVerdict; 4] = [
        FeedbackVerdict::FullyIncorporated,
        FeedbackVerdict::PartiallyIncorporated,
        FeedbackVerdict::NotIncorporated,
        FeedbackVerdict::Unknown,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FeedbackVerdict::FullyIncorporated => "FULLY_INCORPORATED",
            FeedbackVerdict::PartiallyIncorporated => "PARTIALLY_INCORPORATED",
            FeedbackVerdict::NotIncorporated => "NOT_INCORPORATED",
            FeedbackVerdict::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for FeedbackVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackJudgment {
    pub verdict: FeedbackVerdict,
    pub reason: String,
}

/// Read a feedback judgment from the `FINAL OUTPUT:` section. The reason is
/// the text after `REASON:`, or the whole section when that line is absent.
pub fn parse_feedback_judgment(response: &str) -> Result<FeedbackJudgment> {
    let section = section_after(response, FEEDBACK_OUTPUT_MARKER).ok_or_else(|| {
        AgentError::Judgment(format!(
            "expected a '{}' section in: {}",
            FEEDBACK_OUTPUT_MARKER, response
        ))
    })?;

    let verdict = FeedbackVerdict::ALL
        .iter()
        .filter_map(|verdict| section.find(verdict.label()).map(|pos| (pos, *verdict)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, verdict)| verdict)
        .ok_or_else(|| {
            AgentError::Judgment(format!(
                "expected one of FULLY_INCORPORATED, PARTIALLY_INCORPORATED, NOT_INCORPORATED or UNKNOWN, got: {}",
                response
            ))
        })?;

    let reason = section_after(section, REASON_MARKER)
        .unwrap_or(section)
        .to_string();

    Ok(FeedbackJudgment { verdict, reason })
}

/// Asks a model whether each scheduled activity suits that day's weather.
pub struct WeatherCompatibility {
    judge: Arc<dyn LanguageModel>,
    source: Arc<dyn TravelDataSource>,
}

impl WeatherCompatibility {
    pub fn new(judge: Arc<dyn LanguageModel>, source: Arc<dyn TravelDataSource>) -> Self {
        Self { judge, source }
    }

    fn system_prompt(&self, ctx: &EvalContext<'_>) -> String {
        format!(
            "{}\nWeather forecast:\n{}\n\nAvailable activities details:\n{}",
            WEATHER_COMPATIBILITY_PROMPT,
            weather_context(self.source.as_ref(), ctx.vacation),
            activities_context(self.source.as_ref(), ctx.vacation)
        )
    }
}

#[async_trait]
impl Evaluator for WeatherCompatibility {
    fn name(&self) -> &'static str {
        "eval_activities_and_weather_are_compatible"
    }

    async fn evaluate(&self, ctx: &EvalContext<'_>) -> std::result::Result<(), EvalError> {
        let system_prompt = self.system_prompt(ctx);
        let mut incompatible = Vec::new();

        for day in &ctx.plan.itinerary_days {
            for recommendation in &day.activity_recommendations {
                let activity = &recommendation.activity;
                let mut conversation = Conversation::with_system_prompt(&system_prompt);
                conversation.push_user(format!(
                    "Activity: {}\nDescription: {}\nWeather Condition: {}",
                    activity.name, activity.description, day.weather.condition
                ));

                let response = self.judge.complete(&conversation).await?;
                let compatible = parse_compatibility_judgment(&response)?;
                debug!(
                    target: "itinerary::evals",
                    activity = %activity.name,
                    date = %day.date,
                    condition = %day.weather.condition,
                    compatible,
                    "weather judgment"
                );
                if !compatible {
                    incompatible.push(activity.name.clone());
                }
            }
        }

        if !incompatible.is_empty() {
            return Err(EvalError::Failed(format!(
                "Activities that may be ruined by inclement weather: {:?}",
                incompatible
            )));
        }
        Ok(())
    }
}

/// Asks a model whether the revised plan reflects the traveler's feedback.
/// Passes trivially when there is no feedback.
pub struct FeedbackIncorporated {
    judge: Arc<dyn LanguageModel>,
}

impl FeedbackIncorporated {
    pub fn new(judge: Arc<dyn LanguageModel>) -> Self {
        Self { judge }
    }
}

#[async_trait]
impl Evaluator for FeedbackIncorporated {
    fn name(&self) -> &'static str {
        "eval_traveler_feedback_is_incorporated"
    }

    async fn evaluate(&self, ctx: &EvalContext<'_>) -> std::result::Result<(), EvalError> {
        let Some(feedback) = ctx.feedback.filter(|text| !text.trim().is_empty()) else {
            info!(target: "itinerary::evals", "no traveler feedback to check");
            return Ok(());
        };

        let plan_json = serde_json::to_string_pretty(ctx.plan).map_err(AgentError::from)?;
        let mut conversation = Conversation::with_system_prompt(FEEDBACK_PROMPT);
        conversation.push_user(format!(
            "Traveler Feedback: {}\nRevised Travel Plan: {}",
            feedback, plan_json
        ));

        let response = self.judge.complete(&conversation).await?;
        let judgment = parse_feedback_judgment(&response)?;
        if judgment.verdict != FeedbackVerdict::FullyIncorporated {
            return Err(EvalError::Failed(format!(
                "Traveler feedback was not successfully incorporated into the revised travel plan. Verdict: {}. Reason: {}",
                judgment.verdict, judgment.reason
            )));
        }
        Ok(())
    }
}
