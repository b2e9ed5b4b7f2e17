use crate::{core::steps::AgentStep, vacation_types::TravelPlan};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of a completed revision loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionResult {
    /// Validated plan submitted through the final answer tool
    pub plan: TravelPlan,
    /// Every step taken, in order
    pub steps: Vec<AgentStep>,
    /// Wall-clock duration of the loop
    pub duration: Duration,
    /// Model turns consumed, final turn included
    pub steps_used: usize,
}

impl RevisionResult {
    pub fn new(
        plan: TravelPlan,
        steps: Vec<AgentStep>,
        duration: Duration,
        steps_used: usize,
    ) -> Self {
        Self {
            plan,
            steps,
            duration,
            steps_used,
        }
    }

    /// Generate a human-readable replay of the run
    pub fn replay(&self) -> String {
        let mut lines = self.header("Revision Trace");
        lines.push("--- Steps ---".to_string());
        for (idx, step) in self.steps.iter().enumerate() {
            lines.push(format!("{}. {}", idx + 1, step.describe()));
        }
        lines.push(String::new());
        lines.push("--- Final Plan ---".to_string());
        lines.push(self.plan_summary());
        lines.join("\n")
    }

    /// Replay with the full payload of every step
    pub fn explain(&self) -> String {
        let mut lines = self.header("Revision Explanation");
        lines.push("--- Detailed Steps ---".to_string());

        for (idx, step) in self.steps.iter().enumerate() {
            lines.push(format!("\n{}. {}", idx + 1, step.describe()));
            match step {
                AgentStep::Task { content } => lines.push(format!("   Content: {}", content)),
                AgentStep::Thought { thought } => lines.push(format!("   Thought: {}", thought)),
                AgentStep::Action {
                    tool_name,
                    arguments,
                } => {
                    lines.push(format!("   Tool: {}", tool_name));
                    lines.push(format!("   Arguments: {}", arguments));
                }
                AgentStep::Observation { result, is_error } => {
                    lines.push(format!("   Error: {}", is_error));
                    lines.push(format!("   Result: {}", result));
                }
                AgentStep::FinalAnswer { plan } => {
                    lines.push(format!("   Plan: {}", plan));
                }
            }
        }

        lines.push(String::new());
        lines.push("--- Final Plan ---".to_string());
        lines.push(self.plan_summary());
        lines.join("\n")
    }

    fn header(&self, title: &str) -> Vec<String> {
        vec![
            format!("=== {} ===", title),
            format!("Duration: {:.2}s", self.duration.as_secs_f64()),
            format!("Steps used: {}", self.steps_used),
            String::new(),
        ]
    }

    fn plan_summary(&self) -> String {
        format!(
            "{} from {} to {}: {} day(s), {} activities, total cost {}",
            self.plan.city,
            self.plan.start_date,
            self.plan.end_date,
            self.plan.itinerary_days.len(),
            self.plan.activities().count(),
            self.plan.total_cost
        )
    }

    /// Number of tool calls dispatched, final answer excluded
    pub fn action_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, AgentStep::Action { .. }))
            .count()
    }

    pub fn observation_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, AgentStep::Observation { .. }))
            .count()
    }

    /// Observations that reported a protocol or tool failure
    pub fn errors(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter_map(|s| match s {
                AgentStep::Observation { result, is_error } if *is_error => Some(result.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn plan() -> TravelPlan {
        let day = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        TravelPlan {
            city: "AgentsVille".to_string(),
            start_date: day,
            end_date: day,
            total_cost: 0,
            itinerary_days: Vec::new(),
        }
    }

    fn steps() -> Vec<AgentStep> {
        vec![
            AgentStep::Task {
                content: "revise".to_string(),
            },
            AgentStep::Action {
                tool_name: "calculator_tool".to_string(),
                arguments: json!({"input_expression": "1+1"}),
            },
            AgentStep::Observation {
                result: "OBSERVATION: No arguments specified.".to_string(),
                is_error: true,
            },
            AgentStep::Observation {
                result: "OBSERVATION: Tool calculator_tool called successfully with response: 2.0"
                    .to_string(),
                is_error: false,
            },
        ]
    }

    #[test]
    fn test_counts_and_errors() {
        let result = RevisionResult::new(plan(), steps(), Duration::from_millis(10), 3);
        assert_eq!(result.action_count(), 1);
        assert_eq!(result.observation_count(), 2);
        assert_eq!(result.errors(), vec!["OBSERVATION: No arguments specified."]);
    }

    #[test]
    fn test_replay_lists_steps_and_plan() {
        let result = RevisionResult::new(plan(), steps(), Duration::from_secs(2), 3);
        let replay = result.replay();
        assert!(replay.contains("Steps used: 3"));
        assert!(replay.contains("🔧 Action: calculator_tool"));
        assert!(replay.contains("AgentsVille from 2025-06-10 to 2025-06-10"));

        let explain = result.explain();
        assert!(explain.contains("Arguments: {\"input_expression\":\"1+1\"}"));
    }
}
