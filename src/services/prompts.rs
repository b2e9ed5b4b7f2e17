use crate::{
    schemas::CompletionSchema,
    tools::ToolRegistry,
    vacation_types::{TravelPlan, VacationInfo},
};

/// System prompt for the one-shot planning step.
pub fn itinerary_system_prompt(weather_context: &str, activities_context: &str) -> String {
    format!(
        r#"
You are an experienced travel agent. You excel at putting together tailored travel schedules exceeding your customers' expectations.

## Task
Your task is to plan a detailed day-by-day itinerary for your customers.
1. Read carefully the travel requirements of your customers. Take good note of their interests, dates and budget constraints.
2. Follow these rules:
 2.1 There should be at least one activity per day. Choose the activities based on the weather, your customers' interests and constraints.
 2.2 Outdoor-only activities should be avoided.
 2.3 For a given day, check the weather before planning outdoor activities.
 2.4 During rain, events should be chosen based on traveler interests.
 2.5 Your itinerary should not exceed the total budget.
3. Plan a day-by-day itinerary following these steps:
    3.1 The itinerary should start on the date of arrival and should end on the date of departure.
    3.2 For each day,
        3.2.1 check the weather forecast and the available activities. Keep activities matching weather conditions and travelers' interests.
        3.2.2 then check the activity schedules and plan activities accordingly.
        3.2.3 check the overall itinerary cost. Remove activities one by one to match the budget while still maximizing the program.
    3.3 In case of alternatives, select activities so that each traveler has at least one activity in the itinerary that matches their interests.
4. Copy every selected activity exactly as listed in the context, and set total_cost to the sum of the selected activity prices.

## Output Format

Respond using two sections (ANALYSIS AND FINAL OUTPUT) in the following format:

    ANALYSIS:
    Day-by-day travel summary schedule

    FINAL OUTPUT:

    ```json
    {schema}
    ```

## Context

Weather forecast:
{weather_context}

Available activities:
{activities_context}
"#,
        schema = TravelPlan::schema().render_for_prompt(),
    )
}

/// System prompt for the THOUGHT/ACTION revision loop.
pub fn revision_system_prompt(
    feedback: &str,
    tools: &ToolRegistry,
    weather_context: &str,
    vacation: &VacationInfo,
) -> String {
    let vacation_json = serde_json::to_string_pretty(vacation).unwrap_or_default();
    format!(
        r#"
You are an experienced travel agent expert in improving an initial travel itinerary to incorporate traveler feedback in a multi-step process using tool calls and reasoning.

## Task
Your task is to improve the itinerary based on this traveler's feedback: "{feedback}"

# PROCESS
1. Read carefully the traveler's feedback to identify the requested modifications.
2. Follow the process below to improve the itinerary:
- You will use step-by-step reasoning by
    - THOUGHT the next steps to take to complete the task and what next tool call to take to get one step closer to the final answer
    - ACTION on the single next tool call to take
- You will always respond with a single THOUGHT/ACTION message of the following format:
    THOUGHT:
    First, you will reason about the problem and determine the next logical action to take.
    ACTION:
    Based on your thought process, you will call ONE of the available tools.
 IMPORTANT: Start your analysis by invoking the evaluation tool to check the proposed itinerary and identify potential issues to be corrected.
3. Submit Final Response
- As soon as you know the final answer, run the evaluation tool again to check that all criteria are met.
- If the evaluation is passed then call the `final_answer_tool` in an `ACTION` message to submit the final itinerary.

# IMPORTANT RULES
- There should be at least one activity per day. Choose the activities based on the weather, the travelers' interests and constraints.
- During rain, events should be chosen based on traveler interests.
- The itinerary should not exceed the total budget defined by the travelers.
- The itinerary should start on the date of arrival and should end on the date of departure.
- For a given day, timing of activities should be compatible with one another.
- Check the overall itinerary cost. Remove activities one by one to match the budget so that it still maximizes the program.
- In case of alternatives, select activities so that each traveler has at least one activity in the itinerary that matches their interests.

## Available Tools

{tool_listing}
You will not use any other tools.
As soon as you know the final answer, run the evaluation tool again, then call the `final_answer_tool` only if all criteria are met.

## Output Format

    THOUGHT:
    One-liner summary of your reasoning.

    ACTION:
    {{"tool_name": "[tool_name]", "arguments": {{"arg1": "value1", ...}}}}

## Context

Weather forecast:
{weather_context}

VACATION_INFO:
{vacation_json}

Expected output for the final Travel Plan:
{schema}
"#,
        tool_listing = tools.describe_tools(),
        schema = TravelPlan::schema().render_for_prompt(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data::demo_vacation_info, tools::CalculatorTool};

    #[test]
    fn test_revision_prompt_sections() {
        let mut tools = ToolRegistry::new();
        tools.register(CalculatorTool).unwrap();
        let vacation = demo_vacation_info().unwrap();

        let prompt = revision_system_prompt(
            "more tennis",
            &tools,
            "{\"date\":\"2025-06-10\"}",
            &vacation,
        );
        assert!(prompt.contains("based on this traveler's feedback: \"more tennis\""));
        assert!(prompt.contains("* `calculator_tool`: "));
        assert!(prompt.contains("\"destination\": \"AgentsVille\""));
        assert!(prompt.contains("\"total_cost\""));
        assert!(prompt.contains("{\"tool_name\": \"[tool_name]\""));
    }

    #[test]
    fn test_itinerary_prompt_embeds_context() {
        let prompt = itinerary_system_prompt("sunny", "Palette & Pour");
        assert!(prompt.contains("Weather forecast:\nsunny"));
        assert!(prompt.contains("Available activities:\nPalette & Pour"));
        assert!(prompt.contains("\"itinerary_days\""));
    }
}
