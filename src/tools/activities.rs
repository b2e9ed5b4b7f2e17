use super::Tool;
use crate::{
    data::{TravelDataSource, DEFAULT_CITY},
    AgentError,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{pin::Pin, sync::Arc};

/// Arguments shared by the calendar lookups
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DateCityParams {
    /// A date with string format YYYY-MM-DD
    pub date: String,
    /// A city (default = 'AgentsVille')
    #[serde(default = "default_city")]
    pub city: String,
}

fn default_city() -> String {
    DEFAULT_CITY.to_string()
}

pub(crate) fn date_city_schema() -> Value {
    serde_json::to_value(schemars::schema_for!(DateCityParams)).unwrap_or(Value::Null)
}

/// Lists the activities available in a city on a given date
#[derive(Clone)]
pub struct ActivitiesTool {
    source: Arc<dyn TravelDataSource>,
}

impl ActivitiesTool {
    pub fn new(source: Arc<dyn TravelDataSource>) -> Self {
        Self { source }
    }
}

impl std::fmt::Debug for ActivitiesTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivitiesTool").finish_non_exhaustive()
    }
}

impl Tool for ActivitiesTool {
    fn name(&self) -> &'static str {
        "get_activities_by_date_tool"
    }

    fn description(&self) -> &'static str {
        "Returns all activities available on a given date and a city. Inputs: date (YYYY-MM-DD) and city (default = 'AgentsVille'). Output: list of activities available in the city for the selected date, each with activity_id, name, start_time, end_time, location, description, price and related_interests."
    }

    fn parameters_schema(&self) -> Value {
        date_city_schema()
    }

    fn execute(
        &self,
        parameters: Value,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Value, AgentError>> + Send + '_>> {
        Box::pin(async move {
            let params: DateCityParams = serde_json::from_value(parameters)
                .map_err(|e| AgentError::ToolExecution(format!("Invalid parameters: {}", e)))?;

            let activities = self.source.activities_for(&params.date, &params.city);
            serde_json::to_value(activities).map_err(|e| {
                AgentError::ToolExecution(format!("Failed to serialize result: {}", e))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MockTravelData;
    use serde_json::json;

    fn tool() -> ActivitiesTool {
        ActivitiesTool::new(Arc::new(MockTravelData::load().unwrap()))
    }

    #[tokio::test]
    async fn test_city_defaults_to_agentsville() {
        let result = tool().execute(json!({"date": "2025-06-12"})).await.unwrap();
        let activities = result.as_array().unwrap();
        assert_eq!(activities.len(), 3);
        assert!(activities
            .iter()
            .all(|activity| activity["start_time"].as_str().unwrap().starts_with("2025-06-12")));
    }

    #[tokio::test]
    async fn test_unknown_city_is_empty_list() {
        let result = tool()
            .execute(json!({"date": "2025-06-12", "city": "Gotham"}))
            .await
            .unwrap();
        assert_eq!(result, json!([]));
    }

    #[tokio::test]
    async fn test_missing_date_is_an_error() {
        assert!(tool().execute(json!({"city": "AgentsVille"})).await.is_err());
    }
}
