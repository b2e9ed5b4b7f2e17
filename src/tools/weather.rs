use super::{
    activities::{date_city_schema, DateCityParams},
    Tool,
};
use crate::{data::TravelDataSource, AgentError};
use serde_json::Value;
use std::{pin::Pin, sync::Arc};

/// Looks up the forecast for a city on a given date
#[derive(Clone)]
pub struct WeatherTool {
    source: Arc<dyn TravelDataSource>,
}

impl WeatherTool {
    pub fn new(source: Arc<dyn TravelDataSource>) -> Self {
        Self { source }
    }
}

impl std::fmt::Debug for WeatherTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherTool").finish_non_exhaustive()
    }
}

impl Tool for WeatherTool {
    fn name(&self) -> &'static str {
        "get_weather_by_date_tool"
    }

    fn description(&self) -> &'static str {
        "Returns the weather forecast for a given date and city. Inputs: date (YYYY-MM-DD) and city (default = 'AgentsVille'). Output: temperature, temperature_unit and condition, or null when no forecast is available."
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

            match self.source.weather_for(&params.date, &params.city) {
                Some(weather) => serde_json::to_value(weather).map_err(|e| {
                    AgentError::ToolExecution(format!("Failed to serialize result: {}", e))
                }),
                None => Ok(Value::Null),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MockTravelData;
    use serde_json::json;

    fn tool() -> WeatherTool {
        WeatherTool::new(Arc::new(MockTravelData::load().unwrap()))
    }

    #[tokio::test]
    async fn test_known_date_returns_forecast() {
        let result = tool().execute(json!({"date": "2025-06-12"})).await.unwrap();
        assert_eq!(result["condition"], "thunderstorm");
        assert_eq!(result["temperature_unit"], "Celsius");
    }

    #[tokio::test]
    async fn test_out_of_range_date_is_null() {
        let result = tool().execute(json!({"date": "2025-07-01"})).await.unwrap();
        assert!(result.is_null());
    }
}
