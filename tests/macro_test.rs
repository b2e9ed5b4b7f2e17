use itinerary_agent::tools::Tool;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize, JsonSchema)]
struct SplitParams {
    /// Total cost to share
    total_cost: i64,
    /// Number of travelers sharing it
    travelers: u32,
    #[serde(default)]
    currency: Option<String>,
}

itinerary_agent::tool!(
    name = "cost_split_tool",
    description = "Splits a total cost evenly between travelers",
    params = SplitParams,
    |params: SplitParams| async move {
        if params.travelers == 0 {
            return Err("cannot split a cost between zero travelers".to_string());
        }
        Ok(json!({
            "per_traveler": params.total_cost as f64 / params.travelers as f64,
            "currency": params.currency
        }))
    }
);

#[tokio::test]
async fn test_macro_generated_tool() {
    let tool = CostSplitTool;

    assert_eq!(tool.name(), "cost_split_tool");
    assert_eq!(tool.description(), "Splits a total cost evenly between travelers");
    assert!(tool.parameters_schema().is_object());

    let result = tool
        .execute(json!({"total_cost": 130, "travelers": 2, "currency": "AVC"}))
        .await
        .unwrap();
    assert_eq!(result["per_traveler"], 65.0);
    assert_eq!(result["currency"], "AVC");
}

#[tokio::test]
async fn test_macro_tool_optional_params() {
    let result = CostSplitTool
        .execute(json!({"total_cost": 90, "travelers": 3}))
        .await
        .unwrap();
    assert_eq!(result["per_traveler"], 30.0);
    assert!(result["currency"].is_null());
}

#[tokio::test]
async fn test_macro_tool_invalid_params() {
    let err = CostSplitTool
        .execute(json!({"total_cost": "lots", "travelers": 2}))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "TOOL_EXECUTION_ERROR");
    assert!(err.to_string().contains("total_cost"));
}

#[tokio::test]
async fn test_handler_error_becomes_tool_error() {
    let err = CostSplitTool
        .execute(json!({"total_cost": 10, "travelers": 0}))
        .await
        .unwrap_err();
    assert_eq!(
        err.observation_message(),
        "cannot split a cost between zero travelers"
    );
}
