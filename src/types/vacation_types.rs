use crate::{
    completion_schema,
    error::{AgentError, Result},
};
use chrono::{NaiveDate, NaiveDateTime};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Interest tags shared by travelers and activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Interest {
    Art,
    Cooking,
    Comedy,
    Dancing,
    Fitness,
    Gardening,
    Hiking,
    Movies,
    Music,
    Photography,
    Reading,
    Sports,
    Technology,
    Theatre,
    Tennis,
    Writing,
}

impl fmt::Display for Interest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = serde_json::to_value(self)
            .ok()
            .and_then(|value| value.as_str().map(str::to_owned))
            .unwrap_or_default();
        f.write_str(&label)
    }
}

/// A traveler with a name, age, and interests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Traveler {
    pub name: String,
    pub age: u32,
    pub interests: Vec<Interest>,
}

/// Vacation requirements submitted by the travelers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VacationInfo {
    /// Travelers in the group
    pub travelers: Vec<Traveler>,
    /// The vacation destination
    pub destination: String,
    /// The date of arrival
    pub date_of_arrival: NaiveDate,
    /// The date of departure
    pub date_of_departure: NaiveDate,
    /// Budget for the whole trip in fictional currency units
    pub budget: i64,
}

impl VacationInfo {
    /// Check the invariants a vacation request must satisfy before planning.
    pub fn validate(&self) -> Result<()> {
        if self.travelers.is_empty() {
            return Err(AgentError::Validation(
                "vacation info must list at least one traveler".to_string(),
            ));
        }
        if self.budget <= 0 {
            return Err(AgentError::Validation(format!(
                "budget must be positive, got {}",
                self.budget
            )));
        }
        if self.date_of_arrival > self.date_of_departure {
            return Err(AgentError::Validation(format!(
                "date of arrival {} is after date of departure {}",
                self.date_of_arrival, self.date_of_departure
            )));
        }
        Ok(())
    }

    /// Every calendar day of the trip, arrival and departure included.
    pub fn trip_dates(&self) -> Vec<NaiveDate> {
        self.date_of_arrival
            .iter_days()
            .take_while(|day| *day <= self.date_of_departure)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum TemperatureUnit {
    Celsius,
    #[serde(alias = "Farenheit")]
    Fahrenheit,
}

/// Weather snapshot for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Weather {
    pub temperature: f64,
    pub temperature_unit: TemperatureUnit,
    pub condition: String,
}

/// A bookable activity from the activity calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Activity {
    pub activity_id: String,
    pub name: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub location: String,
    pub description: String,
    #[schemars(range(min = 1))]
    pub price: i64,
    pub related_interests: Vec<Interest>,
}

impl Activity {
    pub fn shares_interest_with(&self, interests: &[Interest]) -> bool {
        self.related_interests
            .iter()
            .any(|interest| interests.contains(interest))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ActivityRecommendation {
    pub activity: Activity,
    pub reasons_for_recommendation: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ItineraryDay {
    pub date: NaiveDate,
    pub weather: Weather,
    pub activity_recommendations: Vec<ActivityRecommendation>,
}

/// Day-by-day travel plan produced by the planner and revised by the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[completion_schema]
pub struct TravelPlan {
    /// City the itinerary takes place in
    pub city: String,
    /// First day of the itinerary (ISO-8601 date)
    pub start_date: NaiveDate,
    /// Last day of the itinerary (ISO-8601 date)
    pub end_date: NaiveDate,
    /// Stated total cost: the sum of all scheduled activity prices
    pub total_cost: i64,
    /// One entry per day from start_date to end_date
    pub itinerary_days: Vec<ItineraryDay>,
}

impl TravelPlan {
    /// All scheduled activities in itinerary order.
    pub fn activities(&self) -> impl Iterator<Item = &Activity> {
        self.itinerary_days.iter().flat_map(|day| {
            day.activity_recommendations
                .iter()
                .map(|recommendation| &recommendation.activity)
        })
    }

    /// Sum of the prices of every scheduled activity, `None` on overflow.
    pub fn scheduled_cost(&self) -> Option<i64> {
        self.activities()
            .try_fold(0i64, |total, activity| total.checked_add(activity.price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CompletionSchema;
    use serde_json::json;

    fn traveler(name: &str, interests: Vec<Interest>) -> Traveler {
        Traveler {
            name: name.to_string(),
            age: 30,
            interests,
        }
    }

    fn vacation() -> VacationInfo {
        VacationInfo {
            travelers: vec![traveler("Yuri", vec![Interest::Tennis])],
            destination: "AgentsVille".to_string(),
            date_of_arrival: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            date_of_departure: NaiveDate::from_ymd_opt(2025, 6, 12).unwrap(),
            budget: 130,
        }
    }

    #[test]
    fn test_vacation_validation() {
        assert!(vacation().validate().is_ok());

        let mut no_travelers = vacation();
        no_travelers.travelers.clear();
        assert!(no_travelers.validate().is_err());

        let mut zero_budget = vacation();
        zero_budget.budget = 0;
        assert!(zero_budget.validate().is_err());

        let mut reversed = vacation();
        reversed.date_of_departure = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
        assert!(reversed.validate().is_err());
    }

    #[test]
    fn test_trip_dates_are_inclusive() {
        let dates = vacation().trip_dates();
        assert_eq!(dates.len(), 3);
        assert_eq!(dates[0].to_string(), "2025-06-10");
        assert_eq!(dates[2].to_string(), "2025-06-12");
    }

    #[test]
    fn test_interest_serializes_lowercase() {
        assert_eq!(json!(Interest::Photography), json!("photography"));
        assert_eq!(Interest::Theatre.to_string(), "theatre");
    }

    #[test]
    fn test_misspelled_fahrenheit_is_accepted() {
        let weather: Weather = serde_json::from_value(json!({
            "temperature": 70.0,
            "temperature_unit": "Farenheit",
            "condition": "sunny"
        }))
        .unwrap();
        assert_eq!(weather.temperature_unit, TemperatureUnit::Fahrenheit);
    }

    #[test]
    fn test_travel_plan_schema_requires_total_cost() {
        let schema = TravelPlan::schema();
        assert_eq!(schema.schema_name(), "TravelPlan");
        let required = schema.schema_json()["required"].as_array().unwrap();
        assert!(required.iter().any(|field| field == "total_cost"));
        assert!(schema.schema_json()["definitions"]["ItineraryDay"].is_object());
    }
}
