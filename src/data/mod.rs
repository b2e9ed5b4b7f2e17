//! Mocked activity calendar and weather forecast.
//!
//! Only AgentsVille is covered, from 2025-06-10 to 2025-06-15. Lookups outside
//! that window, for another city or with a malformed date come back empty.

use crate::{
    error::Result,
    vacation_types::{Activity, VacationInfo, Weather},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_CITY: &str = "AgentsVille";

const ACTIVITIES_JSON: &str = include_str!("../../data/activities.json");
const WEATHER_JSON: &str = include_str!("../../data/weather.json");
const DEMO_VACATION_JSON: &str = include_str!("../../data/vacation.json");

/// Feedback used when the caller does not provide any.
pub const DEMO_TRAVELER_FEEDBACK: &str = "I want to have at least two activities per day.";

/// Source of reference activities and forecasts.
pub trait TravelDataSource: Send + Sync {
    /// Activities starting on `date` (YYYY-MM-DD) in `city`.
    fn activities_for(&self, date: &str, city: &str) -> Vec<Activity>;

    fn activity_by_id(&self, activity_id: &str) -> Option<Activity>;

    /// Forecast for `date` (YYYY-MM-DD) in `city`, if known.
    fn weather_for(&self, date: &str, city: &str) -> Option<Weather>;
}

/// Forecast entry as stored in the calendar file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub date: NaiveDate,
    pub city: String,
    #[serde(flatten)]
    pub weather: Weather,
}

/// In-memory travel data backed by the bundled calendar.
#[derive(Debug, Clone)]
pub struct MockTravelData {
    city: String,
    activities: Vec<Activity>,
    forecasts: Vec<WeatherRecord>,
    coverage: Option<(NaiveDate, NaiveDate)>,
}

impl MockTravelData {
    /// Load the bundled AgentsVille calendar.
    pub fn load() -> Result<Self> {
        let activities: Vec<Activity> = serde_json::from_str(ACTIVITIES_JSON)?;
        let forecasts: Vec<WeatherRecord> = serde_json::from_str(WEATHER_JSON)?;
        Ok(Self::new(DEFAULT_CITY, activities, forecasts))
    }

    /// Build a data source from explicit records. The covered date window is
    /// the span of the forecast dates.
    pub fn new(
        city: impl Into<String>,
        activities: Vec<Activity>,
        forecasts: Vec<WeatherRecord>,
    ) -> Self {
        let first = forecasts.iter().map(|record| record.date).min();
        let last = forecasts.iter().map(|record| record.date).max();
        Self {
            city: city.into(),
            activities,
            forecasts,
            coverage: first.zip(last),
        }
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    /// Parse and range-check a date for `city`. `None` means the lookup must
    /// come back empty.
    fn covered_date(&self, date: &str, city: &str) -> Option<NaiveDate> {
        if city != self.city {
            debug!(target: "itinerary::data", city, "city not covered");
            return None;
        }
        let parsed = match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(target: "itinerary::data", date, "invalid date format");
                return None;
            }
        };
        match self.coverage {
            Some((first, last)) if parsed >= first && parsed <= last => Some(parsed),
            _ => {
                warn!(
                    target: "itinerary::data",
                    date,
                    "date is outside the covered range"
                );
                None
            }
        }
    }
}

impl TravelDataSource for MockTravelData {
    fn activities_for(&self, date: &str, city: &str) -> Vec<Activity> {
        let Some(day) = self.covered_date(date, city) else {
            return Vec::new();
        };
        let found: Vec<Activity> = self
            .activities
            .iter()
            .filter(|activity| activity.start_time.date() == day)
            .cloned()
            .collect();
        if found.is_empty() {
            debug!(target: "itinerary::data", date, city, "no activities found");
        }
        found
    }

    fn activity_by_id(&self, activity_id: &str) -> Option<Activity> {
        self.activities
            .iter()
            .find(|activity| activity.activity_id == activity_id)
            .cloned()
    }

    fn weather_for(&self, date: &str, city: &str) -> Option<Weather> {
        let day = self.covered_date(date, city)?;
        self.forecasts
            .iter()
            .find(|record| record.date == day)
            .map(|record| record.weather.clone())
    }
}

/// The bundled demo trip.
pub fn demo_vacation_info() -> Result<VacationInfo> {
    let info: VacationInfo = serde_json::from_str(DEMO_VACATION_JSON)?;
    info.validate()?;
    Ok(info)
}

/// Forecast context for every day of the trip, one JSON object per line.
pub fn weather_context(source: &dyn TravelDataSource, vacation: &VacationInfo) -> String {
    vacation
        .trip_dates()
        .iter()
        .map(|day| {
            let date = day.to_string();
            match source.weather_for(&date, &vacation.destination) {
                Some(weather) => serde_json::json!({
                    "date": date,
                    "temperature": weather.temperature,
                    "temperature_unit": weather.temperature_unit,
                    "condition": weather.condition,
                })
                .to_string(),
                None => serde_json::json!({ "date": date }).to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Every activity available during the trip, one JSON object per line.
pub fn activities_context(source: &dyn TravelDataSource, vacation: &VacationInfo) -> String {
    vacation
        .trip_dates()
        .iter()
        .flat_map(|day| source.activities_for(&day.to_string(), &vacation.destination))
        .filter_map(|activity| serde_json::to_string(&activity).ok())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> MockTravelData {
        MockTravelData::load().unwrap()
    }

    #[test]
    fn test_bundled_calendar_covers_six_days() {
        let data = data();
        for day in 10..=15 {
            let date = format!("2025-06-{}", day);
            assert!(!data.activities_for(&date, DEFAULT_CITY).is_empty());
            assert!(data.weather_for(&date, DEFAULT_CITY).is_some());
        }
    }

    #[test]
    fn test_lookups_outside_coverage_are_empty() {
        let data = data();
        assert!(data.activities_for("2025-06-16", DEFAULT_CITY).is_empty());
        assert!(data.activities_for("2025-06-09", DEFAULT_CITY).is_empty());
        assert!(data.activities_for("June 10th", DEFAULT_CITY).is_empty());
        assert!(data.activities_for("2025-06-10", "Paris").is_empty());
        assert!(data.weather_for("2025-06-16", DEFAULT_CITY).is_none());
        assert!(data.weather_for("2025-06-10", "Paris").is_none());
    }

    #[test]
    fn test_activity_by_id() {
        let data = data();
        let activity = data.activity_by_id("event-2025-06-11-0").unwrap();
        assert_eq!(activity.name, "Laugh Track Live");
        assert!(data.activity_by_id("event-1999-01-01-0").is_none());
    }

    #[test]
    fn test_activity_ids_are_unique() {
        let data = data();
        let mut ids: Vec<&str> = data
            .activities()
            .iter()
            .map(|activity| activity.activity_id.as_str())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), data.activities().len());
    }

    #[test]
    fn test_demo_context_lines() {
        let data = data();
        let vacation = demo_vacation_info().unwrap();
        assert_eq!(weather_context(&data, &vacation).lines().count(), 3);
        assert_eq!(activities_context(&data, &vacation).lines().count(), 9);
    }
}
