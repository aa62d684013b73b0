use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

/// Country label used when the geocoder omits one.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Hours per day in the hourly series.
pub const HOURS_PER_DAY: usize = 24;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// "Name, Country" as shown in the header.
    pub fn label(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub apparent_temperature_c: f64,
    pub weather_code: i32,
    /// Local time of the observation, if the provider reported one.
    pub observed_at: Option<NaiveDateTime>,
}

/// Parallel hourly sequences. Index `i` of every sequence is the same hour.
///
/// Individual readings may be missing (`None`) when the provider reports
/// `null` for an hour.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HourlySeries {
    times: Vec<NaiveDateTime>,
    temperatures_c: Vec<Option<f64>>,
    weather_codes: Vec<Option<i32>>,
}

impl HourlySeries {
    /// Series where every hour has both readings.
    pub fn new(
        times: Vec<NaiveDateTime>,
        temperatures_c: Vec<f64>,
        weather_codes: Vec<i32>,
    ) -> Result<Self, DashboardError> {
        Self::with_gaps(
            times,
            temperatures_c.into_iter().map(Some).collect(),
            weather_codes.into_iter().map(Some).collect(),
        )
    }

    pub fn with_gaps(
        times: Vec<NaiveDateTime>,
        temperatures_c: Vec<Option<f64>>,
        weather_codes: Vec<Option<i32>>,
    ) -> Result<Self, DashboardError> {
        if times.len() != temperatures_c.len() || times.len() != weather_codes.len() {
            return Err(DashboardError::malformed(format!(
                "hourly series lengths differ (time: {}, temperature_2m: {}, weathercode: {})",
                times.len(),
                temperatures_c.len(),
                weather_codes.len(),
            )));
        }

        Ok(Self { times, temperatures_c, weather_codes })
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    pub fn temperatures_c(&self) -> &[Option<f64>] {
        &self.temperatures_c
    }

    pub fn weather_codes(&self) -> &[Option<i32>] {
        &self.weather_codes
    }

    /// Number of whole or partial days covered.
    pub fn day_count(&self) -> usize {
        self.len().div_ceil(HOURS_PER_DAY)
    }
}

/// What the forecast endpoint yields for one pair of coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub current: CurrentConditions,
    pub hourly: HourlySeries,
    /// IANA zone resolved by the provider, e.g. "Asia/Tokyo".
    pub timezone: Option<String>,
}

/// Everything the renderer needs for one displayed city.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherViewModel {
    pub location: Location,
    pub current: CurrentConditions,
    pub hourly: HourlySeries,
    pub timezone: Option<String>,
}
