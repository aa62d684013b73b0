use async_trait::async_trait;
use chrono::{NaiveDateTime, Timelike};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use crate::{
    Config,
    error::DashboardError,
    model::{CurrentConditions, Forecast, HourlySeries, Location, UNKNOWN_COUNTRY},
};

use super::{ForecastSource, Geocoder};

const HOURLY_FIELDS: &str = "temperature_2m,apparent_temperature,weathercode";

/// Client for the Open-Meteo geocoding and forecast endpoints.
///
/// No API key, no caching: each call is one fresh GET without retries or
/// timeout.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: Client,
    geocoding_url: String,
    forecast_url: String,
    language: String,
    forecast_days: Option<u8>,
}

impl Default for OpenMeteoClient {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl OpenMeteoClient {
    pub fn from_config(config: &Config) -> Self {
        Self {
            http: Client::new(),
            geocoding_url: config.geocoding_url.clone(),
            forecast_url: config.forecast_url.clone(),
            language: config.language.clone(),
            forecast_days: config.forecast_days,
        }
    }

    /// Search URL asking for the top match only.
    pub fn geocoding_request_url(&self, city: &str) -> Result<Url, DashboardError> {
        Url::parse_with_params(
            &self.geocoding_url,
            &[("name", city), ("count", "1"), ("language", self.language.as_str())],
        )
        .map_err(|e| DashboardError::transport(format!("Invalid geocoding URL: {e}")))
    }

    /// Forecast URL with current weather, the hourly fields and automatic timezone.
    pub fn forecast_request_url(&self, latitude: f64, longitude: f64) -> Result<Url, DashboardError> {
        let mut params = vec![
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("current_weather", "true".to_string()),
            ("hourly", HOURLY_FIELDS.to_string()),
            ("timezone", "auto".to_string()),
        ];
        if let Some(days) = self.forecast_days {
            params.push(("forecast_days", days.to_string()));
        }

        Url::parse_with_params(&self.forecast_url, &params)
            .map_err(|e| DashboardError::transport(format!("Invalid forecast URL: {e}")))
    }

    async fn get_text(&self, url: Url, what: &str) -> Result<(StatusCode, String), DashboardError> {
        debug!(%url, "sending {what} request");

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| DashboardError::transport(format!("Failed to send {what} request: {e}")))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            DashboardError::transport(format!("Failed to read {what} response body: {e}"))
        })?;

        Ok((status, body))
    }
}

#[async_trait]
impl Geocoder for OpenMeteoClient {
    async fn resolve(&self, city: &str) -> Result<Location, DashboardError> {
        let url = self.geocoding_request_url(city)?;
        let (status, body) = self.get_text(url, "geocoding").await?;
        interpret_geocoding(city, status, &body)
    }
}

#[async_trait]
impl ForecastSource for OpenMeteoClient {
    async fn fetch(&self, latitude: f64, longitude: f64) -> Result<Forecast, DashboardError> {
        let url = self.forecast_request_url(latitude, longitude)?;
        let (status, body) = self.get_text(url, "forecast").await?;
        interpret_forecast(status, &body)
    }
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    #[serde(default)]
    results: Option<Vec<GeoResult>>,
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    name: String,
    country: Option<String>,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct RawForecast {
    timezone: Option<String>,
    current_weather: Option<RawCurrent>,
    hourly: Option<RawHourly>,
}

#[derive(Debug, Deserialize)]
struct RawCurrent {
    time: Option<String>,
    temperature: Option<f64>,
    apparent_temperature: Option<f64>,
    weathercode: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct RawHourly {
    time: Option<Vec<String>>,
    temperature_2m: Option<Vec<Option<f64>>>,
    apparent_temperature: Option<Vec<Option<f64>>>,
    weathercode: Option<Vec<Option<i32>>>,
}

/// Turn a geocoding response into the first matching location.
pub fn interpret_geocoding(
    city: &str,
    status: StatusCode,
    body: &str,
) -> Result<Location, DashboardError> {
    if !status.is_success() {
        debug!(%status, body = %truncate_body(body), "geocoding request failed");
        return Err(DashboardError::GeocodingUnavailable { status });
    }

    let parsed: GeoResponse = serde_json::from_str(body)
        .map_err(|e| DashboardError::malformed(format!("geocoding JSON: {e}")))?;

    let first = parsed
        .results
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| DashboardError::CityNotFound { city: city.to_string() })?;

    Ok(Location {
        name: first.name,
        country: first.country.unwrap_or_else(|| UNKNOWN_COUNTRY.to_string()),
        latitude: first.latitude,
        longitude: first.longitude,
    })
}

/// Turn a forecast response into current conditions and the hourly series.
pub fn interpret_forecast(status: StatusCode, body: &str) -> Result<Forecast, DashboardError> {
    if !status.is_success() {
        debug!(%status, body = %truncate_body(body), "forecast request failed");
        return Err(DashboardError::ForecastUnavailable { status });
    }

    let parsed: RawForecast = serde_json::from_str(body)
        .map_err(|e| DashboardError::malformed(format!("forecast JSON: {e}")))?;

    let current = parsed.current_weather.ok_or_else(|| missing("current_weather"))?;
    let hourly = parsed.hourly.ok_or_else(|| missing("hourly"))?;

    let times = hourly
        .time
        .ok_or_else(|| missing("hourly.time"))?
        .iter()
        .map(|t| parse_local_time(t.as_str()))
        .collect::<Result<Vec<_>, _>>()?;
    let temperatures = hourly.temperature_2m.ok_or_else(|| missing("hourly.temperature_2m"))?;
    let codes = hourly.weathercode.ok_or_else(|| missing("hourly.weathercode"))?;

    let temperature_c = current.temperature.ok_or_else(|| missing("current_weather.temperature"))?;
    let weather_code = current.weathercode.ok_or_else(|| missing("current_weather.weathercode"))?;
    let observed_at = current.time.as_deref().map(parse_local_time).transpose()?;

    // current_weather has no apparent temperature; take the hourly value for
    // the observation hour, then fall back to air temperature.
    let apparent_temperature_c = current
        .apparent_temperature
        .or_else(|| {
            let hour = observed_at?.with_minute(0)?.with_second(0)?;
            let index = times.iter().position(|t| *t == hour)?;
            hourly.apparent_temperature.as_ref()?.get(index).copied().flatten()
        })
        .unwrap_or(temperature_c);

    Ok(Forecast {
        current: CurrentConditions {
            temperature_c,
            apparent_temperature_c,
            weather_code,
            observed_at,
        },
        hourly: HourlySeries::with_gaps(times, temperatures, codes)?,
        timezone: parsed.timezone,
    })
}

fn missing(field: &str) -> DashboardError {
    DashboardError::malformed(format!("missing field `{field}`"))
}

fn parse_local_time(value: &str) -> Result<NaiveDateTime, DashboardError> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| DashboardError::malformed(format!("bad timestamp '{value}': {e}")))
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn forecast_body(hours: usize) -> String {
        let times: Vec<String> = (0..hours)
            .map(|h| format!("2025-06-{:02}T{:02}:00", 1 + h / 24, h % 24))
            .collect();
        let temperatures = vec![20.0; hours];
        let apparent: Vec<f64> = (0..hours).map(|h| h as f64).collect();
        let codes = vec![3; hours];
        json!({
            "latitude": 35.7,
            "longitude": 139.625,
            "timezone": "Asia/Tokyo",
            "current_weather": {
                "time": "2025-06-01T10:15",
                "temperature": 22.5,
                "weathercode": 0
            },
            "hourly": {
                "time": times,
                "temperature_2m": temperatures,
                "apparent_temperature": apparent,
                "weathercode": codes
            }
        })
        .to_string()
    }

    #[test]
    fn geocoding_url_requests_top_match_in_english() {
        let client = OpenMeteoClient::default();
        let url = client.geocoding_request_url("São Paulo").unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(url.host_str(), Some("geocoding-api.open-meteo.com"));
        assert_eq!(
            pairs,
            vec![
                ("name".into(), "São Paulo".into()),
                ("count".into(), "1".into()),
                ("language".into(), "en".into()),
            ]
        );
    }

    #[test]
    fn forecast_url_requests_current_hourly_and_auto_timezone() {
        let client = OpenMeteoClient::default();
        let url = client.forecast_request_url(35.68, 139.65).unwrap();
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let get = |k: &str| query.iter().find(|(key, _)| key == k).map(|(_, v)| v.as_str());

        assert_eq!(get("latitude"), Some("35.68"));
        assert_eq!(get("longitude"), Some("139.65"));
        assert_eq!(get("current_weather"), Some("true"));
        assert_eq!(get("hourly"), Some(HOURLY_FIELDS));
        assert_eq!(get("timezone"), Some("auto"));
        assert_eq!(get("forecast_days"), None);
    }

    #[test]
    fn forecast_url_includes_configured_days() {
        let cfg = Config { forecast_days: Some(5), ..Config::default() };
        let url = OpenMeteoClient::from_config(&cfg).forecast_request_url(0.0, 0.0).unwrap();
        assert!(url.query_pairs().any(|(k, v)| k == "forecast_days" && v == "5"));
    }

    #[test]
    fn geocoding_takes_first_result() {
        let body = json!({
            "results": [
                {"name": "Tokyo", "country": "Japan", "latitude": 35.68, "longitude": 139.65},
                {"name": "Tokyo", "country": "Papua New Guinea", "latitude": -8.4, "longitude": 143.3}
            ]
        })
        .to_string();

        let loc = interpret_geocoding("Tokyo", StatusCode::OK, &body).unwrap();
        assert_eq!(loc.name, "Tokyo");
        assert_eq!(loc.country, "Japan");
        assert_eq!(loc.latitude, 35.68);
        assert_eq!(loc.longitude, 139.65);
    }

    #[test]
    fn geocoding_defaults_missing_country() {
        let body = r#"{"results":[{"name":"Atlantis","latitude":1.0,"longitude":2.0}]}"#;
        let loc = interpret_geocoding("Atlantis", StatusCode::OK, body).unwrap();
        assert_eq!(loc.country, UNKNOWN_COUNTRY);
    }

    #[test]
    fn geocoding_without_results_is_city_not_found() {
        for body in ["{}", r#"{"results":[]}"#, r#"{"generationtime_ms":0.5}"#] {
            let err = interpret_geocoding("Zzqx123", StatusCode::OK, body).unwrap_err();
            assert_eq!(err, DashboardError::CityNotFound { city: "Zzqx123".into() });
        }
    }

    #[test]
    fn geocoding_non_success_is_unavailable() {
        let err = interpret_geocoding("Tokyo", StatusCode::BAD_GATEWAY, "oops").unwrap_err();
        assert_eq!(err, DashboardError::GeocodingUnavailable { status: StatusCode::BAD_GATEWAY });
    }

    #[test]
    fn forecast_parses_current_and_hourly() {
        let forecast = interpret_forecast(StatusCode::OK, &forecast_body(120)).unwrap();

        assert_eq!(forecast.current.temperature_c, 22.5);
        assert_eq!(forecast.current.weather_code, 0);
        assert_eq!(
            forecast.current.observed_at,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(10, 15, 0)
        );
        assert_eq!(forecast.hourly.len(), 120);
        assert_eq!(forecast.hourly.weather_codes()[0], Some(3));
        assert_eq!(forecast.timezone.as_deref(), Some("Asia/Tokyo"));
    }

    #[test]
    fn apparent_temperature_comes_from_observation_hour() {
        let forecast = interpret_forecast(StatusCode::OK, &forecast_body(48)).unwrap();
        // apparent_temperature series encodes the hour index; observation is 10:15
        assert_eq!(forecast.current.apparent_temperature_c, 10.0);
    }

    #[test]
    fn apparent_temperature_falls_back_to_air_temperature() {
        let body = json!({
            "current_weather": {"temperature": 5.5, "weathercode": 71},
            "hourly": {"time": [], "temperature_2m": [], "weathercode": []}
        })
        .to_string();
        let forecast = interpret_forecast(StatusCode::OK, &body).unwrap();
        assert_eq!(forecast.current.apparent_temperature_c, 5.5);
        assert!(forecast.hourly.is_empty());
    }

    #[test]
    fn explicit_apparent_temperature_wins() {
        let body = json!({
            "current_weather": {"temperature": 5.5, "apparent_temperature": 1.0, "weathercode": 0},
            "hourly": {"time": [], "temperature_2m": [], "weathercode": []}
        })
        .to_string();
        let forecast = interpret_forecast(StatusCode::OK, &body).unwrap();
        assert_eq!(forecast.current.apparent_temperature_c, 1.0);
    }

    #[test]
    fn forecast_server_error_carries_status() {
        let err = interpret_forecast(StatusCode::INTERNAL_SERVER_ERROR, "boom").unwrap_err();
        assert_eq!(
            err,
            DashboardError::ForecastUnavailable { status: StatusCode::INTERNAL_SERVER_ERROR }
        );
        assert_eq!(err.status().map(|s| s.as_u16()), Some(500));
    }

    #[test]
    fn forecast_missing_fields_is_malformed() {
        let cases = [
            r#"{"hourly":{"time":[],"temperature_2m":[],"weathercode":[]}}"#,
            r#"{"current_weather":{"temperature":1.0,"weathercode":0}}"#,
            r#"{"current_weather":{"weathercode":0},"hourly":{"time":[],"temperature_2m":[],"weathercode":[]}}"#,
            r#"{"current_weather":{"temperature":1.0,"weathercode":0},"hourly":{"time":[],"weathercode":[]}}"#,
            "not json",
        ];
        for body in cases {
            let err = interpret_forecast(StatusCode::OK, body).unwrap_err();
            assert!(matches!(err, DashboardError::MalformedResponse { .. }), "{body}: {err:?}");
        }
    }

    #[test]
    fn null_hourly_readings_are_kept_as_gaps() {
        let body = json!({
            "current_weather": {"temperature": 1.0, "weathercode": 0},
            "hourly": {
                "time": ["2025-06-01T00:00", "2025-06-01T01:00"],
                "temperature_2m": [1.0, null],
                "weathercode": [0, null]
            }
        })
        .to_string();

        let forecast = interpret_forecast(StatusCode::OK, &body).unwrap();
        assert_eq!(forecast.hourly.len(), 2);
        assert_eq!(forecast.hourly.temperatures_c(), &[Some(1.0), None]);
        assert_eq!(forecast.hourly.weather_codes(), &[Some(0), None]);
    }

    #[test]
    fn forecast_with_bad_timestamp_is_malformed() {
        let body = json!({
            "current_weather": {"temperature": 1.0, "weathercode": 0},
            "hourly": {"time": ["yesterday"], "temperature_2m": [1.0], "weathercode": [0]}
        })
        .to_string();
        let err = interpret_forecast(StatusCode::OK, &body).unwrap_err();
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        assert_eq!(truncate_body(&long).chars().count(), 200);
        assert_eq!(truncate_body("short"), "short");
    }
}
