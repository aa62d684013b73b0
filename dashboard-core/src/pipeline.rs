use tracing::{debug, info};

use crate::{
    error::DashboardError,
    model::WeatherViewModel,
    provider::{ForecastSource, Geocoder},
    view,
};

/// Message shown when the search box is submitted blank.
pub const BLANK_CITY_MESSAGE: &str = "Please enter a valid city name";

/// Trim user input and reject it if nothing is left.
pub fn validate_city(input: &str) -> Result<&str, DashboardError> {
    let city = input.trim();
    if city.is_empty() {
        return Err(DashboardError::validation(BLANK_CITY_MESSAGE));
    }
    Ok(city)
}

/// City name to view model: geocode, then fetch the forecast for the
/// resolved coordinates, then assemble. The forecast request only starts
/// once the geocoder has answered.
pub async fn load_view_model(
    geocoder: &dyn Geocoder,
    forecast: &dyn ForecastSource,
    city: &str,
) -> Result<WeatherViewModel, DashboardError> {
    let city = validate_city(city)?;

    let location = geocoder.resolve(city).await?;
    debug!(
        city,
        name = %location.name,
        latitude = location.latitude,
        longitude = location.longitude,
        "resolved city"
    );

    let data = forecast.fetch(location.latitude, location.longitude).await?;
    info!(
        location = %location.label(),
        hours = data.hourly.len(),
        weather_code = data.current.weather_code,
        "loaded forecast"
    );

    Ok(view::build(location, data))
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory collaborators shared by the pipeline and session tests.

    use std::{
        collections::HashMap,
        sync::{
            Arc, Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate};
    use tokio::sync::Notify;

    use crate::{
        error::DashboardError,
        model::{CurrentConditions, Forecast, HourlySeries, Location},
        provider::{ForecastSource, Geocoder},
    };

    pub fn tokyo() -> Location {
        Location {
            name: "Tokyo".into(),
            country: "Japan".into(),
            latitude: 35.68,
            longitude: 139.65,
        }
    }

    pub fn forecast(current_code: i32, hours: usize) -> Forecast {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let times = (0..hours).map(|h| start + Duration::hours(h as i64)).collect();
        Forecast {
            current: CurrentConditions {
                temperature_c: 24.6,
                apparent_temperature_c: 26.1,
                weather_code: current_code,
                observed_at: Some(start),
            },
            hourly: HourlySeries::new(times, vec![18.0; hours], vec![current_code; hours])
                .unwrap(),
            timezone: Some("Asia/Tokyo".into()),
        }
    }

    #[derive(Debug, Default)]
    pub struct FakeGeocoder {
        pub places: HashMap<String, Location>,
        pub failure: Option<DashboardError>,
        /// Cities whose lookup waits for this gate before answering.
        pub gated: HashMap<String, Arc<Notify>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeGeocoder {
        pub fn with(places: impl IntoIterator<Item = (&'static str, Location)>) -> Self {
            Self {
                places: places.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn resolve(&self, city: &str) -> Result<Location, DashboardError> {
            self.calls.lock().unwrap().push(city.to_string());
            if let Some(gate) = self.gated.get(city) {
                gate.notified().await;
            }
            if let Some(err) = &self.failure {
                return Err(err.clone());
            }
            self.places
                .get(city)
                .cloned()
                .ok_or_else(|| DashboardError::CityNotFound { city: city.to_string() })
        }
    }

    #[derive(Debug)]
    pub struct FakeForecast {
        pub result: Result<Forecast, DashboardError>,
        pub calls: AtomicUsize,
    }

    impl FakeForecast {
        pub fn new(result: Result<Forecast, DashboardError>) -> Self {
            Self { result, calls: AtomicUsize::new(0) }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ForecastSource for FakeForecast {
        async fn fetch(&self, _latitude: f64, _longitude: f64) -> Result<Forecast, DashboardError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }
}
