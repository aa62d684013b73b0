use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config,
    error::DashboardError,
    model::{Forecast, Location},
    provider::open_meteo::OpenMeteoClient,
};

pub mod open_meteo;

/// Resolves a free-text place name to its best single match.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// `city` is expected to be trimmed and non-blank.
    async fn resolve(&self, city: &str) -> Result<Location, DashboardError>;
}

/// Current conditions plus the hourly series for a pair of coordinates.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn fetch(&self, latitude: f64, longitude: f64) -> Result<Forecast, DashboardError>;
}

/// Construct the Open-Meteo client from config, as both collaborators.
pub fn providers_from_config(
    config: &Config,
) -> anyhow::Result<(Box<dyn Geocoder>, Box<dyn ForecastSource>)> {
    config.validate()?;
    let client = OpenMeteoClient::from_config(config);
    Ok((Box::new(client.clone()), Box::new(client)))
}
