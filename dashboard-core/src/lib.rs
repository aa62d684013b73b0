//! Core library for the weather dashboard.
//!
//! This crate defines:
//! - Configuration handling
//! - The Open-Meteo geocoding and forecast client, behind provider traits
//! - Weather-code and time-of-day classification
//! - View-model assembly and the session that drives a renderer
//!
//! It is used by `dashboard-cli`, but any other front-end can implement
//! [`Renderer`] and reuse the same [`Session`].

pub mod condition;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod session;
pub mod time_of_day;
pub mod view;

pub use condition::{AmbientColor, Condition, ConditionClassification, Icon, classify};
pub use config::Config;
pub use error::DashboardError;
pub use model::{CurrentConditions, Forecast, HourlySeries, Location, WeatherViewModel};
pub use provider::{ForecastSource, Geocoder, open_meteo::OpenMeteoClient};
pub use session::{LoadOutcome, Renderer, Session};
pub use time_of_day::TimeOfDay;
pub use view::{DaySummary, HourSlot, SampleOrDefault};
