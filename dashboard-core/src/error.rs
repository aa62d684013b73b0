use reqwest::StatusCode;
use thiserror::Error;

/// Every way a single load attempt can fail.
///
/// All variants are terminal for the attempt; nothing is retried
/// automatically. `Display` is the message shown to the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DashboardError {
    #[error("{message}")]
    Validation { message: String },

    #[error("City not found: {city}")]
    CityNotFound { city: String },

    #[error("Failed to fetch coordinates (status {status})")]
    GeocodingUnavailable { status: StatusCode },

    #[error("Weather API error: {}", .status.as_u16())]
    ForecastUnavailable { status: StatusCode },

    #[error("Unexpected response from weather service: {message}")]
    MalformedResponse { message: String },

    #[error("Network error: {message}")]
    Transport { message: String },
}

impl DashboardError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedResponse { message: message.into() }
    }

    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport { message: message.into() }
    }

    /// Text for the error overlay.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// HTTP status carried by the upstream-unavailable variants.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::GeocodingUnavailable { status } | Self::ForecastUnavailable { status } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        Self::transport(err.to_string())
    }
}
