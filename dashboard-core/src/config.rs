use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

pub const DEFAULT_CITY: &str = "Tokyo";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Longest forecast window Open-Meteo serves.
pub const MAX_FORECAST_DAYS: u8 = 16;

/// Settings stored on disk. Every field is optional in the file.
///
/// Example TOML:
/// default_city = "Lisbon"
/// language = "en"
/// forecast_days = 7
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// City shown at start-up and replayed by `retry` until another is searched.
    pub default_city: String,
    /// Language for geocoder place names.
    pub language: String,
    pub geocoding_url: String,
    pub forecast_url: String,
    /// Sent as `forecast_days` when set; the provider default applies otherwise.
    pub forecast_days: Option<u8>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_city: DEFAULT_CITY.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
            forecast_days: None,
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg = Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.validate()?;
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-dashboard", "weather-dashboard")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_city.trim().is_empty() {
            bail!("default_city must not be blank");
        }
        if self.language.trim().is_empty() {
            bail!("language must not be blank");
        }
        for (field, url) in [("geocoding_url", &self.geocoding_url), ("forecast_url", &self.forecast_url)] {
            reqwest::Url::parse(url).with_context(|| format!("{field} is not a valid URL: {url}"))?;
        }
        if let Some(days) = self.forecast_days
            && !(1..=MAX_FORECAST_DAYS).contains(&days)
        {
            bail!("forecast_days must be between 1 and {MAX_FORECAST_DAYS}, got {days}");
        }
        Ok(())
    }
}
