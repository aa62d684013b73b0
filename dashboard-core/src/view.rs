//! Assembly of the display-ready view model and the per-day derivations
//! the renderer asks for.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::{
    condition::{ConditionClassification, classify},
    model::{Forecast, HOURS_PER_DAY, HourlySeries, Location, WeatherViewModel},
};

/// Number of cards in the daily forecast strip.
pub const SUMMARY_DAYS: usize = 5;

/// Merge a resolved location with its forecast. No I/O happens here.
pub fn build(location: Location, forecast: Forecast) -> WeatherViewModel {
    WeatherViewModel {
        location,
        current: forecast.current,
        hourly: forecast.hourly,
        timezone: forecast.timezone,
    }
}

/// One hour's reading taken from the hourly series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlySample {
    pub temperature_c: f64,
    pub weather_code: i32,
}

impl HourlySample {
    /// Stand-in for a reading the provider did not return.
    pub const DEFAULT: HourlySample = HourlySample { temperature_c: 0.0, weather_code: 0 };
}

/// Result of reading an hour that may be missing from the series, either
/// because the series is too short or because the provider sent `null`.
///
/// Each missing reading degrades to its [`HourlySample::DEFAULT`] value
/// instead of failing the render; readings that are present are kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleOrDefault {
    Sampled(HourlySample),
    Defaulted(HourlySample),
}

impl SampleOrDefault {
    pub fn at(series: &HourlySeries, index: usize) -> Self {
        let temperature_c = series.temperatures_c().get(index).copied().flatten();
        let weather_code = series.weather_codes().get(index).copied().flatten();

        match (temperature_c, weather_code) {
            (Some(temperature_c), Some(weather_code)) => {
                SampleOrDefault::Sampled(HourlySample { temperature_c, weather_code })
            }
            (temperature_c, weather_code) => SampleOrDefault::Defaulted(HourlySample {
                temperature_c: temperature_c.unwrap_or(HourlySample::DEFAULT.temperature_c),
                weather_code: weather_code.unwrap_or(HourlySample::DEFAULT.weather_code),
            }),
        }
    }

    pub fn value(self) -> HourlySample {
        match self {
            SampleOrDefault::Sampled(sample) | SampleOrDefault::Defaulted(sample) => sample,
        }
    }

    pub fn is_defaulted(self) -> bool {
        matches!(self, SampleOrDefault::Defaulted(_))
    }
}

/// One card of the daily strip.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySummary {
    pub day_index: usize,
    /// Index into the hourly series the card was sampled from.
    pub hour_index: usize,
    /// Date of the sampled hour; `None` when it lies past the end of the series.
    pub date: Option<NaiveDate>,
    pub temperature_c: f64,
    pub weather_code: i32,
    pub defaulted: bool,
    pub classification: ConditionClassification,
}

/// One cell of the hourly detail strip.
#[derive(Debug, Clone, PartialEq)]
pub struct HourSlot {
    pub index: usize,
    pub time: NaiveDateTime,
    pub temperature_c: f64,
    pub weather_code: i32,
    /// At least one reading for this hour was `null` and got defaulted.
    pub defaulted: bool,
    pub classification: ConditionClassification,
}

impl WeatherViewModel {
    pub fn current_classification(&self) -> ConditionClassification {
        classify(self.current.weather_code)
    }

    /// One reading per day at hour 0 of each day: indices 0, 24, 48, 72, 96.
    pub fn daily_summary(&self) -> Vec<DaySummary> {
        let summary: Vec<DaySummary> = (0..SUMMARY_DAYS)
            .map(|day_index| {
                let hour_index = day_index * HOURS_PER_DAY;
                let sample = SampleOrDefault::at(&self.hourly, hour_index);
                let value = sample.value();

                DaySummary {
                    day_index,
                    hour_index,
                    date: self.hourly.times().get(hour_index).map(NaiveDateTime::date),
                    temperature_c: value.temperature_c,
                    weather_code: value.weather_code,
                    defaulted: sample.is_defaulted(),
                    classification: classify(value.weather_code),
                }
            })
            .collect();

        let defaulted = summary.iter().filter(|d| d.defaulted).count();
        if defaulted > 0 {
            warn!(
                hours = self.hourly.len(),
                defaulted, "hourly series short or incomplete for daily summary, using defaults"
            );
        }

        summary
    }

    /// Hours `[day*24, day*24+24)` of the series, clipped to its end.
    /// A day that starts past the end yields an empty strip. Hours with
    /// `null` readings get the same defaults as the daily summary.
    pub fn hourly_for_day(&self, day: usize) -> Vec<HourSlot> {
        let len = self.hourly.len();
        let Some(start) = day.checked_mul(HOURS_PER_DAY).filter(|&s| s < len) else {
            return Vec::new();
        };
        let end = (start + HOURS_PER_DAY).min(len);

        (start..end)
            .map(|index| {
                let sample = SampleOrDefault::at(&self.hourly, index);
                let value = sample.value();
                HourSlot {
                    index,
                    time: self.hourly.times()[index],
                    temperature_c: value.temperature_c,
                    weather_code: value.weather_code,
                    defaulted: sample.is_defaulted(),
                    classification: classify(value.weather_code),
                }
            })
            .collect()
    }
}
