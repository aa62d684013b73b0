//! Request context for one dashboard: who to ask, where to draw, and what
//! is currently on screen.

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicU64, Ordering},
};

use tracing::{debug, warn};

use crate::{
    Config,
    condition::AmbientColor,
    error::DashboardError,
    model::WeatherViewModel,
    pipeline::{self, validate_city},
    provider::{ForecastSource, Geocoder, providers_from_config},
    time_of_day::TimeOfDay,
    view::HourSlot,
};

/// The display surface the session drives.
pub trait Renderer: Send + Sync {
    fn show_loading(&self);
    fn hide_loading(&self);
    fn show_error(&self, message: &str);
    /// Current conditions and the daily strip.
    fn render(&self, view: &WeatherViewModel);
    fn fill_background(&self, color: AmbientColor);
    fn render_hourly(&self, day: usize, slots: &[HourSlot]);
    fn render_time_of_day(&self, part: TimeOfDay);
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The load finished and is now on screen.
    Displayed(Arc<WeatherViewModel>),
    /// A newer load started meanwhile; this result was dropped.
    Superseded,
}

#[derive(Debug)]
struct SessionState {
    current_city: String,
    view: Option<Arc<WeatherViewModel>>,
}

pub struct Session<R> {
    geocoder: Box<dyn Geocoder>,
    forecast: Box<dyn ForecastSource>,
    renderer: R,
    generation: AtomicU64,
    state: Mutex<SessionState>,
}

impl<R: Renderer> Session<R> {
    pub fn new(
        geocoder: Box<dyn Geocoder>,
        forecast: Box<dyn ForecastSource>,
        renderer: R,
        initial_city: impl Into<String>,
    ) -> Self {
        Self {
            geocoder,
            forecast,
            renderer,
            generation: AtomicU64::new(0),
            state: Mutex::new(SessionState { current_city: initial_city.into(), view: None }),
        }
    }

    /// Session backed by Open-Meteo, starting at the configured default city.
    pub fn from_config(config: &Config, renderer: R) -> anyhow::Result<Self> {
        let (geocoder, forecast) = providers_from_config(config)?;
        Ok(Self::new(geocoder, forecast, renderer, config.default_city.clone()))
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// City that `retry` would load.
    pub fn current_city(&self) -> String {
        self.state().current_city.clone()
    }

    pub fn view(&self) -> Option<Arc<WeatherViewModel>> {
        self.state().view.clone()
    }

    /// Handle a submitted search box.
    pub async fn search(&self, input: &str) -> Result<LoadOutcome, DashboardError> {
        let city = match validate_city(input) {
            Ok(city) => city,
            Err(err) => {
                self.renderer.show_error(&err.user_message());
                return Err(err);
            }
        };

        self.state().current_city = city.to_string();
        self.load(city).await
    }

    /// Reload whatever city was requested last.
    pub async fn retry(&self) -> Result<LoadOutcome, DashboardError> {
        let city = self.current_city();
        self.load(&city).await
    }

    /// Run the whole pipeline for `city` and push the result to the renderer.
    ///
    /// Last request wins: if another load starts before this one finishes,
    /// this one's result is dropped without touching the renderer.
    ///
    /// Renderer callbacks for the result run while the session lock is held,
    /// so a renderer must not call back into the session.
    pub async fn load(&self, city: &str) -> Result<LoadOutcome, DashboardError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.renderer.show_loading();

        let result =
            pipeline::load_view_model(self.geocoder.as_ref(), self.forecast.as_ref(), city).await;

        // The generation check and everything shown for this load happen
        // under the state lock, so a newer load cannot commit in between.
        let mut state = self.state();
        if self.generation.load(Ordering::SeqCst) != generation {
            drop(state);
            warn!(city, generation, "discarding result of superseded load");
            return Ok(LoadOutcome::Superseded);
        }

        match result {
            Ok(view) => {
                let view = Arc::new(view);
                state.view = Some(Arc::clone(&view));

                self.renderer.render(&view);
                self.renderer.fill_background(view.current_classification().ambient_color);
                self.renderer.hide_loading();
                Ok(LoadOutcome::Displayed(view))
            }
            Err(err) => {
                debug!(city, error = %err, "load failed");
                self.renderer.show_error(&err.user_message());
                Err(err)
            }
        }
    }

    /// Show the hourly strip for `day` of what is on screen. Returns the
    /// number of hours shown; nothing happens when no city is displayed.
    pub fn show_hourly_for_day(&self, day: usize) -> Option<usize> {
        let view = self.view()?;
        let slots = view.hourly_for_day(day);
        self.renderer.render_hourly(day, &slots);
        Some(slots.len())
    }

    pub fn refresh_time_of_day(&self, hour: u32) -> TimeOfDay {
        let part = TimeOfDay::from_hour(hour);
        self.renderer.render_time_of_day(part);
        part
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
