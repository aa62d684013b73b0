//! Line-oriented terminal implementation of [`Renderer`].

use std::{
    io::{self, Write},
    sync::{Mutex, MutexGuard, PoisonError},
};

use chrono::{Days, Local, NaiveDate, NaiveDateTime};
use dashboard_core::{
    AmbientColor, DaySummary, HourSlot, Renderer, TimeOfDay, WeatherViewModel,
};

pub struct TerminalRenderer<W> {
    out: Mutex<W>,
    time_of_day: Mutex<Option<TimeOfDay>>,
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out), time_of_day: Mutex::new(None) }
    }

    /// Label last pushed by the time-of-day refresh, for the prompt.
    pub fn time_label(&self) -> Option<String> {
        let part = *self.time_of_day.lock().unwrap_or_else(PoisonError::into_inner);
        part.map(|part| part.to_string())
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, text: &str) {
        let mut out = self.out();
        // A closed stdout is not worth failing the session over.
        let _ = writeln!(out, "{text}").and_then(|_| out.flush());
    }

    fn out(&self) -> MutexGuard<'_, W> {
        self.out.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> Renderer for TerminalRenderer<W> {
    fn show_loading(&self) {
        self.write("Loading weather data...");
    }

    // Output is line-oriented; the loading line simply scrolls away.
    fn hide_loading(&self) {}

    fn show_error(&self, message: &str) {
        self.write(&format!("\u{2716} {message}"));
    }

    fn render(&self, view: &WeatherViewModel) {
        let now = Local::now();
        let mut text = format_current(view, now.naive_local(), self.time_label());
        text.push('\n');
        text.push_str(&format_daily_strip(&view.daily_summary(), now.date_naive()));
        self.write(&text);
    }

    fn fill_background(&self, color: AmbientColor) {
        self.write(&format_background(color));
    }

    fn render_hourly(&self, day: usize, slots: &[HourSlot]) {
        self.write(&format_hourly(day, slots));
    }

    fn render_time_of_day(&self, part: TimeOfDay) {
        *self.time_of_day.lock().unwrap_or_else(PoisonError::into_inner) = Some(part);
    }
}

/// Round for display, halves toward positive infinity (-2.5 shows as -2).
/// Goes through i64 so -0.2 shows as 0, not -0.
pub fn round_temp(t: f64) -> i64 {
    (t + 0.5).floor() as i64
}

pub fn format_current(view: &WeatherViewModel, now: NaiveDateTime, time_label: Option<String>) -> String {
    let class = view.current_classification();
    let stamp = view.current.observed_at.unwrap_or(now).format("%a %b %-d %Y %H:%M");

    let mut header = view.location.label();
    if let Some(label) = time_label {
        header.push_str(&format!("  \u{00B7}  {label}"));
    }

    let zone = view.timezone.as_deref().map(|tz| format!(" ({tz})")).unwrap_or_default();

    format!(
        "{header}\n{stamp}{zone}\n{icon}  {desc}  {temp}\u{00B0}C (feels like {feels}\u{00B0}C)\n",
        icon = class.icon.emoji(),
        desc = class.description,
        temp = round_temp(view.current.temperature_c),
        feels = round_temp(view.current.apparent_temperature_c),
    )
}

pub fn format_daily_strip(days: &[DaySummary], today: NaiveDate) -> String {
    let mut text = String::from("5-day forecast (`day N` for hourly detail)\n");
    for day in days {
        let date = day
            .date
            .or_else(|| today.checked_add_days(Days::new(day.day_index as u64)))
            .map(|d| d.format("%a, %b %-d").to_string())
            .unwrap_or_default();
        text.push_str(&format!(
            " [{n}] {date:<12} {icon}  {temp:>3}\u{00B0}C  {desc}\n",
            n = day.day_index + 1,
            icon = day.classification.icon.emoji(),
            temp = round_temp(day.temperature_c),
            desc = day.classification.description,
        ));
    }
    text
}

pub fn format_hourly(day: usize, slots: &[HourSlot]) -> String {
    if slots.is_empty() {
        return format!("No hourly data for day {}.", day + 1);
    }

    let mut text = format!("Hourly forecast, day {}\n", day + 1);
    for slot in slots {
        text.push_str(&format!(
            " {time}  {temp:>3}\u{00B0}C  {icon}\n",
            time = slot.time.format("%H:00"),
            temp = round_temp(slot.temperature_c),
            icon = slot.classification.icon.emoji(),
        ));
    }
    text
}

/// A strip painted in the ambient colour, using 24-bit ANSI background.
pub fn format_background(color: AmbientColor) -> String {
    let (r, g, b) = color.rgb();
    format!("\x1b[48;2;{r};{g};{b}m{:40}\x1b[0m {}", "", color.hex())
}
