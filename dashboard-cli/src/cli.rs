use std::{process::ExitCode, sync::Arc, time::Duration};

use anyhow::Context;
use chrono::{Local, Timelike};
use clap::{Parser, Subcommand};
use dashboard_core::{Config, Session};
use inquire::{InquireError, Text};
use tracing::debug;

use crate::render::TerminalRenderer;

/// How often the time-of-day label is re-evaluated.
const TIME_OF_DAY_REFRESH: Duration = Duration::from_secs(60);

type TerminalSession = Session<TerminalRenderer<std::io::Stdout>>;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dashboard", version, about = "Weather dashboard for the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the default city, language and forecast length.
    Configure,

    /// Show current weather and the 5-day strip for a city.
    Show {
        /// City name; the configured default city if absent.
        city: Option<String>,

        /// Also show the hourly breakdown for this day (1 = today).
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
        day: Option<u16>,
    },

    /// Search cities one after another from a prompt.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Configure => {
                configure()?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Show { city, day } => show(city, day).await,
            Command::Interactive => {
                interactive().await?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn new_session() -> anyhow::Result<TerminalSession> {
    let config = Config::load()?;
    debug!(?config, "loaded configuration");
    let session = Session::from_config(&config, TerminalRenderer::stdout())?;
    session.refresh_time_of_day(Local::now().hour());
    Ok(session)
}

async fn show(city: Option<String>, day: Option<u16>) -> anyhow::Result<ExitCode> {
    let session = new_session()?;

    let result = match city {
        Some(city) => session.search(&city).await,
        None => session.retry().await,
    };
    // The renderer has already printed the failure.
    if result.is_err() {
        return Ok(ExitCode::FAILURE);
    }

    if let Some(day) = day {
        session.show_hourly_for_day(usize::from(day) - 1);
    }
    Ok(ExitCode::SUCCESS)
}

async fn interactive() -> anyhow::Result<()> {
    let session = Arc::new(new_session()?);

    let ticker = {
        let session = Arc::clone(&session);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TIME_OF_DAY_REFRESH);
            loop {
                interval.tick().await;
                session.refresh_time_of_day(Local::now().hour());
            }
        })
    };

    let _ = session.retry().await;

    loop {
        let label = session.renderer().time_label().unwrap_or_default();
        let message = format!("[{label}] City, `day N`, `retry` or `quit`:");
        let answer = tokio::task::spawn_blocking(move || Text::new(&message).prompt())
            .await
            .context("Prompt task failed")?;

        let line = match answer {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => {
                ticker.abort();
                return Err(err).context("Failed to read input");
            }
        };

        // Load errors are shown by the renderer; the loop carries on.
        match parse_prompt(&line) {
            PromptInput::Quit => break,
            PromptInput::Retry => {
                let _ = session.retry().await;
            }
            PromptInput::Day(day) => {
                if session.show_hourly_for_day(day).is_none() {
                    println!("Nothing loaded yet; search for a city first.");
                }
            }
            PromptInput::InvalidDay(raw) => {
                println!("'{raw}' is not a day number; use 1 to 5.");
            }
            PromptInput::Search(city) => {
                let _ = session.search(&city).await;
            }
        }
    }

    ticker.abort();
    Ok(())
}

/// One line typed at the interactive prompt.
#[derive(Debug, PartialEq, Eq)]
pub enum PromptInput {
    Quit,
    Retry,
    /// 0-based day index.
    Day(usize),
    InvalidDay(String),
    Search(String),
}

pub fn parse_prompt(line: &str) -> PromptInput {
    let trimmed = line.trim();
    let lower = trimmed.to_lowercase();

    match lower.as_str() {
        "quit" | "exit" | "q" => return PromptInput::Quit,
        "retry" | "r" => return PromptInput::Retry,
        _ => {}
    }

    if let Some(rest) = lower.strip_prefix("day ") {
        let rest = rest.trim();
        return match rest.parse::<usize>() {
            Ok(n) if n >= 1 => PromptInput::Day(n - 1),
            _ => PromptInput::InvalidDay(rest.to_string()),
        };
    }

    PromptInput::Search(line.to_string())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let city = config.default_city.clone();
    config.default_city = Text::new("Default city:").with_default(&city).prompt()?;

    let language = config.language.clone();
    config.language = Text::new("Language code for place names:").with_default(&language).prompt()?;

    let days = config.forecast_days.map(|d| d.to_string()).unwrap_or_default();
    let days = Text::new("Forecast days (blank for provider default):")
        .with_initial_value(&days)
        .prompt()?;
    config.forecast_days = parse_forecast_days(&days)?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn parse_forecast_days(raw: &str) -> anyhow::Result<Option<u8>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let days = raw.parse::<u8>().with_context(|| format!("'{raw}' is not a number of days"))?;
    Ok(Some(days))
}
