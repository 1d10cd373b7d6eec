//! Command-line interface parsing for Riverwatch
//!
//! This module handles parsing of CLI arguments using clap and turns them
//! into the configuration the binary starts with.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::data::{Endpoints, DEFAULT_WATER_BASE_URL, DEFAULT_WEATHER_BASE_URL};
use crate::refresh::RefreshConfig;

/// Default HTTP timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Default auto-refresh interval in minutes
pub const DEFAULT_REFRESH_MINUTES: u64 = 15;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// A zero timeout would fail every request
    #[error("Invalid timeout: must be at least 1 second")]
    InvalidTimeout,

    /// A base URL override that is not http(s)
    #[error("Invalid URL: '{0}'. Expected an http:// or https:// address")]
    InvalidUrl(String),
}

/// Riverwatch - Chattahoochee river conditions in the terminal
#[derive(Parser, Debug)]
#[command(name = "riverwatch")]
#[command(about = "River temperature, weather and E. coli risk for the Chattahoochee")]
#[command(version)]
pub struct Cli {
    /// Fetch everything once, print a summary and exit
    #[arg(long)]
    pub once: bool,

    /// Print the summary as JSON (requires --once)
    #[arg(long, requires = "once")]
    pub json: bool,

    /// HTTP request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Auto-refresh interval in minutes, 0 disables
    #[arg(long, value_name = "MINUTES", default_value_t = DEFAULT_REFRESH_MINUTES)]
    pub refresh: u64,

    /// Base URL of the USGS instantaneous-values service
    #[arg(long, value_name = "URL")]
    pub water_url: Option<String>,

    /// Base URL of the National Weather Service API
    #[arg(long, value_name = "URL")]
    pub weather_url: Option<String>,

    /// Write logs to this file instead of the default location
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// How the binary presents the data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Interactive terminal dashboard
    #[default]
    Interactive,
    /// One fetch cycle printed as text
    Text,
    /// One fetch cycle printed as JSON
    Json,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub mode: OutputMode,
    pub timeout: Duration,
    pub refresh: RefreshConfig,
    pub endpoints: Endpoints,
    /// Explicit log file; `None` means the default location
    pub log_file: Option<PathBuf>,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            mode: OutputMode::Interactive,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            refresh: RefreshConfig::from_minutes(DEFAULT_REFRESH_MINUTES),
            endpoints: Endpoints::default(),
            log_file: None,
        }
    }
}

/// Checks that a base URL override is an http(s) address
///
/// # Returns
/// * `Ok(String)` with the URL unchanged
/// * `Err(CliError::InvalidUrl)` otherwise
pub fn parse_base_url(s: &str) -> Result<String, CliError> {
    let trimmed = s.trim();
    let has_scheme = trimmed.starts_with("http://") || trimmed.starts_with("https://");
    let has_host = trimmed
        .split_once("://")
        .map(|(_, rest)| !rest.is_empty())
        .unwrap_or(false);

    if has_scheme && has_host {
        Ok(trimmed.to_string())
    } else {
        Err(CliError::InvalidUrl(s.to_string()))
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if the timeout or a URL override is invalid
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.timeout == 0 {
            return Err(CliError::InvalidTimeout);
        }

        let mode = match (cli.once, cli.json) {
            (false, _) => OutputMode::Interactive,
            (true, false) => OutputMode::Text,
            (true, true) => OutputMode::Json,
        };

        let water_base = match &cli.water_url {
            Some(url) => parse_base_url(url)?,
            None => DEFAULT_WATER_BASE_URL.to_string(),
        };
        let weather_base = match &cli.weather_url {
            Some(url) => parse_base_url(url)?,
            None => DEFAULT_WEATHER_BASE_URL.to_string(),
        };

        Ok(StartupConfig {
            mode,
            timeout: Duration::from_secs(cli.timeout),
            refresh: RefreshConfig::from_minutes(cli.refresh),
            endpoints: Endpoints {
                water_base,
                weather_base,
            },
            log_file: cli.log_file.clone(),
        })
    }
}
