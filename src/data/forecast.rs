//! National Weather Service forecast client
//!
//! The forecast is a two-step lookup: the points endpoint maps a coordinate to
//! its forecast office grid and hands back the forecast URL, which is then
//! fetched for the day/night periods of the coming week.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::{ForecastPeriod, Location, DEFAULT_WEATHER_BASE_URL};

/// Seven days of day and night periods
pub const MAX_FORECAST_PERIODS: usize = 14;

/// Which of the two requests a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastStage {
    Points,
    Forecast,
}

impl std::fmt::Display for ForecastStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForecastStage::Points => write!(f, "points"),
            ForecastStage::Forecast => write!(f, "forecast"),
        }
    }
}

/// Errors that can occur when fetching the forecast
#[derive(Debug, Error)]
pub enum ForecastError {
    /// HTTP request failed or timed out
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("{stage} request returned HTTP {status}")]
    Status {
        stage: ForecastStage,
        status: StatusCode,
    },

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Points response had no forecast link
    #[error("Points response did not include a forecast URL")]
    MissingForecastUrl,

    /// Forecast decoded but held no periods
    #[error("Forecast contained no periods")]
    NoPeriods,
}

/// Client for fetching the multi-day forecast
#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: Client,
    base_url: String,
}

impl ForecastClient {
    /// Creates a client against api.weather.gov
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
        }
    }

    /// Points the client at a different service root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// URL of the points lookup for a coordinate
    ///
    /// The service only accepts up to four decimal places.
    fn points_url(&self, location: Location) -> String {
        format!(
            "{}/points/{:.4},{:.4}",
            self.base_url.trim_end_matches('/'),
            location.lat,
            location.lon
        )
    }

    /// Fetches the forecast for the given coordinate
    ///
    /// # Returns
    /// * `Ok(Vec<ForecastPeriod>)` - at most 14 periods in chronological order
    /// * `Err(ForecastError)` - if either request fails or no periods came back
    pub async fn fetch_forecast(
        &self,
        location: Location,
    ) -> Result<Vec<ForecastPeriod>, ForecastError> {
        let points_url = self.points_url(location);
        debug!(url = %points_url, "resolving forecast point");
        let body = self.get_text(&points_url, ForecastStage::Points).await?;
        let forecast_url = parse_points(&body)?;

        debug!(url = %forecast_url, "requesting forecast");
        let body = self.get_text(&forecast_url, ForecastStage::Forecast).await?;
        parse_forecast(&body)
    }

    async fn get_text(&self, url: &str, stage: ForecastStage) -> Result<String, ForecastError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ForecastError::Status { stage, status });
        }
        Ok(response.text().await?)
    }
}

/// Extracts the forecast URL from a points response
fn parse_points(body: &str) -> Result<String, ForecastError> {
    let response: PointsResponse = serde_json::from_str(body)?;
    response
        .properties
        .forecast
        .filter(|url| !url.trim().is_empty())
        .ok_or(ForecastError::MissingForecastUrl)
}

/// Parses a forecast response, keeping the first 14 periods
fn parse_forecast(body: &str) -> Result<Vec<ForecastPeriod>, ForecastError> {
    let response: ForecastResponse = serde_json::from_str(body)?;

    let periods: Vec<ForecastPeriod> = response
        .properties
        .periods
        .into_iter()
        .take(MAX_FORECAST_PERIODS)
        .map(|period| ForecastPeriod {
            name: period.name,
            temperature: period.temperature,
            temperature_unit: period.temperature_unit,
            short_forecast: period.short_forecast,
            wind_speed: period.wind_speed,
            wind_direction: period.wind_direction,
        })
        .collect();

    if periods.is_empty() {
        return Err(ForecastError::NoPeriods);
    }

    Ok(periods)
}

/// Points API response structure
#[derive(Debug, Deserialize)]
struct PointsResponse {
    properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
struct PointsProperties {
    forecast: Option<String>,
}

/// Forecast API response structure
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    properties: ForecastProperties,
}

#[derive(Debug, Deserialize)]
struct ForecastProperties {
    #[serde(default)]
    periods: Vec<WirePeriod>,
}

/// A single forecast period from the API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePeriod {
    name: String,
    temperature: f64,
    temperature_unit: String,
    #[serde(default)]
    short_forecast: String,
    #[serde(default)]
    wind_speed: String,
    #[serde(default)]
    wind_direction: String,
}
