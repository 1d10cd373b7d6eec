//! Core data models for Riverwatch
//!
//! This module contains the view-model types shared by the fetch pipelines,
//! the dashboard and the renderers, plus the HTTP client construction used
//! by every pipeline.

pub mod contamination;
pub mod derive;
pub mod forecast;
pub mod sites;
pub mod usgs;
pub mod water_temperature;

pub use contamination::{classify_risk, ContaminationClient, ContaminationError, ContaminationReport};
pub use forecast::{ForecastClient, ForecastError};
pub use sites::{CONTAMINATION_SITE_IDS, FORECAST_POINT, TEMPERATURE_SITE_IDS};
pub use water_temperature::{SiteFetchError, SitesError, WaterTemperatureClient};

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate};
use reqwest::Client;
use serde::Serialize;

/// Default base URL of the USGS instantaneous-values service
pub const DEFAULT_WATER_BASE_URL: &str = "https://waterservices.usgs.gov/nwis/iv/";

/// Default base URL of the National Weather Service API
pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.weather.gov";

/// User agent sent with every request; the weather service rejects anonymous clients
pub const USER_AGENT: &str = concat!("riverwatch/", env!("CARGO_PKG_VERSION"));

/// Geographic coordinates in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

/// One raw temperature sample as reported by the gauge (Celsius)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    /// Observation time in the site's local offset
    pub date_time: DateTime<FixedOffset>,
    pub value: f64,
}

/// The most recent reading of a site, in both units
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureReading {
    pub celsius: f64,
    pub fahrenheit: f64,
    /// Display timestamp, e.g. "Jul 15, 2:30 PM"
    pub timestamp: String,
    pub observed_at: DateTime<FixedOffset>,
}

/// Highest reading of a single calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPeak {
    pub celsius: f64,
    pub fahrenheit: f64,
    /// Display time of day the peak was reached, e.g. "3:15 PM"
    pub time: String,
    pub observed_at: DateTime<FixedOffset>,
}

/// A river monitoring site with its week of readings and derived statistics
///
/// Built once per successful fetch through [`MonitoringSite::new`], which runs
/// the derivations over the raw series. Nothing mutates a site afterwards; a
/// retry replaces the whole list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitoringSite {
    pub site_id: String,
    pub site_name: String,
    pub location: Location,
    pub raw_series: Vec<Sample>,
    pub latest_reading: Option<TemperatureReading>,
    pub daily_peaks: BTreeMap<NaiveDate, DailyPeak>,
}

impl MonitoringSite {
    /// Creates a site and derives its latest reading and daily peaks
    pub fn new(
        site_id: impl Into<String>,
        site_name: impl Into<String>,
        location: Location,
        raw_series: Vec<Sample>,
    ) -> Self {
        let latest_reading = derive::latest_reading(&raw_series);
        let daily_peaks = derive::daily_peaks(&raw_series);
        Self {
            site_id: site_id.into(),
            site_name: site_name.into(),
            location,
            raw_series,
            latest_reading,
            daily_peaks,
        }
    }

    /// Placeholder shown when the data pipeline failed unexpectedly
    pub fn unavailable() -> Self {
        Self::new("unavailable", "Data unavailable", FORECAST_POINT, Vec::new())
    }

    /// Whether this is the placeholder produced by [`MonitoringSite::unavailable`]
    pub fn is_placeholder(&self) -> bool {
        self.site_id == "unavailable"
    }
}

/// One day or night segment of the multi-day forecast
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPeriod {
    pub name: String,
    pub temperature: f64,
    pub temperature_unit: String,
    pub short_forecast: String,
    pub wind_speed: String,
    pub wind_direction: String,
}

/// Contamination risk classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    HighRisk,
    LowRisk,
}

/// Latest E. coli reading for a site
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContaminationReading {
    /// Most probable number per 100 mL
    pub value: f64,
    pub date_time: DateTime<FixedOffset>,
    pub site_name: String,
    pub risk_level: RiskLevel,
}

/// Loading/error state of one view-model slice
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FetchState {
    pub loading: bool,
    pub error: Option<String>,
}

impl FetchState {
    /// Marks a new fetch cycle; any previous error is dropped
    pub fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn succeed(&mut self) {
        self.loading = false;
        self.error = None;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }
}

/// Base URLs of the two services
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub water_base: String,
    pub weather_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            water_base: DEFAULT_WATER_BASE_URL.to_string(),
            weather_base: DEFAULT_WEATHER_BASE_URL.to_string(),
        }
    }
}

/// Builds the HTTP client shared by all pipelines
///
/// The timeout applies to each whole request; an expired request surfaces as
/// an ordinary `reqwest::Error` and is handled like any other failure.
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

/// The three pipeline clients, sharing one connection pool
#[derive(Debug, Clone)]
pub struct FetchClients {
    pub temperature: WaterTemperatureClient,
    pub forecast: ForecastClient,
    pub contamination: ContaminationClient,
}

impl FetchClients {
    pub fn new(endpoints: &Endpoints, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http_client = build_http_client(timeout)?;
        Ok(Self {
            temperature: WaterTemperatureClient::new(http_client.clone())
                .with_base_url(&endpoints.water_base),
            forecast: ForecastClient::new(http_client.clone())
                .with_base_url(&endpoints.weather_base),
            contamination: ContaminationClient::new(http_client)
                .with_base_url(&endpoints.water_base),
        })
    }
}
