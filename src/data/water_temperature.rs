//! River temperature client for the USGS instantaneous-values service
//!
//! Fetches a week of water temperature readings (parameter 00010) for each
//! configured station and builds a [`MonitoringSite`] per station. Stations
//! are requested independently; one station failing never fails the others.

use chrono::{Duration, NaiveDate, Utc};
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::usgs::{decode_series, DecodeError};
use super::{MonitoringSite, DEFAULT_WATER_BASE_URL};

/// USGS parameter code for water temperature in degrees Celsius
pub const PARAM_WATER_TEMPERATURE: &str = "00010";

/// Number of days of history requested per station
pub const LOOKBACK_DAYS: i64 = 7;

/// Errors for a single station request
#[derive(Debug, Error)]
pub enum SiteFetchError {
    /// HTTP request failed or timed out
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("Unexpected HTTP status {0}")]
    Status(StatusCode),

    /// Body could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Response carried no usable series metadata
    #[error("Missing series metadata: {0}")]
    MissingSeries(&'static str),
}

/// Batch-level error, raised only when no station produced data
#[derive(Debug, Error)]
pub enum SitesError {
    #[error("No monitoring site returned data ({attempted} attempted)")]
    NoSitesAvailable { attempted: usize },
}

/// Client for fetching water temperature series
#[derive(Debug, Clone)]
pub struct WaterTemperatureClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Base URL for the IV service (allows override for testing)
    base_url: String,
}

impl WaterTemperatureClient {
    /// Creates a client against the public USGS service
    pub fn new(http_client: Client) -> Self {
        Self {
            http_client,
            base_url: DEFAULT_WATER_BASE_URL.to_string(),
        }
    }

    /// Points the client at a different service root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Builds the request URL for one station
    fn site_url(&self, site_id: &str, start_date: NaiveDate) -> String {
        format!(
            "{}?format=json&sites={}&parameterCd={}&startDT={}&siteStatus=active",
            self.base_url,
            site_id,
            PARAM_WATER_TEMPERATURE,
            start_date.format("%Y-%m-%d")
        )
    }

    /// Fetches every station concurrently
    ///
    /// # Returns
    /// * `Ok(Vec<MonitoringSite>)` - the stations that returned usable data,
    ///   in the order they were requested
    /// * `Err(SitesError)` - if not a single station did
    pub async fn fetch_all(&self, site_ids: &[&str]) -> Result<Vec<MonitoringSite>, SitesError> {
        let start_date = lookback_start(Utc::now().date_naive());

        let results = join_all(
            site_ids
                .iter()
                .map(|site_id| self.fetch_site(site_id, start_date)),
        )
        .await;

        let sites: Vec<MonitoringSite> = site_ids
            .iter()
            .zip(results)
            .filter_map(|(site_id, result)| match result {
                Ok(site) => Some(site),
                Err(e) => {
                    warn!(site_id, error = %e, "monitoring site unavailable");
                    None
                }
            })
            .collect();

        if sites.is_empty() {
            return Err(SitesError::NoSitesAvailable {
                attempted: site_ids.len(),
            });
        }

        info!(loaded = sites.len(), attempted = site_ids.len(), "monitoring sites loaded");
        Ok(sites)
    }

    /// Fetches one station's readings since `start_date`
    pub async fn fetch_site(
        &self,
        site_id: &str,
        start_date: NaiveDate,
    ) -> Result<MonitoringSite, SiteFetchError> {
        let url = self.site_url(site_id, start_date);
        debug!(%url, "requesting water temperature");

        let response = self.http_client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(SiteFetchError::Status(response.status()));
        }

        let body = response.text().await?;
        parse_site(site_id, &body)
    }
}

/// First day of the lookback window ending at `today`
pub fn lookback_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(LOOKBACK_DAYS)
}

/// Builds a site from the first time series of a response body
fn parse_site(site_id: &str, body: &str) -> Result<MonitoringSite, SiteFetchError> {
    let record = decode_series(body)?
        .into_iter()
        .next()
        .ok_or(SiteFetchError::MissingSeries("timeSeries"))?;

    let site_name = record
        .site_name
        .ok_or(SiteFetchError::MissingSeries("sourceInfo.siteName"))?;
    let location = record
        .location
        .ok_or(SiteFetchError::MissingSeries("sourceInfo.geoLocation"))?;

    Ok(MonitoringSite::new(
        site_id,
        site_name,
        location,
        record.samples,
    ))
}
