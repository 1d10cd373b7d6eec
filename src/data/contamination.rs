//! E. coli client for the USGS instantaneous-values service
//!
//! Fetches the latest E. coli estimate (parameter 99407) for all configured
//! stations in one request and maps each to a risk level.

use std::collections::BTreeMap;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::usgs::{decode_series, DecodeError};
use super::{ContaminationReading, RiskLevel, DEFAULT_WATER_BASE_URL};

/// USGS parameter code for estimated E. coli (MPN/100 mL)
pub const PARAM_ECOLI: &str = "99407";

/// Readings strictly above this are high risk (MPN/100 mL)
pub const ECOLI_HIGH_RISK_THRESHOLD: f64 = 235.0;

/// Errors that can occur when fetching E. coli data
#[derive(Debug, Error)]
pub enum ContaminationError {
    /// HTTP request failed or timed out
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("Unexpected HTTP status {0}")]
    Status(StatusCode),

    /// Failed to parse API response
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Latest readings keyed by USGS site code
///
/// An empty report is a successful fetch in which no station had a sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContaminationReport {
    pub readings: BTreeMap<String, ContaminationReading>,
}

impl ContaminationReport {
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

/// Client for fetching E. coli readings
#[derive(Debug, Clone)]
pub struct ContaminationClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Base URL for the IV service (allows override for testing)
    base_url: String,
}

impl ContaminationClient {
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

    fn batch_url(&self, site_ids: &[&str]) -> String {
        format!(
            "{}?format=json&sites={}&parameterCd={}&siteStatus=active",
            self.base_url,
            site_ids.join(","),
            PARAM_ECOLI
        )
    }

    /// Fetches the latest reading of every station in one request
    ///
    /// # Returns
    /// * `Ok(ContaminationReport)` - possibly empty when no station had data
    /// * `Err(ContaminationError)` - if the request or decoding fails
    pub async fn fetch_latest(
        &self,
        site_ids: &[&str],
    ) -> Result<ContaminationReport, ContaminationError> {
        let url = self.batch_url(site_ids);
        debug!(%url, "requesting E. coli readings");

        let response = self.http_client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ContaminationError::Status(response.status()));
        }

        let body = response.text().await?;
        parse_report(&body)
    }
}

/// Maps an E. coli estimate to its risk level
pub fn classify_risk(value: f64) -> RiskLevel {
    if value > ECOLI_HIGH_RISK_THRESHOLD {
        RiskLevel::HighRisk
    } else {
        RiskLevel::LowRisk
    }
}

/// Keeps the most recent sample of each series
///
/// Series without a site code or without samples are skipped rather than
/// treated as errors.
fn parse_report(body: &str) -> Result<ContaminationReport, ContaminationError> {
    let mut readings = BTreeMap::new();

    for record in decode_series(body)? {
        let Some(site_code) = record.site_code else {
            debug!("skipping E. coli series without a site code");
            continue;
        };
        let Some(latest) = record.samples.last() else {
            debug!(%site_code, "no recent E. coli sample");
            continue;
        };

        readings.insert(
            site_code.clone(),
            ContaminationReading {
                value: latest.value,
                date_time: latest.date_time,
                site_name: record.site_name.unwrap_or(site_code),
                risk_level: classify_risk(latest.value),
            },
        );
    }

    Ok(ContaminationReport { readings })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BATCH_RESPONSE: &str = r#"{"value": {"timeSeries": [
        {
            "sourceInfo": {"siteName": "CHATTAHOOCHEE RIVER NEAR NORCROSS, GA", "siteCode": [{"value": "02335000"}]},
            "values": [{"value": [
                {"value": "540", "dateTime": "2024-07-14T09:00:00.000-04:00"},
                {"value": "120", "dateTime": "2024-07-15T09:00:00.000-04:00"}
            ]}]
        },
        {
            "sourceInfo": {"siteName": "CHATTAHOOCHEE RIVER AT ATLANTA, GA", "siteCode": [{"value": "02336000"}]},
            "values": [{"value": [
                {"value": "980", "dateTime": "2024-07-15T10:00:00.000-04:00"}
            ]}]
        },
        {
            "sourceInfo": {"siteName": "CHATTAHOOCHEE RIVER ABOVE ROSWELL, GA", "siteCode": [{"value": "02335880"}]},
            "values": [{"value": []}]
        }
    ]}}"#;

    #[test]
    fn test_classify_risk_threshold_is_strict() {
        assert_eq!(classify_risk(236.0), RiskLevel::HighRisk);
        assert_eq!(classify_risk(235.0), RiskLevel::LowRisk);
        assert_eq!(classify_risk(235.5), RiskLevel::HighRisk);
        assert_eq!(classify_risk(0.0), RiskLevel::LowRisk);
        assert_eq!(classify_risk(2400.0), RiskLevel::HighRisk);
    }

    #[test]
    fn test_batch_url_joins_sites() {
        let client = ContaminationClient::new(Client::new());
        let url = client.batch_url(&["02335000", "02335880", "02336000"]);

        assert!(url.contains("sites=02335000,02335880,02336000"));
        assert!(url.contains("parameterCd=99407"));
        assert!(url.contains("format=json"));
        assert!(url.contains("siteStatus=active"));
        assert!(!url.contains("startDT"));
    }

    #[test]
    fn test_parse_report_uses_latest_sample() {
        let report = parse_report(BATCH_RESPONSE).unwrap();
        let norcross = &report.readings["02335000"];

        assert!((norcross.value - 120.0).abs() < 1e-9);
        assert_eq!(norcross.risk_level, RiskLevel::LowRisk);
        assert_eq!(norcross.site_name, "CHATTAHOOCHEE RIVER NEAR NORCROSS, GA");
        assert_eq!(norcross.date_time.to_rfc3339(), "2024-07-15T09:00:00-04:00");
    }

    #[test]
    fn test_parse_report_classifies_high_risk() {
        let report = parse_report(BATCH_RESPONSE).unwrap();
        assert_eq!(report.readings["02336000"].risk_level, RiskLevel::HighRisk);
    }

    #[test]
    fn test_parse_report_omits_sites_without_values() {
        let report = parse_report(BATCH_RESPONSE).unwrap();
        assert_eq!(report.readings.len(), 2);
        assert!(!report.readings.contains_key("02335880"));
    }

    #[test]
    fn test_parse_report_all_empty_is_ok_and_empty() {
        let body = r#"{"value": {"timeSeries": [
            {"sourceInfo": {"siteName": "A", "siteCode": [{"value": "1"}]}, "values": [{"value": []}]}
        ]}}"#;
        let report = parse_report(body).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_parse_report_falls_back_to_code_for_name() {
        let body = r#"{"value": {"timeSeries": [
            {"sourceInfo": {"siteCode": [{"value": "02335000"}]},
             "values": [{"value": [{"value": "10", "dateTime": "2024-07-15T09:00:00-04:00"}]}]}
        ]}}"#;
        let report = parse_report(body).unwrap();
        assert_eq!(report.readings["02335000"].site_name, "02335000");
    }

    #[test]
    fn test_parse_report_rejects_malformed_body() {
        assert!(matches!(
            parse_report("[]"),
            Err(ContaminationError::Decode(_))
        ));
    }
}
