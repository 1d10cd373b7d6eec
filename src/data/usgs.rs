//! Decoding of USGS instantaneous-values responses
//!
//! The IV service returns WaterML rendered as JSON. Both the temperature and
//! the E. coli pipelines query it, so the envelope is decoded here once: the
//! wire structs tolerate missing fields, and [`decode_series`] turns them into
//! [`SeriesRecord`]s that only carry values that parsed cleanly. Deciding which
//! missing fields make a record unusable is left to the caller.

use chrono::DateTime;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::{Location, Sample};

/// Sentinel the service uses for "no measurement"
pub const NO_DATA_VALUE: f64 = -999_999.0;

/// Errors produced while decoding a response body
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Body is not JSON or does not have the WaterML envelope
    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

/// One time series from the response, validated
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRecord {
    pub site_code: Option<String>,
    pub site_name: Option<String>,
    pub location: Option<Location>,
    /// Samples in the order the service returned them (ascending time)
    pub samples: Vec<Sample>,
}

#[derive(Debug, Deserialize)]
struct IvResponse {
    value: IvValue,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IvValue {
    #[serde(default)]
    time_series: Vec<WireSeries>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSeries {
    source_info: Option<SourceInfo>,
    variable: Option<Variable>,
    #[serde(default)]
    values: Vec<ValueBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SourceInfo {
    site_name: Option<String>,
    #[serde(default)]
    site_code: Vec<SiteCode>,
    geo_location: Option<GeoLocation>,
}

#[derive(Debug, Deserialize)]
struct SiteCode {
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeoLocation {
    geog_location: Option<GeogLocation>,
}

#[derive(Debug, Deserialize)]
struct GeogLocation {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Variable {
    no_data_value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ValueBlock {
    #[serde(default)]
    value: Vec<WireValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireValue {
    value: String,
    date_time: String,
}

/// Decodes an IV response body into its time series
///
/// Values arrive as decimal strings. Samples that do not parse, are not
/// finite, equal the series' no-data sentinel, or carry an unreadable
/// timestamp are dropped.
pub fn decode_series(body: &str) -> Result<Vec<SeriesRecord>, DecodeError> {
    let response: IvResponse = serde_json::from_str(body)?;

    Ok(response
        .value
        .time_series
        .into_iter()
        .map(validate_series)
        .collect())
}

fn validate_series(series: WireSeries) -> SeriesRecord {
    let no_data = series
        .variable
        .and_then(|v| v.no_data_value)
        .unwrap_or(NO_DATA_VALUE);

    let (site_code, site_name, location) = match series.source_info {
        Some(info) => (
            info.site_code.into_iter().next().map(|code| code.value),
            info.site_name,
            info.geo_location
                .and_then(|geo| geo.geog_location)
                .map(|geog| Location {
                    lat: geog.latitude,
                    lon: geog.longitude,
                }),
        ),
        None => (None, None, None),
    };

    // Only the first values block is used; the service emits one per method
    let samples = series
        .values
        .into_iter()
        .next()
        .map(|block| {
            block
                .value
                .into_iter()
                .filter_map(|raw| parse_sample(&raw, no_data))
                .collect()
        })
        .unwrap_or_default();

    SeriesRecord {
        site_code,
        site_name,
        location,
        samples,
    }
}

fn parse_sample(raw: &WireValue, no_data: f64) -> Option<Sample> {
    let value = match raw.value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && (v - no_data).abs() > f64::EPSILON => v,
        _ => {
            debug!(value = %raw.value, "skipping unusable sample value");
            return None;
        }
    };

    match DateTime::parse_from_rfc3339(&raw.date_time) {
        Ok(date_time) => Some(Sample { date_time, value }),
        Err(_) => {
            debug!(date_time = %raw.date_time, "skipping sample with bad timestamp");
            None
        }
    }
}
