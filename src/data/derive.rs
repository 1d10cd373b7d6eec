//! Derived statistics over a site's raw temperature series
//!
//! Everything here is pure: the functions borrow the series and build new
//! values, so the same input always yields the same latest reading and the
//! same set of daily peaks.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::{DailyPeak, Sample, TemperatureReading};

/// Display format for a full timestamp ("Jul 15, 2:30 PM")
const TIMESTAMP_FORMAT: &str = "%b %-d, %-I:%M %p";

/// Display format for a time of day ("2:30 PM")
const TIME_FORMAT: &str = "%-I:%M %p";

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Returns the last sample of the series in both units, or `None` when the
/// series is empty
pub fn latest_reading(series: &[Sample]) -> Option<TemperatureReading> {
    let last = series.last()?;
    Some(TemperatureReading {
        celsius: last.value,
        fahrenheit: celsius_to_fahrenheit(last.value),
        timestamp: last.date_time.format(TIMESTAMP_FORMAT).to_string(),
        observed_at: last.date_time,
    })
}

/// Finds the warmest sample of each calendar day
///
/// Days are taken in the sample's own offset, i.e. the site's local date.
/// When several samples share the maximum, the earliest one is kept.
pub fn daily_peaks(series: &[Sample]) -> BTreeMap<NaiveDate, DailyPeak> {
    let mut peaks: BTreeMap<NaiveDate, DailyPeak> = BTreeMap::new();

    for sample in series {
        let day = sample.date_time.date_naive();
        let replace = match peaks.get(&day) {
            Some(current) => sample.value > current.celsius,
            None => true,
        };

        if replace {
            peaks.insert(
                day,
                DailyPeak {
                    celsius: sample.value,
                    fahrenheit: celsius_to_fahrenheit(sample.value),
                    time: sample.date_time.format(TIME_FORMAT).to_string(),
                    observed_at: sample.date_time,
                },
            );
        }
    }

    peaks
}
