//! Plain-text summary for one-shot runs
//!
//! Mirrors the dashboard panels in the order they appear on screen, so the
//! output can be piped or read in a log.

use std::fmt::Write;

use crate::dashboard::ViewModel;
use crate::data::sites::CONTAMINATION_STATIONS;
use crate::data::{FetchState, RiskLevel};

/// Number of most recent daily peaks listed per site
const PEAK_DAYS_SHOWN: usize = 3;

/// Renders the view model as a human-readable report
pub fn render_text(view: &ViewModel) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = write_sites(&mut out, view);
    let _ = write_forecast(&mut out, view);
    let _ = write_contamination(&mut out, view);

    if let Some(refreshed_at) = view.refreshed_at {
        let _ = writeln!(out, "Updated {}", refreshed_at.format("%b %-d, %-I:%M %p"));
    }

    out
}

/// Renders the view model as pretty-printed JSON
pub fn render_json(view: &ViewModel) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(view)
}

fn write_state(out: &mut String, state: &FetchState) -> std::fmt::Result {
    if let Some(error) = &state.error {
        writeln!(out, "  ! {}", error)?;
    }
    Ok(())
}

fn write_sites(out: &mut String, view: &ViewModel) -> std::fmt::Result {
    writeln!(out, "RIVER TEMPERATURE")?;
    write_state(out, &view.sites_state)?;

    for site in &view.sites {
        if site.is_placeholder() {
            writeln!(out, "  {}", site.site_name)?;
            continue;
        }

        match &site.latest_reading {
            Some(reading) => writeln!(
                out,
                "  {:<45} {:>5.1}°C {:>5.1}°F  ({})",
                site.site_name, reading.celsius, reading.fahrenheit, reading.timestamp
            )?,
            None => writeln!(out, "  {:<45} no recent readings", site.site_name)?,
        }

        for (day, peak) in site.daily_peaks.iter().rev().take(PEAK_DAYS_SHOWN) {
            writeln!(
                out,
                "      peak {}  {:>5.1}°C {:>5.1}°F at {}",
                day.format("%a %b %-d"),
                peak.celsius,
                peak.fahrenheit,
                peak.time
            )?;
        }
    }

    writeln!(out)
}

fn write_forecast(out: &mut String, view: &ViewModel) -> std::fmt::Result {
    writeln!(out, "FORECAST")?;
    write_state(out, &view.weather_state)?;

    for period in &view.forecast {
        writeln!(
            out,
            "  {:<16} {:>4.0}°{}  {}  wind {} {}",
            period.name,
            period.temperature,
            period.temperature_unit,
            period.short_forecast,
            period.wind_direction,
            period.wind_speed
        )?;
    }

    writeln!(out)
}

fn write_contamination(out: &mut String, view: &ViewModel) -> std::fmt::Result {
    writeln!(out, "E. COLI")?;
    write_state(out, &view.ecoli_state)?;
    if let Some(notice) = &view.ecoli_notice {
        writeln!(out, "  {}", notice)?;
    }

    for station in &CONTAMINATION_STATIONS {
        let Some(reading) = view.contamination.get(station.id) else {
            continue;
        };
        let risk = match reading.risk_level {
            RiskLevel::HighRisk => "HIGH RISK",
            RiskLevel::LowRisk => "low risk",
        };
        writeln!(
            out,
            "  {:<10} {:>7.0} MPN/100mL  {}  ({})",
            station.label,
            reading.value,
            risk,
            reading.date_time.format("%b %-d, %-I:%M %p")
        )?;
    }

    writeln!(out)
}
