//! Static monitoring site data
//!
//! The dashboard watches a fixed stretch of the Chattahoochee River. Site
//! identifiers are USGS station numbers. Coordinates come back from the service;
//! the short labels here replace the long service names on the dashboard panels.

use super::Location;

/// A configured USGS station
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Station {
    /// USGS station number
    pub id: &'static str,
    /// Short label shown in place of the service's site name
    pub label: &'static str,
}

/// Stations reporting water temperature, upstream to downstream
pub static TEMPERATURE_STATIONS: [Station; 4] = [
    Station {
        id: "02334430",
        label: "Buford Dam",
    },
    Station {
        id: "02335000",
        label: "Norcross",
    },
    Station {
        id: "02335880",
        label: "Roswell",
    },
    Station {
        id: "02336000",
        label: "Atlanta",
    },
];

/// Stations reporting E. coli estimates
pub static CONTAMINATION_STATIONS: [Station; 3] = [
    Station {
        id: "02335000",
        label: "Norcross",
    },
    Station {
        id: "02335880",
        label: "Roswell",
    },
    Station {
        id: "02336000",
        label: "Atlanta",
    },
];

/// Station numbers queried for water temperature
pub static TEMPERATURE_SITE_IDS: [&str; 4] = ["02334430", "02335000", "02335880", "02336000"];

/// Station numbers queried for E. coli
pub static CONTAMINATION_SITE_IDS: [&str; 3] = ["02335000", "02335880", "02336000"];

/// Point the weather forecast is resolved for (Chattahoochee River NRA, Roswell)
pub const FORECAST_POINT: Location = Location {
    lat: 33.9978,
    lon: -84.3306,
};

/// Looks up the short label of a configured station
pub fn station_label(id: &str) -> Option<&'static str> {
    TEMPERATURE_STATIONS
        .iter()
        .chain(CONTAMINATION_STATIONS.iter())
        .find(|station| station.id == id)
        .map(|station| station.label)
}
