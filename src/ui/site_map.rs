//! Map of the monitoring sites
//!
//! Draws the river as a line through the temperature stations, upstream to
//! downstream, with one marker per site. The selected site is highlighted.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::canvas::{Canvas, Line as CanvasLine, Points},
    Frame,
};

use super::tiles::site_title;
use super::{panel, render_status};
use crate::dashboard::Dashboard;
use crate::data::{Location, MonitoringSite, FORECAST_POINT};

/// Margin around the outermost sites, in degrees
const MAP_MARGIN: f64 = 0.05;

/// Longitude and latitude bounds that contain every site
pub(crate) fn map_bounds(sites: &[MonitoringSite]) -> ([f64; 2], [f64; 2]) {
    let locations: Vec<Location> = sites
        .iter()
        .filter(|site| !site.is_placeholder())
        .map(|site| site.location)
        .collect();

    if locations.is_empty() {
        return (
            [FORECAST_POINT.lon - MAP_MARGIN, FORECAST_POINT.lon + MAP_MARGIN],
            [FORECAST_POINT.lat - MAP_MARGIN, FORECAST_POINT.lat + MAP_MARGIN],
        );
    }

    let (mut lon_min, mut lon_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut lat_min, mut lat_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for location in &locations {
        lon_min = lon_min.min(location.lon);
        lon_max = lon_max.max(location.lon);
        lat_min = lat_min.min(location.lat);
        lat_max = lat_max.max(location.lat);
    }

    (
        [lon_min - MAP_MARGIN, lon_max + MAP_MARGIN],
        [lat_min - MAP_MARGIN, lat_max + MAP_MARGIN],
    )
}

/// Renders the site map panel
pub fn render(frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let block = panel("Sites");
    let inner = block.inner(area);
    let sites = &dashboard.sites.data;

    let has_sites = sites.iter().any(|site| !site.is_placeholder());
    if !has_sites && render_status(frame, inner, &dashboard.sites.state, false, 's') {
        frame.render_widget(block, area);
        return;
    }

    let (x_bounds, y_bounds) = map_bounds(sites);
    let selected = dashboard.selected_site;

    let canvas = Canvas::default()
        .block(block)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(move |ctx| {
            let stations: Vec<&MonitoringSite> =
                sites.iter().filter(|site| !site.is_placeholder()).collect();

            for pair in stations.windows(2) {
                ctx.draw(&CanvasLine {
                    x1: pair[0].location.lon,
                    y1: pair[0].location.lat,
                    x2: pair[1].location.lon,
                    y2: pair[1].location.lat,
                    color: Color::Blue,
                });
            }
            ctx.layer();

            for (i, site) in sites.iter().enumerate() {
                if site.is_placeholder() {
                    continue;
                }
                let coords = [(site.location.lon, site.location.lat)];
                let (color, style) = if i == selected {
                    (
                        Color::Yellow,
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    (Color::Cyan, Style::default().fg(Color::Gray))
                };
                ctx.draw(&Points {
                    coords: &coords,
                    color,
                });
                ctx.print(
                    site.location.lon,
                    site.location.lat,
                    Span::styled(format!(" {}", site_title(site)), style),
                );
            }
        });

    frame.render_widget(canvas, area);
}
