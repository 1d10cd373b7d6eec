//! Latest-reading tiles, one per monitoring site

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::widgets::TemperatureSparkline;
use super::{panel, render_status, temperature_color};
use crate::dashboard::Dashboard;
use crate::data::sites::station_label;
use crate::data::MonitoringSite;

/// Renders the row of site tiles
pub fn render(frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let sites = &dashboard.sites.data;

    if sites.is_empty() {
        let block = panel("Water Temperature");
        let inner = block.inner(area);
        frame.render_widget(block, area);
        render_status(frame, inner, &dashboard.sites.state, false, 's');
        return;
    }

    let constraints: Vec<Constraint> = sites
        .iter()
        .map(|_| Constraint::Ratio(1, sites.len() as u32))
        .collect();
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (i, (site, column)) in sites.iter().zip(columns.iter()).enumerate() {
        let selected = i == dashboard.selected_site;
        render_tile(frame, *column, site, selected, dashboard.sites.state.error.as_deref());
    }
}

/// Short display name for a site
///
/// Configured stations use their static label; anything else keeps the
/// name the service returned.
pub(crate) fn site_title(site: &MonitoringSite) -> &str {
    station_label(&site.site_id).unwrap_or(site.site_name.as_str())
}

fn render_tile(
    frame: &mut Frame,
    area: Rect,
    site: &MonitoringSite,
    selected: bool,
    error: Option<&str>,
) {
    let border_style = if selected {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let title_style = if selected {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let block = Block::default()
        .title(Span::styled(format!(" {} ", site_title(site)), title_style))
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let Some(reading) = &site.latest_reading else {
        let message = if site.is_placeholder() {
            error.unwrap_or("Data unavailable")
        } else {
            "No recent readings"
        };
        frame.render_widget(
            Paragraph::new(message).style(Style::default().fg(Color::DarkGray)),
            rows[0],
        );
        return;
    };

    let temperature = Line::from(vec![
        Span::styled(
            format!("{:.1}°F", reading.fahrenheit),
            Style::default()
                .fg(temperature_color(reading.celsius))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {:.1}°C", reading.celsius),
            Style::default().fg(Color::Gray),
        ),
    ]);
    frame.render_widget(Paragraph::new(temperature), rows[0]);
    frame.render_widget(
        Paragraph::new(reading.timestamp.as_str()).style(Style::default().fg(Color::DarkGray)),
        rows[1],
    );

    let values: Vec<f64> = site.raw_series.iter().map(|sample| sample.value).collect();
    frame.render_widget(TemperatureSparkline::new(&values), rows[2]);
}
