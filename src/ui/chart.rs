//! Seven-day temperature chart of the selected site
//!
//! Plots the raw series as a line and marks each day's peak. The x axis is
//! hours since the first sample.

use chrono::{DateTime, FixedOffset};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use super::tiles::site_title;
use super::{panel, render_status};
use crate::dashboard::Dashboard;
use crate::data::MonitoringSite;

/// Chart points of a site
#[derive(Debug, Default, PartialEq)]
pub(crate) struct ChartSeries {
    pub line: Vec<(f64, f64)>,
    pub peaks: Vec<(f64, f64)>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

fn hours_between(origin: DateTime<FixedOffset>, at: DateTime<FixedOffset>) -> f64 {
    (at - origin).num_seconds() as f64 / 3600.0
}

/// Converts a site's readings into chart coordinates
///
/// Returns `None` for a site without readings.
pub(crate) fn chart_series(site: &MonitoringSite) -> Option<ChartSeries> {
    let origin = site.raw_series.first()?.date_time;

    let line: Vec<(f64, f64)> = site
        .raw_series
        .iter()
        .map(|sample| (hours_between(origin, sample.date_time), sample.value))
        .collect();
    let peaks: Vec<(f64, f64)> = site
        .daily_peaks
        .values()
        .map(|peak| (hours_between(origin, peak.observed_at), peak.celsius))
        .collect();

    let (min, max) = line
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, y)| {
            (lo.min(*y), hi.max(*y))
        });
    let x_max = line.last().map(|(x, _)| *x).unwrap_or(0.0).max(1.0);

    Some(ChartSeries {
        line,
        peaks,
        x_bounds: [0.0, x_max],
        y_bounds: [(min - 1.0).floor(), (max + 1.0).ceil()],
    })
}

/// Renders the chart panel
pub fn render(frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let site = dashboard.selected();
    let title = match site {
        Some(site) => format!("Water Temperature · {}", site_title(site)),
        None => "Water Temperature".to_string(),
    };
    let block = panel(&title);
    let inner = block.inner(area);

    let has_data = site.map(|s| !s.raw_series.is_empty()).unwrap_or(false);
    if render_status(frame, inner, &dashboard.sites.state, has_data, 's') {
        frame.render_widget(block, area);
        return;
    }

    let Some(series) = site.and_then(chart_series) else {
        frame.render_widget(
            Paragraph::new("No readings in the last 7 days")
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            area,
        );
        return;
    };

    let (first_label, last_label) = match site {
        Some(site) => (
            site.raw_series
                .first()
                .map(|s| s.date_time.format("%b %-d").to_string())
                .unwrap_or_default(),
            site.raw_series
                .last()
                .map(|s| s.date_time.format("%b %-d").to_string())
                .unwrap_or_default(),
        ),
        None => (String::new(), String::new()),
    };

    let datasets = vec![
        Dataset::default()
            .name("°C")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&series.line),
        Dataset::default()
            .name("daily peak")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Yellow))
            .data(&series.peaks),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds(series.x_bounds)
                .labels(vec![Span::raw(first_label), Span::raw(last_label)]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds(series.y_bounds)
                .labels(vec![
                    Span::raw(format!("{:.0}", series.y_bounds[0])),
                    Span::raw(format!("{:.0}", series.y_bounds[1])),
                ]),
        );

    frame.render_widget(chart, area);
}
