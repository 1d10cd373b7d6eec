//! E. coli risk grid
//!
//! One row per E. coli station, in upstream-to-downstream order. Stations
//! without a recent sample are listed with a dash so the grid keeps its shape.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};

use super::{panel, render_status};
use crate::dashboard::Dashboard;
use crate::data::contamination::ECOLI_HIGH_RISK_THRESHOLD;
use crate::data::sites::CONTAMINATION_STATIONS;
use crate::data::{ContaminationReading, RiskLevel};

fn risk_label(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::HighRisk => "HIGH RISK",
        RiskLevel::LowRisk => "Low risk",
    }
}

fn risk_color(level: RiskLevel) -> Color {
    match level {
        RiskLevel::HighRisk => Color::Red,
        RiskLevel::LowRisk => Color::Green,
    }
}

fn reading_row(label: &'static str, reading: Option<&ContaminationReading>) -> Row<'static> {
    match reading {
        Some(reading) => Row::new(vec![
            Cell::from(label),
            Cell::from(format!("{:.0}", reading.value)),
            Cell::from(risk_label(reading.risk_level)).style(
                Style::default()
                    .fg(risk_color(reading.risk_level))
                    .add_modifier(Modifier::BOLD),
            ),
            Cell::from(reading.date_time.format("%b %-d %-I%P").to_string()),
        ]),
        None => Row::new(vec![
            Cell::from(label),
            Cell::from("-"),
            Cell::from("no data").style(Style::default().fg(Color::DarkGray)),
            Cell::from(""),
        ]),
    }
}

/// Renders the E. coli panel
pub fn render(frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let block = panel("E. coli (MPN/100 mL)");
    let inner = block.inner(area);
    let report = &dashboard.contamination.data;

    if render_status(
        frame,
        inner,
        &dashboard.contamination.state,
        !report.is_empty(),
        'e',
    ) {
        frame.render_widget(block, area);
        return;
    }
    frame.render_widget(block, area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(1)])
        .split(inner);

    if let Some(notice) = &dashboard.contamination_notice {
        frame.render_widget(
            Paragraph::new(notice.as_str()).style(Style::default().fg(Color::DarkGray)),
            sections[0],
        );
        return;
    }

    let header = Row::new(vec!["Site", "Value", "Risk", "Sampled"]).style(
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    );
    let rows: Vec<Row> = CONTAMINATION_STATIONS
        .iter()
        .map(|station| reading_row(station.label, report.readings.get(station.id)))
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(6),
            Constraint::Length(10),
            Constraint::Min(8),
        ],
    )
    .header(header);
    frame.render_widget(table, sections[0]);

    frame.render_widget(
        Paragraph::new(format!("High risk above {:.0}", ECOLI_HIGH_RISK_THRESHOLD))
            .style(Style::default().fg(Color::DarkGray)),
        sections[1],
    );
}
