//! Forecast panel

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Cell, Row, Table},
    Frame,
};

use super::{panel, render_status};
use crate::dashboard::Dashboard;
use crate::data::derive::{celsius_to_fahrenheit, fahrenheit_to_celsius};
use crate::data::ForecastPeriod;

/// Air temperature color in Fahrenheit
fn air_temperature_color(fahrenheit: f64) -> Color {
    if fahrenheit >= 90.0 {
        Color::Red
    } else if fahrenheit >= 75.0 {
        Color::Yellow
    } else if fahrenheit >= 55.0 {
        Color::Green
    } else {
        Color::Cyan
    }
}

fn temperature_cell(period: &ForecastPeriod) -> Cell<'static> {
    let fahrenheit = match period.temperature_unit.as_str() {
        "C" => celsius_to_fahrenheit(period.temperature),
        _ => period.temperature,
    };
    let text = if period.temperature_unit == "F" {
        format!(
            "{:.0}°F {:.0}°C",
            period.temperature,
            fahrenheit_to_celsius(period.temperature)
        )
    } else {
        format!("{:.0}°{}", period.temperature, period.temperature_unit)
    };
    Cell::from(text).style(Style::default().fg(air_temperature_color(fahrenheit)))
}

/// Renders the forecast periods as a table
pub fn render(frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let block = panel("Forecast");
    let inner = block.inner(area);
    let periods = &dashboard.forecast.data;

    if render_status(frame, inner, &dashboard.forecast.state, !periods.is_empty(), 'w') {
        frame.render_widget(block, area);
        return;
    }

    let header = Row::new(vec!["", "Temp", "Conditions", "Wind"]).style(
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = periods
        .iter()
        .map(|period| {
            Row::new(vec![
                Cell::from(period.name.clone()),
                temperature_cell(period),
                Cell::from(period.short_forecast.clone()),
                Cell::from(format!("{} {}", period.wind_direction, period.wind_speed)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(16),
            Constraint::Length(10),
            Constraint::Min(12),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(block);

    frame.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::tests::{offline_dashboard, populated_dashboard};
    use crate::dashboard::WEATHER_ERROR;
    use crate::ui::tests::draw;

    #[test]
    fn test_forecast_rows() {
        let dashboard = populated_dashboard();
        let content = draw(80, 8, |frame| {
            let area = frame.area();
            render(frame, area, &dashboard)
        });

        assert!(content.contains("Tonight"));
        assert!(content.contains("68°F 20°C"));
        assert!(content.contains("Sunny"));
        assert!(content.contains("NW 5 mph"));
    }

    #[test]
    fn test_forecast_error() {
        let mut dashboard = offline_dashboard();
        dashboard.forecast.state.fail(WEATHER_ERROR);
        let content = draw(80, 6, |frame| {
            let area = frame.area();
            render(frame, area, &dashboard)
        });

        assert!(content.contains(WEATHER_ERROR));
    }

    #[test]
    fn test_air_temperature_color() {
        assert_eq!(air_temperature_color(95.0), Color::Red);
        assert_eq!(air_temperature_color(60.0), Color::Green);
        assert_eq!(air_temperature_color(30.0), Color::Cyan);
    }
}
