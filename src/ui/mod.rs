//! UI rendering module for Riverwatch
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components. Every panel reads from the
//! dashboard and shows the loading or error state of its own source.

pub mod chart;
pub mod forecast;
pub mod help_overlay;
pub mod risk_grid;
pub mod site_map;
pub mod tiles;
pub mod widgets;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::dashboard::Dashboard;
use crate::data::FetchState;

pub use help_overlay::render as render_help_overlay;

/// Renders the whole dashboard
pub fn render(frame: &mut Frame, dashboard: &Dashboard) {
    let area = frame.area();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),  // Header
            Constraint::Length(6),  // Site tiles
            Constraint::Min(10),    // Chart and map
            Constraint::Length(12), // Forecast and E. coli
            Constraint::Length(1),  // Footer
        ])
        .split(area);

    render_header(frame, rows[0], dashboard);
    tiles::render(frame, rows[1], dashboard);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(rows[2]);
    chart::render(frame, middle[0], dashboard);
    site_map::render(frame, middle[1], dashboard);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[3]);
    forecast::render(frame, bottom[0], dashboard);
    risk_grid::render(frame, bottom[1], dashboard);

    render_footer(frame, rows[4]);

    if dashboard.show_help {
        render_help_overlay(frame);
    }
}

fn render_header(frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let mut spans = vec![Span::styled(
        " Riverwatch · Chattahoochee River",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];

    if dashboard.is_loading() {
        spans.push(Span::styled(
            "  refreshing...",
            Style::default().fg(Color::Yellow),
        ));
    } else if let Some(refreshed_at) = dashboard.last_refresh {
        spans.push(Span::styled(
            format!("  updated {}", refreshed_at.format("%-I:%M %p")),
            Style::default().fg(Color::DarkGray),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let hint = Paragraph::new(
        " ←/→ site  s temps  w weather  e E. coli  r reload all  ? help  q quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hint, area);
}

/// Standard bordered panel with a title
pub(crate) fn panel(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
}

/// A key binding followed by what it does
pub(crate) fn key_line(key: &str, action: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<12}", key), Style::default().fg(Color::Yellow)),
        Span::raw(action.to_string()),
    ])
}

/// Renders the loading or error message of a slice that has nothing to show
///
/// Errors come with the key that retries the slice. Returns `true` when a
/// message was drawn and the panel body should be skipped.
pub(crate) fn render_status(
    frame: &mut Frame,
    area: Rect,
    state: &FetchState,
    has_data: bool,
    retry_key: char,
) -> bool {
    let message = match (&state.error, state.loading, has_data) {
        (Some(error), _, _) => Paragraph::new(vec![
            Line::from(Span::styled(error.as_str(), Style::default().fg(Color::Red))),
            Line::from(Span::styled(
                format!("press {} to retry", retry_key),
                Style::default().fg(Color::DarkGray),
            )),
        ]),
        (None, true, false) => {
            Paragraph::new("Loading...").style(Style::default().fg(Color::Cyan))
        }
        _ => return false,
    };

    frame.render_widget(
        message.alignment(Alignment::Center).wrap(Wrap { trim: true }),
        area,
    );
    true
}

/// Color for a water temperature (warmer = more red, cooler = more blue)
pub(crate) fn temperature_color(celsius: f64) -> Color {
    if celsius >= 27.0 {
        Color::Red
    } else if celsius >= 22.0 {
        Color::LightRed
    } else if celsius >= 18.0 {
        Color::Yellow
    } else if celsius >= 14.0 {
        Color::Green
    } else if celsius >= 10.0 {
        Color::Cyan
    } else {
        Color::Blue
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::dashboard::tests::populated_dashboard;
    use crate::refresh::RefreshConfig;
    use ratatui::{backend::TestBackend, Terminal};

    /// Flattens the rendered buffer into one string
    pub(crate) fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    pub(crate) fn draw<F>(width: u16, height: u16, render_fn: F) -> String
    where
        F: FnOnce(&mut Frame),
    {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(render_fn).unwrap();
        buffer_text(&terminal)
    }

    #[test]
    fn test_render_full_dashboard() {
        let dashboard = populated_dashboard();
        let content = draw(120, 40, |frame| render(frame, &dashboard));

        assert!(content.contains("Riverwatch"));
        assert!(content.contains("Forecast"));
        assert!(content.contains("E. coli"));
        assert!(content.contains("updated"));
    }

    #[test]
    fn test_render_degraded_dashboard_is_not_blank() {
        let dashboard = Dashboard::degraded(RefreshConfig::disabled());
        let content = draw(120, 40, |frame| render(frame, &dashboard));

        assert!(content.contains("Data unavailable"));
        assert!(content.contains("Weather forecast temporarily unavailable"));
        assert!(content.contains("Unable to load E. coli data"));
    }

    #[test]
    fn test_render_help_overlay_when_toggled() {
        let mut dashboard = populated_dashboard();
        dashboard.show_help = true;
        let content = draw(120, 40, |frame| render(frame, &dashboard));

        assert!(content.contains("Keyboard Shortcuts"));
    }

    #[test]
    fn test_render_small_terminal_does_not_panic() {
        let dashboard = populated_dashboard();
        draw(20, 8, |frame| render(frame, &dashboard));
    }

    #[test]
    fn test_render_status_prefers_error() {
        let state = FetchState {
            loading: false,
            error: Some("Unable to load E. coli data".to_string()),
        };
        let content = draw(60, 3, |frame| {
            let area = frame.area();
            assert!(render_status(frame, area, &state, false, 'e'));
        });
        assert!(content.contains("Unable to load E. coli data"));
        assert!(content.contains("press e to retry"));
    }

    #[test]
    fn test_render_status_loading_without_data() {
        let state = FetchState {
            loading: true,
            error: None,
        };
        let content = draw(40, 3, |frame| {
            let area = frame.area();
            assert!(render_status(frame, area, &state, false, 'e'));
        });
        assert!(content.contains("Loading"));
    }

    #[test]
    fn test_render_status_keeps_stale_data_while_loading() {
        let state = FetchState {
            loading: true,
            error: None,
        };
        draw(40, 3, |frame| {
            let area = frame.area();
            assert!(!render_status(frame, area, &state, true, 's'));
        });
    }

    #[test]
    fn test_temperature_color_bands() {
        assert_eq!(temperature_color(30.0), Color::Red);
        assert_eq!(temperature_color(12.0), Color::Cyan);
        assert_eq!(temperature_color(4.0), Color::Blue);
    }
}
