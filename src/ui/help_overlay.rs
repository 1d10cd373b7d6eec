//! Help overlay listing the key bindings, including the per-source retry keys

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use super::{key_line, panel};

const HELP_WIDTH: u16 = 46;
const HELP_HEIGHT: u16 = 21;

type Section = (&'static str, &'static [(&'static str, &'static str)]);

const SECTIONS: [Section; 3] = [
    (
        "Sites",
        &[("←/h, →/l", "Previous/next site"), ("Tab", "Next site")],
    ),
    (
        "Data",
        &[
            ("s", "Retry water temperature"),
            ("w", "Retry weather forecast"),
            ("e", "Retry E. coli readings"),
            ("r", "Reload everything"),
        ],
    ),
    (
        "Other",
        &[
            ("?", "Toggle this help"),
            ("Esc", "Close help / Quit"),
            ("q", "Quit application"),
        ],
    ),
];

/// Centers the overlay, shrinking it to fit small terminals
fn overlay_area(area: Rect) -> Rect {
    let width = HELP_WIDTH.min(area.width);
    let height = HELP_HEIGHT.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn help_lines() -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for (title, bindings) in SECTIONS {
        lines.push(Line::from(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.extend(bindings.iter().map(|(key, action)| key_line(key, action)));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        "Press Esc or ? to close",
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

/// Renders the help overlay on top of the current view
pub fn render(frame: &mut Frame) {
    let area = overlay_area(frame.area());
    frame.render_widget(Clear, area);

    let block = panel("Help").border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(Paragraph::new(help_lines()).block(block), area);
}
