//! Temperature sparkline widget for the site tiles

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Block characters for different temperature levels (8 levels)
const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// A one-row sparkline of a temperature series
///
/// The series is split into as many buckets as the area is wide and each
/// bucket is drawn at its maximum, so a week of readings fits a tile.
pub struct TemperatureSparkline<'a> {
    /// Readings in chronological order
    values: &'a [f64],
    /// Style for the sparkline
    style: Style,
    /// Style for the most recent bucket
    marker_style: Style,
}

impl<'a> TemperatureSparkline<'a> {
    pub fn new(values: &'a [f64]) -> Self {
        Self {
            values,
            style: Style::default().fg(Color::Cyan),
            marker_style: Style::default().fg(Color::Yellow),
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Maximum of each of `width` consecutive buckets
    fn buckets(&self, width: usize) -> Vec<f64> {
        if self.values.is_empty() || width == 0 {
            return Vec::new();
        }
        if self.values.len() <= width {
            return self.values.to_vec();
        }

        (0..width)
            .map(|i| {
                let start = i * self.values.len() / width;
                let end = ((i + 1) * self.values.len() / width).max(start + 1);
                self.values[start..end]
                    .iter()
                    .copied()
                    .fold(f64::NEG_INFINITY, f64::max)
            })
            .collect()
    }

    fn value_to_block(value: f64, min: f64, max: f64) -> char {
        let span = max - min;
        if span <= f64::EPSILON {
            return BLOCKS[3];
        }
        let normalized = ((value - min) / span).clamp(0.0, 1.0);
        let index = ((normalized * 7.0).round() as usize).min(7);
        BLOCKS[index]
    }
}

impl<'a> Widget for TemperatureSparkline<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let buckets = self.buckets(area.width as usize);
        let min = buckets.iter().copied().fold(f64::INFINITY, f64::min);
        let max = buckets.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let last = buckets.len().saturating_sub(1);

        for (i, value) in buckets.iter().enumerate() {
            let block = Self::value_to_block(*value, min, max);
            let x = area.x + i as u16;
            let y = area.y;

            let style = if i == last {
                self.marker_style
            } else {
                self.style
            };

            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_char(block).set_style(style);
            }
        }
    }
}
