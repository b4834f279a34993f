//! Delayed tooltip for the terminal UI.
//!
//! A tooltip opens once its target has held focus for the open delay. Moving
//! focus to another target restarts the delay.

use std::time::{Duration, Instant};

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

/// Border color for tooltip popups
const BORDER_TOOLTIP: Color = Color::Rgb(0, 150, 150);

/// Focus tracking for a single tooltip.
#[derive(Debug, Clone, Copy, Default)]
pub struct TooltipState {
    target: Option<usize>,
    since: Option<Instant>,
}

impl TooltipState {
    /// Record which target holds focus at `now`.
    pub fn focus(&mut self, target: Option<usize>, now: Instant) {
        if self.target != target {
            self.target = target;
            self.since = target.map(|_| now);
        }
    }

    /// Drop focus entirely.
    pub fn reset(&mut self) {
        self.target = None;
        self.since = None;
    }

    /// The target whose tooltip is open at `now`, if any.
    pub fn open_target(&self, delay: Duration, now: Instant) -> Option<usize> {
        match (self.target, self.since) {
            (Some(target), Some(since)) if now.saturating_duration_since(since) >= delay => {
                Some(target)
            }
            _ => None,
        }
    }
}

/// Popup showing a tooltip label.
pub struct Tooltip<'a> {
    label: &'a str,
}

impl<'a> Tooltip<'a> {
    pub fn new(label: &'a str) -> Self {
        Self { label }
    }

    /// Width needed to show the label with borders and padding.
    pub fn width(&self) -> u16 {
        let chars = self.label.chars().count().min(u16::MAX as usize - 4) as u16;
        chars + 4
    }
}

impl Widget for Tooltip<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        Paragraph::new(format!(" {} ", self.label))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(BORDER_TOOLTIP)),
            )
            .render(area, buf);
    }
}

/// Place a popup of `width` next to `anchor`, preferring the line below it
/// and staying within `bounds`.
pub fn popup_area(anchor: Rect, width: u16, bounds: Rect) -> Rect {
    const HEIGHT: u16 = 3;

    let width = width.min(bounds.width);
    let height = HEIGHT.min(bounds.height);

    let below = anchor.y.saturating_add(anchor.height);
    let y = if below.saturating_add(height) <= bounds.bottom() {
        below
    } else {
        anchor.y.saturating_sub(height).max(bounds.y)
    };

    let max_x = bounds.right().saturating_sub(width);
    let x = anchor.x.clamp(bounds.x, max_x.max(bounds.x));

    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(500);

    #[test]
    fn test_opens_after_delay() {
        let start = Instant::now();
        let mut state = TooltipState::default();
        state.focus(Some(2), start);

        assert_eq!(state.open_target(DELAY, start), None);
        assert_eq!(state.open_target(DELAY, start + Duration::from_millis(499)), None);
        assert_eq!(state.open_target(DELAY, start + DELAY), Some(2));
    }

    #[test]
    fn test_refocus_same_target_keeps_timer() {
        let start = Instant::now();
        let mut state = TooltipState::default();
        state.focus(Some(1), start);
        state.focus(Some(1), start + Duration::from_millis(400));
        assert_eq!(state.open_target(DELAY, start + DELAY), Some(1));
    }

    #[test]
    fn test_moving_focus_restarts_delay() {
        let start = Instant::now();
        let mut state = TooltipState::default();
        state.focus(Some(0), start);
        state.focus(Some(1), start + DELAY);

        assert_eq!(state.open_target(DELAY, start + DELAY), None);
        assert_eq!(state.open_target(DELAY, start + DELAY * 2), Some(1));

        state.reset();
        assert_eq!(state.open_target(DELAY, start + DELAY * 10), None);
    }

    #[test]
    fn test_popup_prefers_below_anchor() {
        let bounds = Rect::new(0, 0, 80, 24);
        let anchor = Rect::new(2, 5, 60, 1);
        assert_eq!(popup_area(anchor, 30, bounds), Rect::new(2, 6, 30, 3));
    }

    #[test]
    fn test_popup_flips_above_and_clamps() {
        let bounds = Rect::new(0, 0, 40, 24);
        let anchor = Rect::new(20, 22, 20, 1);
        assert_eq!(popup_area(anchor, 30, bounds), Rect::new(10, 19, 30, 3));
    }

    #[test]
    fn test_tooltip_width_includes_borders() {
        assert_eq!(Tooltip::new("10/18/2026, 3:04:05 PM").width(), 26);
    }
}
