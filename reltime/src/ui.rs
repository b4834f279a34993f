//! UI rendering for the TUI.

use std::time::Instant;

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use reltime_core::{Clock, Rendered, Scheduler};

use crate::app::App;
use crate::tooltip::{popup_area, Tooltip};

/// Color for relative phrases
const PHRASE_COLOR: Color = Color::Rgb(0, 180, 180);
/// Color for the "not available" placeholder
const PLACEHOLDER_COLOR: Color = Color::Rgb(120, 120, 120);
/// Color for the refresh column
const REFRESHED_COLOR: Color = Color::Rgb(100, 100, 100);

/// Rows above the first data row inside the table block (border + header)
const TABLE_HEADER_ROWS: u16 = 2;

/// Render the application UI.
pub fn render<S: Scheduler, C: Clock + Clone>(frame: &mut Frame, app: &mut App<S, C>) {
    let area = frame.area();

    // Layout: header, table, footer
    let chunks = Layout::vertical([
        Constraint::Length(2), // Header
        Constraint::Min(5),    // Table
        Constraint::Length(1), // Footer
    ])
    .split(area);

    render_header(frame, app, chunks[0]);
    render_table(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);
    render_tooltip(frame, app, chunks[1], Instant::now());
}

fn render_header<S: Scheduler, C: Clock + Clone>(frame: &mut Frame, app: &App<S, C>, area: Rect) {
    let title = format!(
        " reltime  locale {}  zone {}",
        app.ctx.locale, app.ctx.zone
    );
    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).bold())
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}

fn render_table<S: Scheduler, C: Clock + Clone>(frame: &mut Frame, app: &mut App<S, C>, area: Rect) {
    let header_cells = ["Name", "When", "Refreshed"]
        .into_iter()
        .map(|h| Cell::from(h).style(Style::default().fg(Color::Yellow).bold()));
    let header = Row::new(header_cells).height(1);

    let rendered = app.rendered_rows();
    let rows = app.entries.iter().zip(rendered).map(|(entry, rendered)| {
        let when = match rendered {
            Rendered::Placeholder { text } => {
                Cell::from(text).style(Style::default().fg(PLACEHOLDER_COLOR))
            }
            Rendered::Tooltip { content, .. } => {
                Cell::from(content).style(Style::default().fg(PHRASE_COLOR))
            }
        };
        let refreshed = app
            .ctx
            .zone
            .format(entry.display.reference_time(), "%H:%M:%S");

        Row::new([
            Cell::from(entry.name.as_str()),
            when,
            Cell::from(refreshed).style(Style::default().fg(REFRESHED_COLOR)),
        ])
    });

    let widths = [
        Constraint::Fill(1),    // Name (flexible)
        Constraint::Length(24), // When
        Constraint::Length(10), // Refreshed
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" Dates "),
        )
        .row_highlight_style(
            Style::default()
                .add_modifier(Modifier::REVERSED)
                .fg(Color::Cyan),
        )
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

/// Draw the open tooltip under its row.
fn render_tooltip<S: Scheduler, C: Clock + Clone>(
    frame: &mut Frame,
    app: &App<S, C>,
    table_area: Rect,
    now: Instant,
) {
    let Some((index, label)) = app.open_tooltip(now) else {
        return;
    };

    // Rows scrolled out of view have no anchor
    let offset = app.table_state.offset();
    if index < offset {
        return;
    }
    let row_y = table_area.y + TABLE_HEADER_ROWS + (index - offset) as u16;
    if row_y >= table_area.bottom().saturating_sub(1) {
        return;
    }

    let anchor = Rect::new(table_area.x + 3, row_y, table_area.width.saturating_sub(4), 1);
    let tooltip = Tooltip::new(&label);
    let area = popup_area(anchor, tooltip.width(), frame.area());
    frame.render_widget(tooltip, area);
}

fn render_footer<S: Scheduler, C: Clock + Clone>(frame: &mut Frame, app: &App<S, C>, area: Rect) {
    let count = app.entries.len();
    let selected = app.table_state.selected().map(|i| i + 1).unwrap_or(0);

    let footer_spans = vec![
        Span::styled(" j/k", Style::default().fg(Color::Yellow)),
        Span::raw(" navigate  "),
        Span::styled("n", Style::default().fg(Color::Yellow)),
        Span::raw(" add now  "),
        Span::styled("a", Style::default().fg(Color::Yellow)),
        Span::raw(" add missing  "),
        Span::styled("d", Style::default().fg(Color::Yellow)),
        Span::raw(" remove  "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" quit  "),
        Span::raw("│ "),
        Span::styled(
            format!("{}/{} dates  {} refreshes", selected, count, app.refreshes),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    frame.render_widget(Paragraph::new(Line::from(footer_spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ratatui::{backend::TestBackend, Terminal};
    use reltime_core::{DisplayZone, ManualClock, ManualScheduler, RenderContext};
    use std::time::Duration;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_render_shows_phrases_and_placeholder() {
        let start = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let ctx = RenderContext {
            zone: DisplayZone::Utc,
            tooltip_delay: Duration::from_secs(3600),
            ..RenderContext::default()
        };
        let mut app = App::with_parts(
            ctx,
            Duration::from_secs(60),
            ManualScheduler::new(),
            ManualClock::new(start),
        );
        app.add_demo_entries().unwrap();

        let mut terminal = Terminal::new(TestBackend::new(80, 16)).unwrap();
        terminal.draw(|frame| render(frame, &mut app)).unwrap();
        let text = buffer_text(&terminal);

        assert!(text.contains("5 minutes ago"));
        assert!(text.contains("in 2 days"));
        assert!(text.contains("N/A"));
        assert!(text.contains("12:00:00"));
        assert!(text.contains("1/6 dates"));
    }

    #[test]
    fn test_render_shows_open_tooltip() {
        let start = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let ctx = RenderContext {
            zone: DisplayZone::Utc,
            tooltip_delay: Duration::ZERO,
            ..RenderContext::default()
        };
        let mut app = App::with_parts(
            ctx,
            Duration::from_secs(60),
            ManualScheduler::new(),
            ManualClock::new(start),
        );
        app.add_demo_entries().unwrap();
        app.tick(Instant::now());

        let mut terminal = Terminal::new(TestBackend::new(80, 16)).unwrap();
        terminal.draw(|frame| render(frame, &mut app)).unwrap();

        assert!(buffer_text(&terminal).contains("10/18/2026, 11:59:30 AM"));
    }
}
