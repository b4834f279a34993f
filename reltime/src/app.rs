//! Application state for the TUI.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::widgets::TableState;
use reltime_core::{
    Clock, DateInput, RelativeDate, RenderContext, Rendered, Scheduler, SystemClock,
    ThreadScheduler,
};

use crate::tooltip::TooltipState;

/// One row of the table: a named, mounted relative date.
pub struct Entry<C: Clock> {
    /// Text shown in the name column
    pub name: String,
    /// The mounted display
    pub display: RelativeDate<C>,
}

/// Main application state.
pub struct App<S: Scheduler = ThreadScheduler, C: Clock + Clone = SystemClock> {
    /// Mounted displays, one per row
    pub entries: Vec<Entry<C>>,
    /// Table selection state
    pub table_state: TableState,
    /// Tooltip focus for the selected row
    pub tooltip: TooltipState,
    /// Shared presentation settings
    pub ctx: RenderContext,
    /// Timer firings applied across all rows
    pub refreshes: u64,
    /// Whether the app should exit
    pub should_quit: bool,
    scheduler: S,
    clock: C,
    refresh_interval: Duration,
}

impl App {
    /// Create an app backed by the system clock and thread timers.
    pub fn new(ctx: RenderContext, refresh_interval: Duration) -> Self {
        App::with_parts(ctx, refresh_interval, ThreadScheduler, SystemClock)
    }
}

impl<S: Scheduler, C: Clock + Clone> App<S, C> {
    pub fn with_parts(ctx: RenderContext, refresh_interval: Duration, scheduler: S, clock: C) -> Self {
        Self {
            entries: Vec::new(),
            table_state: TableState::default(),
            tooltip: TooltipState::default(),
            ctx,
            refreshes: 0,
            should_quit: false,
            scheduler,
            clock,
            refresh_interval,
        }
    }

    /// Mount a new row and select it.
    pub fn add_entry(&mut self, name: impl Into<String>, input: DateInput) -> Result<()> {
        let display = RelativeDate::mount(
            input,
            self.clock.clone(),
            &self.scheduler,
            self.refresh_interval,
        )
        .context("failed to start refresh timer")?;

        self.entries.push(Entry {
            name: name.into(),
            display,
        });
        self.table_state.select(Some(self.entries.len() - 1));
        Ok(())
    }

    /// Populate rows showing a spread of past and future offsets.
    pub fn add_demo_entries(&mut self) -> Result<()> {
        let now = self.clock.now();
        let demo = [
            ("30 seconds ago", DateInput::Present(now - chrono::Duration::seconds(30))),
            ("5 minutes ago", DateInput::Present(now - chrono::Duration::minutes(5))),
            ("1 hour ago", DateInput::Present(now - chrono::Duration::hours(1))),
            ("3 days ago", DateInput::Present(now - chrono::Duration::days(3))),
            ("2 days ahead", DateInput::Present(now + chrono::Duration::days(2))),
            ("missing", DateInput::Absent),
        ];
        for (name, input) in demo {
            self.add_entry(name, input)?;
        }
        self.table_state.select(Some(0));
        Ok(())
    }

    /// Unmount the selected row, cancelling its timer.
    pub fn remove_selected(&mut self) {
        let Some(index) = self.table_state.selected() else {
            return;
        };
        if index >= self.entries.len() {
            return;
        }

        let entry = self.entries.remove(index);
        tracing::debug!(name = %entry.name, "Removing entry");
        entry.display.unmount();

        // The same index now points at another entry, so its delay starts over.
        self.tooltip.reset();

        if self.entries.is_empty() {
            self.table_state.select(None);
        } else {
            self.table_state
                .select(Some(index.min(self.entries.len() - 1)));
        }
    }

    /// Apply pending timer firings and update tooltip focus.
    pub fn tick(&mut self, now: Instant) {
        for entry in &mut self.entries {
            self.refreshes += entry.display.refresh() as u64;
        }
        self.tooltip.focus(self.table_state.selected(), now);
    }

    /// Render every row against its own reference time.
    pub fn rendered_rows(&self) -> Vec<Rendered> {
        self.entries
            .iter()
            .map(|entry| entry.display.render(&self.ctx))
            .collect()
    }

    /// Index and label of the tooltip open at `now`, if any.
    pub fn open_tooltip(&self, now: Instant) -> Option<(usize, String)> {
        let index = self.tooltip.open_target(self.ctx.tooltip_delay, now)?;
        let entry = self.entries.get(index)?;
        entry
            .display
            .render(&self.ctx)
            .tooltip_label()
            .map(|label| (index, label.to_string()))
    }

    /// Handle keyboard input.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.select_next();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.select_previous();
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.select_first();
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.select_last();
            }
            KeyCode::Char('n') => {
                let now = self.clock.now();
                let name = format!("added {}", self.ctx.zone.format(now, "%H:%M:%S"));
                if let Err(e) = self.add_entry(name, DateInput::Present(now)) {
                    tracing::warn!(error = %e, "Failed to add entry");
                }
            }
            KeyCode::Char('a') => {
                if let Err(e) = self.add_entry("missing", DateInput::Absent) {
                    tracing::warn!(error = %e, "Failed to add entry");
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                self.remove_selected();
            }
            _ => {}
        }
    }

    /// Select the next row in the table.
    fn select_next(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i >= self.entries.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    /// Select the previous row in the table.
    fn select_previous(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) | None => self.entries.len() - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    fn select_first(&mut self) {
        if !self.entries.is_empty() {
            self.table_state.select(Some(0));
        }
    }

    fn select_last(&mut self) {
        if !self.entries.is_empty() {
            self.table_state.select(Some(self.entries.len() - 1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use crossterm::event::KeyModifiers;
    use reltime_core::{DisplayZone, ManualClock, ManualScheduler};

    const MINUTE: Duration = Duration::from_secs(60);

    fn test_app() -> (App<ManualScheduler, ManualClock>, ManualScheduler, ManualClock) {
        let start = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let scheduler = ManualScheduler::new();
        let clock = ManualClock::new(start);
        let ctx = RenderContext {
            zone: DisplayZone::Utc,
            ..RenderContext::default()
        };
        let app = App::with_parts(ctx, MINUTE, scheduler.clone(), clock.clone());
        (app, scheduler, clock)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_demo_entries_mount_one_timer_each() {
        let (mut app, scheduler, _clock) = test_app();
        app.add_demo_entries().unwrap();

        assert_eq!(app.entries.len(), 6);
        assert_eq!(scheduler.active_timers(), 6);
        assert_eq!(app.table_state.selected(), Some(0));

        let texts: Vec<String> = app
            .rendered_rows()
            .iter()
            .map(|r| r.text().to_string())
            .collect();
        assert_eq!(
            texts,
            [
                "a few seconds ago",
                "5 minutes ago",
                "an hour ago",
                "3 days ago",
                "in 2 days",
                "N/A"
            ]
        );
    }

    #[test]
    fn test_tick_refreshes_every_row() {
        let (mut app, scheduler, clock) = test_app();
        app.add_demo_entries().unwrap();

        clock.advance(chrono::Duration::minutes(10));
        scheduler.advance(MINUTE);
        app.tick(Instant::now());

        assert_eq!(app.refreshes, 6);
        assert_eq!(app.rendered_rows()[1].text(), "15 minutes ago");
    }

    #[test]
    fn test_remove_unmounts_selected() {
        let (mut app, scheduler, _clock) = test_app();
        app.add_demo_entries().unwrap();

        app.handle_key(key(KeyCode::Char('G')));
        app.handle_key(key(KeyCode::Char('d')));

        assert_eq!(app.entries.len(), 5);
        assert_eq!(scheduler.active_timers(), 5);
        assert_eq!(app.table_state.selected(), Some(4));

        for _ in 0..10 {
            app.handle_key(key(KeyCode::Delete));
        }
        assert!(app.entries.is_empty());
        assert_eq!(scheduler.active_timers(), 0);
        assert_eq!(app.table_state.selected(), None);
    }

    #[test]
    fn test_navigation_wraps() {
        let (mut app, _scheduler, _clock) = test_app();
        app.add_demo_entries().unwrap();

        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.table_state.selected(), Some(5));
        app.handle_key(key(KeyCode::Char('j')));
        assert_eq!(app.table_state.selected(), Some(0));
    }

    #[test]
    fn test_add_keys_append_entries() {
        let (mut app, scheduler, _clock) = test_app();
        app.handle_key(key(KeyCode::Char('a')));
        app.handle_key(key(KeyCode::Char('n')));

        assert_eq!(scheduler.active_timers(), 2);
        let rows = app.rendered_rows();
        assert_eq!(rows[0].text(), "N/A");
        assert_eq!(rows[1].text(), "a few seconds ago");
        assert_eq!(app.table_state.selected(), Some(1));
    }

    #[test]
    fn test_tooltip_opens_after_delay_for_present_dates() {
        let (mut app, _scheduler, _clock) = test_app();
        app.add_demo_entries().unwrap();
        let start = Instant::now();

        app.tick(start);
        assert_eq!(app.open_tooltip(start), None);

        let later = start + app.ctx.tooltip_delay;
        let (index, label) = app.open_tooltip(later).unwrap();
        assert_eq!(index, 0);
        assert_eq!(label, "10/18/2026, 11:59:30 AM");

        // Absent rows have nothing to disclose
        app.handle_key(key(KeyCode::Char('G')));
        app.tick(later);
        assert_eq!(app.open_tooltip(later + app.ctx.tooltip_delay), None);
    }

    #[test]
    fn test_delete_restarts_tooltip_delay() {
        let (mut app, _scheduler, _clock) = test_app();
        app.add_demo_entries().unwrap();
        let start = Instant::now();
        let delay = app.ctx.tooltip_delay;

        app.tick(start);
        let (_, label) = app.open_tooltip(start + delay).unwrap();
        assert_eq!(label, "10/18/2026, 11:59:30 AM");

        // Row 0 is now a different entry and must wait out its own delay
        app.handle_key(key(KeyCode::Char('d')));
        app.tick(start + delay);
        assert_eq!(app.table_state.selected(), Some(0));
        assert_eq!(app.open_tooltip(start + delay), None);

        let (index, label) = app.open_tooltip(start + delay * 2).unwrap();
        assert_eq!(index, 0);
        assert_eq!(label, "10/18/2026, 11:55:00 AM");
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, _scheduler, _clock) = test_app();
        app.handle_key(key(KeyCode::Esc));
        assert!(app.should_quit);
    }
}
