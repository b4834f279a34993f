//! The self-refreshing relative date display.
//!
//! A [`RelativeDate`] owns a reference time and a repeating timer. Each timer
//! firing moves the reference time to the clock's current time, so the
//! rendered phrase ("3 minutes ago") stays fresh to within one refresh
//! interval. Rendering itself is a pure function of the input, the reference
//! time and a [`RenderContext`].

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::format::{AbsoluteFormatter, DisplayZone, RelativeFormatter};
use crate::input::DateInput;
use crate::locale::Locale;
use crate::timer::{Scheduler, TimerHandle};

/// Default refresh period for a mounted display
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Default delay before a tooltip opens
pub const DEFAULT_TOOLTIP_DELAY: Duration = Duration::from_millis(500);

/// Presentation settings shared by every display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    pub locale: Locale,
    pub zone: DisplayZone,
    pub tooltip_delay: Duration,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            zone: DisplayZone::default(),
            tooltip_delay: DEFAULT_TOOLTIP_DELAY,
        }
    }
}

impl RenderContext {
    pub fn relative(&self) -> RelativeFormatter {
        RelativeFormatter::new(self.locale)
    }

    pub fn absolute(&self) -> AbsoluteFormatter {
        AbsoluteFormatter::new(self.locale, self.zone)
    }
}

/// Output of one render pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Rendered {
    /// No date: the localized "not available" text
    Placeholder { text: String },
    /// A relative phrase wrapped in a tooltip carrying the absolute time
    Tooltip {
        /// Absolute date-time shown on hover/focus
        label: String,
        #[serde(rename = "open_delay_ms", serialize_with = "serialize_millis")]
        open_delay: Duration,
        /// Relative phrase shown inline
        content: String,
    },
}

fn serialize_millis<S: Serializer>(delay: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(delay.as_millis() as u64)
}

impl Rendered {
    /// The text shown inline.
    pub fn text(&self) -> &str {
        match self {
            Rendered::Placeholder { text } => text,
            Rendered::Tooltip { content, .. } => content,
        }
    }

    /// The tooltip label, if any.
    pub fn tooltip_label(&self) -> Option<&str> {
        match self {
            Rendered::Placeholder { .. } => None,
            Rendered::Tooltip { label, .. } => Some(label),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Render `input` relative to `reference`.
pub fn render_date(input: &DateInput, reference: DateTime<Utc>, ctx: &RenderContext) -> Rendered {
    match input {
        DateInput::Absent => Rendered::Placeholder {
            text: ctx.locale.catalog().not_available.to_string(),
        },
        DateInput::Present(instant) => Rendered::Tooltip {
            label: ctx.absolute().format(*instant),
            open_delay: ctx.tooltip_delay,
            content: ctx.relative().format(*instant, reference),
        },
    }
}

/// State a mounted display renders from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayState {
    /// The "now" relative phrases are computed against
    pub reference_time: DateTime<Utc>,
    /// The instant being described
    pub input_date: DateInput,
}

/// A mounted relative date display.
///
/// Mounting registers exactly one repeating timer; dropping the display (or
/// calling [`RelativeDate::unmount`]) cancels it.
#[derive(Debug)]
pub struct RelativeDate<C: Clock = SystemClock> {
    state: DisplayState,
    clock: C,
    timer: TimerHandle,
    updates: u64,
}

impl<C: Clock> RelativeDate<C> {
    /// Mount a display, capturing the reference time and starting its timer.
    pub fn mount<S: Scheduler + ?Sized>(
        input: DateInput,
        clock: C,
        scheduler: &S,
        refresh_interval: Duration,
    ) -> Result<Self> {
        let timer = scheduler.every(refresh_interval)?;
        let reference_time = clock.now();

        tracing::debug!(
            timer_id = timer.id(),
            period_ms = timer.period().as_millis() as u64,
            present = input.is_present(),
            "Relative date mounted"
        );

        Ok(Self {
            state: DisplayState {
                reference_time,
                input_date: input,
            },
            clock,
            timer,
            updates: 0,
        })
    }

    /// Replace the displayed instant. The reference time is untouched.
    pub fn set_input(&mut self, input: DateInput) {
        self.state.input_date = input;
    }

    pub fn reference_time(&self) -> DateTime<Utc> {
        self.state.reference_time
    }

    /// Number of timer firings applied since mount.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn timer_id(&self) -> u64 {
        self.timer.id()
    }

    /// Apply pending timer firings.
    ///
    /// Firings that queued up since the last call collapse into a single
    /// clock read. Returns the number of firings applied.
    pub fn refresh(&mut self) -> usize {
        let ticks = self.timer.take_ticks();
        if ticks > 0 {
            self.state.reference_time = self.clock.now();
            self.updates += ticks as u64;
            tracing::trace!(
                timer_id = self.timer.id(),
                ticks,
                reference_time = %self.state.reference_time,
                "Reference time refreshed"
            );
        }
        ticks
    }

    /// Block up to `timeout` for the next firing, then apply it.
    pub fn wait_and_refresh(&mut self, timeout: Duration) -> usize {
        if self.timer.wait_tick(timeout) {
            self.state.reference_time = self.clock.now();
            self.updates += 1;
            1 + self.refresh()
        } else {
            0
        }
    }

    pub fn render(&self, ctx: &RenderContext) -> Rendered {
        render_date(&self.state.input_date, self.state.reference_time, ctx)
    }

    /// Unmount, cancelling the timer before returning.
    pub fn unmount(self) {
        let timer_id = self.timer.id();
        drop(self);
        tracing::debug!(timer_id, "Relative date unmounted");
    }
}
