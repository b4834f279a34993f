//! # reltime-core
//!
//! Core library for reltime - self-refreshing relative timestamps.
//!
//! This library provides:
//! - [`RelativeDate`], a display that renders "5 minutes ago" for an optional
//!   instant and refreshes its reference time on a repeating timer
//! - Relative and absolute formatters for several locales
//! - Clock and timer abstractions with manual variants for tests
//! - Configuration management and logging infrastructure
//!
//! ## Example
//!
//! ```rust,no_run
//! use reltime_core::{Config, DateInput, RelativeDate, SystemClock, ThreadScheduler};
//!
//! let config = Config::load().expect("failed to load config");
//! let ctx = config.display.render_context().expect("invalid display config");
//!
//! let mut display = RelativeDate::mount(
//!     DateInput::Present(chrono::Utc::now()),
//!     SystemClock,
//!     &ThreadScheduler,
//!     config.display.refresh_interval(),
//! )
//! .expect("failed to start timer");
//!
//! display.refresh();
//! println!("{}", display.render(&ctx).text());
//! ```

// Re-export commonly used items at the crate root
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{Error, Result};
pub use format::{AbsoluteFormatter, DisplayZone, RelativeFormatter};
pub use input::DateInput;
pub use locale::Locale;
pub use relative_date::{render_date, DisplayState, RelativeDate, RenderContext, Rendered};
pub use timer::{ManualScheduler, Scheduler, ThreadScheduler, TimerHandle};

// Public modules
pub mod clock;
pub mod config;
pub mod error;
pub mod format;
pub mod input;
pub mod locale;
pub mod logging;
pub mod relative_date;
pub mod timer;
