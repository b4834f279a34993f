//! reltime - self-refreshing relative timestamps
//!
//! Shows "5 minutes ago"-style labels that keep themselves current, with the
//! absolute date and time available as a tooltip.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Logs: $XDG_STATE_HOME/reltime/reltime.log (~/.local/state/reltime/reltime.log)
//! - Config: $XDG_CONFIG_HOME/reltime/config.toml (~/.config/reltime/config.toml)

mod app;
mod tooltip;
mod ui;

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use reltime_core::config::DisplayConfig;
use reltime_core::{
    render_date, Clock, Config, DateInput, RelativeDate, RenderContext, Rendered, SystemClock,
    ThreadScheduler,
};

use crate::app::App;

#[derive(Parser)]
#[command(name = "reltime")]
#[command(about = "Self-refreshing relative timestamps")]
#[command(version)]
struct Args {
    /// Config file (defaults to $XDG_CONFIG_HOME/reltime/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Display locale (en, fr, de, es)
    #[arg(long, global = true)]
    locale: Option<String>,

    /// Display timezone: local, utc, or an offset like +02:00
    #[arg(long, global = true)]
    timezone: Option<String>,

    /// Seconds between reference time refreshes
    #[arg(long, global = true)]
    interval_secs: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive table of self-refreshing dates (default)
    Watch {
        /// Dates to show; a demo set is used when none are given
        #[arg(allow_hyphen_values = true)]
        dates: Vec<String>,
    },
    /// Render one date and exit
    Print {
        /// Date to render; omit for the "not available" placeholder
        #[arg(allow_hyphen_values = true)]
        date: Option<String>,

        /// Reference time to render against (defaults to now)
        #[arg(long)]
        now: Option<String>,

        /// Emit JSON instead of tab-separated text
        #[arg(long)]
        json: bool,
    },
    /// Keep printing one date each time it refreshes, until Ctrl+C
    Follow {
        /// Date to follow; omit for the "not available" placeholder
        #[arg(allow_hyphen_values = true)]
        date: Option<String>,
    },
}

/// Display settings after config file and command-line overrides.
struct Settings {
    display: DisplayConfig,
    ctx: RenderContext,
}

impl Settings {
    fn parse_date(&self, text: Option<&str>) -> Result<DateInput> {
        match text {
            Some(text) => DateInput::parse(text, self.ctx.zone)
                .with_context(|| format!("failed to parse date {text:?}")),
            None => Ok(DateInput::Absent),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("failed to load configuration")?;

    // Initialize logging (to file, not stdout since output is the product)
    let _log_guard = reltime_core::logging::init(&config.logging).with_context(|| {
        format!(
            "failed to initialize logging at {}",
            reltime_core::logging::log_file_path().display()
        )
    })?;

    let settings = resolve_settings(config.display, &args)?;
    tracing::info!(
        locale = %settings.ctx.locale,
        zone = %settings.ctx.zone,
        interval_secs = settings.display.refresh_interval_secs,
        "reltime starting"
    );

    match args.command {
        Some(Command::Print { date, now, json }) => {
            run_print(&settings, date.as_deref(), now.as_deref(), json)
        }
        Some(Command::Follow { date }) => run_follow(&settings, date.as_deref()),
        Some(Command::Watch { dates }) => run_watch(&settings, &dates),
        None => run_watch(&settings, &[]),
    }
}

/// Apply command-line overrides on top of the config file.
fn resolve_settings(mut display: DisplayConfig, args: &Args) -> Result<Settings> {
    if let Some(locale) = &args.locale {
        display.locale = locale.clone();
    }
    if let Some(timezone) = &args.timezone {
        display.timezone = timezone.clone();
    }
    if let Some(secs) = args.interval_secs {
        display.refresh_interval_secs = secs;
    }

    display.validate().context("invalid display settings")?;
    let ctx = display
        .render_context()
        .context("invalid display settings")?;

    Ok(Settings { display, ctx })
}

/// Format rendered output as a single line.
fn render_line(rendered: &Rendered) -> String {
    match rendered {
        Rendered::Placeholder { text } => text.clone(),
        Rendered::Tooltip { label, content, .. } => format!("{content}\t{label}"),
    }
}

fn run_print(settings: &Settings, date: Option<&str>, now: Option<&str>, json: bool) -> Result<()> {
    let input = settings.parse_date(date)?;

    let reference = match now {
        Some(text) => settings
            .parse_date(Some(text))?
            .instant()
            .context("--now needs an actual date")?,
        None => SystemClock.now(),
    };

    let rendered = render_date(&input, reference, &settings.ctx);
    if json {
        println!("{}", rendered.to_json().context("failed to serialize output")?);
    } else {
        println!("{}", render_line(&rendered));
    }
    Ok(())
}

fn run_follow(settings: &Settings, date: Option<&str>) -> Result<()> {
    let input = settings.parse_date(date)?;

    // Set up signal handler for graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("failed to set Ctrl+C handler")?;

    let mut date_display = RelativeDate::mount(
        input,
        SystemClock,
        &ThreadScheduler,
        settings.display.refresh_interval(),
    )
    .context("failed to start refresh timer")?;

    println!("{}", render_line(&date_display.render(&settings.ctx)));

    while running.load(Ordering::SeqCst) {
        if date_display.wait_and_refresh(Duration::from_millis(200)) > 0 {
            println!("{}", render_line(&date_display.render(&settings.ctx)));
        }
    }

    tracing::info!(updates = date_display.updates(), "Follow stopped");
    date_display.unmount();
    Ok(())
}

fn run_watch(settings: &Settings, dates: &[String]) -> Result<()> {
    let mut app = App::new(settings.ctx, settings.display.refresh_interval());

    if dates.is_empty() {
        app.add_demo_entries().context("failed to mount demo dates")?;
    } else {
        for text in dates {
            let input = settings.parse_date(Some(text))?;
            app.add_entry(text.clone(), input)?;
        }
        app.table_state.select(Some(0));
    }

    // Setup terminal
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;

    tracing::info!(refreshes = app.refreshes, "reltime shutting down");

    result
}

/// Run the main application loop.
fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        app.tick(Instant::now());

        // Render
        terminal.draw(|frame| ui::render(frame, app))?;

        // Handle events
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_render_line() {
        let placeholder = Rendered::Placeholder {
            text: "N/A".to_string(),
        };
        assert_eq!(render_line(&placeholder), "N/A");

        let tooltip = Rendered::Tooltip {
            label: "10/18/2026, 3:04:05 PM".to_string(),
            open_delay: Duration::from_millis(500),
            content: "an hour ago".to_string(),
        };
        assert_eq!(render_line(&tooltip), "an hour ago\t10/18/2026, 3:04:05 PM");
    }

    #[test]
    fn test_overrides_apply_on_top_of_config() {
        let args = Args::parse_from([
            "reltime",
            "--locale",
            "fr",
            "--timezone",
            "utc",
            "--interval-secs",
            "5",
            "print",
        ]);
        let settings = resolve_settings(DisplayConfig::default(), &args).unwrap();
        assert_eq!(settings.ctx.locale, reltime_core::Locale::Fr);
        assert_eq!(settings.display.refresh_interval(), Duration::from_secs(5));

        let input = settings.parse_date(Some("2026-10-18 10:00")).unwrap();
        assert_eq!(
            input.instant().unwrap(),
            chrono::Utc.with_ymd_and_hms(2026, 10, 18, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_zero_interval_override_is_rejected() {
        let args = Args::parse_from(["reltime", "--interval-secs", "0"]);
        assert!(resolve_settings(DisplayConfig::default(), &args).is_err());
    }
}
