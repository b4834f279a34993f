//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/reltime/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/reltime/` (~/.config/reltime/)
//! - State/Logs: `$XDG_STATE_HOME/reltime/` (~/.local/state/reltime/)

use crate::error::{Error, Result};
use crate::format::DisplayZone;
use crate::locale::Locale;
use crate::relative_date::RenderContext;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// How relative dates are displayed
    #[serde(default)]
    pub display: DisplayConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Display configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    /// Language tag (e.g. "en", "fr-FR")
    #[serde(default = "default_locale")]
    pub locale: String,

    /// "local", "utc", or a fixed offset such as "+02:00"
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Seconds between reference time refreshes
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Milliseconds of hover/focus before a tooltip opens
    #[serde(default = "default_tooltip_delay")]
    pub tooltip_delay_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            timezone: default_timezone(),
            refresh_interval_secs: default_refresh_interval(),
            tooltip_delay_ms: default_tooltip_delay(),
        }
    }
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_timezone() -> String {
    "local".to_string()
}

fn default_refresh_interval() -> u64 {
    60
}

fn default_tooltip_delay() -> u64 {
    500
}

impl DisplayConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval_secs == 0 {
            return Err(Error::Config(
                "display.refresh_interval_secs must be greater than 0".to_string(),
            ));
        }
        self.zone()?;
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Resolved locale; unknown tags fall back to English.
    pub fn locale(&self) -> Locale {
        Locale::from_tag_or_default(&self.locale)
    }

    pub fn zone(&self) -> Result<DisplayZone> {
        self.timezone.parse().map_err(|_| {
            Error::Config(format!(
                "display.timezone must be local, utc, or an offset like +02:00 (got {:?})",
                self.timezone
            ))
        })
    }

    /// Build the render context used by every display.
    pub fn render_context(&self) -> Result<RenderContext> {
        Ok(RenderContext {
            locale: self.locale(),
            zone: self.zone()?,
            tooltip_delay: Duration::from_millis(self.tooltip_delay_ms),
        })
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.display.validate()?;
        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/reltime/config.toml` (~/.config/reltime/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("reltime").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/reltime/` (~/.local/state/reltime/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("reltime")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/reltime/reltime.log` (~/.local/state/reltime/reltime.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("reltime.log")
    }
}
