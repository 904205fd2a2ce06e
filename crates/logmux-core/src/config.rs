//! Configuration types for logmux.
//!
//! [`Config::load`] reads `~/.config/logmux/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist. [`Config::defaults`] returns
//! the same defaults without touching the filesystem (useful in tests).

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[monitor]
poll_interval_ms          = 250
rescan_interval_ms        = 1000
force_polling             = false
channel_capacity          = 1024
transient_error_threshold = 20

[console]
follow               = ["Master"]
format               = "text"
timestamp_format     = "%Y-%m-%d %H:%M:%S"
max_records_per_sink = 100000
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration, loaded from `~/.config/logmux/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
}

/// `[monitor]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Interval of the polling watcher used when OS notifications are
    /// unavailable or `force_polling` is set.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Periodic re-check of the file independent of notifications.
    #[serde(default = "default_rescan_interval_ms")]
    pub rescan_interval_ms: u64,
    #[serde(default)]
    pub force_polling: bool,
    /// Capacity of the monitor → session event channel.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Consecutive failed reads before the monitor reports itself degraded.
    #[serde(default = "default_transient_error_threshold")]
    pub transient_error_threshold: u32,
}

fn default_poll_interval_ms() -> u64 { 250 }
fn default_rescan_interval_ms() -> u64 { 1000 }
fn default_channel_capacity() -> usize { 1024 }
fn default_transient_error_threshold() -> u32 { 20 }

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            rescan_interval_ms: default_rescan_interval_ms(),
            force_polling: false,
            channel_capacity: default_channel_capacity(),
            transient_error_threshold: default_transient_error_threshold(),
        }
    }
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn rescan_interval(&self) -> Duration {
        Duration::from_millis(self.rescan_interval_ms.max(1))
    }
}

/// Output format of the console presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

/// `[console]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    /// Sinks whose records are printed live.
    #[serde(default = "default_follow")]
    pub follow: Vec<String>,
    #[serde(default = "default_format")]
    pub format: OutputFormat,
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
    /// Oldest records are dropped beyond this many per sink.
    #[serde(default = "default_max_records_per_sink")]
    pub max_records_per_sink: usize,
}

fn default_follow() -> Vec<String> { vec!["Master".to_string()] }
fn default_format() -> OutputFormat { OutputFormat::Text }
fn default_timestamp_format() -> String { "%Y-%m-%d %H:%M:%S".to_string() }
fn default_max_records_per_sink() -> usize { 100_000 }

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            follow: default_follow(),
            format: default_format(),
            timestamp_format: default_timestamp_format(),
            max_records_per_sink: default_max_records_per_sink(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/logmux/config.toml`, layered on top of the built-in
    /// defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        Self::load_from(&path)
    }

    /// Layer `path` (if present) over the built-in defaults.
    pub fn load_from(path: &std::path::Path) -> anyhow::Result<Self> {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).required(false))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("logmux")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
