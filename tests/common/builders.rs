//! Test builders: ergonomic constructors for records, log files and configs.
//!
//! These are for readability in tests, not for production use. They panic on
//! invalid input rather than returning `Result`.

use chrono::{DateTime, TimeZone, Utc};
use logmux_core::config::MonitorConfig;
use logmux_core::LogRecord;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// RecordBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`LogRecord`] fixtures.
///
/// # Example
///
/// ```rust
/// let line = RecordBuilder::new("User logged in")
///     .level("Info")
///     .prefix("Auth")
///     .line();
/// ```
pub struct RecordBuilder {
    timestamp: DateTime<Utc>,
    level: String,
    prefix: String,
    message: String,
}

impl RecordBuilder {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc.with_ymd_and_hms(2021, 6, 1, 12, 0, 0).unwrap(),
            level: "Info".to_string(),
            prefix: String::new(),
            message: message.into(),
        }
    }

    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Offset the timestamp by `secs` seconds from the fixture base time.
    pub fn at_second(mut self, secs: i64) -> Self {
        self.timestamp = Utc.with_ymd_and_hms(2021, 6, 1, 12, 0, 0).unwrap()
            + chrono::Duration::seconds(secs);
        self
    }

    pub fn build(self) -> LogRecord {
        LogRecord {
            timestamp: self.timestamp,
            level: self.level,
            prefix: self.prefix,
            message: self.message,
        }
    }

    /// The record as a log line.
    pub fn line(self) -> String {
        self.build().to_string()
    }
}

/// `n` distinct well-formed lines, `Info` level, prefix `Seq`.
pub fn numbered_lines(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            RecordBuilder::new(format!("message {i}"))
                .prefix("Seq")
                .at_second(i as i64)
                .line()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Create `dir/name` holding `lines`, each newline-terminated.
pub fn write_log<S: AsRef<str>>(dir: &Path, name: &str, lines: &[S]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, join_lines(lines)).unwrap();
    path
}

/// Append `lines`, each newline-terminated.
pub fn append_lines<S: AsRef<str>>(path: &Path, lines: &[S]) {
    append_raw(path, &join_lines(lines));
}

/// Append `text` verbatim.
pub fn append_raw(path: &Path, text: &str) {
    let mut f = OpenOptions::new().append(true).open(path).unwrap();
    f.write_all(text.as_bytes()).unwrap();
    f.flush().unwrap();
}

pub fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    lines.iter().map(|l| format!("{}\n", l.as_ref())).collect()
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Monitor settings with short intervals so tests do not wait on defaults.
pub fn fast_monitor_config() -> MonitorConfig {
    MonitorConfig {
        poll_interval_ms: 20,
        rescan_interval_ms: 50,
        ..MonitorConfig::default()
    }
}

pub fn polling_monitor_config() -> MonitorConfig {
    MonitorConfig {
        force_polling: true,
        ..fast_monitor_config()
    }
}
