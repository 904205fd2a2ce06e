//! Core types for logmux-core.
//!
//! This module defines the values that flow from the parser to the router and
//! on to the sinks: the decoded [`LogRecord`], the per-sink [`SinkRecord`]
//! projection of it, and the reserved sink names.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Name of the sink that receives every routed record.
pub const MASTER_SINK: &str = "Master";

/// The fixed level sinks, created eagerly alongside [`MASTER_SINK`].
pub const LEVEL_SINKS: [&str; 5] = ["Trace", "Debug", "Info", "Warn", "Error"];

/// `strftime` pattern of the sortable ISO 8601 timestamp at the start of a line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Whether `name` is created eagerly rather than on first use.
pub fn is_reserved_sink(name: &str) -> bool {
    name == MASTER_SINK || LEVEL_SINKS.contains(&name)
}

// ---------------------------------------------------------------------------
// LogRecord
// ---------------------------------------------------------------------------

/// A decoded log line.
///
/// Produced only by [`crate::parser::parse_line`], so `level` is never empty.
/// An empty `prefix` means the line carried no source and is routed to
/// `Master` and its level sink only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    /// Logical source, possibly hierarchical (`Client#12|net`).
    pub prefix: String,
    /// Remaining tokens rejoined with single spaces.
    pub message: String,
}

impl LogRecord {
    /// The full-fidelity projection appended to `Master` and level sinks.
    pub fn to_sink_record(&self) -> SinkRecord {
        SinkRecord {
            timestamp: self.timestamp,
            level: self.level.clone(),
            prefix: (!self.prefix.is_empty()).then(|| self.prefix.clone()),
            message: self.message.clone(),
        }
    }

    /// The projection appended to the record's own prefix sink. The prefix is
    /// implied by the sink and dropped.
    pub fn to_prefix_record(&self) -> SinkRecord {
        SinkRecord {
            timestamp: self.timestamp,
            level: self.level.clone(),
            prefix: None,
            message: self.message.clone(),
        }
    }
}

/// Canonical line form. Parsing the output yields an equal record.
///
/// An empty prefix is written as `[]` when the message itself opens with a
/// bracket group, otherwise that group would be read back as the prefix.
impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.timestamp.format(TIMESTAMP_FORMAT), self.level)?;
        if !self.prefix.is_empty() {
            write!(f, " [{}]", self.prefix)?;
        } else if self.message.starts_with('[') {
            f.write_str(" []")?;
        }
        if !self.message.is_empty() {
            write!(f, " {}", self.message)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SinkRecord
// ---------------------------------------------------------------------------

/// What a sink actually stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SinkRecord {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    pub message: String,
}

impl fmt::Display for SinkRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.timestamp.format(TIMESTAMP_FORMAT), self.level)?;
        if let Some(prefix) = &self.prefix {
            write!(f, " [{prefix}]")?;
        }
        if !self.message.is_empty() {
            write!(f, " {}", self.message)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
