//! logmux-feeds: the file monitor feeding raw lines into logmux.
//!
//! [`FileMonitor::start`] opens a file, delivers its existing complete lines
//! and then follows it, pushing [`MonitorEvent`]s onto a bounded async
//! channel for the session to parse and route.

pub mod error;
pub mod file;

pub use error::MonitorError;
pub use file::{FileMonitor, MonitorEvent, MonitorState};
