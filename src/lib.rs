//! logmux: follow a structured log file and fan its records out to sinks.
//!
//! This crate wires the pieces from `logmux-core` and `logmux-feeds` into a
//! running pipeline and exposes them as public modules so that integration
//! tests can drive a session directly.
//!
//! # Architecture
//!
//! ```text
//! FileMonitor ──► Session ──► parse_line ──► Router ──► ConsoleRegistry
//!   (feeds)                     (core)        (core)      │
//!                                                         ├──► stdout (followed sinks)
//!                                                         └──► export files
//! ```
//!
//! The monitor runs on a background task; the session consumes its events
//! on whichever task calls [`Session::run`].

pub mod console;
pub mod session;

pub use console::{ConsoleRegistry, SinkId};
pub use session::{Session, SessionError, SessionStats};
