//! logmux-core: record decoding and sink routing.
//!
//! Everything here is synchronous and free of I/O apart from
//! [`config::Config::load`]. The file monitor lives in `logmux-feeds`, the
//! session that drives both in the root `logmux` crate.
//!
//! # Pipeline
//!
//! ```text
//! raw line ──► client_prefix ──► split ──► parser ──► LogRecord ──► Router ──► SinkRegistry
//!                                            │
//!                                            └──► ParseError (line dropped)
//! ```

pub mod client_prefix;
pub mod config;
pub mod error;
pub mod navigation;
pub mod parser;
pub mod router;
pub mod split;
pub mod types;

pub use error::ParseError;
pub use parser::parse_line;
pub use router::{Router, SinkRegistry, SinkSet};
pub use types::{LogRecord, SinkRecord, LEVEL_SINKS, MASTER_SINK};
