//! Decode failures.
//!
//! A [`ParseError`] is never surfaced to the user; the session logs it at
//! `trace` and drops the line.

use thiserror::Error;

/// Why a raw line was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line is empty or whitespace")]
    Blank,
    #[error("first token {0:?} is not a YYYY-MM-DDTHH:MM:SS timestamp")]
    Timestamp(String),
    #[error("second token is not a bracketed level")]
    MissingLevel,
    #[error("level brackets are empty")]
    EmptyLevel,
}
