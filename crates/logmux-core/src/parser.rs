//! Line parser: raw text line to [`LogRecord`].
//!
//! Grammar (after the client wrapper is stripped):
//!
//! ```text
//! <YYYY-MM-DDTHH:MM:SS> [<level>] [<prefix>]? <message...>
//! ```
//!
//! The grammar is strict. Any deviation rejects the whole line, so a
//! malformed line is lost rather than routed to the wrong sink.
//!
//! Prefix padding is stripped with the whitespace inside it (`[a | ]` is
//! `a`), so a record rendered with `Display` parses back unchanged.

use crate::{
    client_prefix::strip_client_prefix,
    error::ParseError,
    split::{bracket_inner, is_bracketed, split_tokens},
    types::{LogRecord, TIMESTAMP_FORMAT},
};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Decode one raw line.
pub fn parse_line(raw: &str) -> Result<LogRecord, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError::Blank);
    }

    let tokens = split_tokens(strip_client_prefix(raw));

    let timestamp = parse_timestamp(tokens[0])?;

    let level_token = match tokens.get(1) {
        Some(token) if is_bracketed(token) => token,
        _ => return Err(ParseError::MissingLevel),
    };
    let level = bracket_inner(level_token).trim();
    if level.is_empty() {
        return Err(ParseError::EmptyLevel);
    }

    let (prefix, rest) = match tokens.get(2) {
        Some(token) if is_bracketed(token) => (clean_prefix(bracket_inner(token)), &tokens[3..]),
        _ => ("", &tokens[2..]),
    };

    Ok(LogRecord {
        timestamp,
        level: level.to_string(),
        prefix: prefix.to_string(),
        message: rest.join(" "),
    })
}

fn parse_timestamp(token: &str) -> Result<DateTime<Utc>, ParseError> {
    NaiveDateTime::parse_from_str(token.trim(), TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| ParseError::Timestamp(token.to_string()))
}

/// Emitters pad hierarchical prefixes with a trailing `|`; drop it together
/// with any whitespace around it.
fn clean_prefix(inner: &str) -> &str {
    inner
        .trim()
        .trim_end_matches(|c: char| c == '|' || c.is_whitespace())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
