#![allow(unused)]
//! Line parser integration harness.
//!
//! # What this covers
//!
//! - **Scenarios**: the four reference lines (full record, client-wrapped
//!   record without prefix, unstructured text, trailing-pipe client prefix).
//! - **Rejection**: every line in `CORPUS_SKIPPED` yields a `ParseError`.
//! - **Property: records survive a round trip**: any record built from
//!   arbitrary level, prefix and message text renders to a line that parses
//!   back to the same record.
//!
//! # Running
//!
//! ```sh
//! cargo test --test parser_harness
//! ```

mod common;
use common::*;

use chrono::{TimeZone, Utc};
use logmux_core::{parse_line, LogRecord, ParseError};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn scenario_full_record() {
    let record = parse_line("2021-06-01T12:00:00 [Info] [Auth] User logged in").unwrap();
    assert_eq!(
        record,
        RecordBuilder::new("User logged in").prefix("Auth").build()
    );
}

#[test]
fn scenario_client_wrapped_without_prefix() {
    let record = parse_line("[ 1234567890] 2021-06-01T12:00:01 [Warn] Disk low").unwrap();
    assert_eq!(
        record,
        RecordBuilder::new("Disk low").level("Warn").at_second(1).build()
    );
}

#[test]
fn scenario_unstructured_text_is_rejected() {
    assert!(matches!(
        parse_line("random text without structure"),
        Err(ParseError::Timestamp(_))
    ));
}

#[test]
fn scenario_trailing_pipe_is_dropped_from_prefix() {
    let record = parse_line("2021-06-01T12:00:02 [Debug] [Client#123|] Connected").unwrap();
    assert_eq!(record.prefix, "Client#123");
    assert_eq!(record.message, "Connected");
}

// ---------------------------------------------------------------------------
// Corpora
// ---------------------------------------------------------------------------

#[test]
fn routed_corpus_parses() {
    for (line, _) in CORPUS_ROUTED {
        assert!(parse_line(line).is_ok(), "expected {line:?} to parse");
    }
}

#[test]
fn skipped_corpus_is_rejected() {
    for line in CORPUS_SKIPPED {
        assert!(parse_line(line).is_err(), "expected {line:?} to be rejected");
    }
}

#[rstest]
#[case("2021-06-01T12:00:00 [Info] [Auth Service] spaced prefix", "Auth Service", "spaced prefix")]
#[case("2021-06-01T12:00:00 [Info] [Client#9|net||] pipes", "Client#9|net", "pipes")]
#[case("2021-06-01T12:00:00 [Info] text [not a prefix]", "", "text [not a prefix]")]
#[case("2021-06-01T12:00:00 [Info] [A]  double  space", "A", " double  space")]
fn prefix_and_message(#[case] line: &str, #[case] prefix: &str, #[case] message: &str) {
    let record = parse_line(line).unwrap();
    assert_eq!((record.prefix.as_str(), record.message.as_str()), (prefix, message));
}

// ---------------------------------------------------------------------------
// Property tests
// ---------------------------------------------------------------------------

fn arb_record() -> impl Strategy<Value = LogRecord> {
    let level = "[A-Za-z]{1,8}";
    let prefix = "([A-Za-z0-9#]{1,6}(\\|[A-Za-z0-9]{1,6}){0,2})?";
    let message = "([A-Za-z0-9\\[\\]]{1,6}( [A-Za-z0-9\\[\\]]{1,6}){0,4})?";
    (0i64..2_000_000_000, level, prefix, message).prop_map(|(secs, level, prefix, message)| {
        LogRecord {
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            level,
            prefix,
            message,
        }
    })
}

proptest! {
    #[test]
    fn prop_rendered_record_parses_back(record in arb_record()) {
        prop_assert_eq!(parse_line(&record.to_string()), Ok(record));
    }
}
