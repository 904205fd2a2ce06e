//! Client wrapper stripper.
//!
//! Client-side log lines arrive wrapped by the upstream process launcher as
//! `[<stamp>] <line>`: a space padded numeric stamp in brackets, ten
//! characters wide (`[     12345] `), or eleven when the launcher pads a
//! full ten digit value (`[ 1234567890] `). The stamp carries nothing the
//! parser needs and is discarded.

use regex::Regex;
use std::sync::LazyLock;

/// Shortest line that can hold a wrapper and at least one more character.
const MIN_WRAPPED_LEN: usize = 14;

static CLIENT_WRAPPER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[[ 0-9]{10,11}\] ").expect("client wrapper pattern is valid"));

/// Return `line` without its client wrapper, or `line` unchanged when it has
/// none or nothing follows it.
pub fn strip_client_prefix(line: &str) -> &str {
    let bytes = line.as_bytes();
    if bytes.len() < MIN_WRAPPED_LEN
        || bytes[0] != b'['
        || (bytes[11] != b']' && bytes[12] != b']')
    {
        return line;
    }

    match CLIENT_WRAPPER_RE.find(line) {
        Some(wrapper) if wrapper.end() < line.len() => &line[wrapper.end()..],
        _ => line,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
