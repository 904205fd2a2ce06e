//! Token splitter: space-delimited tokens that keep `[...]` groups whole.
//!
//! A `[` at the start of a token opens a group; spaces inside the group do
//! not split. The first `]` closes it (groups do not nest) and the token then
//! runs on to the next unprotected space. A group that never closes runs to
//! the end of the line.

/// Split `line` into tokens.
///
/// Every space outside a group is a delimiter, so adjacent spaces yield
/// empty tokens and joining the result with `" "` reproduces the input.
/// An empty line yields no tokens.
pub fn split_tokens(line: &str) -> Vec<&str> {
    if line.is_empty() {
        return Vec::new();
    }

    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_group = false;

    for (idx, ch) in line.char_indices() {
        match ch {
            '[' if idx == start => in_group = true,
            ']' if in_group => in_group = false,
            ' ' if !in_group => {
                tokens.push(&line[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    tokens.push(&line[start..]);

    tokens
}

/// `[...]` check used for the level and prefix tokens.
pub fn is_bracketed(token: &str) -> bool {
    token.len() >= 2 && token.starts_with('[') && token.ends_with(']')
}

/// The text between the outer brackets of a [`is_bracketed`] token.
pub fn bracket_inner(token: &str) -> &str {
    &token[1..token.len() - 1]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
