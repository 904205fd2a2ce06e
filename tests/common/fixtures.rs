//! Static log corpora used across harnesses.

/// Lines that parse. Each is paired with the sinks it must reach, in order.
pub const CORPUS_ROUTED: &[(&str, &[&str])] = &[
    (
        "2021-06-01T12:00:00 [Info] [Auth] User logged in",
        &["Master", "Auth", "Info"],
    ),
    (
        "[ 1234567890] 2021-06-01T12:00:01 [Warn] Disk low",
        &["Master", "Warn"],
    ),
    (
        "2021-06-01T12:00:02 [Debug] [Client#123|] Connected",
        &["Master", "Client#123", "Debug"],
    ),
    (
        "2021-06-01T12:00:03 [Error] [Client#123|net|tcp] reset by peer",
        &["Master", "Client#123|net|tcp", "Error"],
    ),
    ("2021-06-01T12:00:04 [Trace]", &["Master", "Trace"]),
    (
        "2021-06-01T12:00:05 [Notice] [Db] vacuum done",
        &["Master", "Db", "Notice"],
    ),
];

/// Lines the parser must reject without touching any sink.
pub const CORPUS_SKIPPED: &[&str] = &[
    "random text without structure",
    "",
    "   ",
    "2021-06-01 12:00:00 [Info] space instead of T",
    "2021-13-01T12:00:00 [Info] month 13",
    "2021-06-01T12:00:00 Info missing brackets",
    "2021-06-01T12:00:00",
    "2021-06-01T12:00:00 [] empty level",
    "[123] 2021-06-01T12:00:00 [Info] short wrapper",
];

/// Interleaved valid and invalid lines as a writer might produce them.
pub const CORPUS_MIXED: &[&str] = &[
    "2021-06-01T12:00:00 [Info] [Auth] login alice",
    "garbage",
    "2021-06-01T12:00:01 [Warn] [Auth] slow token check",
    "2021-06-01T12:00:02 [Info] [Client#7|ui] opened menu",
    "",
    "2021-06-01T12:00:03 [Error] [Db] connection lost",
    "[ 0000000042] 2021-06-01T12:00:04 [Info] [Client#7] heartbeat",
];
