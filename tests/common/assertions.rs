//! Domain-specific assertions and waiting helpers for logmux harnesses.
//!
//! The macros wrap `pretty_assertions` and add context to failure messages
//! so it is clear which sink or event diverged.

use logmux::Session;
use logmux_core::SinkRegistry;
use logmux_feeds::MonitorEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{timeout, Instant};

/// Upper bound for anything that depends on filesystem notifications.
pub const EVENT_DEADLINE: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Sink assertions
// ---------------------------------------------------------------------------

/// Assert the messages a [`crate::common::RecordingRegistry`] appended to a
/// sink, in order.
///
/// ```rust
/// assert_sink_messages!(registry, "Auth", ["User logged in"]);
/// ```
#[macro_export]
macro_rules! assert_sink_messages {
    ($registry:expr, $sink:expr, [$($msg:expr),* $(,)?]) => {{
        let actual = $registry.messages($sink);
        let expected: Vec<String> = vec![$($msg.to_string()),*];
        if actual != expected {
            pretty_assertions::assert_eq!(
                actual,
                expected,
                "messages of sink {:?} differ",
                $sink
            );
        }
    }};
}

/// Assert a sink was created exactly once over the registry's lifetime.
#[macro_export]
macro_rules! assert_created_once {
    ($registry:expr, $sink:expr) => {{
        let count = $registry
            .created()
            .iter()
            .filter(|name| name.as_str() == $sink)
            .count();
        assert_eq!(
            count, 1,
            "sink {:?} created {} times; creations: {:?}",
            $sink,
            count,
            $registry.created()
        );
    }};
}

// ---------------------------------------------------------------------------
// Monitor helpers
// ---------------------------------------------------------------------------

/// Next monitor event, panicking if none arrives in time or the channel
/// closes.
pub async fn expect_event(rx: &mut mpsc::Receiver<MonitorEvent>) -> MonitorEvent {
    match timeout(EVENT_DEADLINE, rx.recv()).await {
        Ok(Some(event)) => event,
        Ok(None) => panic!("monitor channel closed while waiting for an event"),
        Err(_) => panic!("no monitor event within {EVENT_DEADLINE:?}"),
    }
}

/// Collect `n` line events, panicking on any lifecycle event in between.
pub async fn expect_lines(rx: &mut mpsc::Receiver<MonitorEvent>, n: usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(n);
    while lines.len() < n {
        match expect_event(rx).await {
            MonitorEvent::Line(line) => lines.push(line),
            other => panic!("expected a line, got {other:?} after {lines:?}"),
        }
    }
    lines
}

/// Skip events until one matches `wanted`; returns the lines seen before it.
pub async fn skip_until(
    rx: &mut mpsc::Receiver<MonitorEvent>,
    wanted: impl Fn(&MonitorEvent) -> bool,
) -> Vec<String> {
    let mut seen = Vec::new();
    loop {
        let event = expect_event(rx).await;
        if wanted(&event) {
            return seen;
        }
        if let MonitorEvent::Line(line) = event {
            seen.push(line);
        }
    }
}

/// Wait until the channel closes, returning whatever arrived first.
pub async fn drain_until_closed(rx: &mut mpsc::Receiver<MonitorEvent>) -> Vec<MonitorEvent> {
    let mut events = Vec::new();
    loop {
        match timeout(EVENT_DEADLINE, rx.recv()).await {
            Ok(Some(event)) => events.push(event),
            Ok(None) => return events,
            Err(_) => panic!("monitor channel still open after {EVENT_DEADLINE:?}: {events:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Session helpers
// ---------------------------------------------------------------------------

/// Pump `session` until `done` holds.
pub async fn pump_until<R: SinkRegistry>(
    session: &mut Session<R>,
    mut done: impl FnMut(&Session<R>) -> bool,
) {
    let deadline = Instant::now() + EVENT_DEADLINE;
    while !done(session) {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match timeout(remaining, session.pump()).await {
            Ok(Ok(true)) => {}
            Ok(Ok(false)) => panic!("event stream ended before the condition held"),
            Ok(Err(e)) => panic!("session error: {e}"),
            Err(_) => panic!("condition not met within {EVENT_DEADLINE:?}"),
        }
    }
}
