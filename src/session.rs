//! Session: the single consumer of a file monitor's events.
//!
//! A session owns the [`Router`] and at most one running [`FileMonitor`].
//! Lines are parsed and routed here and nowhere else; lifecycle events become
//! status text on the registry.

use logmux_core::config::MonitorConfig;
use logmux_core::navigation;
use logmux_core::{parse_line, Router, SinkRegistry, LEVEL_SINKS, MASTER_SINK};
use logmux_feeds::{FileMonitor, MonitorError, MonitorEvent, MonitorState};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Open(#[from] MonitorError),
    #[error("no file is open")]
    NotOpen,
}

/// Line counters for the current file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub lines: u64,
    pub routed: u64,
    pub skipped: u64,
    pub truncations: u64,
    /// Times the file was recreated and reopened; the other counters restart
    /// from zero on each reopen.
    pub reopens: u64,
}

struct ActiveFile {
    path: PathBuf,
    monitor: FileMonitor,
    events: mpsc::Receiver<MonitorEvent>,
}

pub struct Session<R: SinkRegistry> {
    router: Router<R>,
    config: MonitorConfig,
    active: Option<ActiveFile>,
    stats: SessionStats,
}

impl<R: SinkRegistry> Session<R> {
    pub fn new(registry: R, config: MonitorConfig) -> Self {
        Self {
            router: Router::new(registry),
            config,
            active: None,
            stats: SessionStats::default(),
        }
    }

    /// Close whatever is open, start a fresh sink namespace and begin
    /// monitoring `path`.
    ///
    /// On failure the previous file is already closed and only the reserved
    /// sinks remain.
    pub async fn open(&mut self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        let path = path.as_ref().to_path_buf();
        tracing::info!(path = %path.display(), "session: opening");
        self.restart(path, 0).await
    }

    /// Stop the monitor and drop its pending events. Sinks are kept.
    pub async fn close(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.monitor.stop().await;
            tracing::info!(
                path = %active.path.display(),
                lines = self.stats.lines,
                skipped = self.stats.skipped,
                "session: closed"
            );
        }
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.active.as_ref().map(|a| a.path.as_path())
    }

    pub fn monitor_state(&self) -> Option<MonitorState> {
        self.active.as_ref().map(|a| a.monitor.state())
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn router(&self) -> &Router<R> {
        &self.router
    }

    pub fn registry(&self) -> &R {
        self.router.registry()
    }

    /// Next event from the monitor, or `None` when nothing is open or the
    /// monitor has finished.
    pub async fn next_event(&mut self) -> Option<MonitorEvent> {
        match self.active.as_mut() {
            Some(active) => active.events.recv().await,
            None => None,
        }
    }

    /// Apply one monitor event.
    pub async fn handle(&mut self, event: MonitorEvent) -> Result<(), SessionError> {
        match event {
            MonitorEvent::Line(raw) => {
                self.ingest_line(&raw);
            }
            MonitorEvent::Truncated => {
                self.stats.truncations += 1;
                tracing::info!(path = ?self.path(), "session: file truncated, replaying");
            }
            MonitorEvent::Deleted | MonitorEvent::Renamed => {
                let status = format!("Monitoring {} (deleted)", self.display_path());
                self.router.set_status(&status);
            }
            MonitorEvent::Created => self.reopen().await?,
            MonitorEvent::Degraded(reason) => {
                tracing::warn!(path = ?self.path(), %reason, "session: monitor degraded");
                let status = format!("Monitoring {} (degraded: {reason})", self.display_path());
                self.router.set_status(&status);
            }
        }
        Ok(())
    }

    /// Handle one event. `Ok(false)` once the event stream has ended.
    pub async fn pump(&mut self) -> Result<bool, SessionError> {
        match self.next_event().await {
            Some(event) => {
                self.handle(event).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Process events until `cancel` fires or the monitor ends, then close.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), SessionError> {
        if self.active.is_none() {
            return Err(SessionError::NotOpen);
        }

        let result = loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => break Ok(()),
                event = self.next_event() => event,
            };
            match event {
                Some(event) => {
                    if let Err(e) = self.handle(event).await {
                        break Err(e);
                    }
                }
                None => break Ok(()),
            }
        };

        self.close().await;
        result
    }

    /// Parse and route one raw line. Returns whether it was routed.
    pub fn ingest_line(&mut self, raw: &str) -> bool {
        self.stats.lines += 1;
        match parse_line(raw) {
            Ok(record) => {
                self.router.route(&record);
                self.stats.routed += 1;
                true
            }
            Err(e) => {
                self.stats.skipped += 1;
                tracing::trace!(error = %e, line = raw, "session: skipped line");
                false
            }
        }
    }

    /// Per-sink record counts: reserved sinks first, then the navigation
    /// tree of the session's dynamic sinks.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for name in std::iter::once(MASTER_SINK).chain(LEVEL_SINKS) {
            let _ = writeln!(out, "{name:<32}{:>10}", self.router.routed_count(name));
        }

        for node in navigation::build(self.router.sinks().dynamic_names()) {
            for (depth, entry) in node.flatten() {
                let label = format!("{}{}", "  ".repeat(depth), entry.label);
                match &entry.sink {
                    Some(sink) => {
                        let _ = writeln!(out, "{label:<32}{:>10}", self.router.routed_count(sink));
                    }
                    None => {
                        let _ = writeln!(out, "{label}");
                    }
                }
            }
        }
        out
    }

    /// The file was recreated: open it again from scratch, as a new session
    /// on the same path.
    async fn reopen(&mut self) -> Result<(), SessionError> {
        let Some(path) = self.path().map(Path::to_path_buf) else {
            return Ok(());
        };
        tracing::info!(path = %path.display(), "session: file recreated, reopening");
        let reopens = self.stats.reopens + 1;
        self.restart(path, reopens).await
    }

    async fn restart(&mut self, path: PathBuf, reopens: u64) -> Result<(), SessionError> {
        self.close().await;
        self.router.begin_session();
        self.stats = SessionStats {
            reopens,
            ..SessionStats::default()
        };
        self.start_monitor(path)
    }

    fn start_monitor(&mut self, path: PathBuf) -> Result<(), SessionError> {
        match FileMonitor::start(&path, &self.config) {
            Ok((monitor, events)) => {
                self.router
                    .set_status(&format!("Monitoring {}", path.display()));
                self.active = Some(ActiveFile {
                    path,
                    monitor,
                    events,
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "session: open failed");
                self.router
                    .set_status(&format!("Cannot open {}", path.display()));
                Err(e.into())
            }
        }
    }

    fn display_path(&self) -> String {
        self.path()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
