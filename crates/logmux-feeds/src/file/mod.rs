//! File monitor: tails one file and reports its lines and lifecycle.
//!
//! A notify watcher on the containing directory feeds [`Signal`]s into a
//! worker task. The worker owns the [`Tailer`], handles signals strictly in
//! arrival order and sends [`MonitorEvent`]s into a bounded channel. A rescan
//! tick re-checks the file independently of notifications.
//!
//! ```text
//! notify thread ──► Signal (unbounded) ──► worker ──► MonitorEvent (bounded) ──► session
//!                                      ▲
//!                         rescan tick ─┘
//! ```

pub mod tail;
mod watcher;

pub use tail::{MonitorState, PathStatus, TailBatch, Tailer};

use crate::error::MonitorError;
use logmux_core::config::MonitorConfig;
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use watcher::{ActiveWatcher, Signal};

/// Everything the monitor reports, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    /// One complete line without its terminator.
    Line(String),
    /// The file shrank; the lines that follow replay it from the start.
    Truncated,
    Deleted,
    Renamed,
    /// The path exists again (or now names a different file). The monitor
    /// has stopped; reopen to continue.
    Created,
    /// Reads have failed repeatedly. Sent once per failure streak.
    Degraded(String),
}

// ---------------------------------------------------------------------------
// FileMonitor
// ---------------------------------------------------------------------------

/// Handle to a running monitor. Dropping it cancels the worker.
pub struct FileMonitor {
    path: PathBuf,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    state: watch::Receiver<MonitorState>,
    polling: bool,
}

impl FileMonitor {
    /// Open `path` and start tailing it on the current tokio runtime.
    ///
    /// Lines already in the file are delivered first. Fails without leaving
    /// anything running if the file cannot be opened or watched.
    pub fn start(
        path: impl AsRef<Path>,
        config: &MonitorConfig,
    ) -> Result<(Self, mpsc::Receiver<MonitorEvent>), MonitorError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| MonitorError::NoRuntime)?;
        let path = path.as_ref().to_path_buf();

        let tailer = Tailer::open(&path).map_err(|source| MonitorError::Open {
            path: path.clone(),
            source,
        })?;

        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let watcher = watcher::start_watcher(&path, config, signal_tx)?;
        let polling = watcher.is_polling();

        let (event_tx, event_rx) = mpsc::channel(config.channel_capacity.max(1));
        let (state_tx, state_rx) = watch::channel(tailer.state());
        let cancel = CancellationToken::new();

        let worker = Worker {
            path: path.clone(),
            tailer: Some(tailer),
            signals: signal_rx,
            backlog: VecDeque::new(),
            events: event_tx,
            state: state_tx,
            cancel: cancel.clone(),
            rescan_interval: config.rescan_interval(),
            failures: FailureStreak::new(config.transient_error_threshold),
            _watcher: watcher,
        };

        tracing::info!(path = %path.display(), polling, "monitor: started");
        let task = runtime.spawn(worker.run());

        Ok((
            Self {
                path,
                cancel,
                task: Some(task),
                state: state_rx,
                polling,
            },
            event_rx,
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the polling fallback is in use instead of OS notifications.
    pub fn is_polling(&self) -> bool {
        self.polling
    }

    /// Latest tail position published by the worker.
    pub fn state(&self) -> MonitorState {
        self.state.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Ask the worker to stop. Safe from any thread; does not wait.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Stop the worker and wait for it to exit. No events are sent after
    /// this returns. Calling it again is a no-op.
    pub async fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if e.is_panic() {
                    tracing::error!(path = %self.path.display(), "monitor: worker panicked");
                }
            }
        }
    }
}

impl Drop for FileMonitor {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

enum Flow {
    Continue,
    Finish,
}

enum Step {
    Signal(Signal),
    Rescan,
}

struct Worker {
    path: PathBuf,
    /// `None` once the target is gone.
    tailer: Option<Tailer>,
    signals: mpsc::UnboundedReceiver<Signal>,
    /// Signals pulled early while coalescing, still to be handled.
    backlog: VecDeque<Signal>,
    events: mpsc::Sender<MonitorEvent>,
    state: watch::Sender<MonitorState>,
    cancel: CancellationToken,
    rescan_interval: Duration,
    failures: FailureStreak,
    _watcher: ActiveWatcher,
}

impl Worker {
    async fn run(mut self) {
        if let Flow::Continue = self.read().await {
            self.event_loop().await;
        }
        self.state.send_replace(MonitorState::closed(self.path.clone()));
        tracing::debug!(path = %self.path.display(), "monitor: worker exited");
    }

    async fn event_loop(&mut self) {
        let mut rescan = time::interval_at(
            Instant::now() + self.rescan_interval,
            self.rescan_interval,
        );
        rescan.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let step = match self.backlog.pop_front() {
                Some(signal) => Step::Signal(signal),
                None => tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => return,
                    Some(signal) = self.signals.recv() => Step::Signal(signal),
                    _ = rescan.tick() => Step::Rescan,
                },
            };
            if self.cancel.is_cancelled() {
                return;
            }

            let flow = match step {
                Step::Signal(signal) => self.on_signal(signal).await,
                Step::Rescan => self.rescan().await,
            };
            if let Flow::Finish = flow {
                return;
            }
        }
    }

    async fn on_signal(&mut self, signal: Signal) -> Flow {
        tracing::trace!(?signal, tailing = self.tailer.is_some(), "monitor: signal");
        match (signal, self.tailer.is_some()) {
            (Signal::Changed, true) => {
                self.coalesce();
                self.read().await
            }
            (Signal::Removed, true) => self.lose_target(MonitorEvent::Deleted).await,
            (Signal::RenamedAway, true) => self.lose_target(MonitorEvent::Renamed).await,
            (Signal::Created, true) => {
                let status = self.tailer.as_ref().map(Tailer::path_status);
                match status {
                    Some(Ok(PathStatus::Replaced)) => self.reappeared().await,
                    // Our own file, or already gone again; nothing to do.
                    _ => Flow::Continue,
                }
            }
            (Signal::Created, false) => {
                if self.path.exists() {
                    self.reappeared().await
                } else {
                    Flow::Continue
                }
            }
            (Signal::Changed | Signal::Removed | Signal::RenamedAway, false) => Flow::Continue,
        }
    }

    /// Re-check the file without a notification.
    async fn rescan(&mut self) -> Flow {
        let status = self.tailer.as_ref().map(Tailer::path_status);
        match status {
            Some(Ok(PathStatus::Same)) => self.read().await,
            Some(Ok(PathStatus::Missing)) => self.lose_target(MonitorEvent::Deleted).await,
            Some(Ok(PathStatus::Replaced)) => self.reappeared().await,
            Some(Err(e)) => self.record_failure(e).await,
            None if self.path.exists() => self.reappeared().await,
            None => Flow::Continue,
        }
    }

    fn coalesce(&mut self) {
        let folded = coalesce(&mut self.signals, &mut self.backlog);
        if folded > 0 {
            tracing::trace!(folded, "monitor: coalesced change signals");
        }
    }

    async fn read(&mut self) -> Flow {
        let result = match self.tailer.as_mut() {
            Some(tailer) => tailer
                .read_available()
                .map(|batch| (batch, tailer.state())),
            None => return Flow::Continue,
        };

        match result {
            Ok((batch, state)) => {
                self.state.send_replace(state);
                self.record_success();
                if batch.truncated && !self.emit(MonitorEvent::Truncated).await {
                    return Flow::Finish;
                }
                for line in batch.lines {
                    if !self.emit(MonitorEvent::Line(line)).await {
                        return Flow::Finish;
                    }
                }
                Flow::Continue
            }
            Err(e) => self.record_failure(e).await,
        }
    }

    /// Drain what is still readable through the old handle, then release it.
    async fn drain_and_close(&mut self) -> Flow {
        if let Flow::Finish = self.read().await {
            return Flow::Finish;
        }
        self.tailer = None;
        self.state.send_replace(MonitorState::closed(self.path.clone()));
        Flow::Continue
    }

    async fn lose_target(&mut self, event: MonitorEvent) -> Flow {
        if let Flow::Finish = self.drain_and_close().await {
            return Flow::Finish;
        }
        tracing::info!(path = %self.path.display(), ?event, "monitor: target gone");
        if self.emit(event).await {
            Flow::Continue
        } else {
            Flow::Finish
        }
    }

    async fn reappeared(&mut self) -> Flow {
        if self.tailer.is_some() {
            if let Flow::Finish = self.drain_and_close().await {
                return Flow::Finish;
            }
        }
        tracing::info!(path = %self.path.display(), "monitor: target recreated");
        self.emit(MonitorEvent::Created).await;
        Flow::Finish
    }

    fn record_success(&mut self) {
        if self.failures.succeed() {
            tracing::info!(path = %self.path.display(), "monitor: reads recovered");
        }
    }

    async fn record_failure(&mut self, err: io::Error) -> Flow {
        let degraded = self.failures.fail();
        tracing::warn!(
            path = %self.path.display(),
            error = %err,
            failures = self.failures.count(),
            "monitor: read failed"
        );
        if degraded {
            let reason = format!("{} consecutive read failures: {err}", self.failures.count());
            if !self.emit(MonitorEvent::Degraded(reason)).await {
                return Flow::Finish;
            }
        }
        Flow::Continue
    }

    /// Send one event. `false` once cancelled or the receiver is gone.
    async fn emit(&self, event: MonitorEvent) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = self.events.send(event) => sent.is_ok(),
        }
    }
}

/// Consecutive read failures since the last successful read.
#[derive(Debug)]
struct FailureStreak {
    threshold: u32,
    count: u32,
}

impl FailureStreak {
    fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            count: 0,
        }
    }

    fn count(&self) -> u32 {
        self.count
    }

    /// Count one failure. `true` exactly when the streak reaches the
    /// threshold, so a long streak degrades once.
    fn fail(&mut self) -> bool {
        self.count = self.count.saturating_add(1);
        self.count == self.threshold
    }

    /// End the streak. `true` if it had degraded.
    fn succeed(&mut self) -> bool {
        let was_degraded = self.count >= self.threshold;
        self.count = 0;
        was_degraded
    }
}

/// Pull every queued signal, folding change signals into the read about to
/// happen. Lifecycle signals, and any change that follows one, are kept in
/// order in `backlog`. Returns how many signals were folded.
fn coalesce(signals: &mut mpsc::UnboundedReceiver<Signal>, backlog: &mut VecDeque<Signal>) -> usize {
    let mut folded = 0;
    while let Ok(signal) = signals.try_recv() {
        if signal == Signal::Changed && matches!(backlog.back(), None | Some(Signal::Changed)) {
            folded += 1;
            continue;
        }
        backlog.push_back(signal);
    }
    folded
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
