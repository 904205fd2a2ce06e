//! Bridge from `notify` events on the containing directory to the monitor's
//! [`Signal`] vocabulary.
//!
//! The directory is watched rather than the file so that deletion, rename
//! and recreation of the target are all observable. Only events naming the
//! target's file name are forwarded.

use crate::error::MonitorError;
use logmux_core::config::MonitorConfig;
use notify::{
    event::{ModifyKind, RenameMode},
    Event, EventKind, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher,
};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::UnboundedSender;

/// What happened to the target, as far as the watcher can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Signal {
    Changed,
    Removed,
    RenamedAway,
    Created,
}

/// Keeps the OS watch alive; dropping it releases the watch.
pub(crate) enum ActiveWatcher {
    Native(RecommendedWatcher),
    Poll(PollWatcher),
}

impl ActiveWatcher {
    pub(crate) fn is_polling(&self) -> bool {
        matches!(self, ActiveWatcher::Poll(_))
    }
}

/// Directory holding `path`; `.` for a bare file name.
pub(crate) fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Start watching the directory of `path`, forwarding signals to `tx`.
///
/// Falls back to a [`PollWatcher`] when the native backend cannot be set up
/// or `force_polling` is configured.
pub(crate) fn start_watcher(
    path: &Path,
    config: &MonitorConfig,
    tx: UnboundedSender<Signal>,
) -> Result<ActiveWatcher, MonitorError> {
    let dir = watch_dir(path);
    let file_name = path.file_name().map(OsString::from).unwrap_or_default();
    let target = path.to_path_buf();

    let handler = move |res: notify::Result<Event>| match res {
        Ok(event) => {
            if let Some(signal) = classify(&event, &file_name, &target) {
                tracing::trace!(?signal, kind = ?event.kind, "watcher: signal");
                let _ = tx.send(signal);
            }
        }
        Err(e) => tracing::warn!(error = %e, "watcher: notify error"),
    };

    if !config.force_polling {
        match RecommendedWatcher::new(handler.clone(), notify::Config::default()) {
            Ok(mut watcher) => match watcher.watch(&dir, RecursiveMode::NonRecursive) {
                Ok(()) => {
                    tracing::debug!(dir = %dir.display(), "watcher: native backend");
                    return Ok(ActiveWatcher::Native(watcher));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "watcher: native watch failed, polling instead");
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "watcher: native backend unavailable, polling instead");
            }
        }
    }

    let mut watcher = PollWatcher::new(
        handler,
        notify::Config::default().with_poll_interval(config.poll_interval()),
    )
    .map_err(MonitorError::Watch)?;
    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .map_err(MonitorError::Watch)?;
    tracing::debug!(
        dir = %dir.display(),
        interval_ms = config.poll_interval_ms,
        "watcher: polling backend"
    );
    Ok(ActiveWatcher::Poll(watcher))
}

/// Map one notify event to a signal for the target, if it concerns it.
pub(crate) fn classify(event: &Event, file_name: &OsString, target: &Path) -> Option<Signal> {
    let names_target = |p: &PathBuf| p.file_name() == Some(file_name.as_os_str());

    match event.kind {
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::From => event.paths.iter().any(names_target).then_some(Signal::RenamedAway),
            RenameMode::To => event.paths.iter().any(names_target).then_some(Signal::Created),
            RenameMode::Both => {
                if event.paths.get(1).is_some_and(names_target) {
                    Some(Signal::Created)
                } else if event.paths.first().is_some_and(names_target) {
                    Some(Signal::RenamedAway)
                } else {
                    None
                }
            }
            // Backends that cannot tell the two sides apart.
            _ => event.paths.iter().any(names_target).then(|| {
                if target.exists() {
                    Signal::Created
                } else {
                    Signal::RenamedAway
                }
            }),
        },
        EventKind::Create(_) => event.paths.iter().any(names_target).then_some(Signal::Created),
        EventKind::Remove(_) => event.paths.iter().any(names_target).then_some(Signal::Removed),
        EventKind::Modify(_) | EventKind::Any => {
            event.paths.iter().any(names_target).then_some(Signal::Changed)
        }
        EventKind::Access(_) | EventKind::Other => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
