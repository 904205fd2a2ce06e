use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by [`crate::FileMonitor::start`].
///
/// Read errors after a successful start never reach the caller as errors;
/// they are retried and, past the configured threshold, reported as
/// [`crate::MonitorEvent::Degraded`].
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot watch file: {0}")]
    Watch(#[from] notify::Error),
    #[error("file monitor must be started inside a tokio runtime")]
    NoRuntime,
}
