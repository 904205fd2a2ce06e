//! Console presentation: an in-memory [`SinkRegistry`] that prints followed
//! sinks as records arrive.
//!
//! Every sink keeps a bounded backlog so it can be exported or inspected
//! after the run. The registry is a cheap clone over shared state, so the
//! binary can keep a copy while the session owns another.

use chrono::{DateTime, Utc};
use logmux_core::config::{ConsoleConfig, OutputFormat};
use logmux_core::{SinkRecord, SinkRegistry};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

type Output = Box<dyn Write + Send + Sync>;

/// Opaque sink handle handed to the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SinkId(u64);

struct SinkBuffer {
    name: String,
    records: VecDeque<SinkRecord>,
    visible: bool,
    /// Records evicted because the sink was full.
    dropped: u64,
}

struct Inner {
    sinks: HashMap<SinkId, SinkBuffer>,
    by_name: HashMap<String, SinkId>,
    next_id: u64,
    follow: HashSet<String>,
    format: OutputFormat,
    timestamp_format: String,
    capacity: usize,
    status: String,
    out: Output,
    err: Output,
}

/// JSON line written for followed sinks.
#[derive(Serialize)]
struct JsonLine<'a> {
    sink: &'a str,
    #[serde(flatten)]
    record: &'a SinkRecord,
}

#[derive(Clone)]
pub struct ConsoleRegistry {
    inner: Arc<RwLock<Inner>>,
}

impl ConsoleRegistry {
    /// Print records to stdout and status to stderr.
    pub fn new(config: &ConsoleConfig) -> Self {
        Self::with_output(config, io::stdout(), io::stderr())
    }

    pub fn with_output(
        config: &ConsoleConfig,
        out: impl Write + Send + Sync + 'static,
        err: impl Write + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                sinks: HashMap::new(),
                by_name: HashMap::new(),
                next_id: 0,
                follow: config.follow.iter().cloned().collect(),
                format: config.format,
                timestamp_format: config.timestamp_format.clone(),
                capacity: config.max_records_per_sink.max(1),
                status: String::new(),
                out: Box::new(out),
                err: Box::new(err),
            })),
        }
    }

    // A panic while holding the lock leaves plain data behind; keep serving it.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Sink names in creation order.
    pub fn names(&self) -> Vec<String> {
        let inner = self.read();
        let mut ids: Vec<&SinkId> = inner.sinks.keys().collect();
        ids.sort_by_key(|id| id.0);
        ids.into_iter()
            .map(|id| inner.sinks[id].name.clone())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().by_name.contains_key(name)
    }

    /// Records currently held by `name`.
    pub fn len(&self, name: &str) -> Option<usize> {
        let inner = self.read();
        inner.buffer(name).map(|b| b.records.len())
    }

    /// Records evicted from `name` because it was full.
    pub fn dropped(&self, name: &str) -> Option<u64> {
        self.read().buffer(name).map(|b| b.dropped)
    }

    /// Copy of a sink's records.
    pub fn snapshot(&self, name: &str) -> Option<Vec<SinkRecord>> {
        self.read()
            .buffer(name)
            .map(|b| b.records.iter().cloned().collect())
    }

    pub fn status(&self) -> String {
        self.read().status.clone()
    }

    pub fn is_visible(&self, name: &str) -> Option<bool> {
        self.read().buffer(name).map(|b| b.visible)
    }

    /// Returns `false` if there is no such sink.
    pub fn set_visible(&self, name: &str, visible: bool) -> bool {
        let mut inner = self.write();
        match inner.buffer_mut(name) {
            Some(buffer) => {
                buffer.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Flip visibility, returning the new value.
    pub fn toggle(&self, name: &str) -> Option<bool> {
        let mut inner = self.write();
        let buffer = inner.buffer_mut(name)?;
        buffer.visible = !buffer.visible;
        Some(buffer.visible)
    }

    /// Print `name` live from now on. The sink need not exist yet.
    pub fn follow(&self, name: &str) {
        self.write().follow.insert(name.to_string());
    }

    pub fn unfollow(&self, name: &str) {
        self.write().follow.remove(name);
    }

    pub fn is_followed(&self, name: &str) -> bool {
        self.read().follow.contains(name)
    }

    /// Render one record the way followed sinks print it.
    pub fn render(&self, sink: &str, record: &SinkRecord) -> String {
        self.read().render(sink, record)
    }

    /// Write a sink's records to `<dir>/<name>.log`, with `|` in the name
    /// replaced by `-`. Returns the written path.
    pub fn export(&self, name: &str, dir: &Path) -> io::Result<PathBuf> {
        let inner = self.read();
        let buffer = inner.buffer(name).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no sink named {name:?}"))
        })?;

        let path = dir.join(export_file_name(name));
        let mut file = io::BufWriter::new(std::fs::File::create(&path)?);
        for record in &buffer.records {
            writeln!(file, "{}", inner.render_text(record))?;
        }
        file.flush()?;

        tracing::debug!(sink = %name, path = %path.display(), records = buffer.records.len(), "console: exported");
        Ok(path)
    }
}

/// File name a sink is exported under.
pub fn export_file_name(name: &str) -> String {
    format!("{}.log", name.replace('|', "-"))
}

impl Inner {
    fn buffer(&self, name: &str) -> Option<&SinkBuffer> {
        self.by_name.get(name).and_then(|id| self.sinks.get(id))
    }

    fn buffer_mut(&mut self, name: &str) -> Option<&mut SinkBuffer> {
        let id = *self.by_name.get(name)?;
        self.sinks.get_mut(&id)
    }

    fn render(&self, sink: &str, record: &SinkRecord) -> String {
        match self.format {
            OutputFormat::Text => self.render_text(record),
            OutputFormat::Json => serde_json::to_string(&JsonLine { sink, record })
                .unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}")),
        }
    }

    fn render_text(&self, record: &SinkRecord) -> String {
        let mut line = format!(
            "{} [{}]",
            format_timestamp(&record.timestamp, &self.timestamp_format),
            record.level
        );
        if let Some(prefix) = &record.prefix {
            line.push_str(" [");
            line.push_str(prefix);
            line.push(']');
        }
        if !record.message.is_empty() {
            line.push(' ');
            line.push_str(&record.message);
        }
        line
    }

    fn status_line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.err, "-- {text}") {
            tracing::debug!(error = %e, "console: status write failed");
        }
    }
}

fn format_timestamp(ts: &DateTime<Utc>, pattern: &str) -> String {
    use std::fmt::Write as _;
    let mut out = String::new();
    // An invalid user pattern makes chrono's Display fail; fall back to RFC 3339.
    if write!(out, "{}", ts.format(pattern)).is_err() {
        return ts.to_rfc3339();
    }
    out
}

impl SinkRegistry for ConsoleRegistry {
    type Handle = SinkId;

    fn create_sink(&mut self, name: &str) -> SinkId {
        let mut inner = self.write();
        if let Some(id) = inner.by_name.get(name) {
            return *id;
        }
        let id = SinkId(inner.next_id);
        inner.next_id += 1;
        inner.sinks.insert(
            id,
            SinkBuffer {
                name: name.to_string(),
                records: VecDeque::new(),
                visible: true,
                dropped: 0,
            },
        );
        inner.by_name.insert(name.to_string(), id);
        id
    }

    fn append_record(&mut self, handle: &SinkId, record: SinkRecord) {
        let mut inner = self.write();
        let capacity = inner.capacity;
        let Some(buffer) = inner.sinks.get_mut(handle) else {
            return;
        };
        let print = buffer.visible;
        let name = buffer.name.clone();

        let line = (print && inner.follow.contains(&name)).then(|| inner.render(&name, &record));

        // Re-borrow after rendering; the buffer is known to exist.
        if let Some(buffer) = inner.sinks.get_mut(handle) {
            if buffer.records.len() == capacity {
                buffer.records.pop_front();
                buffer.dropped += 1;
            }
            buffer.records.push_back(record);
        }

        if let Some(line) = line {
            if let Err(e) = writeln!(inner.out, "{line}") {
                tracing::debug!(error = %e, "console: write failed");
            }
        }
    }

    fn notify_sink_created(&mut self, name: &str) {
        self.write().status_line(&format!("new sink: {name}"));
    }

    fn set_status(&mut self, text: &str) {
        let mut inner = self.write();
        inner.status = text.to_string();
        inner.status_line(text);
    }

    fn remove_sink(&mut self, name: &str, handle: SinkId) {
        let mut inner = self.write();
        inner.sinks.remove(&handle);
        if inner.by_name.get(name) == Some(&handle) {
            inner.by_name.remove(name);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
