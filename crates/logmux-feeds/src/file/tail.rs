//! Synchronous tail state: one open handle, the committed read offset and the
//! unterminated bytes read past it.
//!
//! [`Tailer::read_available`] is the only place bytes are read. The async
//! worker calls it once per coalesced change notification; tests drive it
//! directly.

use std::fs::{File, Metadata};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Snapshot of the tail position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorState {
    pub path: PathBuf,
    /// Bytes consumed through the last complete line.
    pub read_offset: u64,
    pub is_open: bool,
    /// File length observed by the last read.
    pub last_known_length: u64,
}

impl MonitorState {
    pub fn closed(path: PathBuf) -> Self {
        Self {
            path,
            read_offset: 0,
            is_open: false,
            last_known_length: 0,
        }
    }
}

/// What currently sits at the tailed path, relative to the open handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStatus {
    Same,
    /// Another file now has the name (rename-over or delete and recreate).
    Replaced,
    Missing,
}

/// Result of one catch-up read.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TailBatch {
    /// The file shrank below the consumed position and was re-read from 0.
    pub truncated: bool,
    /// Complete lines, without their line terminator.
    pub lines: Vec<String>,
}

pub struct Tailer {
    path: PathBuf,
    file: File,
    read_offset: u64,
    pending: Vec<u8>,
    last_known_length: u64,
}

impl Tailer {
    /// Open `path` read-only; writers keep appending through their own
    /// handles.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
            read_offset: 0,
            pending: Vec::new(),
            last_known_length: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Committed offset plus the partial bytes already buffered.
    pub fn consumed(&self) -> u64 {
        self.read_offset + self.pending.len() as u64
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn state(&self) -> MonitorState {
        MonitorState {
            path: self.path.clone(),
            read_offset: self.read_offset,
            is_open: true,
            last_known_length: self.last_known_length,
        }
    }

    pub fn path_status(&self) -> io::Result<PathStatus> {
        let on_disk = match std::fs::metadata(&self.path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(PathStatus::Missing),
            Err(e) => return Err(e),
        };
        let open = self.file.metadata()?;
        Ok(if same_file(&open, &on_disk) {
            PathStatus::Same
        } else {
            PathStatus::Replaced
        })
    }

    /// Read everything appended since the last call and return the complete
    /// lines. A trailing line without `\n` is held back until it completes.
    ///
    /// On error nothing is consumed; the next call retries from the same
    /// position.
    pub fn read_available(&mut self) -> io::Result<TailBatch> {
        let len = self.file.metadata()?.len();
        let mut batch = TailBatch::default();

        if len < self.consumed() {
            tracing::debug!(
                path = %self.path.display(),
                len,
                consumed = self.consumed(),
                "tail: truncation detected, rewinding"
            );
            batch.truncated = true;
            self.pending.clear();
            self.read_offset = 0;
        }
        self.last_known_length = len;

        let start = self.consumed();
        if len == start {
            return Ok(batch);
        }

        self.file.seek(SeekFrom::Start(start))?;
        let mut fresh = Vec::with_capacity((len - start) as usize);
        (&mut self.file).take(len - start).read_to_end(&mut fresh)?;
        self.pending.extend_from_slice(&fresh);

        let Some(last_newline) = self.pending.iter().rposition(|&b| b == b'\n') else {
            return Ok(batch);
        };

        let complete: Vec<u8> = self.pending.drain(..=last_newline).collect();
        self.read_offset += complete.len() as u64;

        batch.lines = complete[..complete.len() - 1]
            .split(|&b| b == b'\n')
            .map(|line| {
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                String::from_utf8_lossy(line).into_owned()
            })
            .collect();

        tracing::trace!(
            path = %self.path.display(),
            lines = batch.lines.len(),
            offset = self.read_offset,
            pending = self.pending.len(),
            "tail: read"
        );

        Ok(batch)
    }
}

#[cfg(unix)]
fn same_file(a: &Metadata, b: &Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    a.dev() == b.dev() && a.ino() == b.ino()
}

// No stable file identity outside unix; replacement is only seen through
// the watcher's lifecycle signals there.
#[cfg(not(unix))]
fn same_file(_: &Metadata, _: &Metadata) -> bool {
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
