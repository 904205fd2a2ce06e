//! Router: replicates each [`LogRecord`] to `Master`, its prefix sink and
//! its level sink.
//!
//! The router owns the session's [`SinkSet`]. Reserved sinks (`Master` and
//! the five fixed levels) are created eagerly in [`Router::new`]. The level
//! sinks survive every session; `Master` belongs to one session and is
//! rebuilt empty by [`Router::begin_session`]. Everything else is created the
//! first time a record needs it and discarded at the next session.
//!
//! The presentation layer sits behind [`SinkRegistry`]. The router only ever
//! calls it from the single consumer sequence that owns the router, so
//! check-then-create needs no locking.

use crate::types::{is_reserved_sink, LogRecord, SinkRecord, LEVEL_SINKS, MASTER_SINK};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Registry interface
// ---------------------------------------------------------------------------

/// Capability exposed by the presentation layer.
pub trait SinkRegistry {
    /// Opaque handle to one sink.
    type Handle: Clone;

    /// Create the sink `name`. Only called for names the router does not
    /// already hold.
    fn create_sink(&mut self, name: &str) -> Self::Handle;

    /// Append one record. Must not block the caller for long.
    fn append_record(&mut self, handle: &Self::Handle, record: SinkRecord);

    /// A dynamic sink came into existence. Fire-and-forget.
    fn notify_sink_created(&mut self, name: &str);

    /// Informational status text ("Monitoring app.log (deleted)").
    fn set_status(&mut self, text: &str);

    /// A dynamic sink was discarded at a session change.
    fn remove_sink(&mut self, name: &str, handle: Self::Handle);
}

// ---------------------------------------------------------------------------
// SinkSet
// ---------------------------------------------------------------------------

/// Sink name to handle, plus creation order for dynamic sinks.
#[derive(Debug)]
pub struct SinkSet<H> {
    handles: HashMap<String, H>,
    dynamic: Vec<String>,
}

impl<H> Default for SinkSet<H> {
    fn default() -> Self {
        Self {
            handles: HashMap::new(),
            dynamic: Vec::new(),
        }
    }
}

impl<H> SinkSet<H> {
    pub fn get(&self, name: &str) -> Option<&H> {
        self.handles.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handles.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Dynamic sink names in creation order.
    pub fn dynamic_names(&self) -> &[String] {
        &self.dynamic
    }

    fn insert(&mut self, name: &str, handle: H) {
        if !is_reserved_sink(name) {
            self.dynamic.push(name.to_string());
        }
        self.handles.insert(name.to_string(), handle);
    }

    fn remove(&mut self, name: &str) -> Option<H> {
        self.dynamic.retain(|n| n != name);
        self.handles.remove(name)
    }

    /// Remove every dynamic sink, returning them in creation order.
    fn drain_dynamic(&mut self) -> Vec<(String, H)> {
        let names = std::mem::take(&mut self.dynamic);
        names
            .into_iter()
            .filter_map(|name| self.handles.remove(&name).map(|h| (name, h)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub struct Router<R: SinkRegistry> {
    registry: R,
    sinks: SinkSet<R::Handle>,
    routed: HashMap<String, u64>,
}

impl<R: SinkRegistry> Router<R> {
    /// Wrap `registry` and eagerly create the reserved sinks.
    pub fn new(mut registry: R) -> Self {
        let mut sinks = SinkSet::default();
        for name in std::iter::once(MASTER_SINK).chain(LEVEL_SINKS) {
            let handle = registry.create_sink(name);
            sinks.insert(name, handle);
        }
        Self {
            registry,
            sinks,
            routed: HashMap::new(),
        }
    }

    /// Discard the previous session's dynamic sinks, empty `Master` and
    /// reset counters. Level sinks keep their records.
    pub fn begin_session(&mut self) {
        for (name, handle) in self.sinks.drain_dynamic() {
            tracing::debug!(sink = %name, "router: removing session sink");
            self.registry.remove_sink(&name, handle);
        }

        // An untouched Master is already what a new session needs.
        if self.routed_count(MASTER_SINK) > 0 {
            if let Some(handle) = self.sinks.remove(MASTER_SINK) {
                self.registry.remove_sink(MASTER_SINK, handle);
            }
            let handle = self.registry.create_sink(MASTER_SINK);
            self.sinks.insert(MASTER_SINK, handle);
        }

        self.routed.clear();
    }

    /// Route one record. `Master` always receives it; the prefix and level
    /// sinks receive it when the record carries them.
    pub fn route(&mut self, record: &LogRecord) {
        self.append(MASTER_SINK, record.to_sink_record());

        if !record.prefix.is_empty() {
            self.ensure_sink(&record.prefix);
            self.append(&record.prefix, record.to_prefix_record());
        }

        if !record.level.is_empty() {
            self.ensure_sink(&record.level);
            self.append(&record.level, record.to_sink_record());
        }
    }

    pub fn set_status(&mut self, text: &str) {
        self.registry.set_status(text);
    }

    pub fn sinks(&self) -> &SinkSet<R::Handle> {
        &self.sinks
    }

    /// Records routed to `name` since the session began.
    pub fn routed_count(&self, name: &str) -> u64 {
        self.routed.get(name).copied().unwrap_or(0)
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut R {
        &mut self.registry
    }

    fn ensure_sink(&mut self, name: &str) {
        if self.sinks.contains(name) {
            return;
        }
        tracing::debug!(sink = %name, "router: creating sink");
        let handle = self.registry.create_sink(name);
        self.sinks.insert(name, handle);
        self.registry.notify_sink_created(name);
    }

    fn append(&mut self, name: &str, record: SinkRecord) {
        let Some(handle) = self.sinks.get(name) else {
            return;
        };
        self.registry.append_record(handle, record);
        *self.routed.entry(name.to_string()).or_default() += 1;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
