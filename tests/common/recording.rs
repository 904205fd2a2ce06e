//! A [`SinkRegistry`] that records every call, shareable between the
//! session that owns it and the test that inspects it.

use logmux_core::{SinkRecord, SinkRegistry};
use std::sync::{Arc, Mutex, MutexGuard};

/// One registry call, in the order the router made it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(String),
    Append(String, SinkRecord),
    Notify(String),
    Status(String),
    Remove(String),
}

#[derive(Clone, Default)]
pub struct RecordingRegistry {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl RecordingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Call>> {
        self.calls.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn created(&self) -> Vec<String> {
        self.filter(|c| match c {
            Call::Create(name) => Some(name.clone()),
            _ => None,
        })
    }

    pub fn notified(&self) -> Vec<String> {
        self.filter(|c| match c {
            Call::Notify(name) => Some(name.clone()),
            _ => None,
        })
    }

    pub fn removed(&self) -> Vec<String> {
        self.filter(|c| match c {
            Call::Remove(name) => Some(name.clone()),
            _ => None,
        })
    }

    pub fn statuses(&self) -> Vec<String> {
        self.filter(|c| match c {
            Call::Status(text) => Some(text.clone()),
            _ => None,
        })
    }

    pub fn last_status(&self) -> Option<String> {
        self.statuses().pop()
    }

    /// What `sink` currently holds: records appended since it was last
    /// created, empty once it has been removed.
    pub fn records(&self, sink: &str) -> Vec<SinkRecord> {
        let mut held = Vec::new();
        for call in self.lock().iter() {
            match call {
                Call::Create(name) | Call::Remove(name) if name == sink => held.clear(),
                Call::Append(name, record) if name == sink => held.push(record.clone()),
                _ => {}
            }
        }
        held
    }

    /// Messages appended to `sink`, in order.
    pub fn messages(&self, sink: &str) -> Vec<String> {
        self.records(sink).into_iter().map(|r| r.message).collect()
    }

    /// Sink names appended to, in call order.
    pub fn append_targets(&self) -> Vec<String> {
        self.filter(|c| match c {
            Call::Append(name, _) => Some(name.clone()),
            _ => None,
        })
    }

    fn filter<T>(&self, f: impl Fn(&Call) -> Option<T>) -> Vec<T> {
        self.lock().iter().filter_map(f).collect()
    }
}

impl SinkRegistry for RecordingRegistry {
    type Handle = String;

    fn create_sink(&mut self, name: &str) -> String {
        self.lock().push(Call::Create(name.to_string()));
        name.to_string()
    }

    fn append_record(&mut self, handle: &String, record: SinkRecord) {
        self.lock().push(Call::Append(handle.clone(), record));
    }

    fn notify_sink_created(&mut self, name: &str) {
        self.lock().push(Call::Notify(name.to_string()));
    }

    fn set_status(&mut self, text: &str) {
        self.lock().push(Call::Status(text.to_string()));
    }

    fn remove_sink(&mut self, name: &str, _handle: String) {
        self.lock().push(Call::Remove(name.to_string()));
    }
}
