use std::sync::{Arc, Mutex};

use isoforge::host::{HostAdapter, HostEvent, LogSink, ProgressSink};
use isoforge::types::{LogCategory, LogLine, ProgressEvent};

/// Sink that keeps every event in memory, in receipt order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<HostEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn lines(&self) -> Vec<LogLine> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Log(line) => Some(line),
                HostEvent::Progress(_) => None,
            })
            .collect()
    }

    /// Texts of the lines posted with `category`.
    pub fn texts(&self, category: LogCategory) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|l| l.category == category)
            .map(|l| l.text)
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.texts(LogCategory::Error)
    }

    pub fn progress(&self) -> Vec<ProgressEvent> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Progress(p) => Some(p),
                HostEvent::Log(_) => None,
            })
            .collect()
    }
}

impl LogSink for RecordingSink {
    fn post_line(&self, line: LogLine) {
        self.events.lock().unwrap().push(HostEvent::Log(line));
    }
}

impl ProgressSink for RecordingSink {
    fn post_progress(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(HostEvent::Progress(event));
    }
}

/// A host whose output lands in the returned sink.
pub fn recording_host() -> (HostAdapter, RecordingSink) {
    let sink = RecordingSink::new();
    (HostAdapter::with_sink(sink.clone()), sink)
}
