// src/host/sink.rs

//! Destinations for host output.
//!
//! A sink must accept a post without waiting for anyone to render it: the
//! caller is the engine worker, and the presentation side may itself be
//! waiting on that worker for a result.

use tokio::sync::mpsc;
use tracing::trace;

use crate::types::{LogLine, ProgressEvent};

pub trait LogSink: Send + Sync {
    fn post_line(&self, line: LogLine);
}

pub trait ProgressSink: Send + Sync {
    fn post_progress(&self, event: ProgressEvent);
}

/// Everything a [`ChannelSink`] forwards, in receipt order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Log(LogLine),
    Progress(ProgressEvent),
}

/// Sink that posts into an unbounded tokio channel.
///
/// Sending on an unbounded channel never waits, so the engine worker is never
/// held up by a slow or busy consumer. If the receiver has gone away the
/// event is dropped.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<HostEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<HostEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn post(&self, event: HostEvent) {
        if self.tx.send(event).is_err() {
            trace!("host event receiver dropped; discarding event");
        }
    }
}

impl LogSink for ChannelSink {
    fn post_line(&self, line: LogLine) {
        self.post(HostEvent::Log(line));
    }
}

impl ProgressSink for ChannelSink {
    fn post_progress(&self, event: ProgressEvent) {
        self.post(HostEvent::Progress(event));
    }
}
