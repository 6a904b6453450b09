// Event adapters - Deliver progress and status notifications

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::domain::model::AppEvent;
use crate::ports::EventPort;

/// Writes every event to the log
#[derive(Debug, Clone, Default)]
pub struct TracingEventAdapter;

impl TracingEventAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl EventPort for TracingEventAdapter {
    fn emit(&self, event: AppEvent) {
        match event {
            AppEvent::DownloadStatus { message } => {
                info!(target: "clipgrab::events", "{}", message)
            }
            AppEvent::DownloadProgress { percent } => {
                info!(target: "clipgrab::events", percent, "Download progress")
            }
            AppEvent::ExportProgress {
                current,
                total,
                filename,
            } => info!(
                target: "clipgrab::events",
                current,
                total,
                filename = %filename,
                "Exported item {}/{}",
                current,
                total
            ),
        }
    }
}

/// Forwards events to an unbounded channel, preserving emission order
#[derive(Debug, Clone)]
pub struct ChannelEventAdapter {
    tx: mpsc::UnboundedSender<AppEvent>,
}

impl ChannelEventAdapter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventPort for ChannelEventAdapter {
    fn emit(&self, event: AppEvent) {
        // A dropped receiver just means nobody is listening anymore
        let _ = self.tx.send(event);
    }
}

/// Sends each event to every inner sink in turn
#[derive(Clone, Default)]
pub struct FanOutEventAdapter {
    sinks: Vec<Arc<dyn EventPort>>,
}

impl FanOutEventAdapter {
    pub fn new(sinks: Vec<Arc<dyn EventPort>>) -> Self {
        Self { sinks }
    }
}

impl EventPort for FanOutEventAdapter {
    fn emit(&self, event: AppEvent) {
        for sink in &self.sinks {
            sink.emit(event.clone());
        }
    }
}
