//! Presentation-side receivers of [`Event`]s.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::events::Event;

/// Receives every published event.
///
/// Called from the countdown task once per second, so implementations
/// should return quickly.
pub trait UiSink: Send + Sync {
    fn publish(&self, event: &Event);
}

impl<S: UiSink + ?Sized> UiSink for Arc<S> {
    fn publish(&self, event: &Event) {
        (**self).publish(event)
    }
}

/// Forwards events into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Event>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl UiSink for ChannelSink {
    fn publish(&self, event: &Event) {
        // Receiver gone means nobody is watching any more.
        let _ = self.tx.send(event.clone());
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last(&self) -> Option<Event> {
        self.events.lock().ok().and_then(|e| e.last().cloned())
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl UiSink for RecordingSink {
    fn publish(&self, event: &Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
