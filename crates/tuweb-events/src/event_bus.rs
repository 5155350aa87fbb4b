// ABOUTME: Event bus trait and implementations for decoupled communication
// ABOUTME: Channel-backed bus for front ends, recording bus for tests

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::document::Event as DocumentEvent;
use crate::ui::{Event as UiEvent, NotificationLevel};

/// Event bus trait for dispatching domain events
pub trait EventBus: Send + Sync {
    /// Dispatch a document event
    fn dispatch_document(&self, event: DocumentEvent);

    /// Dispatch a UI event
    fn dispatch_ui(&self, event: UiEvent);
}

/// Either kind of event, as delivered to a receiver
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Document(DocumentEvent),
    Ui(UiEvent),
}

/// Bus that forwards events over an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelEventBus {
    sender: mpsc::UnboundedSender<AppEvent>,
}

/// Receiving half of a [`ChannelEventBus`]
#[derive(Debug)]
pub struct EventReceiver {
    receiver: mpsc::UnboundedReceiver<AppEvent>,
}

impl ChannelEventBus {
    pub fn new() -> (Self, EventReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, EventReceiver { receiver })
    }

    fn send(&self, event: AppEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("Event receiver dropped, discarding event");
        }
    }
}

impl EventBus for ChannelEventBus {
    fn dispatch_document(&self, event: DocumentEvent) {
        self.send(AppEvent::Document(event));
    }

    fn dispatch_ui(&self, event: UiEvent) {
        self.send(AppEvent::Ui(event));
    }
}

impl EventReceiver {
    /// Wait for the next event; None once every sender is gone
    pub async fn recv(&mut self) -> Option<AppEvent> {
        self.receiver.recv().await
    }

    /// Take whatever is queued without waiting
    pub fn drain(&mut self) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Bus that keeps every event in memory, for inspection in tests
#[derive(Debug, Default)]
pub struct RecordingEventBus {
    events: Mutex<Vec<AppEvent>>,
}

impl RecordingEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AppEvent> {
        self.events.lock().clone()
    }

    pub fn document_events(&self) -> Vec<DocumentEvent> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                AppEvent::Document(doc) => Some(doc.clone()),
                AppEvent::Ui(_) => None,
            })
            .collect()
    }

    /// Notifications as `(level, message)` pairs
    pub fn notifications(&self) -> Vec<(NotificationLevel, String)> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                AppEvent::Ui(UiEvent::Notification { level, message, .. }) => {
                    Some((*level, message.clone()))
                }
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventBus for RecordingEventBus {
    fn dispatch_document(&self, event: DocumentEvent) {
        self.events.lock().push(AppEvent::Document(event));
    }

    fn dispatch_ui(&self, event: UiEvent) {
        self.events.lock().push(AppEvent::Ui(event));
    }
}
