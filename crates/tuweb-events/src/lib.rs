// ABOUTME: Cross-crate event definitions for decoupled communication
// ABOUTME: Document lifecycle facts and user-facing notifications

pub mod document;
pub mod event_bus;
pub mod ui;

pub use document::Event as DocumentEvent;
pub use event_bus::{AppEvent, ChannelEventBus, EventBus, EventReceiver, RecordingEventBus};
pub use ui::{Event as UiEvent, NotificationLevel};
