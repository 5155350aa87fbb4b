// ABOUTME: Session state for open documents, with no I/O of its own
// ABOUTME: Owns the tab collection and the active-tab pointer

pub mod store;
pub mod tab;

pub use store::DocumentSessionStore;
pub use tab::Tab;
