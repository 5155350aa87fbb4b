// ABOUTME: Pure data types with no cross-crate dependencies
// ABOUTME: Foundation layer for all other tuweb crates

pub mod document;
pub mod input;
pub mod language;
pub mod view;

// Re-export commonly used types
pub use document::{DocumentDescriptor, FileRef, TabId, VersionToken};
pub use input::{Key, KeyModifiers, KeyStroke, KeyStrokeParseError};
pub use language::Language;
pub use view::{FontSizeRange, ViewState};
