// ABOUTME: A single open document tab
// ABOUTME: Content, dirty tracking and the remote version token

use tuweb_types::{DocumentDescriptor, Language, TabId, VersionToken};

/// An open, editable in-memory copy of a remote file
#[derive(Debug, Clone, PartialEq)]
pub struct Tab {
    pub id: TabId,

    /// Display name
    pub name: String,

    /// Source path, unique among open tabs
    pub path: String,

    pub content: String,

    /// Classified once when the tab is created
    pub language: Language,

    /// Whether the content has changed since the last successful save
    pub dirty: bool,

    pub active: bool,

    /// Token of the remote content this tab was last synchronized with
    pub version: Option<VersionToken>,

    /// Branch or reference the content came from
    pub source_ref: Option<String>,

    /// Bumped on every content update
    pub revision: u64,
}

impl Tab {
    pub(crate) fn from_descriptor(id: TabId, descriptor: DocumentDescriptor) -> Self {
        let language = descriptor.resolved_language();
        Self {
            id,
            name: descriptor.name,
            path: descriptor.path,
            content: descriptor.content,
            language,
            dirty: false,
            active: false,
            version: descriptor.version,
            source_ref: descriptor.source_ref,
            revision: 0,
        }
    }

    /// Whether the tab can be saved with conflict detection
    pub fn is_synchronized(&self) -> bool {
        self.version.is_some()
    }
}
