// ABOUTME: Document domain events for tab lifecycle, content changes, and saves
// ABOUTME: Immutable facts emitted after the session store has been updated

use tuweb_types::{Language, TabId, VersionToken};

/// Document domain events.
/// All events are immutable facts about what has already happened.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A new tab was created for a loaded document
    Opened {
        tab_id: TabId,
        path: String,
        language: Language,
    },

    /// The active tab changed (None when the last tab closed)
    Activated { tab_id: Option<TabId> },

    /// Tab content was replaced by an edit
    ContentChanged { tab_id: TabId, revision: u64 },

    /// Tab closed
    Closed { tab_id: TabId, was_dirty: bool },

    /// Content written to the remote source
    Saved {
        tab_id: TabId,
        path: String,
        version: VersionToken,
    },

    /// Save attempt failed; the tab keeps its dirty flag
    SaveFailed {
        tab_id: TabId,
        path: String,
        error: String,
    },

    /// Tab content was refreshed from the remote source
    Reloaded { tab_id: TabId, version: VersionToken },
}

impl Event {
    /// The tab this event concerns, if any
    pub fn tab_id(&self) -> Option<TabId> {
        match self {
            Self::Opened { tab_id, .. }
            | Self::ContentChanged { tab_id, .. }
            | Self::Closed { tab_id, .. }
            | Self::Saved { tab_id, .. }
            | Self::SaveFailed { tab_id, .. }
            | Self::Reloaded { tab_id, .. } => Some(*tab_id),
            Self::Activated { tab_id } => *tab_id,
        }
    }
}
