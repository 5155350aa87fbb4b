// ABOUTME: Identity and descriptor types for open documents
// ABOUTME: Tab ids, remote version tokens and the inputs used to open a tab

use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of an open tab.
///
/// Ids are allocated by the session store and are unique per open instance,
/// so closing and reopening the same path yields a different id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TabId(u64);

impl TabId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab-{}", self.0)
    }
}

/// Opaque content-version token handed out by the remote content provider.
///
/// A save must present the token of the content it was based on so the
/// provider can reject writes over concurrent modifications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for VersionToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for VersionToken {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file that can be loaded into a tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    /// Display name, usually the final path component
    pub name: String,
    /// Path understood by the content gateway
    pub path: String,
}

impl FileRef {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Build a reference whose display name is the last `/`-separated segment of `path`
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = path
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or(path.as_str())
            .to_string();
        Self { name, path }
    }
}

/// Everything needed to open (or re-activate) a tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDescriptor {
    pub name: String,
    pub path: String,
    pub content: String,
    /// Content-type tag. Classified from `name` when absent.
    pub language: Option<Language>,
    pub version: Option<VersionToken>,
    /// Branch or reference the content was read from
    pub source_ref: Option<String>,
}

impl DocumentDescriptor {
    pub fn new(name: impl Into<String>, path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            content: content.into(),
            language: None,
            version: None,
            source_ref: None,
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    pub fn with_version(mut self, version: impl Into<VersionToken>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_source_ref(mut self, source_ref: impl Into<String>) -> Self {
        self.source_ref = Some(source_ref.into());
        self
    }

    /// The language to store on the tab: the explicit one, or the classification of `name`
    pub fn resolved_language(&self) -> Language {
        self.language
            .unwrap_or_else(|| Language::from_file_name(&self.name))
    }
}
