// ABOUTME: UI preferences persisted between sessions as JSON
// ABOUTME: Holds only presentation settings, never document data

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tuweb_logging::{debug, warn};
use tuweb_types::view::default_font_size;

pub const PREFERENCES_FILE_NAME: &str = "preferences.json";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorPreferences {
    pub font_size: f32,
}

impl Default for EditorPreferences {
    fn default() -> Self {
        Self {
            font_size: default_font_size(),
        }
    }
}

impl EditorPreferences {
    /// `<config_dir>/tuweb/preferences.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tuweb").join(PREFERENCES_FILE_NAME))
    }

    /// Read preferences, falling back to defaults when the file is missing or unreadable
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "No stored preferences");
            return Self::default();
        }

        match Self::read(path) {
            Ok(preferences) => preferences,
            Err(err) => {
                warn!(path = %path.display(), error = %format!("{err:#}"), "Ignoring unreadable preferences");
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(path = %path.display(), font_size = self.font_size, "Preferences saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(PREFERENCES_FILE_NAME);

        let preferences = EditorPreferences { font_size: 18.0 };
        preferences.save_to(&path).unwrap();
        assert_eq!(EditorPreferences::load_from(&path), preferences);
    }

    #[test]
    fn test_missing_or_corrupt_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(PREFERENCES_FILE_NAME);
        assert_eq!(EditorPreferences::load_from(&path), EditorPreferences::default());

        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(EditorPreferences::load_from(&path).font_size, 14.0);

        std::fs::write(&path, "{}").unwrap();
        assert_eq!(EditorPreferences::load_from(&path).font_size, 14.0);
    }
}
