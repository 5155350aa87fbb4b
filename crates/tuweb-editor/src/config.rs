// ABOUTME: Editor configuration loaded from editor.toml in the user config directory
// ABOUTME: Auto-save timing, font bounds, remote defaults, key overrides and logging

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tuweb_logging::{LoggingConfig, info, warn};
use tuweb_types::{FontSizeRange, KeyStroke};

use crate::debouncer::DebounceConfig;
use crate::keymap::{EditorAction, Keymap};

/// Name of the configuration file inside the config directory
pub const CONFIG_FILE_NAME: &str = "editor.toml";

/// Reference used when a file is opened without naming one
pub const DEFAULT_SOURCE_REF: &str = "main";

const MAX_AUTO_SAVE_DELAY_MS: u64 = 60_000;
const FONT_SIZE_FLOOR: u16 = 6;
const FONT_SIZE_CEILING: u16 = 96;

/// Auto-save timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoSaveConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Quiet period after the last edit before saving
    #[serde(default = "default_auto_save_delay")]
    pub delay_ms: u64,

    /// Force a save once edits have continued this long. 0 disables.
    #[serde(default)]
    pub max_wait_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_auto_save_delay() -> u64 {
    1000
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ms: default_auto_save_delay(),
            max_wait_ms: 0,
        }
    }
}

impl AutoSaveConfig {
    pub fn debounce_config(&self) -> DebounceConfig {
        DebounceConfig {
            delay: Duration::from_millis(self.delay_ms),
            max_delay: (self.max_wait_ms > 0).then(|| Duration::from_millis(self.max_wait_ms)),
        }
    }
}

/// Editor font size preference and its bounds, in pixels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontConfig {
    #[serde(default = "default_font_size")]
    pub size: u16,

    #[serde(default = "default_font_min")]
    pub min: u16,

    #[serde(default = "default_font_max")]
    pub max: u16,
}

fn default_font_size() -> u16 {
    14
}

fn default_font_min() -> u16 {
    10
}

fn default_font_max() -> u16 {
    32
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            size: default_font_size(),
            min: default_font_min(),
            max: default_font_max(),
        }
    }
}

impl FontConfig {
    pub fn range(&self) -> FontSizeRange {
        FontSizeRange {
            min: f32::from(self.min),
            max: f32::from(self.max),
            ..FontSizeRange::default()
        }
    }
}

/// Remote source defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Branch or commit used when a file is opened without a reference
    #[serde(default = "default_source_ref")]
    pub default_ref: String,
}

fn default_source_ref() -> String {
    DEFAULT_SOURCE_REF.to_string()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            default_ref: default_source_ref(),
        }
    }
}

/// Complete editor configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub auto_save: AutoSaveConfig,

    #[serde(default)]
    pub font: FontConfig,

    #[serde(default)]
    pub remote: RemoteConfig,

    /// Key stroke overrides applied on top of the default bindings
    #[serde(default)]
    pub keys: HashMap<KeyStroke, EditorAction>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EditorConfig {
    /// Default location, `<config_dir>/tuweb/editor.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tuweb").join(CONFIG_FILE_NAME))
    }

    /// Load from the default location, falling back to defaults when absent
    pub fn load() -> anyhow::Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_path(&path),
            Some(path) => {
                info!(config_path = %path.display(), "No editor configuration file found, using defaults");
                Ok(Self::default())
            }
            None => {
                warn!("Could not determine config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from an explicit file. Out-of-range values are clamped.
    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        info!(config_path = %path.display(), "Loading editor configuration");

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: EditorConfig = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        if let Err(validation_error) = config.validate() {
            warn!(
                config_path = %path.display(),
                error = %validation_error,
                "Invalid editor configuration, using sanitized values"
            );
            return Ok(config.sanitized());
        }

        info!(
            auto_save = config.auto_save.enabled,
            delay_ms = config.auto_save.delay_ms,
            font_size = config.font.size,
            key_overrides = config.keys.len(),
            "Loaded editor configuration"
        );
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), String> {
        if self.auto_save.enabled && self.auto_save.delay_ms == 0 {
            return Err("Auto-save delay must be greater than 0".to_string());
        }

        if self.auto_save.delay_ms > MAX_AUTO_SAVE_DELAY_MS {
            return Err("Auto-save delay should not exceed 60 seconds".to_string());
        }

        if self.auto_save.max_wait_ms != 0 && self.auto_save.max_wait_ms < self.auto_save.delay_ms
        {
            return Err("Auto-save max wait must not be shorter than the delay".to_string());
        }

        let font = &self.font;
        if font.min < FONT_SIZE_FLOOR || font.max > FONT_SIZE_CEILING || font.min > font.max {
            return Err(format!(
                "Font bounds must satisfy {FONT_SIZE_FLOOR} <= min <= max <= {FONT_SIZE_CEILING}"
            ));
        }

        if font.size < font.min || font.size > font.max {
            return Err(format!(
                "Font size {} is outside {}..={}",
                font.size, font.min, font.max
            ));
        }

        if self.remote.default_ref.trim().is_empty() {
            return Err("Default remote reference must not be empty".to_string());
        }

        Ok(())
    }

    /// A copy with every invalid value replaced or clamped
    pub fn sanitized(&self) -> Self {
        let mut config = self.clone();

        let auto_save = &mut config.auto_save;
        if auto_save.delay_ms == 0 {
            warn!("Invalid auto-save delay 0, using default 1000ms");
            auto_save.delay_ms = default_auto_save_delay();
        } else if auto_save.delay_ms > MAX_AUTO_SAVE_DELAY_MS {
            warn!(
                original_delay = auto_save.delay_ms,
                "Auto-save delay too high, capping at 60 seconds"
            );
            auto_save.delay_ms = MAX_AUTO_SAVE_DELAY_MS;
        }
        if auto_save.max_wait_ms != 0 && auto_save.max_wait_ms < auto_save.delay_ms {
            warn!(
                max_wait_ms = auto_save.max_wait_ms,
                "Auto-save max wait shorter than delay, disabling it"
            );
            auto_save.max_wait_ms = 0;
        }

        let font = &mut config.font;
        if font.min < FONT_SIZE_FLOOR || font.max > FONT_SIZE_CEILING || font.min > font.max {
            warn!(min = font.min, max = font.max, "Invalid font bounds, using defaults");
            font.min = default_font_min();
            font.max = default_font_max();
        }
        let clamped = font.size.clamp(font.min, font.max);
        if clamped != font.size {
            warn!(original_size = font.size, size = clamped, "Font size out of bounds, clamping");
            font.size = clamped;
        }

        if config.remote.default_ref.trim().is_empty() {
            warn!("Empty default remote reference, using '{}'", DEFAULT_SOURCE_REF);
            config.remote.default_ref = default_source_ref();
        }

        config
    }

    /// Default bindings with the configured overrides applied
    pub fn keymap(&self) -> Keymap {
        Keymap::with_overrides(&self.keys)
    }

    pub fn font_range(&self) -> FontSizeRange {
        self.font.range()
    }

    pub fn debounce_config(&self) -> DebounceConfig {
        self.auto_save.debounce_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.auto_save.enabled);
        assert_eq!(config.debounce_config().delay, Duration::from_millis(1000));
        assert!(config.debounce_config().max_delay.is_none());
        assert_eq!(config.font_range(), FontSizeRange::default());
        assert_eq!(config.remote.default_ref, "main");
    }

    #[test]
    fn test_parse_full_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            r#"
[auto_save]
delay_ms = 1500
max_wait_ms = 10000

[font]
size = 16

[remote]
default_ref = "develop"

[keys]
"ctrl+s" = "toggle_find"
"alt+s" = "save"

[logging]
level = "debug"
"#,
        )
        .unwrap();

        let config = EditorConfig::load_from_path(&path).unwrap();
        assert_eq!(config.auto_save.delay_ms, 1500);
        assert_eq!(
            config.debounce_config().max_delay,
            Some(Duration::from_millis(10_000))
        );
        assert_eq!(config.font.size, 16);
        assert_eq!(config.font.min, 10);
        assert_eq!(config.remote.default_ref, "develop");

        let keymap = config.keymap();
        let ctrl_s: KeyStroke = "ctrl+s".parse().unwrap();
        let alt_s: KeyStroke = "alt+s".parse().unwrap();
        assert_eq!(keymap.lookup(&ctrl_s), Some(EditorAction::ToggleFind));
        assert_eq!(keymap.lookup(&alt_s), Some(EditorAction::Save));
    }

    #[test]
    fn test_invalid_values_are_sanitized_on_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "[auto_save]\ndelay_ms = 0\n\n[font]\nsize = 50\n",
        )
        .unwrap();

        let config = EditorConfig::load_from_path(&path).unwrap();
        assert_eq!(config.auto_save.delay_ms, 1000);
        assert_eq!(config.font.size, 32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_problems() {
        let mut config = EditorConfig::default();
        config.font.min = 40;
        assert!(config.validate().is_err());

        let mut config = EditorConfig::default();
        config.auto_save.max_wait_ms = 200;
        assert!(config.validate().unwrap_err().contains("max wait"));
        assert_eq!(config.sanitized().auto_save.max_wait_ms, 0);

        let mut config = EditorConfig::default();
        config.remote.default_ref = "  ".to_string();
        assert!(config.validate().is_err());
        assert_eq!(config.sanitized().remote.default_ref, "main");
    }

    #[test]
    fn test_parse_errors_carry_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[keys]\n\"hyper+s\" = \"save\"\n").unwrap();

        let err = EditorConfig::load_from_path(&path).unwrap_err();
        assert!(format!("{err:#}").contains(CONFIG_FILE_NAME));

        let missing = EditorConfig::load_from_path(&dir.path().join("missing.toml"));
        assert!(missing.is_err());
    }
}
