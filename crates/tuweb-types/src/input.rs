// ABOUTME: Keyboard input types shared by the keymap and the keyboard hub
// ABOUTME: Parses and prints key strokes such as "ctrl+shift+tab"

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Keyboard modifiers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct KeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// Cmd on macOS, Super elsewhere
    pub meta: bool,
}

impl KeyModifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
        alt: false,
        meta: false,
    };

    pub const CTRL_SHIFT: Self = Self {
        shift: true,
        ctrl: true,
        alt: false,
        meta: false,
    };

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

/// A non-modifier key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Tab,
    Enter,
    Escape,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

/// A modifier+key combination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyStroke {
    pub modifiers: KeyModifiers,
    pub key: Key,
}

impl KeyStroke {
    pub fn new(modifiers: KeyModifiers, key: Key) -> Self {
        Self {
            modifiers,
            key: normalize_key(key),
        }
    }

    /// Stroke with only the control modifier held
    pub fn ctrl(key: Key) -> Self {
        Self::new(KeyModifiers::CTRL, key)
    }

    /// Treat the platform (meta) modifier as control so that Cmd+S and
    /// Ctrl+S resolve to the same binding.
    pub fn with_primary_as_ctrl(self) -> Self {
        if self.modifiers.meta && !self.modifiers.ctrl {
            Self {
                modifiers: KeyModifiers {
                    meta: false,
                    ctrl: true,
                    ..self.modifiers
                },
                key: self.key,
            }
        } else {
            self
        }
    }
}

/// Character keys are stored lowercase; shift is carried by the modifiers
fn normalize_key(key: Key) -> Key {
    match key {
        Key::Char(c) => Key::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyStrokeParseError {
    #[error("Empty key stroke")]
    Empty,

    #[error("Unknown modifier '{0}'")]
    UnknownModifier(String),

    #[error("Unknown key '{0}'")]
    UnknownKey(String),
}

impl FromStr for KeyStroke {
    type Err = KeyStrokeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(KeyStrokeParseError::Empty);
        }

        // "ctrl++" binds the plus key itself
        let (head, key_part) = if let Some(head) = s.strip_suffix("++") {
            (Some(head), "+")
        } else if s == "+" {
            (None, "+")
        } else {
            match s.rsplit_once('+') {
                Some((head, key)) => (Some(head), key),
                None => (None, s),
            }
        };

        let mut modifiers = KeyModifiers::NONE;
        if let Some(head) = head {
            for part in head.split('+') {
                match part.trim().to_ascii_lowercase().as_str() {
                    "ctrl" | "control" => modifiers.ctrl = true,
                    "shift" => modifiers.shift = true,
                    "alt" | "option" => modifiers.alt = true,
                    "meta" | "cmd" | "super" | "win" => modifiers.meta = true,
                    other => return Err(KeyStrokeParseError::UnknownModifier(other.to_string())),
                }
            }
        }

        Ok(Self::new(modifiers, parse_key(key_part.trim())?))
    }
}

fn parse_key(key: &str) -> Result<Key, KeyStrokeParseError> {
    let lower = key.to_ascii_lowercase();
    let parsed = match lower.as_str() {
        "" => return Err(KeyStrokeParseError::Empty),
        "tab" => Key::Tab,
        "enter" | "return" => Key::Enter,
        "escape" | "esc" => Key::Escape,
        "backspace" => Key::Backspace,
        "delete" | "del" => Key::Delete,
        "up" => Key::Up,
        "down" => Key::Down,
        "left" => Key::Left,
        "right" => Key::Right,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" => Key::PageUp,
        "pagedown" => Key::PageDown,
        "space" => Key::Char(' '),
        "plus" => Key::Char('+'),
        "minus" => Key::Char('-'),
        "equal" | "equals" => Key::Char('='),
        _ => {
            let mut chars = lower.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Char(c),
                (Some('f'), Some(_)) => lower[1..]
                    .parse::<u8>()
                    .ok()
                    .filter(|n| (1..=24).contains(n))
                    .map(Key::F)
                    .ok_or_else(|| KeyStrokeParseError::UnknownKey(key.to_string()))?,
                _ => return Err(KeyStrokeParseError::UnknownKey(key.to_string())),
            }
        }
    };
    Ok(parsed)
}

impl fmt::Display for KeyStroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.modifiers;
        if m.ctrl {
            f.write_str("ctrl+")?;
        }
        if m.alt {
            f.write_str("alt+")?;
        }
        if m.shift {
            f.write_str("shift+")?;
        }
        if m.meta {
            f.write_str("meta+")?;
        }
        match self.key {
            Key::Char(' ') => f.write_str("space"),
            Key::Char(c) => write!(f, "{c}"),
            Key::Tab => f.write_str("tab"),
            Key::Enter => f.write_str("enter"),
            Key::Escape => f.write_str("escape"),
            Key::Backspace => f.write_str("backspace"),
            Key::Delete => f.write_str("delete"),
            Key::Up => f.write_str("up"),
            Key::Down => f.write_str("down"),
            Key::Left => f.write_str("left"),
            Key::Right => f.write_str("right"),
            Key::Home => f.write_str("home"),
            Key::End => f.write_str("end"),
            Key::PageUp => f.write_str("pageup"),
            Key::PageDown => f.write_str("pagedown"),
            Key::F(n) => write!(f, "f{n}"),
        }
    }
}

impl Serialize for KeyStroke {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for KeyStroke {
    fn deserialize<D>(deserializer: D) -> Result<KeyStroke, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_strokes() {
        let save: KeyStroke = "ctrl+s".parse().unwrap();
        assert_eq!(save, KeyStroke::ctrl(Key::Char('s')));

        let prev: KeyStroke = "Ctrl+Shift+Tab".parse().unwrap();
        assert_eq!(prev, KeyStroke::new(KeyModifiers::CTRL_SHIFT, Key::Tab));

        let f5: KeyStroke = "f5".parse().unwrap();
        assert_eq!(f5, KeyStroke::new(KeyModifiers::NONE, Key::F(5)));
    }

    #[test]
    fn test_parse_plus_and_minus() {
        let plus: KeyStroke = "ctrl++".parse().unwrap();
        assert_eq!(plus, KeyStroke::ctrl(Key::Char('+')));

        let named: KeyStroke = "ctrl+plus".parse().unwrap();
        assert_eq!(named, plus);

        let minus: KeyStroke = "ctrl+-".parse().unwrap();
        assert_eq!(minus, KeyStroke::ctrl(Key::Char('-')));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<KeyStroke>(), Err(KeyStrokeParseError::Empty));
        assert!(matches!(
            "hyper+s".parse::<KeyStroke>(),
            Err(KeyStrokeParseError::UnknownModifier(_))
        ));
        assert!(matches!(
            "ctrl+banana".parse::<KeyStroke>(),
            Err(KeyStrokeParseError::UnknownKey(_))
        ));
        assert!(matches!(
            "f99".parse::<KeyStroke>(),
            Err(KeyStrokeParseError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_display_parses_back() {
        for text in ["ctrl+s", "ctrl+shift+tab", "alt+f4", "ctrl+space", "meta+="] {
            let stroke: KeyStroke = text.parse().unwrap();
            assert_eq!(stroke.to_string().parse::<KeyStroke>().unwrap(), stroke);
        }
    }

    #[test]
    fn test_char_keys_are_lowercased() {
        let upper = KeyStroke::new(KeyModifiers::CTRL, Key::Char('S'));
        assert_eq!(upper.key, Key::Char('s'));
    }

    #[test]
    fn test_primary_modifier_folding() {
        let cmd_s: KeyStroke = "cmd+s".parse().unwrap();
        assert_eq!(cmd_s.with_primary_as_ctrl(), KeyStroke::ctrl(Key::Char('s')));

        let ctrl_s = KeyStroke::ctrl(Key::Char('s'));
        assert_eq!(ctrl_s.with_primary_as_ctrl(), ctrl_s);
    }
}
