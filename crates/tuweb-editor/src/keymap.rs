// ABOUTME: Mapping from key strokes to editor actions
// ABOUTME: Default bindings plus user overrides from configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tuweb_types::{Key, KeyModifiers, KeyStroke};

/// Operations reachable from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorAction {
    Save,
    ToggleFind,
    ToggleReplace,
    CloseActiveTab,
    NextTab,
    PreviousTab,
    IncreaseFontSize,
    DecreaseFontSize,
}

impl EditorAction {
    pub const ALL: [EditorAction; 8] = [
        EditorAction::Save,
        EditorAction::ToggleFind,
        EditorAction::ToggleReplace,
        EditorAction::CloseActiveTab,
        EditorAction::NextTab,
        EditorAction::PreviousTab,
        EditorAction::IncreaseFontSize,
        EditorAction::DecreaseFontSize,
    ];

    /// Name used in the `[keys]` configuration table
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::ToggleFind => "toggle_find",
            Self::ToggleReplace => "toggle_replace",
            Self::CloseActiveTab => "close_active_tab",
            Self::NextTab => "next_tab",
            Self::PreviousTab => "previous_tab",
            Self::IncreaseFontSize => "increase_font_size",
            Self::DecreaseFontSize => "decrease_font_size",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap {
    bindings: HashMap<KeyStroke, EditorAction>,
}

impl Keymap {
    /// Default bindings with `overrides` applied on top
    pub fn with_overrides<'a>(
        overrides: impl IntoIterator<Item = (&'a KeyStroke, &'a EditorAction)>,
    ) -> Self {
        let mut keymap = Self::default();
        for (stroke, action) in overrides {
            keymap.bind(*stroke, *action);
        }
        keymap
    }

    /// Bind a stroke, returning the action it replaced
    pub fn bind(&mut self, stroke: KeyStroke, action: EditorAction) -> Option<EditorAction> {
        self.bindings.insert(stroke, action)
    }

    /// Resolve a stroke. Exact bindings win; otherwise Cmd is treated as Ctrl.
    pub fn lookup(&self, stroke: &KeyStroke) -> Option<EditorAction> {
        self.bindings
            .get(stroke)
            .or_else(|| self.bindings.get(&stroke.with_primary_as_ctrl()))
            .copied()
    }

    /// Every stroke bound to `action`, sorted by their printed form
    pub fn strokes_for(&self, action: EditorAction) -> Vec<KeyStroke> {
        let mut strokes: Vec<KeyStroke> = self
            .bindings
            .iter()
            .filter(|(_, bound)| **bound == action)
            .map(|(stroke, _)| *stroke)
            .collect();
        strokes.sort_by_key(|stroke| stroke.to_string());
        strokes
    }
}

impl Default for Keymap {
    fn default() -> Self {
        use EditorAction::*;

        let ctrl = KeyStroke::ctrl;
        let bindings = [
            (ctrl(Key::Char('s')), Save),
            (ctrl(Key::Char('f')), ToggleFind),
            (ctrl(Key::Char('h')), ToggleReplace),
            (ctrl(Key::Char('w')), CloseActiveTab),
            (ctrl(Key::Tab), NextTab),
            (KeyStroke::new(KeyModifiers::CTRL_SHIFT, Key::Tab), PreviousTab),
            (ctrl(Key::Char('=')), IncreaseFontSize),
            (ctrl(Key::Char('+')), IncreaseFontSize),
            // Plus is shift+= on most layouts
            (KeyStroke::new(KeyModifiers::CTRL_SHIFT, Key::Char('=')), IncreaseFontSize),
            (ctrl(Key::Char('-')), DecreaseFontSize),
        ];

        Self {
            bindings: bindings.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke(text: &str) -> KeyStroke {
        text.parse().unwrap()
    }

    #[test]
    fn test_default_bindings() {
        let keymap = Keymap::default();
        assert_eq!(keymap.lookup(&stroke("ctrl+s")), Some(EditorAction::Save));
        assert_eq!(keymap.lookup(&stroke("ctrl+f")), Some(EditorAction::ToggleFind));
        assert_eq!(keymap.lookup(&stroke("ctrl+h")), Some(EditorAction::ToggleReplace));
        assert_eq!(keymap.lookup(&stroke("ctrl+w")), Some(EditorAction::CloseActiveTab));
        assert_eq!(keymap.lookup(&stroke("ctrl+tab")), Some(EditorAction::NextTab));
        assert_eq!(
            keymap.lookup(&stroke("ctrl+shift+tab")),
            Some(EditorAction::PreviousTab)
        );
        assert_eq!(
            keymap.lookup(&stroke("ctrl++")),
            Some(EditorAction::IncreaseFontSize)
        );
        assert_eq!(
            keymap.lookup(&stroke("ctrl+-")),
            Some(EditorAction::DecreaseFontSize)
        );
        assert_eq!(keymap.lookup(&stroke("s")), None);
    }

    #[test]
    fn test_cmd_acts_as_ctrl() {
        let keymap = Keymap::default();
        assert_eq!(keymap.lookup(&stroke("cmd+s")), Some(EditorAction::Save));
        assert_eq!(
            keymap.lookup(&stroke("cmd+shift+tab")),
            Some(EditorAction::PreviousTab)
        );
    }

    #[test]
    fn test_overrides() {
        let overrides: HashMap<KeyStroke, EditorAction> = [
            (stroke("ctrl+s"), EditorAction::ToggleFind),
            (stroke("alt+s"), EditorAction::Save),
        ]
        .into_iter()
        .collect();

        let keymap = Keymap::with_overrides(&overrides);
        assert_eq!(keymap.lookup(&stroke("ctrl+s")), Some(EditorAction::ToggleFind));
        assert_eq!(keymap.strokes_for(EditorAction::Save), vec![stroke("alt+s")]);
    }

    #[test]
    fn test_every_action_has_a_default_binding() {
        let keymap = Keymap::default();
        for action in EditorAction::ALL {
            assert!(!keymap.strokes_for(action).is_empty(), "{action:?} is unbound");
        }
        assert_eq!(
            keymap.strokes_for(EditorAction::IncreaseFontSize),
            vec![stroke("ctrl++"), stroke("ctrl+="), stroke("ctrl+shift+=")]
        );
    }

    #[test]
    fn test_action_names_match_config_keys() {
        for action in EditorAction::ALL {
            let parsed: EditorAction =
                serde_json::from_value(serde_json::Value::from(action.as_str())).unwrap();
            assert_eq!(parsed, action);
        }
    }
}
