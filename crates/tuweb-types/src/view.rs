// ABOUTME: View preferences pushed to the mounted text-editing widget
// ABOUTME: Font size bounds and find/replace panel visibility

use serde::{Deserialize, Serialize};

/// Bounds for the editor font-size preference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontSizeRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl Default for FontSizeRange {
    fn default() -> Self {
        Self {
            min: 10.0,
            max: 32.0,
            step: 1.0,
        }
    }
}

impl FontSizeRange {
    pub fn clamp(&self, size: f32) -> f32 {
        size.clamp(self.min, self.max)
    }

    pub fn increase(&self, size: f32) -> f32 {
        self.clamp(size + self.step)
    }

    pub fn decrease(&self, size: f32) -> f32 {
        self.clamp(size - self.step)
    }
}

/// Presentation state owned by the controller and mirrored onto the widget
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    /// Font size in pixels
    pub font_size: f32,
    pub find_open: bool,
    pub replace_open: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            font_size: default_font_size(),
            find_open: false,
            replace_open: false,
        }
    }
}

/// Default font size in pixels
pub fn default_font_size() -> f32 {
    14.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_size_clamping() {
        let range = FontSizeRange::default();
        assert_eq!(range.increase(14.0), 15.0);
        assert_eq!(range.decrease(14.0), 13.0);
        assert_eq!(range.increase(32.0), 32.0);
        assert_eq!(range.decrease(10.0), 10.0);
        assert_eq!(range.clamp(100.0), 32.0);
    }

    #[test]
    fn test_view_state_defaults() {
        let state = ViewState::default();
        assert_eq!(state.font_size, 14.0);
        assert!(!state.find_open);
        assert!(!state.replace_open);
    }
}
