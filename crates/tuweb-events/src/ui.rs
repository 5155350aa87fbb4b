// ABOUTME: UI domain events for transient notifications and view toggles
// ABOUTME: Pure UI facts without business logic dependencies

use std::fmt;

/// Severity of a transient notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// UI domain events
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Something the user should see briefly
    Notification {
        level: NotificationLevel,
        title: String,
        message: String,
    },

    /// Editor font size preference changed
    FontSizeChanged { font_size: f32 },

    /// Find or replace panel visibility changed
    SearchPanelToggled { find_open: bool, replace_open: bool },
}

impl Event {
    pub fn notification(
        level: NotificationLevel,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Notification {
            level,
            title: title.into(),
            message: message.into(),
        }
    }
}
