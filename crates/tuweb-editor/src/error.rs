// ABOUTME: Error types for remote content access and editor session operations
// ABOUTME: Gateway failures are translated into the controller's user-facing taxonomy

use thiserror::Error;
use tuweb_events::NotificationLevel;
use tuweb_types::TabId;

/// Failures reported by a content gateway
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("'{path}' does not exist on '{source_ref}'")]
    NotFound { path: String, source_ref: String },

    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("'{path}' was modified remotely")]
    Conflict { path: String },

    #[error("Remote request failed: {message}")]
    Transport { message: String },
}

impl GatewayError {
    pub fn not_found(path: impl Into<String>, source_ref: impl Into<String>) -> Self {
        Self::NotFound {
            path: path.into(),
            source_ref: source_ref.into(),
        }
    }

    pub fn auth<S: Into<String>>(message: S) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn conflict<S: Into<String>>(path: S) -> Self {
        Self::Conflict { path: path.into() }
    }

    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// Failures surfaced at the editor session boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("Could not open '{path}': {source}")]
    LoadFailure {
        path: String,
        #[source]
        source: GatewayError,
    },

    #[error("'{path}' is not synchronized with the remote source")]
    SaveRefused { path: String },

    #[error("'{path}' was changed remotely since it was loaded; reload it before saving")]
    SaveConflict { path: String },

    #[error("Authentication failed: {message}")]
    AuthFailure { message: String },

    #[error("Could not save '{path}': {message}")]
    SaveFailure { path: String, message: String },

    #[error("No open tab with id {id}")]
    UnknownTab { id: TabId },
}

impl EditorError {
    /// Translate a failed fetch
    pub fn from_load(path: &str, error: GatewayError) -> Self {
        match error {
            GatewayError::Auth { message } => Self::AuthFailure { message },
            source => Self::LoadFailure {
                path: path.to_string(),
                source,
            },
        }
    }

    /// Translate a failed write
    pub fn from_save(path: &str, error: GatewayError) -> Self {
        match error {
            GatewayError::Auth { message } => Self::AuthFailure { message },
            GatewayError::Conflict { .. } => Self::SaveConflict {
                path: path.to_string(),
            },
            other => Self::SaveFailure {
                path: path.to_string(),
                message: other.to_string(),
            },
        }
    }

    /// Short heading for the notification shown to the user
    pub fn title(&self) -> &'static str {
        match self {
            Self::LoadFailure { .. } => "Open failed",
            Self::SaveRefused { .. } => "Save refused",
            Self::SaveConflict { .. } => "Save conflict",
            Self::AuthFailure { .. } => "Authentication required",
            Self::SaveFailure { .. } => "Save failed",
            Self::UnknownTab { .. } => "Unknown tab",
        }
    }

    pub fn notification_level(&self) -> NotificationLevel {
        match self {
            Self::SaveRefused { .. } | Self::UnknownTab { .. } => NotificationLevel::Warning,
            _ => NotificationLevel::Error,
        }
    }

    /// Whether retrying the same operation unchanged cannot succeed.
    ///
    /// Conflicts need a reload and auth failures need new credentials first.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::SaveRefused { .. } | Self::SaveConflict { .. } | Self::AuthFailure { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_translation() {
        let not_found = EditorError::from_load("a.ts", GatewayError::not_found("a.ts", "main"));
        assert!(matches!(not_found, EditorError::LoadFailure { .. }));
        assert!(not_found.to_string().contains("does not exist on 'main'"));

        let auth = EditorError::from_load("a.ts", GatewayError::auth("token expired"));
        assert_eq!(
            auth,
            EditorError::AuthFailure {
                message: "token expired".to_string()
            }
        );
    }

    #[test]
    fn test_save_translation() {
        let conflict = EditorError::from_save("a.ts", GatewayError::conflict("a.ts"));
        assert_eq!(
            conflict,
            EditorError::SaveConflict {
                path: "a.ts".to_string()
            }
        );
        assert!(conflict.is_terminal());

        let transport = EditorError::from_save("a.ts", GatewayError::transport("timeout"));
        assert!(matches!(transport, EditorError::SaveFailure { .. }));
        assert!(!transport.is_terminal());
    }

    #[test]
    fn test_save_refused_message() {
        let refused = EditorError::SaveRefused {
            path: "a.ts".to_string(),
        };
        assert!(refused.to_string().contains("not synchronized"));
        assert_eq!(refused.notification_level(), NotificationLevel::Warning);
        assert_eq!(refused.title(), "Save refused");
    }
}
