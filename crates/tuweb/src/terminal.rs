// ABOUTME: Terminal rendering for the line front end
// ABOUTME: Prints the active document header, view changes and notifications

use std::io::Write;
use tuweb_editor::EditorSurface;
use tuweb_events::{AppEvent, DocumentEvent, EventReceiver, UiEvent};
use tuweb_logging::debug;
use tuweb_session::Tab;
use tuweb_types::ViewState;

/// Surface that echoes what a graphical widget would display
#[derive(Debug, Default)]
pub struct TerminalSurface;

impl EditorSurface for TerminalSurface {
    fn apply_view_state(&self, state: &ViewState) {
        let panels = match (state.find_open, state.replace_open) {
            (_, true) => "find+replace",
            (true, false) => "find",
            (false, false) => "none",
        };
        println!("view: font {}px, panels: {panels}", state.font_size);
    }

    fn present(&self, tab: Option<&Tab>) {
        match tab {
            Some(tab) => println!("{}", header(tab)),
            None => println!("-- no open documents --"),
        }
    }
}

/// One-line summary of a tab, e.g. `* tab-0 src/a.ts [typescript] modified`
pub fn header(tab: &Tab) -> String {
    format!(
        "{} {} {} [{}]{}",
        if tab.active { '*' } else { ' ' },
        tab.id,
        tab.path,
        tab.language,
        if tab.dirty { " modified" } else { "" }
    )
}

/// Print notifications to stderr until the bus is gone
pub async fn print_events(mut receiver: EventReceiver) {
    while let Some(event) = receiver.recv().await {
        match event {
            AppEvent::Ui(UiEvent::Notification {
                level,
                title,
                message,
            }) => {
                let mut stderr = std::io::stderr().lock();
                let _ = writeln!(stderr, "[{level}] {title}: {message}");
            }
            AppEvent::Document(DocumentEvent::Saved { path, version, .. }) => {
                debug!(path = %path, version = %version.as_str(), "Save confirmed");
            }
            other => debug!(event = ?other, "Event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuweb_types::{Language, TabId};

    fn tab(dirty: bool) -> Tab {
        Tab {
            id: TabId::from_raw(3),
            name: "a.ts".to_string(),
            path: "src/a.ts".to_string(),
            content: String::new(),
            language: Language::TypeScript,
            dirty,
            active: true,
            version: None,
            source_ref: None,
            revision: 0,
        }
    }

    #[test]
    fn test_header() {
        assert_eq!(header(&tab(false)), "* tab-3 src/a.ts [typescript]");
        assert_eq!(header(&tab(true)), "* tab-3 src/a.ts [typescript] modified");
    }
}
