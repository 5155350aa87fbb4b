// ABOUTME: Seam to the text-editing widget mounted by the front end
// ABOUTME: The controller pushes view state and the active document through it

use tuweb_session::Tab;
use tuweb_types::ViewState;

/// A mounted editing widget.
///
/// The controller holds at most one surface at a time and only between
/// `mount` and `unmount`; it never stores document data in it.
pub trait EditorSurface: Send + Sync {
    /// Font size or panel visibility changed
    fn apply_view_state(&self, state: &ViewState);

    /// The document to show changed; `None` when no tab is open
    fn present(&self, _tab: Option<&Tab>) {}

    /// Give keyboard focus to the widget
    fn focus(&self) {}
}
