// ABOUTME: Editor session controller coordinating the store, the remote gateway and the widget
// ABOUTME: Owns auto-save timing, keyboard shortcut dispatch and the view preferences

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tuweb_events::{DocumentEvent, EventBus, NotificationLevel, UiEvent};
use tuweb_logging::{PerfTimer, debug, error, info, trace, warn};
use tuweb_session::{DocumentSessionStore, Tab};
use tuweb_types::{
    DocumentDescriptor, FileRef, FontSizeRange, KeyStroke, TabId, VersionToken, ViewState,
};

use crate::config::EditorConfig;
use crate::debouncer::Debouncer;
use crate::error::EditorError;
use crate::gateway::ContentGateway;
use crate::keyboard::{KeyboardHub, ListenerGuard};
use crate::keymap::{EditorAction, Keymap};
use crate::surface::EditorSurface;

/// Remote calls slower than this are logged as warnings
const SLOW_REMOTE_CALL: Duration = Duration::from_secs(2);

/// Result of a save request that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written; the tab is clean and carries the new version
    Saved(VersionToken),
    /// Written, but the tab was edited meanwhile: it carries the new version and stays dirty
    SavedWithPendingEdits(VersionToken),
    /// The tab was closed before the response arrived
    Discarded,
    /// A save of the same tab is already running
    AlreadyInFlight,
    /// No active tab
    NothingToSave,
}

struct Inner {
    store: Mutex<DocumentSessionStore>,
    gateway: Arc<dyn ContentGateway>,
    events: Arc<dyn EventBus>,
    /// None when auto-save is disabled
    auto_save: Option<Mutex<Debouncer>>,
    keymap: Keymap,
    font_range: FontSizeRange,
    view: Mutex<ViewState>,
    surface: Mutex<Option<Arc<dyn EditorSurface>>>,
    shortcuts: Mutex<Option<ListenerGuard>>,
    saving: Mutex<HashSet<TabId>>,
    default_source_ref: String,
}

/// Handle to an editor session. Clones share the same session.
#[derive(Clone)]
pub struct EditorSessionController {
    inner: Arc<Inner>,
}

/// Marks a tab as being saved until dropped
struct SaveGuard<'a> {
    saving: &'a Mutex<HashSet<TabId>>,
    id: TabId,
}

impl<'a> SaveGuard<'a> {
    fn acquire(saving: &'a Mutex<HashSet<TabId>>, id: TabId) -> Option<Self> {
        saving.lock().insert(id).then(|| Self { saving, id })
    }
}

impl Drop for SaveGuard<'_> {
    fn drop(&mut self) {
        self.saving.lock().remove(&self.id);
    }
}

/// What a save needs from the tab, captured before the remote call
struct SaveRequest {
    path: String,
    source_ref: String,
    content: String,
    version: VersionToken,
    revision: u64,
}

impl EditorSessionController {
    pub fn new(
        gateway: Arc<dyn ContentGateway>,
        events: Arc<dyn EventBus>,
        config: &EditorConfig,
    ) -> Self {
        let font_range = config.font_range();
        let view = ViewState {
            font_size: font_range.clamp(f32::from(config.font.size)),
            ..ViewState::default()
        };
        let auto_save = config
            .auto_save
            .enabled
            .then(|| Mutex::new(Debouncer::with_config(config.debounce_config())));

        info!(
            auto_save = config.auto_save.enabled,
            delay_ms = config.auto_save.delay_ms,
            default_ref = %config.remote.default_ref,
            "Editor session created"
        );

        Self {
            inner: Arc::new(Inner {
                store: Mutex::new(DocumentSessionStore::new()),
                gateway,
                events,
                auto_save,
                keymap: config.keymap(),
                font_range,
                view: Mutex::new(view),
                surface: Mutex::new(None),
                shortcuts: Mutex::new(None),
                saving: Mutex::new(HashSet::new()),
                default_source_ref: config.remote.default_ref.clone(),
            }),
        }
    }

    // Loading

    /// Open `file` from `source_ref` (the configured default when `None`).
    ///
    /// A path that is already open is activated without fetching it again.
    pub async fn load_file(
        &self,
        file: &FileRef,
        source_ref: Option<&str>,
    ) -> Result<TabId, EditorError> {
        let existing = self.inner.store.lock().tab_by_path(&file.path).map(|t| t.id);
        if let Some(id) = existing {
            debug!(tab_id = %id, path = %file.path, "File already open");
            self.set_active(id);
            return Ok(id);
        }

        let source_ref = source_ref.unwrap_or(self.inner.default_source_ref.as_str());
        debug!(path = %file.path, source_ref, "Loading file");

        let fetched = {
            let _timer = PerfTimer::new("gateway.get_content").with_warn_threshold(SLOW_REMOTE_CALL);
            self.inner.gateway.get_content(&file.path, source_ref).await
        };

        let remote = match fetched {
            Ok(remote) => remote,
            Err(gateway_error) => {
                let err = EditorError::from_load(&file.path, gateway_error);
                self.report(&err);
                return Err(err);
            }
        };

        let descriptor = DocumentDescriptor::new(&file.name, &file.path, remote.content)
            .with_version(remote.version)
            .with_source_ref(source_ref);
        let id = self.open_or_activate(descriptor);
        info!(tab_id = %id, path = %file.path, source_ref, "File loaded");
        Ok(id)
    }

    /// Fetch a fresh copy of an open tab, discarding local edits
    pub async fn reload_tab(&self, id: TabId) -> Result<(), EditorError> {
        let target = self
            .inner
            .store
            .lock()
            .tab(id)
            .map(|tab| (tab.path.clone(), self.source_ref_of(tab)));
        let Some((path, source_ref)) = target else {
            return Err(self.unknown_tab(id));
        };

        let fetched = {
            let _timer = PerfTimer::new("gateway.get_content").with_warn_threshold(SLOW_REMOTE_CALL);
            self.inner.gateway.get_content(&path, &source_ref).await
        };

        let remote = match fetched {
            Ok(remote) => remote,
            Err(gateway_error) => {
                let err = EditorError::from_load(&path, gateway_error);
                self.report(&err);
                return Err(err);
            }
        };

        let version = remote.version.clone();
        let applied = self
            .inner
            .store
            .lock()
            .replace_content(id, remote.content, remote.version);
        if !applied {
            debug!(tab_id = %id, path = %path, "Tab closed during reload, discarding response");
            return Ok(());
        }

        info!(tab_id = %id, path = %path, version = %version.as_str(), "Tab reloaded");
        self.inner
            .events
            .dispatch_document(DocumentEvent::Reloaded { tab_id: id, version });
        self.notify(NotificationLevel::Info, "Reloaded", format!("'{path}' reloaded from {source_ref}"));
        self.refresh_surface();
        Ok(())
    }

    // Saving

    /// Write a tab back to the remote source.
    ///
    /// Refused without a gateway call when the tab has no version token.
    pub async fn save_file(&self, id: TabId) -> Result<SaveOutcome, EditorError> {
        let request = self.inner.store.lock().tab(id).map(|tab| {
            let request = tab.version.clone().map(|version| SaveRequest {
                path: tab.path.clone(),
                source_ref: self.source_ref_of(tab),
                content: tab.content.clone(),
                version,
                revision: tab.revision,
            });
            (tab.path.clone(), request)
        });

        let request = match request {
            None => return Err(self.unknown_tab(id)),
            Some((path, None)) => {
                let err = EditorError::SaveRefused { path };
                self.report(&err);
                return Err(err);
            }
            Some((_, Some(request))) => request,
        };

        let Some(_guard) = SaveGuard::acquire(&self.inner.saving, id) else {
            debug!(tab_id = %id, "Save already in flight");
            return Ok(SaveOutcome::AlreadyInFlight);
        };

        debug!(tab_id = %id, path = %request.path, revision = request.revision, "Saving");
        let written = {
            let _timer = PerfTimer::new("gateway.put_content").with_warn_threshold(SLOW_REMOTE_CALL);
            self.inner
                .gateway
                .put_content(
                    &request.path,
                    &request.source_ref,
                    &request.content,
                    &request.version,
                )
                .await
        };

        match written {
            Ok(version) => Ok(self.apply_saved(id, &request, version)),
            Err(gateway_error) => {
                if !self.inner.store.lock().contains(id) {
                    debug!(tab_id = %id, error = %gateway_error, "Tab closed during failed save");
                    return Ok(SaveOutcome::Discarded);
                }

                let err = EditorError::from_save(&request.path, gateway_error);
                self.inner.events.dispatch_document(DocumentEvent::SaveFailed {
                    tab_id: id,
                    path: request.path.clone(),
                    error: err.to_string(),
                });
                self.report(&err);
                Err(err)
            }
        }
    }

    fn apply_saved(&self, id: TabId, request: &SaveRequest, version: VersionToken) -> SaveOutcome {
        let (outcome, is_active) = {
            let mut store = self.inner.store.lock();
            match store.tab(id).map(|tab| (tab.revision, tab.active)) {
                None => (SaveOutcome::Discarded, false),
                Some((revision, active)) if revision == request.revision => {
                    store.mark_saved(id, Some(version.clone()));
                    (SaveOutcome::Saved(version.clone()), active)
                }
                Some((_, active)) => {
                    store.set_version(id, version.clone());
                    (SaveOutcome::SavedWithPendingEdits(version.clone()), active)
                }
            }
        };

        match &outcome {
            SaveOutcome::Discarded => {
                debug!(tab_id = %id, path = %request.path, "Tab closed during save, discarding response");
                return outcome;
            }
            SaveOutcome::SavedWithPendingEdits(_) => {
                debug!(tab_id = %id, path = %request.path, "Tab edited during save, keeping it dirty");
                // Triggers that fired while this save ran were skipped as in flight
                if is_active {
                    self.schedule_auto_save();
                }
            }
            _ => {}
        }

        info!(tab_id = %id, path = %request.path, version = %version.as_str(), "File saved");
        self.inner.events.dispatch_document(DocumentEvent::Saved {
            tab_id: id,
            path: request.path.clone(),
            version,
        });
        self.notify(NotificationLevel::Success, "Saved", format!("'{}' saved", request.path));
        outcome
    }

    pub async fn save_active(&self) -> Result<SaveOutcome, EditorError> {
        match self.active_tab_id() {
            Some(id) => self.save_file(id).await,
            None => Ok(SaveOutcome::NothingToSave),
        }
    }

    /// Save every dirty tab one after another
    pub async fn save_all(&self) -> Vec<(TabId, Result<SaveOutcome, EditorError>)> {
        let dirty: Vec<TabId> = self
            .inner
            .store
            .lock()
            .dirty_tabs()
            .iter()
            .map(|tab| tab.id)
            .collect();

        let mut results = Vec::with_capacity(dirty.len());
        for id in dirty {
            results.push((id, self.save_file(id).await));
        }
        results
    }

    /// Save `id` on a background task. Failures are reported through the event bus.
    fn spawn_save(&self, id: TabId) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(tab_id = %id, "Cannot save outside a tokio runtime");
            return;
        };
        let controller = self.clone();
        runtime.spawn(async move {
            let _ = controller.save_file(id).await;
        });
    }

    // Editing

    /// Replace the content of a tab. Edits to the active tab restart the auto-save timer.
    pub fn update_content(&self, id: TabId, content: impl Into<String>) -> Result<u64, EditorError> {
        let updated = {
            let mut store = self.inner.store.lock();
            store
                .update_content(id, content.into())
                .map(|revision| (revision, store.tab(id).is_some_and(|tab| tab.active)))
        };
        let Some((revision, is_active)) = updated else {
            return Err(self.unknown_tab(id));
        };

        self.inner
            .events
            .dispatch_document(DocumentEvent::ContentChanged { tab_id: id, revision });
        if is_active {
            self.schedule_auto_save();
        }
        Ok(revision)
    }

    /// Content change reported by the widget for the active tab
    pub fn on_content_change(&self, content: impl Into<String>) -> Option<u64> {
        let Some(id) = self.active_tab_id() else {
            trace!("Content change with no active tab");
            return None;
        };
        self.update_content(id, content).ok()
    }

    fn schedule_auto_save(&self) {
        let Some(auto_save) = &self.inner.auto_save else {
            return;
        };
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        auto_save.lock().debounce(move || {
            if let Some(inner) = weak.upgrade() {
                EditorSessionController { inner }.auto_save_active();
            }
        });
    }

    fn auto_save_active(&self) {
        let target = self
            .inner
            .store
            .lock()
            .active_tab()
            .filter(|tab| tab.dirty)
            .map(|tab| tab.id);

        match target {
            Some(id) => {
                debug!(tab_id = %id, "Auto-saving");
                self.spawn_save(id);
            }
            None => trace!("Auto-save fired with nothing to save"),
        }
    }

    /// Drop any scheduled auto-save and forget the current burst of edits
    pub fn cancel_auto_save(&self) {
        if let Some(auto_save) = &self.inner.auto_save {
            auto_save.lock().reset();
        }
    }

    pub fn auto_save_pending(&self) -> bool {
        self.inner
            .auto_save
            .as_ref()
            .is_some_and(|auto_save| auto_save.lock().is_pending())
    }

    // Tabs

    pub fn open_or_activate(&self, descriptor: DocumentDescriptor) -> TabId {
        let (id, opened) = {
            let mut store = self.inner.store.lock();
            let before = store.len();
            let id = store.open_or_activate(descriptor);
            let opened = (store.len() > before)
                .then(|| store.tab(id).map(|tab| (tab.path.clone(), tab.language)))
                .flatten();
            (id, opened)
        };

        if let Some((path, language)) = opened {
            self.inner.events.dispatch_document(DocumentEvent::Opened {
                tab_id: id,
                path,
                language,
            });
        }
        self.announce_active();
        id
    }

    pub fn close_tab(&self, id: TabId) -> Option<Tab> {
        let closed = self.inner.store.lock().close(id)?;
        self.after_close(std::slice::from_ref(&closed));
        Some(closed)
    }

    pub fn close_all(&self) -> Vec<Tab> {
        let closed = self.inner.store.lock().close_all();
        self.cancel_auto_save();
        self.after_close(&closed);
        closed
    }

    pub fn close_others(&self, id: TabId) -> Vec<Tab> {
        let closed = self.inner.store.lock().close_others(id);
        self.after_close(&closed);
        closed
    }

    fn after_close(&self, closed: &[Tab]) {
        if closed.is_empty() {
            return;
        }
        for tab in closed {
            if tab.dirty {
                warn!(tab_id = %tab.id, path = %tab.path, "Closed tab with unsaved changes");
            }
            self.inner.events.dispatch_document(DocumentEvent::Closed {
                tab_id: tab.id,
                was_dirty: tab.dirty,
            });
        }
        if closed.iter().any(|tab| tab.active) {
            self.announce_active();
        }
    }

    /// Activate `id`; false when no such tab is open
    pub fn set_active(&self, id: TabId) -> bool {
        let changed = {
            let mut store = self.inner.store.lock();
            if !store.contains(id) {
                return false;
            }
            let changed = store.active_tab().map(|tab| tab.id) != Some(id);
            store.set_active(id);
            changed
        };
        if changed {
            self.announce_active();
        }
        true
    }

    fn announce_active(&self) {
        let active = self.active_tab_id();
        self.inner
            .events
            .dispatch_document(DocumentEvent::Activated { tab_id: active });
        self.refresh_surface();
    }

    // Widget

    /// Attach the editing widget and bring it up to date
    pub fn mount(&self, surface: Arc<dyn EditorSurface>) {
        let view = *self.inner.view.lock();
        let active = self.active_tab();
        surface.apply_view_state(&view);
        surface.present(active.as_ref());
        surface.focus();

        if self.inner.surface.lock().replace(surface).is_some() {
            debug!("Replaced previously mounted surface");
        }
        debug!("Editor surface mounted");
    }

    pub fn unmount(&self) {
        if self.inner.surface.lock().take().is_some() {
            debug!("Editor surface unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.surface.lock().is_some()
    }

    fn current_surface(&self) -> Option<Arc<dyn EditorSurface>> {
        self.inner.surface.lock().clone()
    }

    fn refresh_surface(&self) {
        if let Some(surface) = self.current_surface() {
            let active = self.active_tab();
            surface.present(active.as_ref());
        }
    }

    // View state

    pub fn view_state(&self) -> ViewState {
        *self.inner.view.lock()
    }

    /// Set the font size, clamped to the configured range. Returns the applied size.
    pub fn set_font_size(&self, size: f32) -> f32 {
        let applied = self.inner.font_range.clamp(size);
        let changed = self.update_view(|view| {
            let changed = view.font_size != applied;
            view.font_size = applied;
            changed
        });
        if changed {
            debug!(font_size = applied, "Font size changed");
            self.inner
                .events
                .dispatch_ui(UiEvent::FontSizeChanged { font_size: applied });
        }
        applied
    }

    pub fn increase_font_size(&self) -> f32 {
        let current = self.view_state().font_size;
        self.set_font_size(self.inner.font_range.increase(current))
    }

    pub fn decrease_font_size(&self) -> f32 {
        let current = self.view_state().font_size;
        self.set_font_size(self.inner.font_range.decrease(current))
    }

    /// Show or hide the find panel. Hiding it also hides replace.
    pub fn toggle_find(&self) {
        self.update_view(|view| {
            view.find_open = !view.find_open;
            if !view.find_open {
                view.replace_open = false;
            }
            true
        });
        self.announce_search_panels();
    }

    /// Show or hide the replace panel. Showing it also shows find.
    pub fn toggle_replace(&self) {
        self.update_view(|view| {
            view.replace_open = !view.replace_open;
            if view.replace_open {
                view.find_open = true;
            }
            true
        });
        self.announce_search_panels();
    }

    fn announce_search_panels(&self) {
        let view = self.view_state();
        self.inner.events.dispatch_ui(UiEvent::SearchPanelToggled {
            find_open: view.find_open,
            replace_open: view.replace_open,
        });
    }

    /// Mutate the view state and push it to the widget when `update` reports a change
    fn update_view(&self, update: impl FnOnce(&mut ViewState) -> bool) -> bool {
        let (changed, view) = {
            let mut view = self.inner.view.lock();
            (update(&mut *view), *view)
        };
        if changed {
            if let Some(surface) = self.current_surface() {
                surface.apply_view_state(&view);
            }
        }
        changed
    }

    // Keyboard

    /// Register this session's shortcut listener on `hub`. Only one listener
    /// is kept per controller; attaching again is a no-op.
    pub fn attach_shortcuts(&self, hub: &KeyboardHub) {
        let mut shortcuts = self.inner.shortcuts.lock();
        if shortcuts.is_some() {
            debug!("Shortcuts already attached");
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        *shortcuts = Some(hub.register(move |stroke| {
            weak.upgrade()
                .is_some_and(|inner| EditorSessionController { inner }.handle_key(stroke))
        }));
        debug!("Shortcuts attached");
    }

    pub fn shortcuts_attached(&self) -> bool {
        self.inner.shortcuts.lock().is_some()
    }

    /// Run the action bound to `stroke`. Returns false for unbound strokes.
    pub fn handle_key(&self, stroke: &KeyStroke) -> bool {
        match self.inner.keymap.lookup(stroke) {
            Some(action) => {
                trace!(%stroke, ?action, "Shortcut");
                self.perform_action(action);
                true
            }
            None => false,
        }
    }

    pub fn perform_action(&self, action: EditorAction) {
        match action {
            EditorAction::Save => match self.active_tab_id() {
                Some(id) => self.spawn_save(id),
                None => trace!("Save shortcut with no active tab"),
            },
            EditorAction::ToggleFind => self.toggle_find(),
            EditorAction::ToggleReplace => self.toggle_replace(),
            EditorAction::CloseActiveTab => {
                if let Some(id) = self.active_tab_id() {
                    self.close_tab(id);
                }
            }
            EditorAction::NextTab => {
                let next = self.inner.store.lock().next_tab_id();
                if let Some(id) = next {
                    self.set_active(id);
                }
            }
            EditorAction::PreviousTab => {
                let prev = self.inner.store.lock().prev_tab_id();
                if let Some(id) = prev {
                    self.set_active(id);
                }
            }
            EditorAction::IncreaseFontSize => {
                self.increase_font_size();
            }
            EditorAction::DecreaseFontSize => {
                self.decrease_font_size();
            }
        }
    }

    /// Remove the shortcut listener, cancel pending auto-save and detach the widget
    pub fn teardown(&self) {
        if self.inner.shortcuts.lock().take().is_some() {
            debug!("Shortcuts detached");
        }
        self.cancel_auto_save();
        self.unmount();
    }

    // Queries

    pub fn tabs(&self) -> Vec<Tab> {
        self.inner.store.lock().tabs().to_vec()
    }

    pub fn tab(&self, id: TabId) -> Option<Tab> {
        self.inner.store.lock().tab(id).cloned()
    }

    pub fn active_tab(&self) -> Option<Tab> {
        self.inner.store.lock().active_tab().cloned()
    }

    pub fn active_tab_id(&self) -> Option<TabId> {
        self.inner.store.lock().active_tab().map(|tab| tab.id)
    }

    pub fn dirty_tab_ids(&self) -> Vec<TabId> {
        self.inner
            .store
            .lock()
            .dirty_tabs()
            .iter()
            .map(|tab| tab.id)
            .collect()
    }

    pub fn tab_count(&self) -> usize {
        self.inner.store.lock().len()
    }

    pub fn keymap(&self) -> &Keymap {
        &self.inner.keymap
    }

    pub fn default_source_ref(&self) -> &str {
        &self.inner.default_source_ref
    }

    // Reporting

    fn source_ref_of(&self, tab: &Tab) -> String {
        tab.source_ref
            .clone()
            .unwrap_or_else(|| self.inner.default_source_ref.clone())
    }

    fn unknown_tab(&self, id: TabId) -> EditorError {
        debug!(tab_id = %id, "Operation on unknown tab");
        EditorError::UnknownTab { id }
    }

    /// Log a failure and surface it as a notification
    fn report(&self, err: &EditorError) {
        match err.notification_level() {
            NotificationLevel::Error => error!(error = %err, terminal = err.is_terminal(), "Editor operation failed"),
            _ => warn!(error = %err, "Editor operation refused"),
        }
        if matches!(err, EditorError::UnknownTab { .. }) {
            return;
        }
        self.notify(err.notification_level(), err.title(), err.to_string());
    }

    fn notify(&self, level: NotificationLevel, title: &str, message: String) {
        self.inner
            .events
            .dispatch_ui(UiEvent::notification(level, title, message));
    }
}

impl std::fmt::Debug for EditorSessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSessionController")
            .field("tabs", &self.tab_count())
            .field("view", &self.view_state())
            .field("mounted", &self.is_mounted())
            .finish()
    }
}
