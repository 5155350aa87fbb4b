// ABOUTME: Registry of open document tabs and which one is active
// ABOUTME: Synchronous and total, unknown tab ids are ignored

use tuweb_logging::{debug, trace};
use tuweb_types::{DocumentDescriptor, TabId, VersionToken};

use crate::tab::Tab;

/// Single source of truth for the open documents.
///
/// Invariant: when `tabs` is non-empty exactly one tab is active, otherwise
/// none is. Every operation preserves it.
#[derive(Debug, Default)]
pub struct DocumentSessionStore {
    /// Tabs in display order
    tabs: Vec<Tab>,

    /// Next raw id to hand out
    next_id: u64,
}

impl DocumentSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate the tab showing `descriptor.path`, creating it if needed.
    ///
    /// An existing tab keeps its content; the descriptor is only used when a
    /// new tab has to be created.
    pub fn open_or_activate(&mut self, descriptor: DocumentDescriptor) -> TabId {
        if let Some(existing) = self.tab_by_path(&descriptor.path).map(|tab| tab.id) {
            debug!(tab_id = %existing, path = %descriptor.path, "Path already open, activating");
            self.set_active(existing);
            return existing;
        }

        let id = TabId::from_raw(self.next_id);
        self.next_id += 1;

        let mut tab = Tab::from_descriptor(id, descriptor);
        tab.active = true;
        for other in &mut self.tabs {
            other.active = false;
        }

        debug!(tab_id = %id, path = %tab.path, language = %tab.language, "Tab opened");
        self.tabs.push(tab);
        id
    }

    /// Remove a tab.
    ///
    /// When the active tab is removed the tab now at its index (clamped to
    /// the new last index) becomes active.
    pub fn close(&mut self, id: TabId) -> Option<Tab> {
        let index = self.index_of(id)?;
        let tab = self.tabs.remove(index);

        if tab.active && !self.tabs.is_empty() {
            let replacement = index.min(self.tabs.len() - 1);
            self.tabs[replacement].active = true;
        }

        debug!(tab_id = %id, was_dirty = tab.dirty, remaining = self.tabs.len(), "Tab closed");
        Some(tab)
    }

    /// Remove every tab
    pub fn close_all(&mut self) -> Vec<Tab> {
        debug!(count = self.tabs.len(), "Closing all tabs");
        std::mem::take(&mut self.tabs)
    }

    /// Remove every tab except `id`, which becomes active.
    /// Nothing is closed when `id` is unknown.
    pub fn close_others(&mut self, id: TabId) -> Vec<Tab> {
        if !self.contains(id) {
            return Vec::new();
        }

        let (kept, closed): (Vec<Tab>, Vec<Tab>) =
            std::mem::take(&mut self.tabs).into_iter().partition(|t| t.id == id);
        self.tabs = kept;
        self.tabs[0].active = true;

        debug!(tab_id = %id, closed = closed.len(), "Closed other tabs");
        closed
    }

    /// Make `id` the active tab
    pub fn set_active(&mut self, id: TabId) {
        if !self.contains(id) {
            return;
        }
        for tab in &mut self.tabs {
            tab.active = tab.id == id;
        }
    }

    /// Replace a tab's content. Always marks the tab dirty, even when the
    /// new content equals the old. Returns the new revision.
    pub fn update_content(&mut self, id: TabId, content: String) -> Option<u64> {
        let tab = self.tab_mut(id)?;
        tab.content = content;
        tab.dirty = true;
        tab.revision += 1;
        trace!(tab_id = %id, revision = tab.revision, "Content updated");
        Some(tab.revision)
    }

    /// Record a successful save: clears dirty, and updates the version token
    /// when one is given.
    pub fn mark_saved(&mut self, id: TabId, version: Option<VersionToken>) -> bool {
        let Some(tab) = self.tab_mut(id) else {
            return false;
        };
        tab.dirty = false;
        if let Some(version) = version {
            tab.version = Some(version);
        }
        true
    }

    /// Update the version token without touching the dirty flag
    pub fn set_version(&mut self, id: TabId, version: VersionToken) -> bool {
        match self.tab_mut(id) {
            Some(tab) => {
                tab.version = Some(version);
                true
            }
            None => false,
        }
    }

    /// Replace content with a fresh remote copy: the tab becomes clean and
    /// synchronized with `version`.
    pub fn replace_content(&mut self, id: TabId, content: String, version: VersionToken) -> bool {
        let Some(tab) = self.tab_mut(id) else {
            return false;
        };
        tab.content = content;
        tab.version = Some(version);
        tab.dirty = false;
        tab.revision += 1;
        true
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    pub fn tab_by_path(&self, path: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.path == path)
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.active)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.tabs.iter().position(|t| t.active)
    }

    /// Tabs with unsaved changes, in display order
    pub fn dirty_tabs(&self) -> Vec<&Tab> {
        self.tabs.iter().filter(|t| t.dirty).collect()
    }

    pub fn contains(&self, id: TabId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// The tab after the active one, wrapping around
    pub fn next_tab_id(&self) -> Option<TabId> {
        let active = self.active_index()?;
        let next = (active + 1) % self.tabs.len();
        Some(self.tabs[next].id)
    }

    /// The tab before the active one, wrapping around
    pub fn prev_tab_id(&self) -> Option<TabId> {
        let active = self.active_index()?;
        let prev = if active == 0 {
            self.tabs.len() - 1
        } else {
            active - 1
        };
        Some(self.tabs[prev].id)
    }

    fn index_of(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == id)
    }

    fn tab_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuweb_types::Language;

    fn doc(path: &str) -> DocumentDescriptor {
        let name = path.rsplit('/').next().unwrap_or(path);
        DocumentDescriptor::new(name, path, format!("// {path}"))
    }

    fn active_count(store: &DocumentSessionStore) -> usize {
        store.tabs().iter().filter(|t| t.active).count()
    }

    fn open_three(store: &mut DocumentSessionStore) -> (TabId, TabId, TabId) {
        let x = store.open_or_activate(doc("x.ts"));
        let y = store.open_or_activate(doc("y.ts"));
        let z = store.open_or_activate(doc("z.ts"));
        (x, y, z)
    }

    #[test]
    fn test_open_activates_new_tab() {
        let mut store = DocumentSessionStore::new();
        let a = store.open_or_activate(doc("src/a.ts"));
        let b = store.open_or_activate(doc("src/b.ts"));

        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
        assert_eq!(store.active_tab().map(|t| t.id), Some(b));
        assert_eq!(active_count(&store), 1);

        let tab = store.tab(a).unwrap();
        assert_eq!(tab.language, Language::TypeScript);
        assert!(!tab.dirty);
        assert_eq!(tab.revision, 0);
    }

    #[test]
    fn test_reopening_path_reuses_tab() {
        let mut store = DocumentSessionStore::new();
        let a = store.open_or_activate(doc("a.ts"));
        store.open_or_activate(doc("b.ts"));
        let again = store.open_or_activate(doc("a.ts"));

        assert_eq!(again, a);
        assert_eq!(store.len(), 2);
        assert_eq!(store.active_tab().map(|t| t.id), Some(a));
        assert_eq!(active_count(&store), 1);
    }

    #[test]
    fn test_reopening_keeps_existing_content() {
        let mut store = DocumentSessionStore::new();
        let a = store.open_or_activate(doc("a.ts"));
        store.update_content(a, "edited".to_string());

        store.open_or_activate(DocumentDescriptor::new("a.ts", "a.ts", "remote copy"));
        let tab = store.tab(a).unwrap();
        assert_eq!(tab.content, "edited");
        assert!(tab.dirty);
    }

    #[test]
    fn test_repeated_opens_never_duplicate() {
        let mut store = DocumentSessionStore::new();
        for _ in 0..5 {
            store.open_or_activate(doc("a.ts"));
            store.open_or_activate(doc("b.ts"));
        }
        assert_eq!(store.tabs().iter().filter(|t| t.path == "a.ts").count(), 1);
        assert_eq!(store.tabs().iter().filter(|t| t.path == "b.ts").count(), 1);
    }

    #[test]
    fn test_close_middle_active_tab_activates_next_in_slot() {
        let mut store = DocumentSessionStore::new();
        let (x, y, z) = open_three(&mut store);
        store.set_active(y);

        let closed = store.close(y).unwrap();
        assert_eq!(closed.id, y);
        assert_eq!(store.active_tab().map(|t| t.id), Some(z));
        assert_eq!(active_count(&store), 1);
        assert_eq!(store.tabs().iter().map(|t| t.id).collect::<Vec<_>>(), vec![x, z]);
    }

    #[test]
    fn test_close_last_active_tab_activates_new_last() {
        let mut store = DocumentSessionStore::new();
        let (_, y, z) = open_three(&mut store);

        store.close(z);
        assert_eq!(store.active_tab().map(|t| t.id), Some(y));
    }

    #[test]
    fn test_close_inactive_tab_keeps_active() {
        let mut store = DocumentSessionStore::new();
        let (x, _, z) = open_three(&mut store);

        store.close(x);
        assert_eq!(store.active_tab().map(|t| t.id), Some(z));
        assert_eq!(active_count(&store), 1);
    }

    #[test]
    fn test_close_only_tab_leaves_none_active() {
        let mut store = DocumentSessionStore::new();
        let a = store.open_or_activate(doc("a.ts"));
        store.close(a);

        assert!(store.is_empty());
        assert!(store.active_tab().is_none());
        assert!(store.active_index().is_none());
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let mut store = DocumentSessionStore::new();
        let a = store.open_or_activate(doc("a.ts"));
        let ghost = TabId::from_raw(999);

        assert!(store.close(ghost).is_none());
        store.set_active(ghost);
        assert!(store.update_content(ghost, "x".to_string()).is_none());
        assert!(!store.mark_saved(ghost, None));
        assert!(store.close_others(ghost).is_empty());

        assert_eq!(store.len(), 1);
        assert_eq!(store.active_tab().map(|t| t.id), Some(a));
    }

    #[test]
    fn test_close_all() {
        let mut store = DocumentSessionStore::new();
        open_three(&mut store);

        let closed = store.close_all();
        assert_eq!(closed.len(), 3);
        assert!(store.is_empty());
        assert!(store.active_tab().is_none());
    }

    #[test]
    fn test_close_others() {
        let mut store = DocumentSessionStore::new();
        let (x, y, z) = open_three(&mut store);

        let closed = store.close_others(x);
        let closed_ids: Vec<_> = closed.iter().map(|t| t.id).collect();
        assert_eq!(closed_ids, vec![y, z]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.active_tab().map(|t| t.id), Some(x));
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut store = DocumentSessionStore::new();
        let first = store.open_or_activate(doc("a.ts"));
        store.close(first);
        let second = store.open_or_activate(doc("a.ts"));
        assert_ne!(first, second);
    }

    #[test]
    fn test_update_content_always_marks_dirty() {
        let mut store = DocumentSessionStore::new();
        let a = store.open_or_activate(doc("a.ts"));
        let same = store.tab(a).unwrap().content.clone();

        assert_eq!(store.update_content(a, same), Some(1));
        assert!(store.tab(a).unwrap().dirty);
        assert_eq!(store.update_content(a, "new".to_string()), Some(2));
    }

    #[test]
    fn test_mark_saved_clears_dirty_and_updates_token() {
        let mut store = DocumentSessionStore::new();
        let a = store.open_or_activate(doc("a.ts").with_version("v1"));

        assert!(store.mark_saved(a, None));
        assert!(!store.tab(a).unwrap().dirty);

        store.update_content(a, "x".to_string());
        assert!(store.mark_saved(a, Some(VersionToken::from("v2"))));
        let tab = store.tab(a).unwrap();
        assert!(!tab.dirty);
        assert_eq!(tab.version, Some(VersionToken::from("v2")));

        // No token given: the previous one is kept
        store.mark_saved(a, None);
        assert_eq!(store.tab(a).unwrap().version, Some(VersionToken::from("v2")));
    }

    #[test]
    fn test_set_version_keeps_dirty() {
        let mut store = DocumentSessionStore::new();
        let a = store.open_or_activate(doc("a.ts"));
        store.update_content(a, "x".to_string());

        assert!(store.set_version(a, VersionToken::from("v9")));
        let tab = store.tab(a).unwrap();
        assert!(tab.dirty);
        assert!(tab.is_synchronized());
    }

    #[test]
    fn test_replace_content() {
        let mut store = DocumentSessionStore::new();
        let a = store.open_or_activate(doc("a.ts").with_version("v1"));
        store.update_content(a, "local".to_string());

        assert!(store.replace_content(a, "remote".to_string(), VersionToken::from("v2")));
        let tab = store.tab(a).unwrap();
        assert_eq!(tab.content, "remote");
        assert!(!tab.dirty);
        assert_eq!(tab.version, Some(VersionToken::from("v2")));
        assert_eq!(tab.revision, 2);
    }

    #[test]
    fn test_dirty_tabs_in_display_order() {
        let mut store = DocumentSessionStore::new();
        let (x, y, z) = open_three(&mut store);
        store.update_content(z, "z".to_string());
        store.update_content(x, "x".to_string());

        let dirty: Vec<_> = store.dirty_tabs().iter().map(|t| t.id).collect();
        assert_eq!(dirty, vec![x, z]);
        assert!(!dirty.contains(&y));
    }

    #[test]
    fn test_cycling_wraps_around() {
        let mut store = DocumentSessionStore::new();
        assert!(store.next_tab_id().is_none());

        let (x, y, z) = open_three(&mut store);
        assert_eq!(store.next_tab_id(), Some(x));
        assert_eq!(store.prev_tab_id(), Some(y));

        store.set_active(x);
        assert_eq!(store.prev_tab_id(), Some(z));
        assert_eq!(store.next_tab_id(), Some(y));
    }

    #[test]
    fn test_exactly_one_active_through_mixed_operations() {
        let mut store = DocumentSessionStore::new();
        let (x, y, z) = open_three(&mut store);
        let w = store.open_or_activate(doc("w.ts"));

        let steps: Vec<Box<dyn Fn(&mut DocumentSessionStore)>> = vec![
            Box::new(move |s| s.set_active(y)),
            Box::new(move |s| {
                s.close(y);
            }),
            Box::new(move |s| {
                s.open_or_activate(doc("x.ts"));
            }),
            Box::new(move |s| {
                s.close(x);
            }),
            Box::new(move |s| s.set_active(w)),
            Box::new(move |s| {
                s.close(w);
            }),
        ];

        for step in steps {
            step(&mut store);
            assert_eq!(active_count(&store), 1);
        }
        assert_eq!(store.active_tab().map(|t| t.id), Some(z));
    }
}
