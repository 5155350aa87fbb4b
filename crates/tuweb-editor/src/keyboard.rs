// ABOUTME: Process-wide key listener registry with scoped registrations
// ABOUTME: Dropping a ListenerGuard removes its listener from the hub

use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tuweb_logging::{debug, trace};
use tuweb_types::KeyStroke;

/// Listener callback; returns true when it handled the stroke
pub type KeyHandler = Arc<dyn Fn(&KeyStroke) -> bool + Send + Sync>;

#[derive(Default)]
struct HubState {
    next_id: u64,
    listeners: Vec<(u64, KeyHandler)>,
}

/// Shared source of key strokes. Clones refer to the same hub.
#[derive(Clone, Default)]
pub struct KeyboardHub {
    state: Arc<Mutex<HubState>>,
}

impl KeyboardHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener. It stays registered for as long as the returned guard lives.
    #[must_use = "the listener is removed as soon as the guard is dropped"]
    pub fn register<F>(&self, handler: F) -> ListenerGuard
    where
        F: Fn(&KeyStroke) -> bool + Send + Sync + 'static,
    {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.listeners.push((id, Arc::new(handler)));
        debug!(listener = id, total = state.listeners.len(), "Key listener registered");

        ListenerGuard {
            id,
            hub: Arc::downgrade(&self.state),
        }
    }

    /// Offer a stroke to the listeners in registration order until one handles it
    pub fn dispatch(&self, stroke: &KeyStroke) -> bool {
        // Handlers may register or drop listeners, so call them unlocked
        let listeners: Vec<KeyHandler> = self
            .state
            .lock()
            .listeners
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        let handled = listeners.iter().any(|handler| handler(stroke));
        trace!(%stroke, handled, "Key dispatched");
        handled
    }

    pub fn listener_count(&self) -> usize {
        self.state.lock().listeners.len()
    }
}

impl std::fmt::Debug for KeyboardHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyboardHub")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Registration handle returned by [`KeyboardHub::register`]
#[derive(Debug)]
pub struct ListenerGuard {
    id: u64,
    hub: Weak<Mutex<HubState>>,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let Some(hub) = self.hub.upgrade() else {
            return;
        };
        let mut state = hub.lock();
        state.listeners.retain(|(id, _)| *id != self.id);
        debug!(listener = self.id, remaining = state.listeners.len(), "Key listener removed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn stroke(text: &str) -> KeyStroke {
        text.parse().unwrap()
    }

    #[test]
    fn test_guard_removes_listener() {
        let hub = KeyboardHub::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let guard = hub.register(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });
        assert_eq!(hub.listener_count(), 1);
        assert!(hub.dispatch(&stroke("ctrl+s")));

        drop(guard);
        assert_eq!(hub.listener_count(), 0);
        assert!(!hub.dispatch(&stroke("ctrl+s")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dispatch_stops_at_first_handler() {
        let hub = KeyboardHub::new();
        let second = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&second);

        let _first = hub.register(|stroke| stroke.to_string() == "ctrl+s");
        let _second = hub.register(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            false
        });

        assert!(hub.dispatch(&stroke("ctrl+s")));
        assert_eq!(second.load(Ordering::SeqCst), 0);

        assert!(!hub.dispatch(&stroke("ctrl+f")));
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_guard_outliving_hub() {
        let hub = KeyboardHub::new();
        let guard = hub.register(|_| false);
        drop(hub);
        drop(guard);
    }
}
