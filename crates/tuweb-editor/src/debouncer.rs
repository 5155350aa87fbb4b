// ABOUTME: Trailing-edge debouncer driving auto-save
// ABOUTME: Each new trigger cancels the pending timer and starts a fresh one

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tuweb_logging::{trace, warn};

/// Configuration for debouncing behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebounceConfig {
    /// How long the input must stay quiet before the handler runs
    pub delay: Duration,
    /// Run immediately once a burst of input has lasted this long.
    /// `None` is a pure debounce.
    pub max_delay: Option<Duration>,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(1000),
            max_delay: None,
        }
    }
}

/// Debouncer running its handler on the tokio runtime
pub struct Debouncer {
    config: DebounceConfig,
    /// Timer task for the most recent trigger
    pending: Option<JoinHandle<()>>,
    /// Start of the current burst, cleared when the handler runs
    burst_start: Arc<Mutex<Option<Instant>>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::with_config(DebounceConfig::default())
    }

    pub fn with_config(config: DebounceConfig) -> Self {
        Self {
            config,
            pending: None,
            burst_start: Arc::new(Mutex::new(None)),
        }
    }

    /// Schedule `handler` to run once input has been quiet for the delay.
    ///
    /// Any previously scheduled handler that has not run yet is dropped.
    /// Must be called from within a tokio runtime; outside one the trigger
    /// is ignored.
    pub fn debounce<F>(&mut self, handler: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("Debounce triggered outside a tokio runtime, ignoring");
            return;
        };

        let now = Instant::now();
        self.cancel();

        let burst_start = *self.burst_start.lock().get_or_insert(now);
        if let Some(max_delay) = self.config.max_delay {
            if now.duration_since(burst_start) >= max_delay {
                trace!("Debounce burst exceeded max delay, running now");
                *self.burst_start.lock() = None;
                handler();
                return;
            }
        }

        let delay = self.config.delay;
        let burst = Arc::clone(&self.burst_start);
        self.pending = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            *burst.lock() = None;
            handler();
        }));
    }

    /// Cancel any pending debounced operation
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }

    /// Cancel and forget the current burst
    pub fn reset(&mut self) {
        self.cancel();
        *self.burst_start.lock() = None;
    }

    /// Whether a handler is scheduled and has not run yet
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn config(&self) -> &DebounceConfig {
        &self.config
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> Box<dyn FnOnce() + Send>) {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = Arc::clone(&count);
        let make = move || {
            let handle = Arc::clone(&handle);
            Box::new(move || {
                handle.fetch_add(1, Ordering::SeqCst);
            }) as Box<dyn FnOnce() + Send>
        };
        (count, make)
    }

    #[test]
    fn test_defaults() {
        let debouncer = Debouncer::new();
        assert_eq!(debouncer.config().delay, Duration::from_millis(1000));
        assert!(debouncer.config().max_delay.is_none());
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_outside_runtime_is_ignored() {
        let (count, make) = counter();
        let mut debouncer = Debouncer::new();
        debouncer.debounce(make());
        assert!(!debouncer.is_pending());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_triggers_fire_once() {
        let (count, make) = counter();
        let mut debouncer = Debouncer::with_config(DebounceConfig {
            delay: Duration::from_millis(500),
            max_delay: None,
        });

        for _ in 0..3 {
            debouncer.debounce(make());
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_handler() {
        let (count, make) = counter();
        let mut debouncer = Debouncer::with_config(DebounceConfig {
            delay: Duration::from_millis(200),
            max_delay: None,
        });

        debouncer.debounce(make());
        debouncer.cancel();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_delay_forces_run() {
        let (count, make) = counter();
        let mut debouncer = Debouncer::with_config(DebounceConfig {
            delay: Duration::from_millis(200),
            max_delay: Some(Duration::from_millis(450)),
        });

        // Triggers every 150ms never leave a 200ms gap
        for _ in 0..4 {
            debouncer.debounce(make());
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // A fresh burst starts counting from zero again
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        debouncer.debounce(make());
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_clears_tracking() {
        let (count, make) = counter();
        let mut debouncer = Debouncer::new();
        debouncer.debounce(make());
        assert!(debouncer.is_pending());

        debouncer.reset();
        assert!(!debouncer.is_pending());
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
