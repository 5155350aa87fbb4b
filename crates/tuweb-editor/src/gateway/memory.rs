// ABOUTME: In-memory content gateway keyed by reference and path
// ABOUTME: Supports injected failures, latency and call counting for tests and demos

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tuweb_types::VersionToken;

use super::{ContentGateway, RemoteContent};
use crate::error::GatewayError;

#[derive(Debug, Clone)]
struct Entry {
    content: String,
    version: u64,
}

#[derive(Debug, Default)]
struct State {
    files: HashMap<(String, String), Entry>,
    next_version: u64,
    get_failures: VecDeque<GatewayError>,
    put_failures: VecDeque<GatewayError>,
}

impl State {
    fn bump(&mut self) -> u64 {
        self.next_version += 1;
        self.next_version
    }
}

/// Gateway holding all files in memory
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    state: Mutex<State>,
    latency: Mutex<Option<Duration>>,
    get_calls: AtomicUsize,
    put_calls: AtomicUsize,
}

fn token(version: u64) -> VersionToken {
    VersionToken::new(format!("v{version}"))
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite a file, as a concurrent remote writer would.
    /// Returns the new version token.
    pub fn insert(&self, source_ref: &str, path: &str, content: &str) -> VersionToken {
        let mut state = self.state.lock();
        let version = state.bump();
        state.files.insert(
            (source_ref.to_string(), path.to_string()),
            Entry {
                content: content.to_string(),
                version,
            },
        );
        token(version)
    }

    /// Current remote content of a file
    pub fn content(&self, source_ref: &str, path: &str) -> Option<String> {
        self.state
            .lock()
            .files
            .get(&(source_ref.to_string(), path.to_string()))
            .map(|entry| entry.content.clone())
    }

    /// Current remote version of a file
    pub fn version(&self, source_ref: &str, path: &str) -> Option<VersionToken> {
        self.state
            .lock()
            .files
            .get(&(source_ref.to_string(), path.to_string()))
            .map(|entry| token(entry.version))
    }

    /// Make the next `get_content` call fail with `error`
    pub fn fail_next_get(&self, error: GatewayError) {
        self.state.lock().get_failures.push_back(error);
    }

    /// Make the next `put_content` call fail with `error`
    pub fn fail_next_put(&self, error: GatewayError) {
        self.state.lock().put_failures.push_back(error);
    }

    /// Delay every call by `latency`
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock() = latency;
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl ContentGateway for InMemoryGateway {
    async fn get_content(
        &self,
        path: &str,
        source_ref: &str,
    ) -> Result<RemoteContent, GatewayError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        let mut state = self.state.lock();
        if let Some(error) = state.get_failures.pop_front() {
            return Err(error);
        }

        state
            .files
            .get(&(source_ref.to_string(), path.to_string()))
            .map(|entry| RemoteContent {
                content: entry.content.clone(),
                version: token(entry.version),
            })
            .ok_or_else(|| GatewayError::not_found(path, source_ref))
    }

    async fn put_content(
        &self,
        path: &str,
        source_ref: &str,
        content: &str,
        version: &VersionToken,
    ) -> Result<VersionToken, GatewayError> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        let mut state = self.state.lock();
        if let Some(error) = state.put_failures.pop_front() {
            return Err(error);
        }

        let key = (source_ref.to_string(), path.to_string());
        let current = match state.files.get(&key) {
            Some(entry) => entry.version,
            None => return Err(GatewayError::not_found(path, source_ref)),
        };
        if token(current) != *version {
            return Err(GatewayError::conflict(path));
        }

        let next = state.bump();
        state.files.insert(
            key,
            Entry {
                content: content.to_string(),
                version: next,
            },
        );
        Ok(token(next))
    }
}
