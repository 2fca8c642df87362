use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use thiserror::Error;

/// Errors produced by remote seed store implementations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeedStoreError {
    /// Create was refused because the identifier is already taken.
    #[error("secret {id:?} already exists")]
    AlreadyExists { id: String },
    /// The entry exists but is not opaque binary content.
    #[error("secret {id:?} has unusable content: {reason}")]
    InvalidContent { id: String, reason: String },
    /// Network or API failure other than not-found. The caller decides whether to retry.
    #[error("secret store request for {id:?} failed: {reason}")]
    Transport { id: String, reason: String },
}

/// Narrow view of a remote secret store: read the current version, or create.
#[async_trait]
pub trait SeedStore: Send + Sync {
    /// Fetch the binary content pinned to the current version stage.
    /// `Ok(None)` means the store has never heard of `id`; a placeholder entry
    /// without content comes back as `Ok(Some(vec![]))`.
    async fn fetch_current(&self, id: &str) -> Result<Option<Vec<u8>>, SeedStoreError>;

    /// Store `content` as binary for an unknown id or a placeholder without
    /// content. Existing content is never overwritten.
    async fn create(&self, id: &str, content: &[u8]) -> Result<(), SeedStoreError>;
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Vec<u8>>,
    create_calls: usize,
    failure: Option<String>,
}

/// In-memory seed store for tests and smoke runs. Clones share state, so a
/// test can hand one clone to the resolver and inspect the other.
#[derive(Debug, Default, Clone)]
pub struct InMemorySeedStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemorySeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate an entry. An empty `content` models a placeholder secret.
    pub fn with_entry(self, id: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.lock().entries.insert(id.into(), content.into());
        self
    }

    /// Make every request fail with a transport error.
    pub fn failing(self, reason: impl Into<String>) -> Self {
        self.lock().failure = Some(reason.into());
        self
    }

    /// Current content for `id`, bypassing the failure switch.
    pub fn entry(&self, id: &str) -> Option<Vec<u8>> {
        self.lock().entries.get(id).cloned()
    }

    /// Number of `create` requests received, successful or not.
    pub fn create_calls(&self) -> usize {
        self.lock().create_calls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only happens after a panicking test; keep the data.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SeedStore for InMemorySeedStore {
    async fn fetch_current(&self, id: &str) -> Result<Option<Vec<u8>>, SeedStoreError> {
        let inner = self.lock();
        if let Some(reason) = &inner.failure {
            return Err(SeedStoreError::Transport {
                id: id.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(inner.entries.get(id).cloned())
    }

    async fn create(&self, id: &str, content: &[u8]) -> Result<(), SeedStoreError> {
        let mut inner = self.lock();
        inner.create_calls += 1;
        if let Some(reason) = &inner.failure {
            return Err(SeedStoreError::Transport {
                id: id.to_string(),
                reason: reason.clone(),
            });
        }
        if content.is_empty() {
            return Err(SeedStoreError::InvalidContent {
                id: id.to_string(),
                reason: "refusing to create an empty secret".to_string(),
            });
        }

        let occupied = inner
            .entries
            .get(id)
            .is_some_and(|existing| !existing.is_empty());
        if occupied {
            return Err(SeedStoreError::AlreadyExists { id: id.to_string() });
        }

        inner.entries.insert(id.to_string(), content.to_vec());
        Ok(())
    }
}
