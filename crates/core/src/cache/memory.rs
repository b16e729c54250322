//! In-memory named stores.
//!
//! Same semantics as the SQLite backend without persistence. Useful for
//! hosts that keep the agent ephemeral and for exercising the policies.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::hash::request_key;
use super::storage::CacheStorage;
use crate::Error;
use crate::http::{CapturedResponse, Request};

struct StoredEntry {
    url: String,
    response: CapturedResponse,
    seq: u64,
}

#[derive(Default)]
struct MemoryStore {
    created: u64,
    entries: HashMap<String, StoredEntry>,
}

#[derive(Default)]
struct Inner {
    next_seq: u64,
    stores: HashMap<String, MemoryStore>,
}

impl Inner {
    fn bump(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn store_mut(&mut self, name: &str) -> &mut MemoryStore {
        if !self.stores.contains_key(name) {
            let created = self.bump();
            self.stores
                .insert(name.to_string(), MemoryStore { created, entries: HashMap::new() });
        }
        self.stores.entry(name.to_string()).or_default()
    }

    fn insert(&mut self, name: &str, request: &Request, response: &CapturedResponse) {
        let key = request_key(request);
        let fresh_seq = self.bump();
        let store = self.store_mut(name);
        // An overwrite keeps the original insertion position.
        let seq = store.entries.get(&key).map_or(fresh_seq, |e| e.seq);
        store
            .entries
            .insert(key, StoredEntry { url: request.url().to_string(), response: response.clone(), seq });
    }
}

/// Named stores held in process memory behind a tokio RwLock.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, name: &str) -> Result<(), Error> {
        self.inner.write().await.store_mut(name);
        Ok(())
    }

    async fn has(&self, name: &str) -> Result<bool, Error> {
        Ok(self.inner.read().await.stores.contains_key(name))
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        let inner = self.inner.read().await;
        let mut names: Vec<(&String, u64)> = inner.stores.iter().map(|(k, s)| (k, s.created)).collect();
        names.sort_by_key(|(_, created)| *created);
        Ok(names.into_iter().map(|(k, _)| k.clone()).collect())
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        Ok(self.inner.write().await.stores.remove(name).is_some())
    }

    async fn lookup(&self, name: &str, request: &Request) -> Result<Option<CapturedResponse>, Error> {
        let inner = self.inner.read().await;
        let key = request_key(request);
        Ok(inner
            .stores
            .get(name)
            .and_then(|store| store.entries.get(&key))
            .map(|entry| entry.response.clone()))
    }

    async fn put(&self, name: &str, request: &Request, response: &CapturedResponse) -> Result<(), Error> {
        self.inner.write().await.insert(name, request, response);
        Ok(())
    }

    async fn put_all(&self, name: &str, entries: &[(Request, CapturedResponse)]) -> Result<(), Error> {
        // A single write guard makes the batch visible all at once.
        let mut inner = self.inner.write().await;
        for (request, response) in entries {
            inner.insert(name, request, response);
        }
        Ok(())
    }

    async fn urls(&self, name: &str) -> Result<Vec<String>, Error> {
        let inner = self.inner.read().await;
        let Some(store) = inner.stores.get(name) else {
            return Ok(Vec::new());
        };
        let mut entries: Vec<&StoredEntry> = store.entries.values().collect();
        entries.sort_by_key(|e| e.seq);
        Ok(entries.into_iter().map(|e| e.url.clone()).collect())
    }
}
