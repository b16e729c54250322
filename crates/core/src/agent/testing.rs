//! Test doubles for the agent: a scripted origin and a storage wrapper with
//! injectable faults.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use super::OfflineAgent;
use crate::Error;
use crate::cache::{CacheDb, CacheStorage};
use crate::config::AgentConfig;
use crate::http::{CapturedResponse, Request};
use crate::network::{Network, NetworkError};

const ORIGIN: &str = "https://app.test/";

/// Scripted origin. Unknown URLs answer 404.
#[derive(Default)]
pub(crate) struct FakeNetwork {
    routes: Mutex<HashMap<String, (String, u16, Bytes)>>,
    offline: AtomicBool,
    calls: AtomicUsize,
}

impl FakeNetwork {
    /// Asset paths and bodies of the app under test; the root comes first.
    pub(crate) const APP: [(&'static str, &'static str); 3] = [
        ("./", "<html>root</html>"),
        ("./index.html", "<html>index</html>"),
        ("./manifest.webmanifest", "{\"name\":\"kwh\"}"),
    ];

    pub(crate) fn with_app() -> Arc<Self> {
        let network = Self::default();
        for (path, body) in Self::APP {
            let url = format!("{ORIGIN}{}", path.trim_start_matches("./"));
            network.serve(&url, 200, body);
        }
        Arc::new(network)
    }

    pub(crate) fn serve(&self, url: &str, status: u16, body: &'static str) {
        self.routes
            .lock()
            .insert(url.to_string(), (url.to_string(), status, Bytes::from_static(body.as_bytes())));
    }

    /// Answer `from` with a 200 whose final URL is `to`.
    pub(crate) fn redirect(&self, from: &str, to: &str, body: &'static str) {
        self.routes
            .lock()
            .insert(from.to_string(), (to.to_string(), 200, Bytes::from_static(body.as_bytes())));
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Network for FakeNetwork {
    async fn fetch(&self, request: &Request) -> Result<CapturedResponse, NetworkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(NetworkError::Connect(format!("offline: {}", request.url())));
        }

        let url = request.url().as_str();
        let response = match self.routes.lock().get(url) {
            Some((final_url, status, body)) => CapturedResponse::new(final_url.clone(), *status, body.clone()),
            None => CapturedResponse::new(url, 404, "not found"),
        };
        Ok(response)
    }
}

/// What [`FlakyStorage`] gets wrong. Snapshot inserts (`put_all`) are never
/// affected, so installs still succeed.
pub(crate) enum Fault {
    /// Deleting this store fails.
    Undeletable(&'static str),
    /// Single-entry writes never complete.
    StalledPuts,
    /// Single-entry writes fail.
    FailingPuts,
}

/// Delegates to a database, except where the fault applies.
pub(crate) struct FlakyStorage {
    db: CacheDb,
    fault: Fault,
}

impl FlakyStorage {
    pub(crate) fn new(db: CacheDb, fault: Fault) -> Self {
        Self { db, fault }
    }
}

#[async_trait]
impl CacheStorage for FlakyStorage {
    async fn open(&self, name: &str) -> Result<(), Error> {
        self.db.open(name).await
    }

    async fn has(&self, name: &str) -> Result<bool, Error> {
        self.db.has(name).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.db.keys().await
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        if let Fault::Undeletable(undeletable) = self.fault
            && name == undeletable
        {
            return Err(Error::Database(tokio_rusqlite::Error::ConnectionClosed));
        }
        self.db.delete(name).await
    }

    async fn lookup(&self, name: &str, request: &Request) -> Result<Option<CapturedResponse>, Error> {
        self.db.lookup(name, request).await
    }

    async fn put(&self, name: &str, request: &Request, response: &CapturedResponse) -> Result<(), Error> {
        match self.fault {
            Fault::StalledPuts => std::future::pending().await,
            Fault::FailingPuts => Err(Error::Database(tokio_rusqlite::Error::ConnectionClosed)),
            Fault::Undeletable(_) => self.db.put(name, request, response).await,
        }
    }

    async fn put_all(&self, name: &str, entries: &[(Request, CapturedResponse)]) -> Result<(), Error> {
        self.db.put_all(name, entries).await
    }

    async fn urls(&self, name: &str) -> Result<Vec<String>, Error> {
        self.db.urls(name).await
    }
}

pub(crate) fn config() -> AgentConfig {
    AgentConfig {
        version: "v1.0.0".into(),
        namespace: "kwh-calc".into(),
        scope: ORIGIN.into(),
        assets: FakeNetwork::APP.iter().map(|(path, _)| path.to_string()).collect(),
        ..Default::default()
    }
}

/// A fresh agent over an in-memory database.
pub(crate) async fn agent_with(network: Arc<FakeNetwork>) -> (OfflineAgent, CacheDb) {
    let db = CacheDb::open_in_memory().await.unwrap();
    let agent = OfflineAgent::new(&config(), Arc::new(db.clone()), network).unwrap();
    (agent, db)
}

/// An agent that has installed and activated, controlling its scope.
pub(crate) async fn installed_agent(network: Arc<FakeNetwork>) -> (OfflineAgent, CacheDb) {
    let (agent, db) = agent_with(network).await;
    agent.install().await.unwrap();
    agent.activate().await.unwrap();
    (agent, db)
}

/// An installed and activated agent over a faulty wrapper of a fresh database.
pub(crate) async fn installed_flaky_agent(network: Arc<FakeNetwork>, fault: Fault) -> (OfflineAgent, CacheDb) {
    let db = CacheDb::open_in_memory().await.unwrap();
    let storage = FlakyStorage::new(db.clone(), fault);
    let agent = OfflineAgent::new(&config(), Arc::new(storage), network).unwrap();
    agent.install().await.unwrap();
    agent.activate().await.unwrap();
    (agent, db)
}
