//! The offline caching agent.
//!
//! An [`OfflineAgent`] reacts to three triggers from its host:
//!
//! - **install**: capture every configured asset into the store named for the
//!   current version, all or nothing
//! - **activate**: delete every store owned by another version and start
//!   controlling requests
//! - **fetch**: route an intercepted request through one of two policies
//!
//! ### Policies
//! - Navigations are network-first. A live response refreshes the root entry;
//!   a network failure falls back to it.
//! - Other same-origin GETs are cache-first. A miss goes to the network and a
//!   2xx same-origin response is stored; a network failure falls back to the
//!   root entry.
//!
//! Store writes after a live response run as spawned background tasks and
//! never delay the response. Concurrent identical requests are not coalesced.

pub mod lifecycle;
pub mod scope;

mod background;
mod navigation;
mod resource;
mod snapshot;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::Error;
use crate::cache::{CacheStorage, StoreRegistry};
use crate::config::AgentConfig;
use crate::http::{CapturedResponse, Request};
use crate::network::{Network, NetworkError};

use background::BackgroundWrites;
pub use lifecycle::{Lifecycle, WorkerState};
pub use scope::{PassReason, Route};
pub use snapshot::{ActivateReport, InstallReport};

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    /// Live response from the origin.
    Network,
    /// Exact match in the current store.
    Cache,
    /// Root entry served because the network failed.
    Fallback,
    /// Request bypassed the policies entirely.
    Passthrough,
}

/// A response handed back to the host.
#[derive(Debug, Clone)]
pub struct Served {
    pub response: CapturedResponse,
    pub source: ResponseSource,
}

impl Served {
    fn new(response: CapturedResponse, source: ResponseSource) -> Self {
        Self { response, source }
    }
}

/// Result of intercepting a request.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// The agent produced the response.
    Served(Served),
    /// The agent declined; the host applies default network behavior.
    PassThrough(PassReason),
}

/// The closed set of events a host can deliver.
#[derive(Debug, Clone)]
pub enum Trigger {
    Install,
    Activate,
    Fetch(Request),
}

/// What handling a trigger produced.
#[derive(Debug, Clone)]
pub enum TriggerOutcome {
    Installed(InstallReport),
    Activated(ActivateReport),
    Fetched(FetchOutcome),
}

/// Offline caching agent bound to one version identifier.
pub struct OfflineAgent {
    registry: StoreRegistry,
    network: Arc<dyn Network>,
    scope: Url,
    root: Url,
    assets: Vec<Url>,
    lifecycle: Lifecycle,
    writes: BackgroundWrites,
}

impl OfflineAgent {
    /// Build an agent from validated configuration.
    pub fn new(config: &AgentConfig, storage: Arc<dyn CacheStorage>, network: Arc<dyn Network>) -> Result<Self, Error> {
        config.validate()?;

        let registry = StoreRegistry::new(storage, &config.namespace, config.version_id()?);

        Ok(Self {
            registry,
            network,
            scope: config.scope_url()?,
            root: config.root_url()?,
            assets: config.asset_urls()?,
            lifecycle: Lifecycle::default(),
            writes: BackgroundWrites::default(),
        })
    }

    pub fn registry(&self) -> &StoreRegistry {
        &self.registry
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn scope(&self) -> &Url {
        &self.scope
    }

    /// URL of the root entry, the universal offline fallback.
    pub fn root_url(&self) -> &Url {
        &self.root
    }

    /// Handle one trigger.
    pub async fn dispatch(&self, trigger: Trigger) -> Result<TriggerOutcome, Error> {
        match trigger {
            Trigger::Install => self.install().await.map(TriggerOutcome::Installed),
            Trigger::Activate => self.activate().await.map(TriggerOutcome::Activated),
            Trigger::Fetch(request) => self.intercept(&request).await.map(TriggerOutcome::Fetched),
        }
    }

    /// Route an intercepted request.
    ///
    /// Until the instance controls its scope every request passes through.
    ///
    /// # Errors
    ///
    /// Returns `Error::Network` when the network failed and no root entry was
    /// available to cover it.
    pub async fn intercept(&self, request: &Request) -> Result<FetchOutcome, Error> {
        if !self.lifecycle.is_controlling() {
            return Ok(FetchOutcome::PassThrough(PassReason::NotControlling));
        }

        let served = match scope::classify(request, &self.scope) {
            Route::PassThrough(reason) => {
                tracing::trace!(method = request.method(), url = %request.url(), ?reason, "passing through");
                return Ok(FetchOutcome::PassThrough(reason));
            }
            Route::Navigation => self.handle_navigation(request).await?,
            Route::Resource => self.handle_resource(request).await?,
        };

        Ok(FetchOutcome::Served(served))
    }

    /// Intercept a request, sending pass-throughs straight to the network.
    pub async fn fetch(&self, request: &Request) -> Result<Served, Error> {
        match self.intercept(request).await? {
            FetchOutcome::Served(served) => Ok(served),
            FetchOutcome::PassThrough(_) => {
                let response = self.network.fetch(request).await?;
                Ok(Served::new(response, ResponseSource::Passthrough))
            }
        }
    }

    /// Wait for every background store write spawned so far.
    pub async fn settle(&self) {
        self.writes.settle().await;
    }

    /// Number of background store writes still running.
    pub fn pending_writes(&self) -> usize {
        self.writes.pending()
    }

    fn root_request(&self) -> Request {
        Request::get(self.root.clone())
    }

    fn spawn_store(&self, request: Request, response: CapturedResponse) {
        self.writes.spawn(self.registry.clone(), request, response);
    }

    /// Serve the root entry in place of a failed network attempt, or hand the
    /// original failure back when there is nothing to serve.
    async fn root_fallback(&self, failure: NetworkError) -> Result<Served, Error> {
        match self.registry.lookup(&self.root_request()).await {
            Ok(Some(root)) => {
                tracing::debug!(error = %failure, "network failed, serving root entry");
                Ok(Served::new(root, ResponseSource::Fallback))
            }
            Ok(None) => Err(Error::Network(failure)),
            Err(err) => {
                tracing::warn!(error = %err, "root entry lookup failed");
                Err(Error::Network(failure))
            }
        }
    }
}
