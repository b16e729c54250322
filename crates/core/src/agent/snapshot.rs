//! Install and activate: snapshot population and retirement of old versions.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use url::Url;

use super::OfflineAgent;
use crate::Error;
use crate::http::{CapturedResponse, Request};
use crate::network::Network;

/// Outcome of a successful install.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InstallReport {
    /// Store that now holds the snapshot.
    pub store: String,
    pub version: String,
    /// Captured asset URLs, in configuration order.
    pub assets: Vec<String>,
    /// Total body bytes captured.
    pub bytes: u64,
}

/// Outcome of an activation sweep.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ActivateReport {
    /// The store kept as current.
    pub store: String,
    /// Stale stores removed.
    pub deleted: Vec<String>,
    /// Stale stores that could not be removed.
    pub retained: Vec<String>,
    /// Whether the instance now controls its scope.
    pub claimed: bool,
}

async fn capture(network: Arc<dyn Network>, url: Url) -> Result<(Request, CapturedResponse), Error> {
    let request = Request::get(url);
    let response = network
        .fetch(&request)
        .await
        .map_err(|e| Error::InstallFailed { url: request.url().to_string(), reason: e.to_string() })?;

    if !response.is_ok() {
        return Err(Error::InstallFailed {
            url: request.url().to_string(),
            reason: format!("status {}", response.status),
        });
    }

    Ok((request, response))
}

impl OfflineAgent {
    /// Capture every configured asset into the current store.
    ///
    /// Assets are fetched concurrently and committed in one transaction only
    /// after all of them succeeded, so a failed install leaves no new store
    /// and does not touch the previous version's store.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidState` if this instance is already installing or installed
    /// - `Error::InstallFailed` if any asset fetch fails or returns a non-2xx status
    pub async fn install(&self) -> Result<InstallReport, Error> {
        self.lifecycle.begin_install()?;

        let store = self.registry.current_name().to_string();
        tracing::info!(store = %store, assets = self.assets.len(), "installing snapshot");

        let result = match self.capture_assets().await {
            Ok(entries) => self.registry.populate(&entries).await.map(|()| entries),
            Err(err) => Err(err),
        };

        match result {
            Ok(entries) => {
                self.lifecycle.finish_install(true);
                let report = InstallReport {
                    store,
                    version: self.registry.version().to_string(),
                    assets: entries.iter().map(|(req, _)| req.url().to_string()).collect(),
                    bytes: entries.iter().map(|(_, res)| res.body.len() as u64).sum(),
                };
                tracing::info!(store = %report.store, bytes = report.bytes, "snapshot installed");
                Ok(report)
            }
            Err(err) => {
                self.lifecycle.finish_install(false);
                tracing::warn!(store = %store, error = %err, "install failed");
                Err(err)
            }
        }
    }

    async fn capture_assets(&self) -> Result<Vec<(Request, CapturedResponse)>, Error> {
        let mut join_set = JoinSet::new();
        for (index, url) in self.assets.iter().cloned().enumerate() {
            let network = Arc::clone(&self.network);
            join_set.spawn(async move { (index, capture(network, url).await) });
        }

        let mut captured: Vec<Option<(Request, CapturedResponse)>> = vec![None; self.assets.len()];
        while let Some(joined) = join_set.join_next().await {
            let (index, result) =
                joined.map_err(|e| Error::InstallFailed { url: "<asset task>".into(), reason: e.to_string() })?;
            // Returning early drops the set, which aborts the remaining fetches.
            captured[index] = Some(result?);
        }

        Ok(captured.into_iter().flatten().collect())
    }

    /// Delete every store owned by another version and claim the scope.
    ///
    /// Cleanup is best effort: a store that cannot be enumerated or deleted is
    /// logged and reported, never fatal.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` unless this instance finished installing.
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        self.lifecycle.begin_activate()?;

        let store = self.registry.current_name().to_string();
        let stale = match self.registry.stale_names().await {
            Ok(names) => names,
            Err(err) => {
                tracing::warn!(error = %err, "could not enumerate stores; skipping cleanup");
                Vec::new()
            }
        };

        let mut deleted = Vec::new();
        let mut retained = Vec::new();
        for name in stale {
            match self.registry.evict(&name).await {
                Ok(_) => {
                    tracing::info!(store = %name, "deleted stale store");
                    deleted.push(name);
                }
                Err(err) => {
                    tracing::warn!(store = %name, error = %err, "failed to delete stale store");
                    retained.push(name);
                }
            }
        }

        self.lifecycle.finish_activate();
        tracing::info!(store = %store, deleted = deleted.len(), "activated and claimed scope");

        Ok(ActivateReport { store, deleted, retained, claimed: true })
    }
}
