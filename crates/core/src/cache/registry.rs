//! The versioned view over named stores that the policies share.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::storage::CacheStorage;
use crate::Error;
use crate::http::{CapturedResponse, Request};

/// Opaque token selecting which store is current.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionId(String);

impl VersionId {
    pub fn new(version: impl Into<String>) -> Result<Self, Error> {
        let version = version.into();
        if version.trim().is_empty() {
            return Err(Error::InvalidInput("version identifier cannot be empty".into()));
        }
        Ok(Self(version))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive a store name from a namespace and version.
pub fn store_name(namespace: &str, version: &VersionId) -> String {
    format!("{namespace}-{version}")
}

/// Storage bound to the current version's store name.
///
/// Cheap to clone; clones share the underlying storage.
#[derive(Clone)]
pub struct StoreRegistry {
    storage: Arc<dyn CacheStorage>,
    version: VersionId,
    current: String,
}

impl StoreRegistry {
    pub fn new(storage: Arc<dyn CacheStorage>, namespace: &str, version: VersionId) -> Self {
        let current = store_name(namespace, &version);
        Self { storage, version, current }
    }

    pub fn version(&self) -> &VersionId {
        &self.version
    }

    /// Name of the store owned by the current version.
    pub fn current_name(&self) -> &str {
        &self.current
    }

    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.storage
    }

    pub async fn lookup(&self, request: &Request) -> Result<Option<CapturedResponse>, Error> {
        self.storage.lookup(&self.current, request).await
    }

    pub async fn store(&self, request: &Request, response: &CapturedResponse) -> Result<(), Error> {
        self.storage.put(&self.current, request, response).await
    }

    /// Insert a full snapshot into the current store in one transaction.
    pub async fn populate(&self, entries: &[(Request, CapturedResponse)]) -> Result<(), Error> {
        self.storage.put_all(&self.current, entries).await
    }

    /// Every existing store not owned by the current version.
    pub async fn stale_names(&self) -> Result<Vec<String>, Error> {
        let names = self.storage.keys().await?;
        Ok(names.into_iter().filter(|name| *name != self.current).collect())
    }

    pub async fn evict(&self, name: &str) -> Result<bool, Error> {
        self.storage.delete(name).await
    }

    pub async fn cached_urls(&self) -> Result<Vec<String>, Error> {
        self.storage.urls(&self.current).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheDb;

    #[test]
    fn test_version_rejects_empty() {
        assert!(VersionId::new("").is_err());
        assert!(VersionId::new("   ").is_err());
        assert_eq!(VersionId::new("v1.0.0").unwrap().as_str(), "v1.0.0");
    }

    #[test]
    fn test_store_name() {
        let version = VersionId::new("v1.0.0").unwrap();
        assert_eq!(store_name("kwh-calc", &version), "kwh-calc-v1.0.0");
    }

    #[tokio::test]
    async fn test_stale_names_excludes_current() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open("app-v1").await.unwrap();
        db.open("app-v2").await.unwrap();
        db.open("other-store").await.unwrap();

        let registry = StoreRegistry::new(Arc::new(db), "app", VersionId::new("v2").unwrap());
        assert_eq!(registry.current_name(), "app-v2");
        assert_eq!(registry.stale_names().await.unwrap(), vec!["app-v1", "other-store"]);
    }
}
