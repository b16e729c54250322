//! The named-store interface both backends implement.

use async_trait::async_trait;

use crate::Error;
use crate::http::{CapturedResponse, Request};

/// A set of named key-value stores mapping request identity to a captured
/// response.
///
/// Writes are upserts, so repeating one is harmless. Concurrent writes to the
/// same key are last-write-wins.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the named store if it does not exist.
    async fn open(&self, name: &str) -> Result<(), Error>;

    /// Whether the named store exists.
    async fn has(&self, name: &str) -> Result<bool, Error>;

    /// Names of all existing stores, oldest first.
    async fn keys(&self) -> Result<Vec<String>, Error>;

    /// Delete a store with all its entries. Returns false if it did not exist.
    async fn delete(&self, name: &str) -> Result<bool, Error>;

    /// Look up a request in the named store. A missing store is a miss.
    async fn lookup(&self, name: &str, request: &Request) -> Result<Option<CapturedResponse>, Error>;

    /// Insert or replace one entry, creating the store if needed.
    async fn put(&self, name: &str, request: &Request, response: &CapturedResponse) -> Result<(), Error>;

    /// Insert a batch of entries atomically: either all become visible or none.
    async fn put_all(&self, name: &str, entries: &[(Request, CapturedResponse)]) -> Result<(), Error>;

    /// URLs of the requests held in the named store, in insertion order.
    async fn urls(&self, name: &str) -> Result<Vec<String>, Error>;
}
