//! The seam between the agent and whatever actually talks to the origin.

use async_trait::async_trait;

use crate::http::{CapturedResponse, Request};

/// A failed network attempt. Terminal for the request that caused it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NetworkError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("response too large: {0}")]
    TooLarge(String),

    #[error("network error: {0}")]
    Other(String),
}

/// Issues requests to the origin.
///
/// A completed exchange is `Ok` regardless of status; only transport-level
/// failures are errors.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<CapturedResponse, NetworkError>;
}
