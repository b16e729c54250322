//! sw_stores tool implementation.
//!
//! Reports the named stores and what the current one holds.

use harbor_core::agent::WorkerState;
use harbor_core::{CacheStorage, OfflineAgent};
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output structure for sw_stores tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwStoresOutput {
    /// Version identifier the agent was built with.
    pub version: String,
    /// Store owned by that version.
    pub current: String,
    /// Every existing store, oldest first.
    pub stores: Vec<String>,
    /// Request URLs held in the current store.
    pub cached_urls: Vec<String>,
    pub state: WorkerState,
    pub controlling: bool,
    /// Background store writes still running.
    pub pending_writes: usize,
}

/// Implementation of the sw_stores tool.
pub async fn stores_impl(agent: &OfflineAgent) -> Result<CallToolResult, McpError> {
    let registry = agent.registry();
    let output = SwStoresOutput {
        version: registry.version().to_string(),
        current: registry.current_name().to_string(),
        stores: registry.storage().keys().await?,
        cached_urls: registry.cached_urls().await?,
        state: agent.lifecycle().state(),
        controlling: agent.lifecycle().is_controlling(),
        pending_writes: agent.pending_writes(),
    };

    Ok(CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(&output).unwrap_or_default(),
    )]))
}
