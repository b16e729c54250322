//! sw_install and sw_activate tool implementations.
//!
//! Deliver lifecycle triggers to the agent on behalf of the host.

use harbor_core::OfflineAgent;
use rmcp::{ErrorData as McpError, model::*};

fn report_json<T: serde::Serialize>(report: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(report).map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Implementation of the sw_install tool.
pub async fn install_impl(agent: &OfflineAgent) -> Result<CallToolResult, McpError> {
    let report = agent.install().await?;
    report_json(&report)
}

/// Implementation of the sw_activate tool.
pub async fn activate_impl(agent: &OfflineAgent) -> Result<CallToolResult, McpError> {
    let report = agent.activate().await?;
    report_json(&report)
}
