//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the agent.
use std::sync::Arc;

use crate::tools::{SwFetchParams, fetch::fetch_impl, lifecycle, stores::stores_impl};
use harbor_core::OfflineAgent;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for harbor.
#[derive(Clone)]
pub struct HarborServer {
    tool_router: ToolRouter<Self>,
    agent: Arc<OfflineAgent>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl HarborServer {
    /// Create a new server handler around a shared agent.
    pub fn new(agent: Arc<OfflineAgent>) -> Self {
        Self { tool_router: Self::tool_router(), agent }
    }

    /// Capture the configured asset list into the current version's store.
    #[tool(description = "Install the current version: fetch every configured asset and store them as one snapshot. Fails as a whole if any asset fails.")]
    async fn sw_install(&self) -> Result<CallToolResult, McpError> {
        lifecycle::install_impl(&self.agent).await
    }

    /// Retire stores owned by other versions and start controlling requests.
    #[tool(description = "Activate the installed version: delete every store owned by another version and start intercepting requests.")]
    async fn sw_activate(&self) -> Result<CallToolResult, McpError> {
        lifecycle::activate_impl(&self.agent).await
    }

    /// Intercept a request through the offline policies.
    #[tool(description = "Request a URL through the offline agent. Navigations are network-first, other same-origin GETs cache-first; both fall back to the cached root document when offline.")]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.agent, params.0).await
    }

    /// Report stores and agent state.
    #[tool(description = "List cache stores, the current store's entries, and the agent lifecycle state.")]
    async fn sw_stores(&self) -> Result<CallToolResult, McpError> {
        stores_impl(&self.agent).await
    }
}

impl ServerHandler for HarborServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "harbor".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::fresh_agent;

    #[test]
    fn test_tools_registered() {
        let server = HarborServer::new(Arc::new(fresh_agent()));
        let names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        for expected in ["sw_install", "sw_activate", "sw_fetch", "sw_stores"] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
    }
}
