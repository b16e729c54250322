//! sw_fetch tool implementation.
//!
//! Delivers an intercepted request to the agent and reports what it served.

use harbor_client::canonicalize;
use harbor_core::{OfflineAgent, Request, RequestMode, ResponseSource};
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

/// Input parameters for sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Absolute URL, or a path resolved against the agent scope (e.g. "./index.html").
    pub url: String,

    /// HTTP method (default: GET). Anything but GET bypasses the cache.
    #[serde(default = "default_method")]
    pub method: String,

    /// Treat the request as a top-level document navigation.
    #[serde(default)]
    pub navigate: bool,
}

fn default_method() -> String {
    "GET".into()
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResponseHeader {
    pub name: String,
    pub value: String,
}

/// Output structure for sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchOutput {
    /// The request URL after resolution.
    pub url: String,
    /// Final URL of the served response.
    pub response_url: String,
    pub status: u16,
    pub headers: Vec<ResponseHeader>,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
    pub body_bytes: usize,
    /// Where the response came from.
    pub source: ResponseSource,
}

/// Implementation of the sw_fetch tool.
pub async fn fetch_impl(agent: &OfflineAgent, params: SwFetchParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(ToolError::InvalidInput("url cannot be empty".into()).into());
    }
    if params.method.trim().is_empty() {
        return Err(ToolError::InvalidInput("method cannot be empty".into()).into());
    }

    let url = canonicalize(&params.url, agent.scope()).map_err(|e| ToolError::InvalidUrl(e.to_string()))?;
    let mode = if params.navigate { RequestMode::Navigate } else { RequestMode::Subresource };
    let request = Request::new(&params.method, url, mode);

    let served = agent.fetch(&request).await?;
    tracing::debug!(url = %request.url(), source = ?served.source, status = served.response.status, "served");

    let response = served.response;
    let output = SwFetchOutput {
        url: request.url().to_string(),
        response_url: response.url.clone(),
        status: response.status,
        headers: response
            .headers
            .iter()
            .map(|(name, value)| ResponseHeader { name: name.clone(), value: value.clone() })
            .collect(),
        body: String::from_utf8_lossy(&response.body).to_string(),
        body_bytes: response.body.len(),
        source: served.source,
    };

    Ok(CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(&output).unwrap_or_default(),
    )]))
}
