//! Structured errors for tool parameter handling.
//!
//! Agent failures convert through `harbor_core::Error`; these cover input the
//! agent never sees.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Structured errors for the harbor server.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Invalid input parameters (e.g., empty URL).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// URL could not be resolved against the scope.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        let code = match &err {
            ToolError::InvalidInput(_) => -32602,
            ToolError::InvalidUrl(_) => -32003,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}
