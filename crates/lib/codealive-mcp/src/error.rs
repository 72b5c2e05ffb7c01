use codealive_client::ApiError;
use rmcp::model::{CallToolResult, Content};
use thiserror::Error;

/// Failure of one tool dispatch, surfaced to the MCP caller as a structured
/// tool failure rather than a protocol error: no tool failure crashes the
/// server or other in-flight calls.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Arguments were malformed before any network call was attempted.
    #[error("{0}")]
    Validation(String),

    /// The API client reported a failure.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A response could not be rendered; should not occur in practice.
    #[error("{0}")]
    Internal(String),
}

impl ToolError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Stable category label paired with the human-readable message.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Api(err) => err.category(),
            Self::Internal(_) => "internal_error",
        }
    }

    pub fn into_call_result(self) -> CallToolResult {
        CallToolResult::error(vec![Content::text(format!("{}: {self}", self.category()))])
    }
}
