//! MCP server implementation for the CodeAlive API.
//!
//! This crate wires the CodeAlive API client into rmcp tool handlers and
//! exposes the MCP-facing surface: data-source discovery, semantic search,
//! the codebase consultant, and repository overviews. Tool arguments are
//! scrubbed of platform-injected noise before they are bound to any tool's
//! parameter schema.

mod error;
mod sanitize;
mod scope;
mod tools;
mod transform;
pub mod server;

use std::sync::Arc;

use codealive_client::CodeAliveClient;
use rmcp::{
    ErrorData,
    ServerHandler,
    handler::server::tool::{ToolCallContext, ToolRouter},
};
use rmcp::model::{
    CallToolRequestParam,
    CallToolResult,
    ListToolsResult,
    PaginatedRequestParam,
    ServerCapabilities,
    ServerInfo,
};
use rmcp::service::{RequestContext, RoleServer};

pub use error::ToolError;
pub use sanitize::{SCRUBBED_KEYS, scrub_arguments};
pub use scope::DataSourceScope;

const SERVER_INSTRUCTIONS: &str = r#"This server provides access to the CodeAlive API for AI-powered code search and code understanding.

Workflow:
1. Call `get_data_sources` to identify available repositories and workspaces.
2. Use `codebase_search` to find relevant files and code snippets.
3. Use `codebase_consultant` for in-depth analysis of the code.
4. Use `get_repo_overview` for the business context and vocabulary of a codebase.

Scoping:
- Pass a workspace id to operate across all of its repositories at once, or a
  repository id (or URL) for a targeted call; never both on the same call.
- Ids come from `get_data_sources`; data sources must be in the "Alive" state.

Search:
- Prefer `codebase_search` over grep for exploration: it understands semantic
  meaning and searches the indexed repository state with full context.
- Use natural-language questions ("Where is rate limiting handled?"); include
  known symbol names to narrow scope.
- Keep the default "auto" mode; reserve "deep" for hard, cross-cutting
  questions as it is resource-intensive.
- Set include_content=true only for repositories you cannot read directly;
  for the codebase you are working in, request paths and read the files.

Consultant:
- Context carries across messages of the same conversation; pass back the
  conversation id to continue one."#;

/// MCP server wrapper around the CodeAlive API client.
#[derive(Clone)]
pub struct CodeAliveMcp {
    tool_router: ToolRouter<Self>,
    client: Arc<CodeAliveClient>,
}

impl CodeAliveMcp {
    /// Creates a new server owning the client.
    #[must_use]
    pub fn new(client: CodeAliveClient) -> Self {
        Self::with_client(Arc::new(client))
    }

    /// Creates a new server sharing an existing client handle; every clone
    /// (one per MCP session in HTTP mode) reuses the same connection pool.
    #[must_use]
    pub fn with_client(client: Arc<CodeAliveClient>) -> Self {
        let tool_router = Self::tool_router_datasources()
            + Self::tool_router_search()
            + Self::tool_router_chat()
            + Self::tool_router_overview();
        Self {
            tool_router,
            client,
        }
    }
}

impl ServerHandler for CodeAliveMcp {
    /// Dispatches a tool call, scrubbing nuisance arguments first so the
    /// scrub runs on every invocation regardless of transport.
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let mut request = request;
        request.arguments = sanitize::scrub_arguments(request.arguments);
        let tool_call = ToolCallContext::new(self, request, context);
        self.tool_router.call(tool_call).await
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            meta: None,
            next_cursor: None,
            tools: self.tool_router.list_all(),
        })
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
