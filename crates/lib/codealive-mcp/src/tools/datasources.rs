use codealive_client::{CodeAliveClient, DataSourceKind};
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};

use crate::CodeAliveMcp;
use crate::error::ToolError;

/// Parameters for listing data sources.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetDataSourcesParams {
    #[schemars(
        description = "When true (default), return only data sources in the Alive state, ready for search and chat. When false, include sources still being indexed."
    )]
    pub alive_only: Option<bool>,
}

#[tool_router(router = tool_router_datasources, vis = "pub")]
impl CodeAliveMcp {
    #[tool(
        description = "List the repositories and workspaces indexed for this API key. Each entry carries the id to pass as the repository/workspace scope of codebase_search and codebase_consultant, plus name, description, and URL to help match a source against the codebase you are working in. Call this first."
    )]
    async fn get_data_sources(
        &self,
        Parameters(params): Parameters<GetDataSourcesParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match run_get_data_sources(&self.client, params).await {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(err) => Ok(err.into_call_result()),
        }
    }
}

pub(crate) async fn run_get_data_sources(
    client: &CodeAliveClient,
    params: GetDataSourcesParams,
) -> Result<String, ToolError> {
    let alive_only = params.alive_only.unwrap_or(true);
    let mut sources = client.data_sources(alive_only).await?;

    if sources.is_empty() {
        return Ok(
            "No data sources found. Please add a repository or workspace to CodeAlive before using this API."
                .to_string(),
        );
    }

    // Workspace composition is an implementation detail of the service;
    // callers scope calls by the workspace id itself.
    for source in &mut sources {
        if source.kind == DataSourceKind::Workspace {
            source.repository_ids = None;
        }
    }

    let formatted = serde_json::to_string_pretty(&sources)
        .map_err(|err| ToolError::internal(format!("failed to render data sources: {err}")))?;
    Ok(format!(
        "Available data sources:\n{formatted}\n\nYou can use these ids as the repository or workspace argument of codebase_search and codebase_consultant."
    ))
}
