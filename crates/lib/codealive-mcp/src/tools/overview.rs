use codealive_client::CodeAliveClient;
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
use crate::scope::DataSourceScope;
use crate::transform::overviews_to_xml;

/// Parameters for fetching repository overviews.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetRepoOverviewParams {
    #[schemars(
        description = "Repository id or URL to describe. Mutually exclusive with workspace. Omit both to get overviews for all accessible data sources."
    )]
    pub repository: Option<String>,

    #[schemars(
        description = "Workspace id to describe. Mutually exclusive with repository."
    )]
    pub workspace: Option<String>,
}

#[tool_router(router = tool_router_overview, vis = "pub")]
impl CodeAliveMcp {
    #[tool(
        description = "Get a high-level overview of indexed repositories: purpose, responsibilities, domain vocabulary, and business context. Useful before searching, to understand what a codebase is for and which terms it uses."
    )]
    async fn get_repo_overview(
        &self,
        Parameters(params): Parameters<GetRepoOverviewParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match run_repo_overview(&self.client, params).await {
            Ok(xml) => Ok(CallToolResult::success(vec![Content::text(xml)])),
            Err(err) => Ok(err.into_call_result()),
        }
    }
}

pub(crate) async fn run_repo_overview(
    client: &CodeAliveClient,
    params: GetRepoOverviewParams,
) -> Result<String, ToolError> {
    let scope = DataSourceScope::resolve(params.repository, params.workspace)?;
    let names = scope.map(|s| vec![s.into_name()]).unwrap_or_default();
    let overviews = client.overview(&names).await?;
    Ok(overviews_to_xml(&overviews))
}
