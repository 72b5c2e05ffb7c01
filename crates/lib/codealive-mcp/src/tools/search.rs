use codealive_client::{ApiError, CodeAliveClient, SearchMode, SearchQuery};
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
use crate::transform::search_results_to_xml;

/// Parameters for semantic code search.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CodebaseSearchParams {
    #[schemars(
        description = "Natural-language description of what you are looking for, e.g. \"Where is rate limiting handled?\". Function or class names narrow the scope."
    )]
    pub query: String,

    #[schemars(
        description = "Repository id or URL to search, as returned by get_data_sources. Mutually exclusive with workspace."
    )]
    pub repository: Option<String>,

    #[schemars(
        description = "Workspace id to search across all of its repositories. Mutually exclusive with repository."
    )]
    pub workspace: Option<String>,

    #[schemars(
        description = "Search mode: auto (default, recommended), fast for obvious matches, or deep for hard cross-cutting questions."
    )]
    pub mode: Option<String>,

    #[schemars(description = "Maximum number of results to return.")]
    pub limit: Option<u32>,

    #[schemars(
        description = "Include file content in results (default false). Set true only for repositories you cannot read directly; for the codebase you are working in, take the paths and read the files yourself."
    )]
    pub include_content: Option<bool>,
}

#[tool_router(router = tool_router_search, vis = "pub")]
impl CodeAliveMcp {
    #[tool(
        description = "Semantic search over an indexed repository or workspace. Prefer this over grep for exploration: it understands meaning, not just text patterns, and searches the indexed branch with full context. Results come back ranked by the service, grouped by file."
    )]
    async fn codebase_search(
        &self,
        Parameters(params): Parameters<CodebaseSearchParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match run_search(&self.client, params).await {
            Ok(xml) => Ok(CallToolResult::success(vec![Content::text(xml)])),
            Err(err) => Ok(err.into_call_result()),
        }
    }
}

pub(crate) async fn run_search(
    client: &CodeAliveClient,
    params: CodebaseSearchParams,
) -> Result<String, ToolError> {
    let query = params.query.trim().to_string();
    if query.is_empty() {
        return Err(ToolError::validation(
            "Query cannot be empty. Please provide a search term, function name, or description of the code you're looking for.",
        ));
    }
    let scope = DataSourceScope::resolve(params.repository, params.workspace)?;
    let mode = SearchMode::parse_lenient(params.mode.as_deref());
    let include_content = params.include_content.unwrap_or(false);
    let names = scope.map(|s| vec![s.into_name()]).unwrap_or_default();
    if names.is_empty() {
        tracing::debug!("no scope provided, using the API key's default data source");
    }

    let response = client
        .search(&SearchQuery {
            query,
            mode,
            include_content,
            names,
            limit: params.limit,
        })
        .await
        .map_err(|err| match err {
            ApiError::NotFound { .. } => ApiError::NotFound {
                message: "Not found error (404): One or more data sources could not be found. Check your repository or workspace argument."
                    .to_string(),
            }
            .into(),
            other => ToolError::from(other),
        })?;

    Ok(search_results_to_xml(&response.results, include_content))
}

#[cfg(test)]
mod tests {
    use codealive_client::ClientConfig;
    use mockito::Matcher;
    use serde_json::json;

    use super::*;

    fn client_for(server: &mockito::Server) -> CodeAliveClient {
        CodeAliveClient::new(ClientConfig::new("test-key").with_base_url(server.url()))
            .expect("client should build")
    }

    fn params(query: &str) -> CodebaseSearchParams {
        CodebaseSearchParams {
            query: query.to_string(),
            repository: None,
            workspace: None,
            mode: None,
            limit: None,
            include_content: None,
        }
    }

    #[tokio::test]
    async fn empty_query_fails_validation_with_zero_requests() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = run_search(&client, params("   "))
            .await
            .expect_err("blank query must be rejected");
        assert_eq!(err.category(), "validation_error");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn conflicting_scopes_fail_validation_with_zero_requests() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = client_for(&server);
        let mut request = params("auth flow");
        request.repository = Some("repo-1".to_string());
        request.workspace = Some("ws-1".to_string());
        let err = run_search(&client, request)
            .await
            .expect_err("both scopes must be rejected");
        assert_eq!(err.category(), "validation_error");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn workspace_scope_sends_one_scoped_bearer_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/search")
            .match_header("authorization", "Bearer test-key")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("Query".into(), "parse json".into()),
                Matcher::UrlEncoded("Mode".into(), "auto".into()),
                Matcher::UrlEncoded("Names".into(), "ws-1".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "results": [
                        {"kind": "File", "location": {"path": "src/json.rs"}},
                        {"kind": "File", "location": {"path": "src/lib.rs"}}
                    ]
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let mut request = params("parse json");
        request.workspace = Some("ws-1".to_string());
        let xml = run_search(&client, request)
            .await
            .expect("search should succeed");

        mock.assert_async().await;
        // Ranked order is preserved in the rendered output.
        let first = xml.find("src/json.rs").expect("first hit present");
        let second = xml.find("src/lib.rs").expect("second hit present");
        assert!(first < second);
    }

    #[tokio::test]
    async fn invalid_mode_falls_back_to_auto() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/search")
            .match_query(Matcher::UrlEncoded("Mode".into(), "auto".into()))
            .with_status(200)
            .with_body(json!({"results": []}).to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        let mut request = params("anything");
        request.mode = Some("EXHAUSTIVE".to_string());
        run_search(&client, request)
            .await
            .expect("search should succeed despite bad mode");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn not_found_carries_data_source_guidance() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/search")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = run_search(&client, params("anything"))
            .await
            .expect_err("404 should fail");
        assert_eq!(err.category(), "not_found_error");
        assert!(err.to_string().contains("repository or workspace"));
    }
}
