use codealive_client::{ApiError, ChatMessage, ChatRequest, CodeAliveClient, DataSourceRef};
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

const NO_CONTENT_MESSAGE: &str =
    "No content returned from the API. Please check that your data sources are accessible and try again.";

/// Parameters for a consultant question.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CodebaseConsultantParams {
    #[schemars(
        description = "The question to ask about the codebase, e.g. \"How does the login process work?\""
    )]
    pub question: String,

    #[schemars(
        description = "Repository id or URL to consult, as returned by get_data_sources. Mutually exclusive with workspace."
    )]
    pub repository: Option<String>,

    #[schemars(
        description = "Workspace id to consult across all of its repositories. Mutually exclusive with repository."
    )]
    pub workspace: Option<String>,

    #[schemars(
        description = "Opaque id of a previous consultant conversation to continue; the service keeps the context. Omit to start a new conversation."
    )]
    pub conversation_id: Option<String>,
}

#[tool_router(router = tool_router_chat, vis = "pub")]
impl CodeAliveMcp {
    #[tool(
        description = "Ask the codebase consultant an in-depth question about an indexed repository or workspace. The service answers with knowledge of the code's structure, dependencies, and implementation details, and maintains context across turns of the same conversation. Use codebase_search first to locate code, then this for analysis."
    )]
    async fn codebase_consultant(
        &self,
        Parameters(params): Parameters<CodebaseConsultantParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match run_consultant(&self.client, params).await {
            Ok(answer) => Ok(CallToolResult::success(vec![Content::text(answer)])),
            Err(err) => Ok(err.into_call_result()),
        }
    }
}

pub(crate) async fn run_consultant(
    client: &CodeAliveClient,
    params: CodebaseConsultantParams,
) -> Result<String, ToolError> {
    let question = params.question.trim();
    if question.is_empty() {
        return Err(ToolError::validation(
            "Question cannot be empty. Please provide a question about the codebase.",
        ));
    }
    let scope = DataSourceScope::resolve(params.repository, params.workspace)?;
    let conversation_id = params
        .conversation_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());

    // The continuation token and scope are forwarded opaquely; the service
    // owns the conversation state.
    let request = ChatRequest {
        messages: vec![ChatMessage::user(question)],
        stream: true,
        conversation_id,
        data_sources: scope.map(|s| {
            vec![DataSourceRef {
                id: s.into_name(),
            }]
        }),
    };

    let stream = client.chat(&request).await.map_err(|err| match err {
        ApiError::NotFound { .. } => ApiError::NotFound {
            message: "Not found error (404): The requested resource could not be found. Check your conversation_id or data source ids."
                .to_string(),
        }
        .into(),
        other => ToolError::from(other),
    })?;

    let answer = stream.collect_answer().await?;
    if answer.is_empty() {
        Ok(NO_CONTENT_MESSAGE.to_string())
    } else {
        Ok(answer)
    }
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

    fn params(question: &str) -> CodebaseConsultantParams {
        CodebaseConsultantParams {
            question: question.to_string(),
            repository: None,
            workspace: None,
            conversation_id: None,
        }
    }

    #[tokio::test]
    async fn empty_question_fails_validation_with_zero_requests() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = run_consultant(&client, params(""))
            .await
            .expect_err("blank question must be rejected");
        assert_eq!(err.category(), "validation_error");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn conflicting_scopes_fail_validation_with_zero_requests() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = client_for(&server);
        let mut request = params("How does auth work?");
        request.repository = Some("repo-1".to_string());
        request.workspace = Some("ws-1".to_string());
        let err = run_consultant(&client, request)
            .await
            .expect_err("both scopes must be rejected");
        assert_eq!(err.category(), "validation_error");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn answer_is_reassembled_from_the_stream() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat/completions")
            .match_body(Matcher::PartialJson(json!({
                "messages": [{"role": "user", "content": "How does login work?"}],
                "stream": true,
                "conversationId": "conv-1",
                "dataSources": [{"id": "repo-1"}]
            })))
            .with_status(200)
            .with_body(
                "data: {\"choices\":[{\"delta\":{\"content\":\"Login uses\"}}]}\n\
                 data: {\"choices\":[{\"delta\":{\"content\":\" sessions.\"}}]}\n\
                 data: [DONE]\n",
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let mut request = params("How does login work?");
        request.repository = Some("repo-1".to_string());
        request.conversation_id = Some("conv-1".to_string());
        let answer = run_consultant(&client, request)
            .await
            .expect("consultant call should succeed");

        mock.assert_async().await;
        assert_eq!(answer, "Login uses sessions.");
    }

    #[tokio::test]
    async fn truncated_stream_surfaces_a_stream_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat/completions")
            .with_status(200)
            .with_body(
                "data: {\"choices\":[{\"delta\":{\"content\":\"partial\"}}]}\n\
                 data: {\"choices\":[{\"delta\":{\"content\":\" answer\"}}]}\n",
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let err = run_consultant(&client, params("anything"))
            .await
            .expect_err("truncated stream must not be silent success");
        assert_eq!(err.category(), "stream_error");
    }

    #[tokio::test]
    async fn empty_answer_returns_guidance() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat/completions")
            .with_status(200)
            .with_body("data: [DONE]\n")
            .create_async()
            .await;

        let client = client_for(&server);
        let answer = run_consultant(&client, params("anything"))
            .await
            .expect("empty stream should still complete");
        assert_eq!(answer, NO_CONTENT_MESSAGE);
    }

    #[tokio::test]
    async fn not_found_carries_conversation_guidance() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat/completions")
            .with_status(404)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = run_consultant(&client, params("anything"))
            .await
            .expect_err("404 should fail");
        assert_eq!(err.category(), "not_found_error");
        assert!(err.to_string().contains("conversation_id"));
    }
}
