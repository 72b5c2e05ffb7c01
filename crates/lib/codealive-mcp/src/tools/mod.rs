//! MCP tool modules.
//!
//! One module per tool: data-source discovery, semantic search, the codebase
//! consultant, and repository overviews. Each module pairs a thin rmcp
//! handler with a dispatch function that does the actual validation and API
//! call, so the pipeline is testable without MCP transport scaffolding.

pub mod chat;
pub mod datasources;
pub mod overview;
pub mod search;

#[cfg(test)]
mod tests {
    use codealive_client::{ClientConfig, CodeAliveClient};
    use serde_json::json;

    use super::chat::{CodebaseConsultantParams, run_consultant};
    use super::datasources::{GetDataSourcesParams, run_get_data_sources};
    use super::search::{CodebaseSearchParams, run_search};

    fn client_for(server: &mockito::Server) -> CodeAliveClient {
        CodeAliveClient::new(ClientConfig::new("test-key").with_base_url(server.url()))
            .expect("client should build")
    }

    /// Platform-injected extras fail schema binding as-is; after the scrub
    /// the call binds exactly like one that never carried them.
    #[test]
    fn scrubbed_arguments_bind_like_clean_ones() {
        let noisy = json!({
            "query": "auth flow",
            "workspace": "ws-1",
            "sessionId": "s-1",
            "action": "run",
            "chatInput": "auth flow",
            "toolCallId": "tc-1"
        })
        .as_object()
        .expect("object payload")
        .clone();

        assert!(
            serde_json::from_value::<CodebaseSearchParams>(serde_json::Value::Object(
                noisy.clone()
            ))
            .is_err(),
            "unknown keys must fail schema binding"
        );

        let scrubbed = crate::sanitize::scrub_arguments(Some(noisy)).expect("payload survives");
        let params =
            serde_json::from_value::<CodebaseSearchParams>(serde_json::Value::Object(scrubbed))
                .expect("scrubbed payload binds");
        assert_eq!(params.query, "auth flow");
        assert_eq!(params.workspace.as_deref(), Some("ws-1"));
    }

    /// An id returned by `get_data_sources` must be accepted as scope by both
    /// scoped tools without tripping validation.
    #[tokio::test]
    async fn listed_ids_round_trip_into_search_and_consultant() {
        let mut server = mockito::Server::new_async().await;
        let _list = server
            .mock("GET", "/api/datasources/alive")
            .with_status(200)
            .with_body(
                json!([{"id": "ws-1", "name": "platform", "type": "Workspace"}]).to_string(),
            )
            .create_async()
            .await;
        let _search = server
            .mock("GET", "/api/search")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(json!({"results": []}).to_string())
            .create_async()
            .await;
        let _chat = server
            .mock("POST", "/api/chat/completions")
            .with_status(200)
            .with_body("data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\ndata: [DONE]\n")
            .create_async()
            .await;

        let client = client_for(&server);
        let listing = run_get_data_sources(
            &client,
            GetDataSourcesParams { alive_only: None },
        )
        .await
        .expect("listing should succeed");
        assert!(listing.contains("ws-1"));

        let searched = run_search(
            &client,
            CodebaseSearchParams {
                query: "auth flow".to_string(),
                repository: None,
                workspace: Some("ws-1".to_string()),
                mode: None,
                limit: None,
                include_content: None,
            },
        )
        .await;
        assert!(searched.is_ok(), "search should accept a listed id");

        let consulted = run_consultant(
            &client,
            CodebaseConsultantParams {
                question: "How does auth work?".to_string(),
                repository: None,
                workspace: Some("ws-1".to_string()),
                conversation_id: None,
            },
        )
        .await;
        assert_eq!(consulted.expect("consultant should accept a listed id"), "ok");
    }
}
