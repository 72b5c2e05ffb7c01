//! HTTP client for the CodeAlive API.
//!
//! This crate is the single choke point for outbound traffic: it owns the
//! process-wide connection pool, attaches the bearer credential to every
//! request, maps non-success statuses to the error taxonomy, and decodes the
//! chat endpoint's event stream.

mod error;
mod stream;
mod types;

use std::time::Duration;

use futures::TryStreamExt;

pub use error::ApiError;
pub use stream::{ChatEvent, ChatStream};
pub use types::{
    ChatMessage,
    ChatRequest,
    DataSource,
    DataSourceKind,
    DataSourceRef,
    LinePosition,
    LineRange,
    RepositoryOverview,
    SearchMatch,
    SearchMode,
    SearchQuery,
    SearchResponse,
    SourceLocation,
};

/// Hosted endpoint used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://app.codealive.ai";

/// Bounded timeouts per request kind: list/search are interactive, chat has
/// model-generation latency.
const DATA_SOURCES_TIMEOUT: Duration = Duration::from_secs(30);
const SEARCH_TIMEOUT: Duration = Duration::from_secs(60);
const CHAT_TIMEOUT: Duration = Duration::from_secs(300);

/// Startup-resolved client settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub verify_ssl: bool,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            verify_ssl: true,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Disabling verification is an explicit opt-in for debugging against
    /// self-signed endpoints.
    #[must_use]
    pub fn with_verify_ssl(mut self, verify_ssl: bool) -> Self {
        self.verify_ssl = verify_ssl;
        self
    }
}

/// Client over the CodeAlive API; one instance per process.
///
/// Holds the only reqwest handle, so every tool call shares one connection
/// pool; the pool is released when the client is dropped. Requests are never
/// retried here.
pub struct CodeAliveClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl CodeAliveClient {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if !config.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http = builder
            .build()
            .map_err(|err| ApiError::transport(err.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Lists repositories and workspaces accessible to the API key.
    pub async fn data_sources(&self, alive_only: bool) -> Result<Vec<DataSource>, ApiError> {
        let path = if alive_only {
            "/api/datasources/alive"
        } else {
            "/api/datasources/all"
        };
        let request = self
            .http
            .get(self.endpoint(path))
            .bearer_auth(&self.api_key)
            .timeout(DATA_SOURCES_TIMEOUT);
        let response = self
            .dispatch("GET", path, request, DATA_SOURCES_TIMEOUT)
            .await?;
        response
            .json()
            .await
            .map_err(|err| ApiError::transport(format!("invalid data sources payload: {err}")))
    }

    /// Runs one synchronous semantic search; result order is the service's
    /// ranking and is passed through untouched.
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, ApiError> {
        let request = self
            .http
            .get(self.endpoint("/api/search"))
            .query(&query.to_params())
            .bearer_auth(&self.api_key)
            .timeout(SEARCH_TIMEOUT);
        let response = self
            .dispatch("GET", "/api/search", request, SEARCH_TIMEOUT)
            .await?;
        response
            .json()
            .await
            .map_err(|err| ApiError::transport(format!("invalid search payload: {err}")))
    }

    /// Issues a chat-completions request and hands back the undecoded event
    /// stream as a [`ChatStream`].
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatStream, ApiError> {
        let http_request = self
            .http
            .post(self.endpoint("/api/chat/completions"))
            .json(request)
            .bearer_auth(&self.api_key)
            .timeout(CHAT_TIMEOUT);
        let response = self
            .dispatch("POST", "/api/chat/completions", http_request, CHAT_TIMEOUT)
            .await?;
        let source = response
            .bytes_stream()
            .map_ok(|chunk| chunk.to_vec())
            .map_err(|err| ApiError::from_reqwest(&err, CHAT_TIMEOUT));
        Ok(ChatStream::new(source))
    }

    /// Fetches repository overview documents, optionally scoped by name.
    pub async fn overview(&self, names: &[String]) -> Result<Vec<RepositoryOverview>, ApiError> {
        let params: Vec<(&str, &str)> = names
            .iter()
            .filter(|name| !name.is_empty())
            .map(|name| ("Names", name.as_str()))
            .collect();
        let request = self
            .http
            .get(self.endpoint("/api/overview"))
            .query(&params)
            .bearer_auth(&self.api_key)
            .timeout(DATA_SOURCES_TIMEOUT);
        let response = self
            .dispatch("GET", "/api/overview", request, DATA_SOURCES_TIMEOUT)
            .await?;
        response
            .json()
            .await
            .map_err(|err| ApiError::transport(format!("invalid overview payload: {err}")))
    }

    /// Sends one request and maps failures; the credential never appears in
    /// logs.
    async fn dispatch(
        &self,
        method: &str,
        path: &str,
        request: reqwest::RequestBuilder,
        timeout: Duration,
    ) -> Result<reqwest::Response, ApiError> {
        let request_id = short_request_id();
        tracing::debug!(%request_id, method, path, "dispatching API request");

        let response = request
            .send()
            .await
            .map_err(|err| ApiError::from_reqwest(&err, timeout))?;
        let status = response.status();
        tracing::debug!(%request_id, status = status.as_u16(), "API response");

        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status.as_u16(), &body))
        }
    }
}

fn short_request_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..8].to_string()
}
