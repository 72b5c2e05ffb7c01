use serde::{Deserialize, Serialize};

/// Kind tag for an indexed data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSourceKind {
    Repository,
    Workspace,
}

/// A repository or workspace indexed by the CodeAlive service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: DataSourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Workspace composition; stripped from tool output before it reaches
    /// the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_ids: Option<Vec<String>>,
}

/// Search depth requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    #[default]
    Auto,
    Fast,
    Deep,
}

impl SearchMode {
    /// Parses a caller-supplied mode, falling back to `Auto` on anything
    /// unrecognized rather than failing the call.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        let normalized = value.map(|v| v.trim().to_ascii_lowercase());
        match normalized.as_deref() {
            None | Some("" | "auto") => Self::Auto,
            Some("fast") => Self::Fast,
            Some("deep") => Self::Deep,
            Some(other) => {
                tracing::warn!(mode = other, "unknown search mode, using auto");
                Self::Auto
            }
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Fast => "fast",
            Self::Deep => "deep",
        }
    }
}

/// One outbound search request.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub query: String,
    pub mode: SearchMode,
    pub include_content: bool,
    /// Data source names/ids to scope the search to; empty means the API
    /// key's default data source.
    pub names: Vec<String>,
    pub limit: Option<u32>,
}

impl SearchQuery {
    pub(crate) fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("Query", self.query.clone()),
            ("Mode", self.mode.as_str().to_string()),
            ("IncludeContent", self.include_content.to_string()),
        ];
        if let Some(limit) = self.limit {
            params.push(("Limit", limit.to_string()));
        }
        for name in &self.names {
            if !name.is_empty() {
                params.push(("Names", name.clone()));
            }
        }
        params
    }
}

/// Search response payload, in the order the service ranked it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchMatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMatch {
    #[serde(default)]
    pub kind: String,
    /// Identifier of the shape `owner/repo::path::chunk`.
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub location: Option<SourceLocation>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceLocation {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub range: Option<LineRange>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LineRange {
    #[serde(default)]
    pub start: Option<LinePosition>,
    #[serde(default)]
    pub end: Option<LinePosition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinePosition {
    #[serde(default)]
    pub line: Option<u32>,
}

impl SearchMatch {
    /// File path for grouping: explicit location first, identifier fallback.
    pub fn path(&self) -> Option<&str> {
        if let Some(path) = self
            .location
            .as_ref()
            .and_then(|loc| loc.path.as_deref())
            .filter(|p| !p.is_empty())
        {
            return Some(path);
        }
        self.identifier
            .as_deref()
            .and_then(|id| id.split("::").nth(1))
            .filter(|p| !p.is_empty())
    }

    pub fn start_line(&self) -> Option<u32> {
        self.location
            .as_ref()
            .and_then(|loc| loc.range.as_ref())
            .and_then(|range| range.start.as_ref())
            .and_then(|pos| pos.line)
    }

    pub fn end_line(&self) -> Option<u32> {
        self.location
            .as_ref()
            .and_then(|loc| loc.range.as_ref())
            .and_then(|range| range.end.as_ref())
            .and_then(|pos| pos.line)
    }
}

/// One chat message in a consultant conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Reference to a data source in a chat request body.
#[derive(Debug, Clone, Serialize)]
pub struct DataSourceRef {
    pub id: String,
}

/// Outbound chat-completions request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_sources: Option<Vec<DataSourceRef>>,
}

/// One decoded chunk of a streamed chat response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChatChunk {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ChatChoice {
    #[serde(default)]
    pub delta: ChatDelta,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ChatDelta {
    #[serde(default)]
    pub content: Option<String>,
}

/// High-level overview document for one repository.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryOverview {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}
