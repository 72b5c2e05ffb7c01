use crate::error::ToolError;

/// Caller-supplied scope for a search/consultant/overview call: a single
/// repository (by id or URL) or a single workspace (by id), never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSourceScope {
    Repository(String),
    Workspace(String),
}

impl DataSourceScope {
    /// Resolves optional `repository`/`workspace` arguments into a scope.
    ///
    /// Blank values count as absent. Supplying both kinds is a validation
    /// error, raised before any request leaves the process.
    pub fn resolve(
        repository: Option<String>,
        workspace: Option<String>,
    ) -> Result<Option<Self>, ToolError> {
        let repository = normalize(repository);
        let workspace = normalize(workspace);
        match (repository, workspace) {
            (Some(_), Some(_)) => Err(ToolError::validation(
                "repository and workspace are mutually exclusive; supply at most one",
            )),
            (Some(repo), None) => Ok(Some(Self::Repository(repo))),
            (None, Some(ws)) => Ok(Some(Self::Workspace(ws))),
            (None, None) => Ok(None),
        }
    }

    /// The opaque identifier forwarded to the service.
    pub fn into_name(self) -> String {
        match self {
            Self::Repository(name) | Self::Workspace(name) => name,
        }
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
