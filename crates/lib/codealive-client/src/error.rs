use std::time::Duration;

use thiserror::Error;

/// Maximum number of characters of a remote error body carried into a message.
const DETAIL_LIMIT: usize = 200;

/// Failure categories for CodeAlive API calls.
///
/// The HTTP-status mapping lives entirely in [`ApiError::from_status`] so the
/// service contract can be adjusted in one place.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Credential missing, rejected, or expired (401/403).
    #[error("{message}")]
    Auth { status: u16, message: String },

    /// Referenced resource does not exist or is not accessible (404).
    #[error("{message}")]
    NotFound { message: String },

    /// The remote service signalled throttling (429).
    #[error("{message}")]
    RateLimit { message: String },

    /// Any other non-success HTTP status.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// A request exceeded its bounded timeout.
    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// A streamed response terminated abnormally or carried a malformed event.
    #[error("Stream error: {message}")]
    Stream { message: String },

    /// Connect/send failure below the HTTP layer.
    #[error("Transport error: {message}")]
    Transport { message: String },
}

impl ApiError {
    pub(crate) fn stream(message: impl Into<String>) -> Self {
        Self::Stream {
            message: message.into(),
        }
    }

    pub(crate) fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Stable category label surfaced to MCP callers and asserted by tests.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Auth { .. } => "auth_error",
            Self::NotFound { .. } => "not_found_error",
            Self::RateLimit { .. } => "rate_limit_error",
            Self::Upstream { .. } => "upstream_error",
            Self::Timeout { .. } => "timeout_error",
            Self::Stream { .. } => "stream_error",
            Self::Transport { .. } => "transport_error",
        }
    }

    /// Maps a non-success HTTP status and its response body to a category.
    ///
    /// The mapping is total: every status resolves to exactly one variant.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 => Self::Auth {
                status,
                message: "Authentication error (401): Invalid API key or insufficient permissions"
                    .to_string(),
            },
            403 => Self::Auth {
                status,
                message:
                    "Authorization error (403): You don't have permission to access this resource"
                        .to_string(),
            },
            404 => Self::NotFound {
                message: "Not found error (404): The requested resource could not be found"
                    .to_string(),
            },
            429 => Self::RateLimit {
                message: "Rate limit exceeded (429): Too many requests, please try again later"
                    .to_string(),
            },
            502 => Self::Upstream {
                status,
                message: "Bad gateway (502): The CodeAlive service is temporarily unavailable"
                    .to_string(),
            },
            503 => Self::Upstream {
                status,
                message: "Service unavailable (503): The CodeAlive service is under maintenance"
                    .to_string(),
            },
            s if s >= 500 => Self::Upstream {
                status,
                message: format!("Server error ({s}): The CodeAlive service encountered an issue"),
            },
            s => Self::Upstream {
                status,
                message: format!("HTTP error: {s} - {}", detail_snippet(body)),
            },
        }
    }

    /// Maps a reqwest failure for a request issued with the given timeout.
    pub(crate) fn from_reqwest(err: &reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                seconds: timeout.as_secs(),
            }
        } else {
            Self::transport(err.to_string())
        }
    }
}

fn detail_snippet(body: &str) -> &str {
    if body.len() <= DETAIL_LIMIT {
        return body;
    }
    let mut end = DETAIL_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
