/// Failures talking to a model backend. None of them are retried.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend could not be reached or rejected the call; `op` names the call.
    #[error("{provider} {op} failed: {reason}")]
    Backend {
        provider: &'static str,
        op: &'static str,
        reason: String,
    },

    #[error("{provider} {op} failed with status {status}")]
    Status {
        provider: &'static str,
        op: &'static str,
        status: u16,
    },

    #[error("rate limited by {provider}")]
    RateLimited { provider: &'static str },

    #[error("{provider} rejected the API key: {message}")]
    Unauthorized {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} returned an empty response")]
    EmptyResponse { provider: &'static str },

    #[error("stream interrupted: {0}")]
    Stream(String),

    #[error("{provider} has no embedding model configured")]
    EmbedUnsupported { provider: &'static str },

    #[cfg(feature = "mock")]
    #[error("{0}")]
    Mock(String),
}

impl LlmError {
    pub(crate) fn backend(provider: &'static str, op: &'static str, reason: impl ToString) -> Self {
        Self::Backend {
            provider,
            op,
            reason: reason.to_string(),
        }
    }
}
