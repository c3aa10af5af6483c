#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("no API key configured for {provider}")]
    NoApiKey { provider: String },

    #[error("search API error: {status} - {message}")]
    SearchApi { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("database error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("query refused: {reason}")]
    Refused { reason: String },

    #[error(transparent)]
    Config(#[from] parley_memory::ConfigError),
}
