#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("chunk_size must be greater than zero")]
    ZeroChunkSize,

    #[error("chunk overlap {overlap} must be smaller than chunk size {chunk_size}")]
    InvalidChunking { chunk_size: usize, overlap: usize },

    #[error("k must be greater than zero")]
    ZeroK,

    #[error("fetch_k {fetch_k} must be at least k {k}")]
    InvalidFetchK { k: usize, fetch_k: usize },

    #[error("MMR lambda {0} must be within 0.0..=1.0")]
    InvalidLambda(f32),

    #[error("invalid connection string: {0}")]
    InvalidConnectionString(String),

    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("embedding failed: {0}")]
    Embedding(#[from] parley_llm::LlmError),

    #[error("provider {0} cannot produce embeddings")]
    EmbeddingsUnsupported(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
