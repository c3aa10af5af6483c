use parley_llm::LlmProvider;
use serde::{Deserialize, Serialize};

use crate::document::Chunk;
use crate::error::{ConfigError, IndexError};
use crate::index::IndexHandle;

pub const DEFAULT_MMR_LAMBDA: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Plain top-k by cosine similarity.
    Similarity,
    /// Maximal marginal relevance over a pool of `fetch_k` candidates.
    Mmr {
        fetch_k: usize,
        #[serde(default = "default_lambda")]
        lambda: f32,
    },
}

fn default_lambda() -> f32 {
    DEFAULT_MMR_LAMBDA
}

/// Validated `k` + strategy pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalConfig {
    k: usize,
    strategy: SearchStrategy,
}

impl RetrievalConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError`] for `k == 0`, `fetch_k < k` or a lambda outside `0.0..=1.0`.
    pub fn new(k: usize, strategy: SearchStrategy) -> Result<Self, ConfigError> {
        if k == 0 {
            return Err(ConfigError::ZeroK);
        }
        if let SearchStrategy::Mmr { fetch_k, lambda } = strategy {
            if fetch_k < k {
                return Err(ConfigError::InvalidFetchK { k, fetch_k });
            }
            if !(0.0..=1.0).contains(&lambda) {
                return Err(ConfigError::InvalidLambda(lambda));
            }
        }
        Ok(Self { k, strategy })
    }

    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    #[must_use]
    pub fn strategy(&self) -> SearchStrategy {
        self.strategy
    }
}

#[derive(Debug, Clone)]
pub struct RetrievalResult {
    pub chunk: Chunk,
    /// 1-based position in the result list.
    pub rank: usize,
    /// Cosine similarity to the query.
    pub score: f32,
}

/// Embed `query` with the handle's own embedder and search its index.
///
/// # Errors
///
/// Returns [`IndexError`] if embedding the query fails or its dimension does not match.
pub async fn retrieve<P: LlmProvider>(
    query: &str,
    handle: &IndexHandle<P>,
    config: &RetrievalConfig,
) -> Result<Vec<RetrievalResult>, IndexError> {
    if handle.index().is_empty() {
        return Ok(Vec::new());
    }
    let vector = handle.embedder().embed(query).await?;
    let results = handle.index().search_with(&vector, config)?;
    tracing::debug!(k = config.k(), hits = results.len(), "retrieved chunks");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parley_llm::mock::MockProvider;

    use super::*;
    use crate::document::{Document, DocumentMetadata, chunk};
    use crate::embedder::Embedder;

    fn doc(source: &str, text: &str) -> Document {
        Document {
            content: text.into(),
            metadata: DocumentMetadata::new(source, "text/plain"),
        }
    }

    #[test]
    fn config_rejects_zero_k() {
        assert!(matches!(
            RetrievalConfig::new(0, SearchStrategy::Similarity),
            Err(ConfigError::ZeroK)
        ));
    }

    #[test]
    fn config_rejects_small_fetch_k() {
        let err = RetrievalConfig::new(3, SearchStrategy::Mmr { fetch_k: 2, lambda: 0.5 })
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFetchK { k: 3, fetch_k: 2 }));
    }

    #[test]
    fn config_rejects_bad_lambda() {
        let err = RetrievalConfig::new(1, SearchStrategy::Mmr { fetch_k: 2, lambda: 1.5 })
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLambda(_)));
    }

    #[test]
    fn strategy_deserializes_with_default_lambda() {
        let s: SearchStrategy = serde_json::from_str(r#"{"type":"mmr","fetch_k":4}"#).unwrap();
        assert_eq!(s, SearchStrategy::Mmr { fetch_k: 4, lambda: 0.5 });
    }

    #[tokio::test]
    async fn retrieves_relevant_chunk_first() {
        let docs = [
            doc("france.txt", "The capital of France is Paris."),
            doc("rust.txt", "Cargo builds Rust crates and manages dependencies."),
        ];
        let chunks = chunk(&docs, 1000, 200).unwrap();
        let embedder = Embedder::new(Arc::new(MockProvider::default())).unwrap();
        let handle = IndexHandle::build(chunks, embedder).await.unwrap();

        let config = RetrievalConfig::new(1, SearchStrategy::Similarity).unwrap();
        let results = retrieve("What is the capital of France?", &handle, &config)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.metadata.source, "france.txt");
    }

    #[tokio::test]
    async fn empty_index_skips_embedding() {
        let provider = Arc::new(MockProvider::default());
        let embedder = Embedder::new(Arc::clone(&provider)).unwrap();
        let handle = IndexHandle::build(Vec::new(), embedder).await.unwrap();
        let config = RetrievalConfig::new(3, SearchStrategy::Similarity).unwrap();
        let results = retrieve("anything", &handle, &config).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(provider.embed_calls(), 0);
    }
}
