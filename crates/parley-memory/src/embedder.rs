use std::sync::Arc;

use parley_llm::LlmProvider;

use crate::error::IndexError;

/// Binds an embedding-capable provider to the vectors it produced.
///
/// Queries against an index must be embedded by the same `Embedder` that embedded its chunks.
#[derive(Debug)]
pub struct Embedder<P> {
    provider: Arc<P>,
}

impl<P> Clone for Embedder<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<P: LlmProvider> Embedder<P> {
    /// # Errors
    ///
    /// Returns [`IndexError::EmbeddingsUnsupported`] if the provider has no embedding model.
    pub fn new(provider: Arc<P>) -> Result<Self, IndexError> {
        if !provider.supports_embeddings() {
            return Err(IndexError::EmbeddingsUnsupported(provider.name().to_owned()));
        }
        Ok(Self { provider })
    }

    /// `provider/model` identity of the vectors this embedder produces.
    #[must_use]
    pub fn id(&self) -> String {
        format!(
            "{}/{}",
            self.provider.name(),
            self.provider.embedding_model().unwrap_or("default")
        )
    }

    /// # Errors
    ///
    /// Returns [`IndexError::Embedding`] if the provider call fails.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, IndexError> {
        Ok(self.provider.embed(text).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_llm::mock::MockProvider;

    #[test]
    fn rejects_provider_without_embeddings() {
        let provider = MockProvider::default().without_embeddings();
        let err = Embedder::new(Arc::new(provider)).unwrap_err();
        assert!(matches!(err, IndexError::EmbeddingsUnsupported(name) if name == "mock"));
    }

    #[tokio::test]
    async fn embeds_through_provider() {
        let embedder = Embedder::new(Arc::new(MockProvider::default().with_embedding(vec![1.0, 2.0])))
            .unwrap();
        assert_eq!(embedder.embed("x").await.unwrap(), vec![1.0, 2.0]);
        assert_eq!(embedder.id(), "mock/mock-embed");
    }
}
