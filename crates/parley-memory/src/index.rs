use std::collections::BTreeSet;

use parley_llm::LlmProvider;

use crate::document::Chunk;
use crate::embedder::Embedder;
use crate::error::IndexError;
use crate::retriever::{RetrievalConfig, RetrievalResult, SearchStrategy};

#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

/// In-memory cosine index. All vectors share one dimension.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    entries: Vec<EmbeddedChunk>,
    dim: Option<usize>,
}

pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

impl VectorIndex {
    /// # Errors
    ///
    /// Returns [`IndexError::DimensionMismatch`] if the vectors differ in length.
    pub fn build(entries: Vec<EmbeddedChunk>) -> Result<Self, IndexError> {
        let dim = entries.first().map(|e| e.vector.len());
        if let Some(expected) = dim
            && let Some(bad) = entries.iter().find(|e| e.vector.len() != expected)
        {
            return Err(IndexError::DimensionMismatch {
                expected,
                got: bad.vector.len(),
            });
        }
        Ok(Self { entries, dim })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn dim(&self) -> Option<usize> {
        self.dim
    }

    #[must_use]
    pub fn entries(&self) -> &[EmbeddedChunk] {
        &self.entries
    }

    /// Top-`k` chunks for `query` under `strategy`. An empty index yields no results.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Config`] for `k == 0` or `fetch_k < k`, and
    /// [`IndexError::DimensionMismatch`] if the query vector has the wrong length.
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        strategy: SearchStrategy,
    ) -> Result<Vec<RetrievalResult>, IndexError> {
        let config = RetrievalConfig::new(k, strategy)?;
        self.search_with(query, &config)
    }

    pub(crate) fn search_with(
        &self,
        query: &[f32],
        config: &RetrievalConfig,
    ) -> Result<Vec<RetrievalResult>, IndexError> {
        let Some(expected) = self.dim else {
            return Ok(Vec::new());
        };
        if query.len() != expected {
            return Err(IndexError::DimensionMismatch {
                expected,
                got: query.len(),
            });
        }

        let picked = match config.strategy() {
            SearchStrategy::Similarity => self.top_by_similarity(query, config.k()),
            SearchStrategy::Mmr { fetch_k, lambda } => {
                self.mmr(query, config.k(), fetch_k, lambda)
            }
        };

        Ok(picked
            .into_iter()
            .zip(1..)
            .map(|((idx, score), rank)| RetrievalResult {
                chunk: self.entries[idx].chunk.clone(),
                rank,
                score,
            })
            .collect())
    }

    fn top_by_similarity(&self, query: &[f32], n: usize) -> Vec<(usize, f32)> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i, cosine_similarity(query, &e.vector)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(n);
        scored
    }

    /// Greedy maximal marginal relevance over the `fetch_k` most similar entries.
    fn mmr(&self, query: &[f32], k: usize, fetch_k: usize, lambda: f32) -> Vec<(usize, f32)> {
        let mut candidates = self.top_by_similarity(query, fetch_k);
        let mut selected: Vec<(usize, f32)> = Vec::with_capacity(k);

        while selected.len() < k && !candidates.is_empty() {
            let mut best = 0;
            let mut best_score = f32::NEG_INFINITY;
            for (pos, &(idx, relevance)) in candidates.iter().enumerate() {
                let redundancy = selected
                    .iter()
                    .map(|&(s, _)| {
                        cosine_similarity(&self.entries[idx].vector, &self.entries[s].vector)
                    })
                    .fold(f32::NEG_INFINITY, f32::max);
                let redundancy = if selected.is_empty() { 0.0 } else { redundancy };
                let score = lambda * relevance - (1.0 - lambda) * redundancy;
                if score > best_score {
                    best = pos;
                    best_score = score;
                }
            }
            selected.push(candidates.remove(best));
        }
        selected
    }
}

/// A built index together with the embedder that produced its vectors.
#[derive(Debug)]
pub struct IndexHandle<P> {
    index: VectorIndex,
    embedder: Embedder<P>,
    sources: Vec<String>,
}

impl<P: LlmProvider> IndexHandle<P> {
    /// Embed every chunk and build the index. Nothing is kept if any step fails.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError`] if an embedding call fails or dimensions differ.
    pub async fn build(chunks: Vec<Chunk>, embedder: Embedder<P>) -> Result<Self, IndexError> {
        let mut entries = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let vector = embedder.embed(&chunk.content).await?;
            entries.push(EmbeddedChunk { chunk, vector });
        }
        let index = VectorIndex::build(entries)?;

        let sources: BTreeSet<&str> = index
            .entries
            .iter()
            .map(|e| e.chunk.metadata.source.as_str())
            .collect();
        let sources: Vec<String> = sources.into_iter().map(str::to_owned).collect();

        tracing::info!(
            chunks = index.len(),
            sources = sources.len(),
            dim = index.dim().unwrap_or(0),
            embedder = %embedder.id(),
            "index built"
        );

        Ok(Self {
            index,
            embedder,
            sources,
        })
    }

    #[must_use]
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    #[must_use]
    pub fn embedder(&self) -> &Embedder<P> {
        &self.embedder
    }

    /// Distinct chunk sources, sorted.
    #[must_use]
    pub fn sources(&self) -> &[String] {
        &self.sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentMetadata;

    pub(crate) fn entry(text: &str, vector: Vec<f32>) -> EmbeddedChunk {
        EmbeddedChunk {
            chunk: Chunk {
                content: text.into(),
                metadata: DocumentMetadata::new(format!("{text}.txt"), "text/plain"),
                chunk_index: 0,
                offset: 0,
            },
            vector,
        }
    }

    #[test]
    fn cosine_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).abs() < f32::EPSILON);
    }

    #[test]
    fn mixed_dimensions_rejected() {
        let err = VectorIndex::build(vec![entry("a", vec![1.0, 0.0]), entry("b", vec![1.0])])
            .unwrap_err();
        assert!(matches!(
            err,
            IndexError::DimensionMismatch {
                expected: 2,
                got: 1
            }
        ));
    }

    #[test]
    fn empty_index_returns_empty() {
        let index = VectorIndex::build(Vec::new()).unwrap();
        let results = index.search(&[1.0], 3, SearchStrategy::Similarity).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn similarity_orders_by_score_with_ranks() {
        let index = VectorIndex::build(vec![
            entry("far", vec![0.0, 1.0]),
            entry("near", vec![1.0, 0.1]),
            entry("mid", vec![1.0, 1.0]),
        ])
        .unwrap();
        let results = index.search(&[1.0, 0.0], 2, SearchStrategy::Similarity).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.content, "near");
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[1].chunk.content, "mid");
        assert_eq!(results[1].rank, 2);
        assert!(results[0].score >= results[1].score);
    }

    #[test]
    fn returns_at_most_k() {
        let index = VectorIndex::build(vec![entry("only", vec![1.0])]).unwrap();
        let results = index.search(&[1.0], 5, SearchStrategy::Similarity).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn query_dimension_checked() {
        let index = VectorIndex::build(vec![entry("a", vec![1.0, 0.0])]).unwrap();
        let err = index.search(&[1.0, 0.0, 0.0], 1, SearchStrategy::Similarity).unwrap_err();
        assert!(matches!(err, IndexError::DimensionMismatch { .. }));
    }

    #[test]
    fn zero_k_is_config_error() {
        let index = VectorIndex::build(vec![entry("a", vec![1.0])]).unwrap();
        let err = index.search(&[1.0], 0, SearchStrategy::Similarity).unwrap_err();
        assert!(matches!(err, IndexError::Config(_)));
    }

    #[test]
    fn mmr_prefers_diverse_chunk() {
        let index = VectorIndex::build(vec![
            entry("d0", vec![0.9, 0.436, 0.0]),
            entry("dup", vec![0.88, 0.475, 0.0]),
            entry("diverse", vec![0.8, -0.6, 0.0]),
        ])
        .unwrap();
        let query = [1.0, 0.0, 0.0];

        let plain = index.search(&query, 2, SearchStrategy::Similarity).unwrap();
        assert_eq!(plain[1].chunk.content, "dup");

        let mmr = index
            .search(&query, 2, SearchStrategy::Mmr { fetch_k: 3, lambda: 0.5 })
            .unwrap();
        assert_eq!(mmr[0].chunk.content, "d0");
        assert_eq!(mmr[1].chunk.content, "diverse");
    }

    #[tokio::test]
    async fn handle_build_embeds_every_chunk() {
        use parley_llm::mock::MockProvider;
        use std::sync::Arc;

        let provider = Arc::new(MockProvider::default());
        let embedder = Embedder::new(Arc::clone(&provider)).unwrap();
        let chunks = vec![entry("alpha", vec![]).chunk, entry("beta", vec![]).chunk];
        let handle = IndexHandle::build(chunks, embedder).await.unwrap();
        assert_eq!(handle.index().len(), 2);
        assert_eq!(handle.sources(), ["alpha.txt", "beta.txt"]);
        assert_eq!(provider.embed_calls(), 2);
    }

    #[tokio::test]
    async fn handle_build_fails_without_partial_state() {
        use parley_llm::mock::MockProvider;
        use std::sync::Arc;

        let provider = Arc::new(MockProvider::default().with_failing_embeddings());
        let embedder = Embedder::new(provider).unwrap();
        let result = IndexHandle::build(vec![entry("a", vec![]).chunk], embedder).await;
        assert!(matches!(result, Err(IndexError::Embedding(_))));
    }

    mod proptest_mmr {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn lambda_one_matches_similarity_order(
                vectors in proptest::collection::vec(proptest::collection::vec(-1.0f32..1.0, 4), 1..20),
                query in proptest::collection::vec(-1.0f32..1.0, 4),
                k in 1usize..6,
            ) {
                let entries: Vec<_> = vectors
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| entry(&i.to_string(), v))
                    .collect();
                let index = VectorIndex::build(entries).unwrap();
                let plain = index.search(&query, k, SearchStrategy::Similarity).unwrap();
                let mmr = index
                    .search(&query, k, SearchStrategy::Mmr { fetch_k: k + 4, lambda: 1.0 })
                    .unwrap();
                let a: Vec<_> = plain.iter().map(|r| r.chunk.content.clone()).collect();
                let b: Vec<_> = mmr.iter().map(|r| r.chunk.content.clone()).collect();
                prop_assert_eq!(a, b);
            }

            #[test]
            fn results_bounded_by_k(
                n in 0usize..30,
                k in 1usize..10,
            ) {
                #[allow(clippy::cast_precision_loss)]
                let entries: Vec<_> = (0..n).map(|i| entry(&i.to_string(), vec![1.0, i as f32])).collect();
                let index = VectorIndex::build(entries).unwrap();
                let results = index.search(&[1.0, 0.0], k, SearchStrategy::Mmr { fetch_k: k * 2, lambda: 0.5 }).unwrap();
                prop_assert!(results.len() <= k);
                prop_assert_eq!(results.len(), k.min(n));
            }
        }
    }
}
