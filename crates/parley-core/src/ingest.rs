//! Sources to documents to chunks to an embedded index.

use std::sync::Arc;

use parley_llm::LlmProvider;
use parley_memory::document::{Document, TextSplitter, load_upload};
use parley_memory::{Embedder, IndexHandle};
use parley_tools::WebPageLoader;

use crate::error::ChatError;
use crate::input::Source;

#[derive(Debug, Clone)]
pub struct Ingestor {
    splitter: TextSplitter,
    web: WebPageLoader,
    max_file_size: u64,
}

impl Ingestor {
    #[must_use]
    pub fn new(splitter: TextSplitter, web: WebPageLoader, max_file_size: u64) -> Self {
        Self {
            splitter,
            web,
            max_file_size,
        }
    }

    /// Load every source in order. The first failure aborts the whole load.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Load`] naming the failing source.
    pub async fn load(&self, sources: &[Source]) -> Result<Vec<Document>, ChatError> {
        let mut documents = Vec::new();
        for source in sources {
            let docs = match source {
                Source::Upload(upload) => load_upload(upload, self.max_file_size).await?,
                Source::Url(url) => self.web.load(url).await?,
            };
            tracing::debug!(source = source.id(), documents = docs.len(), "source loaded");
            documents.extend(docs);
        }
        Ok(documents)
    }

    /// Chunk `documents` and embed them with `provider` into a new index.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Index`] if the provider cannot embed or the vectors disagree in size.
    pub async fn index<P: LlmProvider>(
        &self,
        documents: &[Document],
        provider: Arc<P>,
    ) -> Result<IndexHandle<P>, ChatError> {
        let embedder = Embedder::new(provider)?;
        let chunks = self.splitter.split_all(documents);
        Ok(IndexHandle::build(chunks, embedder).await?)
    }
}

#[cfg(test)]
mod tests {
    use parley_llm::mock::MockProvider;
    use parley_memory::document::{SplitterConfig, Upload};
    use parley_tools::WebConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn ingestor(web: &WebConfig) -> Ingestor {
        let splitter = TextSplitter::new(SplitterConfig {
            chunk_size: 40,
            chunk_overlap: 10,
            boundary_aware: true,
        })
        .unwrap();
        Ingestor::new(splitter, WebPageLoader::new(web), 1024 * 1024)
    }

    fn upload(name: &str, text: &str) -> Source {
        Source::Upload(Upload::new(name, text.as_bytes().to_vec()))
    }

    #[tokio::test]
    async fn loads_uploads_and_indexes_them() {
        let ing = ingestor(&WebConfig::default());
        let docs = ing
            .load(&[
                upload("notes.md", "Rust ownership rules keep memory safe without a collector."),
                upload("todo.txt", "Buy milk. Call the plumber about the kitchen sink."),
            ])
            .await
            .unwrap();
        assert_eq!(docs.len(), 2);

        let handle = ing.index(&docs, Arc::new(MockProvider::default())).await.unwrap();
        assert!(handle.index().len() >= 2);
        assert_eq!(handle.sources(), ["notes.md", "todo.txt"]);
    }

    #[tokio::test]
    async fn unsupported_upload_fails_whole_load() {
        let ing = ingestor(&WebConfig::default());
        let err = ing
            .load(&[
                upload("ok.txt", "fine"),
                Source::Upload(Upload::new("image.png", vec![0x89, 0x50])),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Load(_)));
    }

    #[tokio::test]
    async fn loads_urls_through_reader_proxy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/https://example.com/about"))
            .respond_with(ResponseTemplate::new(200).set_body_string("About us: we bake bread."))
            .expect(1)
            .mount(&server)
            .await;

        let web = WebConfig {
            reader_proxy: Some(format!("{}/", server.uri())),
            ..WebConfig::default()
        };
        let docs = ingestor(&web)
            .load(&[Source::Url("https://example.com/about".into())])
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].metadata.source, "https://example.com/about");
        assert!(docs[0].content.contains("bake bread"));
    }

    #[tokio::test]
    async fn provider_without_embeddings_is_an_index_error() {
        let ing = ingestor(&WebConfig::default());
        let docs = ing.load(&[upload("a.txt", "hello world")]).await.unwrap();
        let provider = MockProvider::default().without_embeddings();
        let err = ing.index(&docs, Arc::new(provider)).await.unwrap_err();
        assert!(matches!(err, ChatError::Index(_)));
    }
}
