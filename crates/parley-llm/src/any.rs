#[cfg(feature = "mock")]
use crate::mock::MockProvider;
use crate::ollama::OllamaProvider;
use crate::openai::OpenAiProvider;

use crate::provider::{ChatStream, LlmProvider, Message};

/// Expand `$expr` once per backend with `$p` bound to the inner provider.
macro_rules! delegate_provider {
    ($self:expr, |$p:ident| $expr:expr) => {
        match $self {
            AnyProvider::Ollama($p) => $expr,
            AnyProvider::OpenAi($p) => $expr,
            #[cfg(feature = "mock")]
            AnyProvider::Mock($p) => $expr,
        }
    };
}

/// The configured backend, switchable at runtime.
#[derive(Debug, Clone)]
pub enum AnyProvider {
    Ollama(OllamaProvider),
    OpenAi(OpenAiProvider),
    #[cfg(feature = "mock")]
    Mock(MockProvider),
}

impl AnyProvider {
    /// Models the user may pick from for this backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be queried.
    pub async fn list_models(&self) -> Result<Vec<String>, crate::LlmError> {
        match self {
            Self::Ollama(p) => p.list_models().await,
            Self::OpenAi(p) => p.list_models().await,
            #[cfg(feature = "mock")]
            Self::Mock(p) => Ok(vec![p.model().to_owned()]),
        }
    }

    /// Reachability probe run at startup. Only the local backend is probed; a hosted backend
    /// reports a bad key on its first request.
    ///
    /// # Errors
    ///
    /// Returns [`crate::LlmError::Backend`] if Ollama is not reachable.
    pub async fn health_check(&self) -> Result<(), crate::LlmError> {
        match self {
            Self::Ollama(p) => p.health_check().await,
            _ => Ok(()),
        }
    }
}

impl LlmProvider for AnyProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, crate::LlmError> {
        delegate_provider!(self, |p| p.chat(messages).await)
    }

    async fn chat_stream(&self, messages: &[Message]) -> Result<ChatStream, crate::LlmError> {
        delegate_provider!(self, |p| p.chat_stream(messages).await)
    }

    fn supports_streaming(&self) -> bool {
        delegate_provider!(self, |p| p.supports_streaming())
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, crate::LlmError> {
        delegate_provider!(self, |p| p.embed(text).await)
    }

    fn supports_embeddings(&self) -> bool {
        delegate_provider!(self, |p| p.supports_embeddings())
    }

    fn name(&self) -> &str {
        delegate_provider!(self, |p| p.name())
    }

    fn model(&self) -> &str {
        delegate_provider!(self, |p| p.model())
    }

    fn embedding_model(&self) -> Option<&str> {
        delegate_provider!(self, |p| p.embedding_model())
    }
}
