use ollama_rs::Ollama;
use ollama_rs::generation::chat::ChatMessage;
use ollama_rs::generation::chat::request::ChatMessageRequest;
use ollama_rs::generation::embeddings::request::{EmbeddingsInput, GenerateEmbeddingsRequest};
use ollama_rs::models::ModelOptions;
use tokio_stream::StreamExt;

use crate::error::LlmError;
use crate::provider::{ChatStream, LlmProvider, Message, Role};

/// Sampling parameters sent with every Ollama chat request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingOptions {
    pub temperature: f32,
    pub num_predict: i32,
    pub top_p: f32,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            num_predict: 768,
            top_p: 0.9,
        }
    }
}

impl SamplingOptions {
    fn to_model_options(self) -> ModelOptions {
        ModelOptions::default()
            .temperature(self.temperature)
            .num_predict(self.num_predict)
            .top_p(self.top_p)
    }
}

const PROVIDER: &str = "ollama";
const DEFAULT_PORT: u16 = 11434;

/// Local Ollama backend for chat, streaming and embeddings.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Ollama,
    model: String,
    embedding_model: String,
    sampling: SamplingOptions,
}

impl OllamaProvider {
    #[must_use]
    pub fn new(base_url: &str, model: String, embedding_model: String) -> Self {
        let (host, port) = split_endpoint(base_url);
        Self {
            client: Ollama::new(host, port),
            model,
            embedding_model,
            sampling: SamplingOptions::default(),
        }
    }

    #[must_use]
    pub fn with_sampling(mut self, sampling: SamplingOptions) -> Self {
        self.sampling = sampling;
        self
    }

    #[must_use]
    pub fn sampling(&self) -> SamplingOptions {
        self.sampling
    }

    /// Probe the endpoint so a stopped daemon is reported at startup rather than on the
    /// first question.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Backend`] if Ollama cannot be reached.
    pub async fn health_check(&self) -> Result<(), LlmError> {
        self.client
            .list_local_models()
            .await
            .map(drop)
            .map_err(|e| LlmError::backend(PROVIDER, "health check", e))
    }

    /// Names of the locally pulled models, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Backend`] if Ollama cannot be reached.
    pub async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let mut names: Vec<String> = self
            .client
            .list_local_models()
            .await
            .map_err(|e| LlmError::backend(PROVIDER, "model listing", e))?
            .into_iter()
            .map(|m| m.name)
            .collect();
        names.sort();
        Ok(names)
    }

    fn request(&self, messages: &[Message]) -> ChatMessageRequest {
        let history = messages.iter().map(to_chat_message).collect();
        ChatMessageRequest::new(self.model.clone(), history)
            .options(self.sampling.to_model_options())
    }
}

impl LlmProvider for OllamaProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        let response = self
            .client
            .send_chat_messages(self.request(messages))
            .await
            .map_err(|e| LlmError::backend(PROVIDER, "chat", e))?;
        if response.message.content.is_empty() {
            return Err(LlmError::EmptyResponse { provider: PROVIDER });
        }
        Ok(response.message.content)
    }

    async fn chat_stream(&self, messages: &[Message]) -> Result<ChatStream, LlmError> {
        let stream = self
            .client
            .send_chat_messages_stream(self.request(messages))
            .await
            .map_err(|e| LlmError::backend(PROVIDER, "streaming chat", e))?;

        let tokens = stream.filter_map(|item| match item {
            Ok(part) if part.message.content.is_empty() => None,
            Ok(part) => Some(Ok(part.message.content)),
            Err(()) => Some(Err(LlmError::Stream("ollama sent a malformed chunk".into()))),
        });
        Ok(Box::pin(tokens))
    }

    fn supports_streaming(&self) -> bool {
        true
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let request = GenerateEmbeddingsRequest::new(
            self.embedding_model.clone(),
            EmbeddingsInput::from(text),
        );
        let response = self
            .client
            .generate_embeddings(request)
            .await
            .map_err(|e| LlmError::backend(PROVIDER, "embedding", e))?;

        response
            .embeddings
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyResponse { provider: PROVIDER })
    }

    fn supports_embeddings(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn embedding_model(&self) -> Option<&str> {
        Some(&self.embedding_model)
    }
}

fn to_chat_message(msg: &Message) -> ChatMessage {
    let text = msg.content.clone();
    match msg.role {
        Role::System => ChatMessage::system(text),
        Role::User => ChatMessage::user(text),
        Role::Assistant => ChatMessage::assistant(text),
    }
}

/// `http://host:port/` into the `(scheme://host, port)` pair `ollama-rs` expects.
fn split_endpoint(url: &str) -> (String, u16) {
    let url = url.trim_end_matches('/');
    match url.rsplit_once(':') {
        Some((host, port)) if !port.starts_with("//") => match port.parse() {
            Ok(port) => (host.to_owned(), port),
            Err(_) => (url.to_owned(), DEFAULT_PORT),
        },
        _ => (url.to_owned(), DEFAULT_PORT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OllamaProvider {
        OllamaProvider::new("http://localhost:11434", "llama3.2:3b".into(), "embed".into())
    }

    #[test]
    fn default_sampling_matches_chat_defaults() {
        let sampling = provider().sampling();
        assert!((sampling.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(sampling.num_predict, 768);
        assert!((sampling.top_p - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn with_sampling_overrides() {
        let p = provider().with_sampling(SamplingOptions {
            temperature: 0.0,
            num_predict: 64,
            top_p: 1.0,
        });
        assert_eq!(p.sampling().num_predict, 64);
    }

    #[test]
    fn split_endpoint_custom_port() {
        assert_eq!(
            split_endpoint("http://gpu-box:8080"),
            ("http://gpu-box".to_owned(), 8080)
        );
    }

    #[test]
    fn split_endpoint_with_port() {
        let (host, port) = split_endpoint("http://localhost:11434");
        assert_eq!(host, "http://localhost");
        assert_eq!(port, 11434);
    }

    #[test]
    fn split_endpoint_without_port() {
        let (host, port) = split_endpoint("http://localhost");
        assert_eq!(host, "http://localhost");
        assert_eq!(port, 11434);
    }

    #[test]
    fn split_endpoint_trailing_slash() {
        let (host, port) = split_endpoint("http://localhost:11434/");
        assert_eq!(host, "http://localhost");
        assert_eq!(port, 11434);
    }

    #[test]
    fn split_endpoint_invalid_port_falls_back() {
        let (host, port) = split_endpoint("http://localhost:notaport");
        assert_eq!(host, "http://localhost:notaport");
        assert_eq!(port, 11434);
    }

    #[test]
    fn to_chat_message_keeps_content() {
        let cm = to_chat_message(&Message::system("be brief"));
        assert_eq!(cm.content, "be brief");
        let cm = to_chat_message(&Message::assistant("sure"));
        assert_eq!(cm.content, "sure");
    }

    #[test]
    fn identity_accessors() {
        let p = provider();
        assert_eq!(p.name(), "ollama");
        assert_eq!(p.model(), "llama3.2:3b");
        assert_eq!(p.embedding_model(), Some("embed"));
        assert!(p.supports_streaming());
        assert!(p.supports_embeddings());
    }

    #[tokio::test]
    async fn chat_unreachable_endpoint_errors() {
        let p = OllamaProvider::new("http://127.0.0.1:1", "m".into(), "e".into());
        assert!(p.chat(&[Message::user("hi")]).await.is_err());
    }

    #[tokio::test]
    #[ignore = "requires running Ollama instance"]
    async fn integration_ollama_chat() {
        let p = provider();
        let reply = p.chat(&[Message::user("Say hello")]).await.unwrap();
        assert!(!reply.is_empty());
    }
}
