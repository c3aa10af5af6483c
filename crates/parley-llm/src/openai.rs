use std::fmt;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::LlmError;
use crate::provider::{ChatStream, LlmProvider, Message};
use crate::sse::delta_stream;

const PROVIDER: &str = "openai";

#[derive(Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    embedding_model: Option<String>,
}

impl fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("embedding_model", &self.embedding_model)
            .finish()
    }
}

impl OpenAiProvider {
    #[must_use]
    pub fn new(
        api_key: String,
        mut base_url: String,
        model: String,
        max_tokens: u32,
        embedding_model: Option<String>,
    ) -> Self {
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: crate::http::default_client(),
            api_key,
            base_url,
            model,
            max_tokens,
            temperature: 0.0,
            embedding_model,
        }
    }

    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Chat-capable models visible to this key, oldest first.
    ///
    /// Only ids starting with `gpt` are kept.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Unauthorized`] when the key is rejected.
    pub async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let request = self.client.get(self.url("models"));
        let wire::ModelList { mut data } = self.call(request, "model listing").await?;
        data.retain(|m| m.id.starts_with("gpt"));
        data.sort_by_key(|m| m.created);
        Ok(data.into_iter().map(|m| m.id).collect())
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url)
    }

    fn chat_request(&self, messages: &[Message], stream: bool) -> reqwest::RequestBuilder {
        self.client
            .post(self.url("chat/completions"))
            .json(&wire::ChatRequest {
                model: &self.model,
                messages,
                max_tokens: self.max_tokens,
                temperature: self.temperature,
                stream,
            })
    }

    /// Send with the bearer key, map the status, then decode the JSON body.
    async fn call<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        op: &'static str,
    ) -> Result<T, LlmError> {
        let response = request.bearer_auth(&self.api_key).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(status_error(status, &body, op));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// Map a non-success status to the matching [`LlmError`].
fn status_error(status: StatusCode, body: &str, op: &'static str) -> LlmError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited { provider: PROVIDER },
        StatusCode::UNAUTHORIZED => LlmError::Unauthorized {
            provider: PROVIDER,
            message: serde_json::from_str::<wire::ErrorBody>(body)
                .map_or_else(|_| "invalid API key".to_owned(), |b| b.error.message),
        },
        s => {
            tracing::error!(op, status = s.as_u16(), body, "openai request failed");
            LlmError::Status {
                provider: PROVIDER,
                op,
                status: s.as_u16(),
            }
        }
    }
}

impl LlmProvider for OpenAiProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        let reply: wire::ChatResponse = self
            .call(self.chat_request(messages, false), "chat request")
            .await?;
        reply
            .choices
            .into_iter()
            .find_map(|c| c.message.content)
            .ok_or(LlmError::EmptyResponse { provider: PROVIDER })
    }

    async fn chat_stream(&self, messages: &[Message]) -> Result<ChatStream, LlmError> {
        let response = self
            .chat_request(messages, true)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(status_error(status, &body, "streaming request"));
        }
        Ok(delta_stream(response))
    }

    fn supports_streaming(&self) -> bool {
        true
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let Some(model) = self.embedding_model.as_deref() else {
            return Err(LlmError::EmbedUnsupported { provider: PROVIDER });
        };
        let request = self
            .client
            .post(self.url("embeddings"))
            .json(&wire::EmbeddingRequest { input: text, model });
        let wire::EmbeddingResponse { data } = self.call(request, "embedding request").await?;
        data.into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or(LlmError::EmptyResponse { provider: PROVIDER })
    }

    fn supports_embeddings(&self) -> bool {
        self.embedding_model.is_some()
    }

    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn embedding_model(&self) -> Option<&str> {
        self.embedding_model.as_deref()
    }
}

/// Request and response bodies of the chat completions API.
mod wire {
    use serde::{Deserialize, Serialize};

    use crate::provider::Message;

    #[derive(Serialize)]
    pub(super) struct ChatRequest<'a> {
        pub model: &'a str,
        pub messages: &'a [Message],
        pub max_tokens: u32,
        pub temperature: f32,
        pub stream: bool,
    }

    #[derive(Deserialize)]
    pub(super) struct ChatResponse {
        pub choices: Vec<Choice>,
    }

    #[derive(Deserialize)]
    pub(super) struct Choice {
        pub message: Reply,
    }

    #[derive(Deserialize)]
    pub(super) struct Reply {
        #[serde(default)]
        pub content: Option<String>,
    }

    #[derive(Serialize)]
    pub(super) struct EmbeddingRequest<'a> {
        pub input: &'a str,
        pub model: &'a str,
    }

    #[derive(Deserialize)]
    pub(super) struct EmbeddingResponse {
        pub data: Vec<Embedding>,
    }

    #[derive(Deserialize)]
    pub(super) struct Embedding {
        pub embedding: Vec<f32>,
    }

    #[derive(Deserialize)]
    pub(super) struct ModelList {
        pub data: Vec<Model>,
    }

    #[derive(Deserialize)]
    pub(super) struct Model {
        pub id: String,
        #[serde(default)]
        pub created: i64,
    }

    #[derive(Deserialize)]
    pub(super) struct ErrorBody {
        pub error: ErrorDetail,
    }

    #[derive(Deserialize)]
    pub(super) struct ErrorDetail {
        pub message: String,
    }
}
