//! Provider construction from configuration.

use parley_llm::any::AnyProvider;
use parley_llm::ollama::{OllamaProvider, SamplingOptions};
use parley_llm::openai::OpenAiProvider;

use crate::config::{Config, ProviderKind};
use crate::error::ChatError;

/// Build the provider for `kind`.
///
/// # Errors
///
/// Returns [`ChatError::MissingApiKey`] for the hosted provider without a resolved key.
pub fn create_provider(config: &Config, kind: ProviderKind) -> Result<AnyProvider, ChatError> {
    let llm = &config.llm;
    match kind {
        ProviderKind::Ollama => {
            let defaults = SamplingOptions::default();
            let sampling = SamplingOptions {
                temperature: llm.temperature.unwrap_or(defaults.temperature),
                num_predict: llm.num_predict,
                top_p: llm.top_p,
            };
            Ok(AnyProvider::Ollama(
                OllamaProvider::new(&llm.base_url, llm.model.clone(), llm.embedding_model.clone())
                    .with_sampling(sampling),
            ))
        }
        ProviderKind::OpenAi => {
            let key = config
                .secrets
                .openai_api_key
                .as_ref()
                .ok_or(ChatError::MissingApiKey { provider: "openai" })?;
            let mut provider = OpenAiProvider::new(
                key.expose().to_owned(),
                llm.openai.base_url.clone(),
                llm.openai.model.clone(),
                llm.openai.max_tokens,
                llm.openai.embedding_model.clone(),
            );
            if let Some(t) = llm.temperature {
                provider = provider.with_temperature(t);
            }
            Ok(AnyProvider::OpenAi(provider))
        }
    }
}
