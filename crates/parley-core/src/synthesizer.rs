//! Prompt assembly and answer generation.

use std::fmt::Write as _;

use futures::StreamExt;
use parley_llm::LlmProvider;
use parley_llm::provider::Message;
use parley_memory::RetrievalResult;

use crate::channel::{Channel, Reference};
use crate::error::{ChatError, GenerationError};

pub const RAG_SYSTEM_PROMPT: &str = "You are a helpful assistant answering questions about the \
user's sources. Use only the context passages below. Each passage is tagged with its source. \
If the context does not contain the answer, say that you don't know.";

pub const NO_CONTEXT_SYSTEM_PROMPT: &str = "You are a helpful assistant. No relevant passages \
were found in the user's sources, so answer from general knowledge and say so.";

/// Markers small local models emit when they role-play both sides of a chat.
const ARTIFACT_MARKERS: &[&str] = &[
    "Human:",
    "AI:",
    "AI response:",
    "Artificial Intelligence:",
    "AI (Computer-Generated Voice):",
    "AI-generated response:",
    "The Human:",
];

/// A generated answer with the chunks it was grounded on, in rank order.
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub citations: Vec<RetrievalResult>,
}

impl Answer {
    /// One reference per citation: `source p.N` with the chunk text.
    #[must_use]
    pub fn references(&self) -> Vec<Reference> {
        self.citations
            .iter()
            .map(|r| {
                Reference::new(r.chunk.metadata.label()).with_detail(excerpt(&r.chunk.content, 160))
            })
            .collect()
    }
}

fn excerpt(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut cut: String = flat.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}

/// Messages for a RAG turn: instruction, tagged context, history, then the question.
///
/// With no results the no-context instruction is used and the context block is left out.
#[must_use]
pub fn build_rag_prompt(query: &str, results: &[RetrievalResult], history: &[Message]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 3);
    if results.is_empty() {
        messages.push(Message::system(NO_CONTEXT_SYSTEM_PROMPT));
    } else {
        messages.push(Message::system(RAG_SYSTEM_PROMPT));
        let mut context = String::from("Context:");
        for r in results {
            let _ = write!(
                context,
                "\n\n[{}] ({})\n{}",
                r.rank,
                r.chunk.metadata.label(),
                r.chunk.content.trim()
            );
        }
        messages.push(Message::system(context));
    }
    messages.extend_from_slice(history);
    messages.push(Message::user(query));
    messages
}

/// Strip role-play lines and prefixes. Falls back to the raw text minus markers when
/// nothing else would remain.
#[must_use]
pub fn clean_response(raw: &str) -> String {
    let mut kept = Vec::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || ARTIFACT_MARKERS.iter().any(|m| line.contains(m)) {
            continue;
        }
        kept.push(line);
    }
    if !kept.is_empty() {
        return kept.join("\n");
    }
    let mut fallback = raw.to_owned();
    for marker in ["AI response:", "AI:", "Human:"] {
        fallback = fallback.replace(marker, "");
    }
    fallback.trim().to_owned()
}

/// Calls the LLM for one turn and delivers the answer to the channel.
pub struct Synthesizer<'a, P> {
    provider: &'a P,
    streaming: bool,
}

impl<'a, P: LlmProvider> Synthesizer<'a, P> {
    /// `streaming` is honoured only when the provider supports it.
    #[must_use]
    pub fn new(provider: &'a P, streaming: bool) -> Self {
        Self {
            provider,
            streaming: streaming && provider.supports_streaming(),
        }
    }

    /// One blocking call whose output is not shown to the user, such as SQL drafting.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Generation`] if the provider fails.
    pub async fn complete(&self, messages: &[Message]) -> Result<String, ChatError> {
        Ok(self
            .provider
            .chat(messages)
            .await
            .map_err(GenerationError)?)
    }

    /// Run `messages` through the LLM. Tokens are streamed to the channel when enabled,
    /// otherwise the finished text is sent once. Returns the cleaned answer.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Generation`] if the provider fails, before or during the stream.
    pub async fn generate<C: Channel>(
        &self,
        messages: &[Message],
        channel: &mut C,
    ) -> Result<String, ChatError> {
        let raw = if self.streaming {
            let mut stream = self
                .provider
                .chat_stream(messages)
                .await
                .map_err(GenerationError)?;
            let mut raw = String::new();
            while let Some(token) = stream.next().await {
                let token = token.map_err(GenerationError)?;
                channel.send_chunk(&token).await?;
                raw.push_str(&token);
            }
            channel.flush_chunks().await?;
            clean_response(&raw)
        } else {
            let raw = self
                .provider
                .chat(messages)
                .await
                .map_err(GenerationError)?;
            let cleaned = clean_response(&raw);
            channel.send(&cleaned).await?;
            cleaned
        };
        Ok(raw)
    }

    /// Answer `query` from `results` and `history`, citing the results in rank order.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Generation`] if the provider fails.
    pub async fn synthesize<C: Channel>(
        &self,
        query: &str,
        results: Vec<RetrievalResult>,
        history: &[Message],
        channel: &mut C,
    ) -> Result<Answer, ChatError> {
        let messages = build_rag_prompt(query, &results, history);
        let text = self.generate(&messages, channel).await?;
        Ok(Answer {
            text,
            citations: results,
        })
    }
}
