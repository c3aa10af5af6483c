use std::fmt::Write as _;

use parley_llm::LlmProvider;
use parley_llm::provider::Message;
use parley_tools::{SearchHit, TavilySearch};

use super::Reply;
use crate::channel::{Channel, Reference};
use crate::error::ChatError;
use crate::synthesizer::Synthesizer;

pub const NO_RESULTS_NOTE: &str = "Note: I couldn't access current web information, so I'll \
answer based on my general knowledge.";

/// Prompt grounded in the first `context_results` hits, or the general-knowledge fallback.
#[must_use]
pub fn build_prompt(query: &str, hits: &[SearchHit], context_results: usize) -> String {
    if hits.is_empty() {
        return format!("Answer the following question: {query}\n\n{NO_RESULTS_NOTE}");
    }
    let mut context = String::new();
    for hit in hits.iter().take(context_results.max(1)) {
        let title = if hit.title.is_empty() {
            "No Title"
        } else {
            &hit.title
        };
        let _ = writeln!(context, "- **{title}**: {}", hit.content.trim());
    }
    format!(
        "Based on these recent web search results, answer the user's question clearly and \
accurately:\n\nSearch Results:\n{context}\nUser Question: {query}\n\n\
Provide a comprehensive answer based on the search results:"
    )
}

/// Search, then answer from the results. Every hit is listed as a reference.
///
/// # Errors
///
/// Returns [`ChatError::Generation`] if the LLM call fails. Search failures are not errors.
pub async fn answer<P: LlmProvider, C: Channel>(
    synth: &Synthesizer<'_, P>,
    search: &TavilySearch,
    context_results: usize,
    query: &str,
    channel: &mut C,
) -> Result<Reply, ChatError> {
    if search.is_available() {
        channel.send_status("Searching the web").await?;
    } else {
        tracing::warn!("no search API key configured, answering from general knowledge");
    }
    let hits = search.search_or_empty(query).await;
    tracing::debug!(hits = hits.len(), "web search finished");

    let prompt = build_prompt(query, &hits, context_results);
    let text = synth.generate(&[Message::user(prompt)], channel).await?;

    let references = hits
        .iter()
        .map(|h| Reference::new(h.title.clone()).with_detail(h.url.clone()))
        .collect();
    Ok(Reply::text(text).with_references(references))
}
