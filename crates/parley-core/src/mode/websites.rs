use std::sync::Arc;

use parley_llm::LlmProvider;
use parley_memory::{IndexHandle, retrieve};

use super::{RagTurn, Reply};
use crate::cache::{CacheState, SessionCache};
use crate::channel::{Channel, Reference};
use crate::error::ChatError;

/// Answer from the added web pages. References are the distinct cited URLs in rank order.
///
/// # Errors
///
/// Returns [`ChatError::NoSources`] with no URLs added, [`ChatError::Load`] when a page cannot
/// be fetched, and [`ChatError::Generation`] if the LLM call fails.
pub async fn answer<P: LlmProvider, C: Channel>(
    turn: RagTurn<'_, P>,
    cache: &mut SessionCache<IndexHandle<P>>,
    query: &str,
    channel: &mut C,
) -> Result<Reply, ChatError> {
    if turn.sources.is_empty() {
        return Err(ChatError::NoSources);
    }
    let key = turn.sources.key();
    if cache.state(&key) == CacheState::Stale {
        channel
            .send_status(&format!("Fetching {} website(s)", turn.sources.len()))
            .await?;
    }

    let handle = cache
        .get_or_build(&key, || async move {
            let docs = turn.ingest.load(turn.sources.sources()).await?;
            turn.ingest.index(&docs, Arc::clone(turn.provider)).await
        })
        .await?;

    let results = retrieve(query, handle, &turn.retrieval).await?;
    let answer = turn
        .synth
        .synthesize(query, results, turn.history, channel)
        .await?;

    let mut urls: Vec<&str> = Vec::new();
    for c in &answer.citations {
        let url = c.chunk.metadata.source.as_str();
        if !urls.contains(&url) {
            urls.push(url);
        }
    }
    let references = urls.into_iter().map(Reference::new).collect();
    Ok(Reply::text(answer.text.clone()).with_references(references))
}
