use std::sync::Arc;

use parley_llm::LlmProvider;
use parley_memory::document::{ExtractedLinks, extract_links, is_link_query};
use parley_memory::{IndexHandle, retrieve};

use super::{RagTurn, Reply};
use crate::cache::{CacheState, SessionCache};
use crate::channel::Channel;
use crate::error::ChatError;

/// Index over the uploaded files plus the links found in them.
#[derive(Debug)]
pub struct DocumentIndex<P> {
    pub handle: IndexHandle<P>,
    pub links: ExtractedLinks,
}

/// Answer from the uploaded files, rebuilding the index first if the uploads changed.
///
/// Questions about links, URLs or profiles are answered from the extracted links without
/// calling the LLM.
///
/// # Errors
///
/// Returns [`ChatError::NoSources`] with nothing uploaded, load and index errors from a
/// rebuild, and [`ChatError::Generation`] if the LLM call fails.
pub async fn answer<P: LlmProvider, C: Channel>(
    turn: RagTurn<'_, P>,
    cache: &mut SessionCache<DocumentIndex<P>>,
    query: &str,
    channel: &mut C,
) -> Result<Reply, ChatError> {
    if turn.sources.is_empty() {
        return Err(ChatError::NoSources);
    }
    let key = turn.sources.key();
    if cache.state(&key) == CacheState::Stale {
        channel
            .send_status(&format!("Analyzing {} document(s)", turn.sources.len()))
            .await?;
    }

    let built = cache
        .get_or_build(&key, || async move {
            let docs = turn.ingest.load(turn.sources.sources()).await?;
            let links = extract_links(&docs);
            tracing::debug!(urls = links.urls.len(), platforms = links.platforms.len(), "links extracted");
            let handle = turn.ingest.index(&docs, Arc::clone(turn.provider)).await?;
            Ok::<_, ChatError>(DocumentIndex { handle, links })
        })
        .await?;

    if is_link_query(query) {
        let text = built.links.render();
        channel.send(&text).await?;
        return Ok(Reply::text(text));
    }

    let results = retrieve(query, &built.handle, &turn.retrieval).await?;
    let answer = turn
        .synth
        .synthesize(query, results, turn.history, channel)
        .await?;
    let references = answer.references();
    Ok(Reply::text(answer.text).with_references(references))
}
