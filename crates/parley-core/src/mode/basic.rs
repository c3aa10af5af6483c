use parley_llm::LlmProvider;
use parley_llm::provider::Message;

use super::Reply;
use crate::channel::Channel;
use crate::error::ChatError;
use crate::synthesizer::Synthesizer;

fn prompt(query: &str) -> String {
    format!(
        "You are a helpful AI assistant. Provide a direct, clear answer to the following \
question without referencing previous conversations or adding conversation artifacts.\n\n\
Question: {query}\n\nAnswer directly and clearly:"
    )
}

/// Single-shot answer. Conversation history is never sent.
///
/// # Errors
///
/// Returns [`ChatError::Generation`] if the LLM call fails.
pub async fn answer<P: LlmProvider, C: Channel>(
    synth: &Synthesizer<'_, P>,
    query: &str,
    channel: &mut C,
) -> Result<Reply, ChatError> {
    let text = synth.generate(&[Message::user(prompt(query))], channel).await?;
    Ok(Reply::text(text))
}
