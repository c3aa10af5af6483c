use parley_llm::LlmProvider;
use parley_llm::provider::Message;

use super::Reply;
use crate::channel::Channel;
use crate::error::ChatError;
use crate::synthesizer::Synthesizer;

pub const SYSTEM_PROMPT: &str =
    "You are a friendly assistant. Use the earlier conversation to keep your answers consistent.";

/// Conversation turn: system prompt, windowed history, then the question.
///
/// # Errors
///
/// Returns [`ChatError::Generation`] if the LLM call fails.
pub async fn answer<P: LlmProvider, C: Channel>(
    synth: &Synthesizer<'_, P>,
    query: &str,
    history: &[Message],
    channel: &mut C,
) -> Result<Reply, ChatError> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(SYSTEM_PROMPT));
    messages.extend_from_slice(history);
    messages.push(Message::user(query));
    let text = synth.generate(&messages, channel).await?;
    Ok(Reply::text(text))
}

#[cfg(test)]
mod tests {
    use parley_llm::mock::MockProvider;

    use super::*;
    use crate::channel::RecordingChannel;

    #[tokio::test]
    async fn history_precedes_question() {
        let provider = MockProvider::with_responses(vec!["Your name is Ada.".into()]);
        let synth = Synthesizer::new(&provider, false);
        let mut ch = RecordingChannel::default();
        let history = [Message::user("I am Ada"), Message::assistant("Hi Ada!")];
        let reply = answer(&synth, "What is my name?", &history, &mut ch)
            .await
            .unwrap();

        assert_eq!(reply.text, "Your name is Ada.");
        let sent = &provider.prompts()[0];
        assert_eq!(sent.len(), 4);
        assert_eq!(sent[1].content, "I am Ada");
        assert_eq!(sent[3], Message::user("What is my name?"));
    }
}
