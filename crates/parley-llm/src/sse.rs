//! Server-sent event decoding for OpenAI-style streaming chat completions.

use eventsource_stream::Eventsource;
use serde::Deserialize;
use tokio_stream::StreamExt;

use crate::error::LlmError;
use crate::provider::ChatStream;

const DONE: &str = "[DONE]";

/// Token stream over a `stream: true` chat completion response.
///
/// Keep-alive events and deltas without text are skipped; the stream ends at `[DONE]` or when
/// the connection closes.
pub(crate) fn delta_stream(response: reqwest::Response) -> ChatStream {
    let tokens = response
        .bytes_stream()
        .eventsource()
        .take_while(|event| !matches!(event, Ok(e) if e.data.trim() == DONE))
        .filter_map(|event| match event {
            Ok(event) => decode(&event.data),
            Err(e) => Some(Err(LlmError::Stream(e.to_string()))),
        });
    Box::pin(tokens)
}

#[derive(Deserialize)]
struct Frame {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<FrameError>,
}

#[derive(Deserialize)]
struct Choice {
    delta: Delta,
}

#[derive(Deserialize)]
struct Delta {
    content: Option<String>,
}

#[derive(Deserialize)]
struct FrameError {
    message: String,
}

/// One event's `data` field: `None` when it carries no text.
fn decode(data: &str) -> Option<Result<String, LlmError>> {
    let data = data.trim();
    if data.is_empty() || data == DONE {
        return None;
    }
    let frame: Frame = match serde_json::from_str(data) {
        Ok(frame) => frame,
        Err(e) => return Some(Err(LlmError::Stream(format!("bad event payload: {e}")))),
    };
    if let Some(err) = frame.error {
        return Some(Err(LlmError::Stream(err.message)));
    }
    frame
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
        .filter(|text| !text.is_empty())
        .map(Ok)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn text_delta() {
        let data = r#"{"choices":[{"delta":{"content":"Par"},"finish_reason":null}]}"#;
        assert_eq!(decode(data).unwrap().unwrap(), "Par");
    }

    #[test]
    fn done_and_blank_carry_nothing() {
        assert!(decode("[DONE]").is_none());
        assert!(decode("  ").is_none());
    }

    #[test]
    fn role_only_and_finish_deltas_are_skipped() {
        assert!(decode(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#).is_none());
        assert!(decode(r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#).is_none());
        assert!(decode(r#"{"choices":[{"delta":{"content":""}}]}"#).is_none());
        assert!(decode(r#"{"choices":[]}"#).is_none());
    }

    #[test]
    fn malformed_payload_is_a_stream_error() {
        let err = decode("not json").unwrap().unwrap_err();
        assert!(matches!(err, LlmError::Stream(m) if m.starts_with("bad event payload")));
    }

    #[test]
    fn error_frame_is_surfaced() {
        let err = decode(r#"{"error":{"message":"context length exceeded"}}"#)
            .unwrap()
            .unwrap_err();
        assert_eq!(err.to_string(), "stream interrupted: context length exceeded");
    }

    proptest! {
        #[test]
        fn decode_never_panics(data in "\\PC{0,200}") {
            let _ = decode(&data);
        }
    }
}
