use std::fmt;
use std::fmt::Write as _;

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("channel closed")]
    ChannelClosed,
}

/// Incoming line from a channel.
#[derive(Debug, Clone)]
pub struct ChannelMessage {
    pub text: String,
}

/// A source shown under an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// `file p.3`, a page title, or a URL.
    pub label: String,
    /// Supporting excerpt or URL, if any.
    pub detail: Option<String>,
}

impl Reference {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            detail: None,
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {detail}", self.label),
            None => f.write_str(&self.label),
        }
    }
}

/// Bidirectional communication channel for a chat session.
pub trait Channel: Send {
    /// Receive the next message. Returns `None` on EOF.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying I/O fails.
    fn recv(&mut self)
    -> impl Future<Output = Result<Option<ChannelMessage>, ChannelError>> + Send;

    /// Send a complete message.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying I/O fails.
    fn send(&mut self, text: &str) -> impl Future<Output = Result<(), ChannelError>> + Send;

    /// Send one streamed token.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying I/O fails.
    fn send_chunk(&mut self, chunk: &str) -> impl Future<Output = Result<(), ChannelError>> + Send;

    /// End a streamed answer.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying I/O fails.
    fn flush_chunks(&mut self) -> impl Future<Output = Result<(), ChannelError>> + Send;

    /// Short progress note such as "Indexing 3 sources". No-op by default.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying I/O fails.
    fn send_status(
        &mut self,
        _text: &str,
    ) -> impl Future<Output = Result<(), ChannelError>> + Send {
        async { Ok(()) }
    }

    /// Show the references used by the last answer, numbered from 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying I/O fails.
    fn send_references(
        &mut self,
        references: &[Reference],
    ) -> impl Future<Output = Result<(), ChannelError>> + Send {
        let text = format_references(references);
        async move {
            if text.is_empty() {
                Ok(())
            } else {
                self.send(&text).await
            }
        }
    }
}

#[must_use]
pub fn format_references(references: &[Reference]) -> String {
    if references.is_empty() {
        return String::new();
    }
    let mut out = String::from("References:");
    for (i, r) in references.iter().enumerate() {
        let _ = write!(out, "\n{}. {r}", i + 1);
    }
    out
}

/// Channel that records everything sent through it.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingChannel {
    pub inputs: std::collections::VecDeque<String>,
    pub sent: Vec<String>,
    pub chunks: Vec<String>,
    pub statuses: Vec<String>,
    pub references: Vec<Vec<Reference>>,
    pub flushes: usize,
}

#[cfg(test)]
impl Channel for RecordingChannel {
    async fn recv(&mut self) -> Result<Option<ChannelMessage>, ChannelError> {
        Ok(self.inputs.pop_front().map(|text| ChannelMessage { text }))
    }

    async fn send(&mut self, text: &str) -> Result<(), ChannelError> {
        self.sent.push(text.to_owned());
        Ok(())
    }

    async fn send_chunk(&mut self, chunk: &str) -> Result<(), ChannelError> {
        self.chunks.push(chunk.to_owned());
        Ok(())
    }

    async fn flush_chunks(&mut self) -> Result<(), ChannelError> {
        self.flushes += 1;
        Ok(())
    }

    async fn send_status(&mut self, text: &str) -> Result<(), ChannelError> {
        self.statuses.push(text.to_owned());
        Ok(())
    }

    async fn send_references(&mut self, references: &[Reference]) -> Result<(), ChannelError> {
        self.references.push(references.to_vec());
        Ok(())
    }
}
