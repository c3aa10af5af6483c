//! Line-oriented terminal channel.

use parley_core::channel::{Channel, ChannelError, ChannelMessage};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};

const PROMPT: &str = "you> ";

/// Reads one query per line and writes answers, streamed tokens and status notes.
#[derive(Debug)]
pub struct CliChannel<R, W> {
    lines: Lines<BufReader<R>>,
    out: W,
    streaming: bool,
}

impl CliChannel<Stdin, Stdout> {
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout())
    }
}

impl<R, W> CliChannel<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, out: W) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            out,
            streaming: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn into_output(self) -> W {
        self.out
    }

    async fn write(&mut self, text: &str) -> Result<(), ChannelError> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.flush().await?;
        Ok(())
    }
}

impl<R, W> Channel for CliChannel<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn recv(&mut self) -> Result<Option<ChannelMessage>, ChannelError> {
        self.write(PROMPT).await?;
        let Some(line) = self.lines.next_line().await? else {
            return Ok(None);
        };
        Ok(Some(ChannelMessage {
            text: line.trim().to_owned(),
        }))
    }

    async fn send(&mut self, text: &str) -> Result<(), ChannelError> {
        self.write(&format!("{text}\n")).await
    }

    async fn send_chunk(&mut self, chunk: &str) -> Result<(), ChannelError> {
        self.streaming = true;
        self.write(chunk).await
    }

    async fn flush_chunks(&mut self) -> Result<(), ChannelError> {
        if std::mem::take(&mut self.streaming) {
            self.write("\n").await?;
        }
        Ok(())
    }

    async fn send_status(&mut self, text: &str) -> Result<(), ChannelError> {
        self.write(&format!("[{text}...]\n")).await
    }
}

#[cfg(test)]
mod tests {
    use parley_core::Reference;

    use super::*;

    fn channel(input: &'static str) -> CliChannel<&'static [u8], Vec<u8>> {
        CliChannel::new(input.as_bytes(), Vec::new())
    }

    #[tokio::test]
    async fn recv_trims_lines_until_eof() {
        let mut ch = channel("  hello  \n/help\n");
        assert_eq!(ch.recv().await.unwrap().unwrap().text, "hello");
        assert_eq!(ch.recv().await.unwrap().unwrap().text, "/help");
        assert!(ch.recv().await.unwrap().is_none());
        let out = String::from_utf8(ch.into_output()).unwrap();
        assert_eq!(out, "you> you> you> ");
    }

    #[tokio::test]
    async fn streamed_chunks_end_with_one_newline() {
        let mut ch = channel("");
        ch.send_chunk("Hel").await.unwrap();
        ch.send_chunk("lo").await.unwrap();
        ch.flush_chunks().await.unwrap();
        ch.flush_chunks().await.unwrap();
        assert_eq!(String::from_utf8(ch.into_output()).unwrap(), "Hello\n");
    }

    #[tokio::test]
    async fn status_and_references_are_written() {
        let mut ch = channel("");
        ch.send_status("Fetching 1 website(s)").await.unwrap();
        ch.send_references(&[Reference::new("https://a.example")])
            .await
            .unwrap();
        assert_eq!(
            String::from_utf8(ch.into_output()).unwrap(),
            "[Fetching 1 website(s)...]\nReferences:\n1. https://a.example\n"
        );
    }
}
