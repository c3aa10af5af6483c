use super::types::{Chunk, Document};
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitterConfig {
    /// Maximum chunk length in chars.
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// End windows on paragraph, line, sentence or word boundaries when possible.
    pub boundary_aware: bool,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            boundary_aware: true,
        }
    }
}

impl SplitterConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `chunk_size` is zero or `chunk_overlap >= chunk_size`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ConfigError::InvalidChunking {
                chunk_size: self.chunk_size,
                overlap: self.chunk_overlap,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct TextSplitter {
    config: SplitterConfig,
}

impl TextSplitter {
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid.
    pub fn new(config: SplitterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    #[must_use]
    pub fn split(&self, document: &Document) -> Vec<Chunk> {
        let chars: Vec<char> = document.content.chars().collect();
        windows(
            &chars,
            self.config.chunk_size,
            self.config.chunk_overlap,
            self.config.boundary_aware,
        )
        .into_iter()
        .enumerate()
        .map(|(i, (start, end))| Chunk {
            content: chars[start..end].iter().collect(),
            metadata: document.metadata.clone(),
            chunk_index: i,
            offset: start,
        })
        .collect()
    }

    #[must_use]
    pub fn split_all(&self, documents: &[Document]) -> Vec<Chunk> {
        documents.iter().flat_map(|d| self.split(d)).collect()
    }
}

/// Split `documents` into boundary-aware overlapping chunks.
///
/// # Errors
///
/// Returns [`ConfigError`] when `chunk_size` is zero or `overlap >= chunk_size`.
pub fn chunk(
    documents: &[Document],
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<Chunk>, ConfigError> {
    let splitter = TextSplitter::new(SplitterConfig {
        chunk_size,
        chunk_overlap: overlap,
        boundary_aware: true,
    })?;
    Ok(splitter.split_all(documents))
}

/// Rebuild the text of one document from its chunks, given in order.
#[must_use]
pub fn stitch(chunks: &[Chunk]) -> String {
    let mut out = String::new();
    let mut covered = 0;
    for chunk in chunks {
        let len = chunk.content.chars().count();
        let end = chunk.offset + len;
        if end > covered {
            let skip = covered.saturating_sub(chunk.offset);
            out.extend(chunk.content.chars().skip(skip));
            covered = end;
        }
    }
    out
}

/// `[start, end)` char ranges of every window. Requires `overlap < size`.
fn windows(chars: &[char], size: usize, overlap: usize, boundary_aware: bool) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let hard_end = (start + size).min(chars.len());
        let end = if hard_end == chars.len() || !boundary_aware {
            hard_end
        } else {
            boundary(&chars[start..hard_end], overlap).map_or(hard_end, |p| start + p)
        };
        out.push((start, end));
        if end == chars.len() {
            break;
        }
        start = end - overlap;
    }
    out
}

/// Relative end position of the best separator in `window`, tried in priority order.
/// A separator only counts if the chunk it closes is longer than `overlap`.
fn boundary(window: &[char], overlap: usize) -> Option<usize> {
    let separators: [fn(&[char], usize) -> Option<usize>; 4] = [
        |w, i| (w[i] == '\n' && w.get(i + 1) == Some(&'\n')).then_some(i + 2),
        |w, i| (w[i] == '\n').then_some(i + 1),
        |w, i| {
            (matches!(w[i], '.' | '!' | '?') && w.get(i + 1).is_some_and(|c| c.is_whitespace()))
                .then_some(i + 2)
        },
        |w, i| (w[i] == ' ').then_some(i + 1),
    ];

    separators.iter().find_map(|sep| {
        (0..window.len())
            .rev()
            .find_map(|i| sep(window, i))
            .filter(|&p| p > overlap)
    })
}
