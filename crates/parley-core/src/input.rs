use std::fmt;
use std::path::Path;

use parley_memory::document::{LoadError, Upload};

/// One thing the user added to the session.
#[derive(Debug, Clone)]
pub enum Source {
    Upload(Upload),
    Url(String),
}

impl Source {
    /// File name for uploads, the URL itself for web pages.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Upload(upload) => &upload.name,
            Self::Url(url) => url,
        }
    }
}

/// Read a local file into an [`Upload`] named after its file name.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be read.
pub async fn read_upload(path: &Path) -> Result<Upload, LoadError> {
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    Ok(Upload::new(name, bytes))
}

/// Identity of a set of sources: sorted, de-duplicated ids plus their blake3 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputSetKey {
    ids: Vec<String>,
    digest: String,
}

impl InputSetKey {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        ids.sort();
        ids.dedup();

        let mut hasher = blake3::Hasher::new();
        for id in &ids {
            hasher.update(id.as_bytes());
            hasher.update(&[0]);
        }
        Self {
            ids,
            digest: hasher.finalize().to_hex().to_string(),
        }
    }

    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl fmt::Display for InputSetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digest[..12])
    }
}

/// Sources of the active mode, in insertion order, unique by id.
#[derive(Debug, Clone, Default)]
pub struct InputSet {
    sources: Vec<Source>,
}

impl InputSet {
    /// Adds `source` unless one with the same id is present. Returns whether it was added.
    pub fn add(&mut self, source: Source) -> bool {
        if self.contains(source.id()) {
            return false;
        }
        self.sources.push(source);
        true
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.sources.len();
        self.sources.retain(|s| s.id() != id);
        self.sources.len() != before
    }

    pub fn clear(&mut self) {
        self.sources.clear();
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.sources.iter().any(|s| s.id() == id)
    }

    #[must_use]
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.sources.iter().map(Source::id).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn key(&self) -> InputSetKey {
        InputSetKey::new(self.sources.iter().map(Source::id))
    }
}
