pub mod error;
pub mod links;
pub mod loader;
pub mod splitter;
pub mod types;

pub use error::LoadError;
pub use links::{ExtractedLinks, extract_links, is_link_query};
pub use loader::{TextLoader, load_upload};
pub use splitter::{SplitterConfig, TextSplitter, chunk, stitch};
pub use types::{Chunk, Document, DocumentMetadata, Upload};

#[cfg(feature = "pdf")]
pub use loader::PdfLoader;

/// Default maximum upload size: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// A format-specific reader that turns one [`Upload`] into documents.
pub trait DocumentLoader: Send + Sync {
    /// Lowercase file extensions this loader claims.
    const EXTENSIONS: &'static [&'static str];

    fn load(
        &self,
        upload: &Upload,
    ) -> impl Future<Output = Result<Vec<Document>, LoadError>> + Send;
}
