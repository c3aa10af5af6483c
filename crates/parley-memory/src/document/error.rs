/// Why a source could not be turned into documents. Never retried.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported upload: {0}")]
    UnsupportedFormat(String),

    #[error("{name} is {size} bytes, over the {limit} byte limit")]
    TooLarge { name: String, size: u64, limit: u64 },

    #[cfg(feature = "pdf")]
    #[error("could not read PDF {name}: {reason}")]
    Pdf { name: String, reason: String },

    #[error("{name} contains no text")]
    Empty { name: String },

    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}
