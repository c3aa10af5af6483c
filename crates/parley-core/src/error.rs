use std::path::PathBuf;

use parley_llm::LlmError;
use parley_memory::document::LoadError;
use parley_memory::{ConfigError, IndexError};
use parley_tools::ToolError;

use crate::channel::ChannelError;
use crate::mode::ChatMode;
use crate::vault::VaultError;

/// The LLM failed to produce an answer. Shown in place of the answer; the session keeps going.
#[derive(Debug, thiserror::Error)]
#[error("generation failed: {0}")]
pub struct GenerationError(#[source] pub LlmError);

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("failed to load source: {0}")]
    Load(#[from] LoadError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("{provider} API key is not set")]
    MissingApiKey { provider: &'static str },

    #[error("{0} mode does not take sources")]
    SourcesUnsupported(ChatMode),

    #[error("{mode} mode takes {expected}")]
    WrongSourceKind {
        mode: ChatMode,
        expected: &'static str,
    },

    #[error("no sources added yet, use /add first")]
    NoSources,
}

impl ChatError {
    /// Whether this error replaces an answer instead of aborting the request.
    #[must_use]
    pub fn is_generation(&self) -> bool {
        matches!(self, Self::Generation(_))
    }
}
