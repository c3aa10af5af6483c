use parley_memory::document::{DEFAULT_MAX_FILE_SIZE, SplitterConfig};
use parley_memory::{ConfigError, RetrievalConfig, SearchStrategy};
use parley_tools::ToolsConfig;
use serde::{Deserialize, Serialize};

use crate::mode::ChatMode;
use crate::vault::Secret;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub rag: RagConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub documents: DocumentsConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(skip)]
    pub secrets: ResolvedSecrets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Ollama,
    #[serde(alias = "open_ai")]
    OpenAi,
}

impl ProviderKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::OpenAi => "openai",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" | "open_ai" => Ok(Self::OpenAi),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:11434".into()
}

fn default_model() -> String {
    "llama3.2:3b".into()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".into()
}

fn default_true() -> bool {
    true
}

fn default_num_predict() -> i32 {
    768
}

fn default_top_p() -> f32 {
    0.9
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    /// Ollama endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Overrides the provider default (0.7 for Ollama, 0.0 for OpenAI).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_true")]
    pub streaming: bool,
    #[serde(default = "default_num_predict")]
    pub num_predict: i32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default)]
    pub openai: OpenAiConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            base_url: default_base_url(),
            model: default_model(),
            temperature: None,
            embedding_model: default_embedding_model(),
            streaming: true,
            num_predict: default_num_predict(),
            top_p: default_top_p(),
            openai: OpenAiConfig::default(),
        }
    }
}

fn default_openai_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".into()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_openai_embedding_model() -> Option<String> {
    Some("text-embedding-3-small".into())
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenAiConfig {
    #[serde(default = "default_openai_url")]
    pub base_url: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// `None` disables the document and website modes for this provider.
    #[serde(default = "default_openai_embedding_model")]
    pub embedding_model: Option<String>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_url(),
            model: default_openai_model(),
            max_tokens: default_max_tokens(),
            embedding_model: default_openai_embedding_model(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct ChatConfig {
    /// Mode selected at startup.
    #[serde(default)]
    pub mode: ChatMode,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    #[serde(default = "default_true")]
    pub boundary_aware: bool,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            boundary_aware: true,
        }
    }
}

impl ChunkingConfig {
    #[must_use]
    pub fn splitter(&self) -> SplitterConfig {
        SplitterConfig {
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            boundary_aware: self.boundary_aware,
        }
    }
}

/// Retrieval settings for one RAG mode.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct RetrievalSettings {
    pub k: usize,
    pub strategy: SearchStrategy,
}

impl RetrievalSettings {
    /// # Errors
    ///
    /// Returns [`ConfigError`] for `k == 0` or an invalid MMR pool.
    pub fn to_config(self) -> Result<RetrievalConfig, ConfigError> {
        RetrievalConfig::new(self.k, self.strategy)
    }
}

fn default_documents_retrieval() -> RetrievalSettings {
    RetrievalSettings {
        k: 3,
        strategy: SearchStrategy::Similarity,
    }
}

fn default_websites_retrieval() -> RetrievalSettings {
    RetrievalSettings {
        k: 2,
        strategy: SearchStrategy::Mmr {
            fetch_k: 4,
            lambda: parley_memory::retriever::DEFAULT_MMR_LAMBDA,
        },
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct RagConfig {
    #[serde(default = "default_documents_retrieval")]
    pub documents: RetrievalSettings,
    #[serde(default = "default_websites_retrieval")]
    pub websites: RetrievalSettings,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            documents: default_documents_retrieval(),
            websites: default_websites_retrieval(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct MemoryConfig {
    /// Most recent turns put into a prompt. 0 means all of them.
    #[serde(default)]
    pub history_limit: usize,
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct DocumentsConfig {
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ResolvedSecrets {
    pub openai_api_key: Option<Secret>,
    pub tavily_api_key: Option<Secret>,
}
