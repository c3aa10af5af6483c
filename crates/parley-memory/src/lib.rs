//! Retrieval building blocks: documents, chunks, vector index and conversation memory.

pub mod conversation;
pub mod document;
pub mod embedder;
pub mod error;
pub mod index;
pub mod retriever;

pub use conversation::{ConversationMemory, ConversationTurn, TurnRole};
pub use embedder::Embedder;
pub use error::{ConfigError, IndexError};
pub use index::{EmbeddedChunk, IndexHandle, VectorIndex};
pub use retriever::{RetrievalConfig, RetrievalResult, SearchStrategy, retrieve};
