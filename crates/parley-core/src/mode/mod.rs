//! The six chat modes. Each turns a question into a [`Reply`].

pub mod basic;
pub mod context;
pub mod documents;
pub mod internet;
pub mod sql;
pub mod websites;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parley_llm::provider::Message;
use parley_memory::RetrievalConfig;
use serde::{Deserialize, Serialize};

use crate::channel::Reference;
use crate::ingest::Ingestor;
use crate::input::InputSet;
use crate::synthesizer::Synthesizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    /// Direct answers, no history in the prompt.
    Basic,
    /// Plain conversation with history.
    #[default]
    Context,
    /// Web search results as context.
    Internet,
    /// Retrieval over uploaded files.
    Documents,
    /// Retrieval over fetched web pages.
    Websites,
    /// Natural language over a read-only SQLite database.
    Sql,
}

impl ChatMode {
    pub const ALL: [Self; 6] = [
        Self::Basic,
        Self::Context,
        Self::Internet,
        Self::Documents,
        Self::Websites,
        Self::Sql,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Context => "context",
            Self::Internet => "internet",
            Self::Documents => "documents",
            Self::Websites => "websites",
            Self::Sql => "sql",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Basic => "simple Q&A without conversation memory",
            Self::Context => "conversation that remembers earlier turns",
            Self::Internet => "answers grounded in a web search",
            Self::Documents => "chat with uploaded PDF, text and markdown files",
            Self::Websites => "chat with the content of web pages",
            Self::Sql => "questions over a read-only SQLite database",
        }
    }

    /// Whether this mode works over user-added sources.
    #[must_use]
    pub fn takes_sources(self) -> bool {
        matches!(self, Self::Documents | Self::Websites)
    }
}

impl fmt::Display for ChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == lower)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|m| m.as_str()).collect();
                format!("unknown mode '{s}', expected one of: {}", names.join(", "))
            })
    }
}

/// What a mode produced for one question. The text has already been delivered to the
/// channel; references are shown by the session.
#[derive(Debug, Clone, Default)]
pub struct Reply {
    pub text: String,
    pub references: Vec<Reference>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            references: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_references(mut self, references: Vec<Reference>) -> Self {
        self.references = references;
        self
    }
}

/// Everything a retrieval mode needs for one question.
pub struct RagTurn<'a, P> {
    pub synth: &'a Synthesizer<'a, P>,
    pub ingest: &'a Ingestor,
    /// Bound into the index's embedder when the index is (re)built.
    pub provider: &'a Arc<P>,
    pub sources: &'a InputSet,
    pub retrieval: RetrievalConfig,
    pub history: &'a [Message],
}
