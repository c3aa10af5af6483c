//! A single-owner chat session: memory, sources, index caches and the active mode.

use std::sync::Arc;

use parley_llm::LlmProvider;
use parley_llm::any::AnyProvider;
use parley_memory::document::TextSplitter;
use parley_memory::{ConversationMemory, ConversationTurn, IndexHandle, RetrievalConfig, TurnRole};
use parley_tools::{SqlDatabase, TavilySearch, WebPageLoader};

use crate::cache::SessionCache;
use crate::channel::Channel;
use crate::config::{Config, ProviderKind};
use crate::error::ChatError;
use crate::ingest::Ingestor;
use crate::input::{InputSet, Source};
use crate::mode::documents::DocumentIndex;
use crate::mode::{ChatMode, RagTurn, Reply, basic, context, documents, internet, sql, websites};
use crate::synthesizer::Synthesizer;

pub const GREETING: &str = "How can I help you?";

pub struct Session {
    config: Config,
    provider: Arc<AnyProvider>,
    provider_kind: ProviderKind,
    mode: ChatMode,
    memory: ConversationMemory,
    sources: InputSet,
    documents: SessionCache<DocumentIndex<AnyProvider>>,
    websites: SessionCache<IndexHandle<AnyProvider>>,
    sql: Option<SqlDatabase>,
    search: TavilySearch,
    ingest: Ingestor,
    documents_retrieval: RetrievalConfig,
    websites_retrieval: RetrievalConfig,
}

impl Session {
    /// Validate `config` and set up a session in the configured start mode.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Config`] if chunking or retrieval settings are invalid.
    pub fn new(config: Config, provider: AnyProvider, provider_kind: ProviderKind) -> Result<Self, ChatError> {
        config.validate()?;
        let splitter = TextSplitter::new(config.chunking.splitter())?;
        let ingest = Ingestor::new(
            splitter,
            WebPageLoader::new(&config.tools.web),
            config.documents.max_file_size,
        );
        let search = TavilySearch::new(
            &config.tools.search,
            config
                .secrets
                .tavily_api_key
                .as_ref()
                .map(|k| k.expose().to_owned()),
        );

        Ok(Self {
            provider: Arc::new(provider),
            provider_kind,
            mode: config.chat.mode,
            memory: ConversationMemory::new(config.memory.history_limit),
            sources: InputSet::default(),
            documents: SessionCache::default(),
            websites: SessionCache::default(),
            sql: None,
            search,
            ingest,
            documents_retrieval: config.rag.documents.to_config()?,
            websites_retrieval: config.rag.websites.to_config()?,
            config,
        })
    }

    #[must_use]
    pub fn mode(&self) -> ChatMode {
        self.mode
    }

    #[must_use]
    pub fn provider(&self) -> &AnyProvider {
        &self.provider
    }

    #[must_use]
    pub fn provider_kind(&self) -> ProviderKind {
        self.provider_kind
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    #[must_use]
    pub fn sources(&self) -> Vec<&str> {
        self.sources.ids()
    }

    /// Greeting followed by every stored turn.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel fails.
    pub async fn render_history<C: Channel>(&self, channel: &mut C) -> Result<(), ChatError> {
        channel.send(&format!("assistant: {GREETING}")).await?;
        for turn in self.memory.history() {
            let role = match turn.role {
                TurnRole::User => "user",
                TurnRole::Assistant => "assistant",
            };
            channel.send(&format!("{role}: {}", turn.content)).await?;
        }
        Ok(())
    }

    /// Answer `query` in the active mode, show references and record the turn.
    ///
    /// Generation failures are shown in place of the answer and are not returned; the turn is
    /// not recorded.
    ///
    /// # Errors
    ///
    /// Returns load, index, configuration and tool errors. Session state is unchanged by them.
    pub async fn handle_new_input<C: Channel>(&mut self, query: &str, channel: &mut C) -> Result<(), ChatError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }

        let result = self.dispatch(query, channel).await;
        match result {
            Ok(reply) => {
                if !reply.references.is_empty() {
                    channel.send_references(&reply.references).await?;
                }
                tracing::info!(
                    mode = %self.mode,
                    question = query,
                    answer_len = reply.text.len(),
                    references = reply.references.len(),
                    "answered"
                );
                self.memory.append(ConversationTurn::user(query));
                self.memory.append(ConversationTurn::assistant(reply.text));
                Ok(())
            }
            Err(e) if e.is_generation() => {
                tracing::warn!(mode = %self.mode, "{e}");
                let mut text = format!("Error generating response: {e}");
                if self.mode == ChatMode::Sql
                    && let Some(db) = &self.sql
                {
                    text.push_str("\n\n");
                    text.push_str(&sql::table_listing(db));
                }
                channel.send(&text).await?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn dispatch<C: Channel>(&mut self, query: &str, channel: &mut C) -> Result<Reply, ChatError> {
        let synth = Synthesizer::new(self.provider.as_ref(), self.config.llm.streaming);
        let history = self.memory.window_messages();

        match self.mode {
            ChatMode::Basic => basic::answer(&synth, query, channel).await,
            ChatMode::Context => context::answer(&synth, query, &history, channel).await,
            ChatMode::Internet => {
                let context_results = self.config.tools.search.context_results;
                internet::answer(&synth, &self.search, context_results, query, channel).await
            }
            ChatMode::Documents => {
                let turn = RagTurn {
                    synth: &synth,
                    ingest: &self.ingest,
                    provider: &self.provider,
                    sources: &self.sources,
                    retrieval: self.documents_retrieval,
                    history: &history,
                };
                documents::answer(turn, &mut self.documents, query, channel).await
            }
            ChatMode::Websites => {
                let turn = RagTurn {
                    synth: &synth,
                    ingest: &self.ingest,
                    provider: &self.provider,
                    sources: &self.sources,
                    retrieval: self.websites_retrieval,
                    history: &history,
                };
                websites::answer(turn, &mut self.websites, query, channel).await
            }
            ChatMode::Sql => {
                // connected on first use, then reused for the rest of the session
                let db = match self.sql.take() {
                    Some(db) => db,
                    None => SqlDatabase::connect(&self.config.tools.sql).await?,
                };
                let db = self.sql.insert(db);
                sql::answer(&synth, db, query, &history, channel).await
            }
        }
    }

    /// Switch mode, dropping memory, sources and any built index.
    pub fn switch_mode(&mut self, mode: ChatMode) -> String {
        self.mode = mode;
        self.reset_state();
        self.sources.clear();
        tracing::info!(mode = %mode, "mode switched");
        format!("Switched to {mode} mode ({}).", mode.description())
    }

    /// Replace the provider, dropping memory and any index built with the old embedder.
    /// Sources are kept and re-indexed on the next question.
    pub fn switch_provider(&mut self, kind: ProviderKind, provider: AnyProvider) -> String {
        self.provider = Arc::new(provider);
        self.provider_kind = kind;
        self.reset_state();
        tracing::info!(provider = %kind, model = self.provider.model(), "provider switched");
        format!(
            "Switched to {kind} ({}). Memory and index cleared.",
            self.provider.model()
        )
    }

    fn reset_state(&mut self) {
        self.memory.clear();
        self.documents.invalidate();
        self.websites.invalidate();
    }

    pub fn reset_memory(&mut self) {
        self.memory.clear();
    }

    /// Add a source to the active mode. Returns `false` if it was already present.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::SourcesUnsupported`] outside the document and website modes and
    /// [`ChatError::WrongSourceKind`] for a file in website mode or a URL in document mode.
    pub fn add_source(&mut self, source: Source) -> Result<bool, ChatError> {
        match (self.mode, &source) {
            (ChatMode::Documents, Source::Upload(_)) | (ChatMode::Websites, Source::Url(_)) => {}
            (ChatMode::Documents, Source::Url(_)) => {
                return Err(ChatError::WrongSourceKind {
                    mode: self.mode,
                    expected: "files",
                });
            }
            (ChatMode::Websites, Source::Upload(_)) => {
                return Err(ChatError::WrongSourceKind {
                    mode: self.mode,
                    expected: "URLs",
                });
            }
            (mode, _) => return Err(ChatError::SourcesUnsupported(mode)),
        }
        let id = source.id().to_owned();
        let added = self.sources.add(source);
        tracing::debug!(source = %id, added, total = self.sources.len(), "source added");
        Ok(added)
    }

    pub fn remove_source(&mut self, id: &str) -> bool {
        self.sources.remove(id)
    }

    pub fn clear_sources(&mut self) {
        self.sources.clear();
    }

    /// Models offered by the active provider.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Llm`] if the provider cannot be queried.
    pub async fn list_models(&self) -> Result<Vec<String>, ChatError> {
        Ok(self.provider.list_models().await?)
    }
}
