use super::{Config, ProviderKind};

fn env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    let v = env(key)?;
    let parsed = v.trim().parse::<T>().ok();
    if parsed.is_none() {
        tracing::warn!("ignoring invalid {key} value: {v}");
    }
    parsed
}

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Some(kind) = parsed::<ProviderKind>("PARLEY_LLM_PROVIDER") {
            self.llm.provider = kind;
        }
        if let Some(v) = env("PARLEY_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Some(v) = env("PARLEY_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Some(t) = parsed::<f32>("PARLEY_LLM_TEMPERATURE") {
            if (0.0..=1.0).contains(&t) {
                self.llm.temperature = Some(t);
            } else {
                tracing::warn!("ignoring out-of-range PARLEY_LLM_TEMPERATURE value: {t}");
            }
        }
        if let Some(v) = env("PARLEY_LLM_EMBEDDING_MODEL") {
            self.llm.embedding_model = v;
        }
        if let Some(enabled) = parsed::<bool>("PARLEY_LLM_STREAMING") {
            self.llm.streaming = enabled;
        }
        if let Some(v) = env("PARLEY_OPENAI_MODEL") {
            self.llm.openai.model = v;
        }
        if let Some(v) = env("PARLEY_OPENAI_BASE_URL") {
            self.llm.openai.base_url = v;
        }
        if let Some(size) = parsed::<usize>("PARLEY_CHUNK_SIZE") {
            self.chunking.chunk_size = size;
        }
        if let Some(overlap) = parsed::<usize>("PARLEY_CHUNK_OVERLAP") {
            self.chunking.chunk_overlap = overlap;
        }
        if let Some(limit) = parsed::<usize>("PARLEY_MEMORY_HISTORY_LIMIT") {
            self.memory.history_limit = limit;
        }
        if let Some(v) = env("PARLEY_SQL_URL") {
            self.tools.sql.url = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Some(v) = env("PARLEY_SQL_ALLOWED_TABLES") {
            self.tools.sql.allowed_tables = v
                .split(',')
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(n) = parsed::<usize>("PARLEY_SEARCH_MAX_RESULTS") {
            self.tools.search.max_results = n;
        }
        if let Some(v) = env("PARLEY_WEB_READER_PROXY") {
            self.tools.web.reader_proxy = Some(v).filter(|s| !s.trim().is_empty());
        }
    }
}
