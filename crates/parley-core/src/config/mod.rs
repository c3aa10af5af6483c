mod env;
mod types;


pub use types::*;

use std::path::{Path, PathBuf};

use parley_memory::ConfigError;

use crate::error::ChatError;
use crate::vault::{OPENAI_API_KEY, TAVILY_API_KEY, VaultProvider};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ChatError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| ChatError::ConfigRead {
                path: path.to_owned(),
                source,
            })?;
            toml::from_str::<Self>(&content)?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// `--config` first, then `PARLEY_CONFIG`, then [`DEFAULT_CONFIG_PATH`].
    #[must_use]
    pub fn resolve_path(cli: Option<&Path>) -> PathBuf {
        if let Some(path) = cli {
            return path.to_owned();
        }
        std::env::var("PARLEY_CONFIG")
            .ok()
            .filter(|v| !v.is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
    }

    /// Resolve API keys through the vault.
    ///
    /// # Errors
    ///
    /// Returns an error if the vault backend fails.
    pub async fn resolve_secrets(&mut self, vault: &dyn VaultProvider) -> Result<(), ChatError> {
        if let Some(key) = vault.get_secret(OPENAI_API_KEY).await? {
            self.secrets.openai_api_key = Some(key);
        }
        if let Some(key) = vault.get_secret(TAVILY_API_KEY).await? {
            self.secrets.tavily_api_key = Some(key);
        }
        Ok(())
    }

    /// Check chunking, retrieval and sampling values before anything is built.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.chunking.splitter().validate()?;
        self.rag.documents.to_config()?;
        self.rag.websites.to_config()?;
        if let Some(t) = self.llm.temperature
            && !(0.0..=1.0).contains(&t)
        {
            return Err(ConfigError::Invalid(format!(
                "llm.temperature must be within 0.0..=1.0, got {t}"
            )));
        }
        if self.tools.search.max_results == 0 {
            return Err(ConfigError::Invalid(
                "tools.search.max_results must be at least 1".into(),
            ));
        }
        if self.tools.sql.max_rows == 0 {
            return Err(ConfigError::Invalid(
                "tools.sql.max_rows must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
