use serde::{Deserialize, Serialize};

fn default_web_timeout() -> u64 {
    25
}

fn default_max_body_bytes() -> usize {
    4 * 1024 * 1024
}

fn default_reader_proxy() -> Option<String> {
    Some("https://r.jina.ai/".into())
}

fn default_search_url() -> String {
    "https://api.tavily.com".into()
}

fn default_max_results() -> usize {
    3
}

fn default_context_results() -> usize {
    2
}

fn default_search_timeout() -> u64 {
    15
}

fn default_max_rows() -> usize {
    50
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub sql: SqlConfig,
}

/// Website loading: reader proxy, timeouts and host policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebConfig {
    #[serde(default = "default_web_timeout")]
    pub timeout: u64,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Prefix prepended to the page URL. `None` fetches pages directly.
    #[serde(default = "default_reader_proxy")]
    pub reader_proxy: Option<String>,
    #[serde(default)]
    pub allow_private_hosts: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            timeout: default_web_timeout(),
            max_body_bytes: default_max_body_bytes(),
            reader_proxy: default_reader_proxy(),
            allow_private_hosts: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_url")]
    pub base_url: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// How many of the top hits are put into the prompt.
    #[serde(default = "default_context_results")]
    pub context_results: usize,
    #[serde(default = "default_search_timeout")]
    pub timeout: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_search_url(),
            max_results: default_max_results(),
            context_results: default_context_results(),
            timeout: default_search_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SqlConfig {
    /// `sqlite:///path` or `sqlite://path`.
    #[serde(default)]
    pub url: Option<String>,
    /// Empty means every table in the database.
    #[serde(default)]
    pub allowed_tables: Vec<String>,
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self {
            url: None,
            allowed_tables: Vec::new(),
            max_rows: default_max_rows(),
        }
    }
}
