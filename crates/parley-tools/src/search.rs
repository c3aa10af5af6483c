use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::error::ToolError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub content: String,
    pub url: String,
}

/// Tavily-compatible web search client.
#[derive(Clone)]
pub struct TavilySearch {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    max_results: usize,
}

impl std::fmt::Debug for TavilySearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TavilySearch")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("max_results", &self.max_results)
            .finish_non_exhaustive()
    }
}

impl TavilySearch {
    #[must_use]
    pub fn new(config: &SearchConfig, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key: api_key.filter(|k| !k.is_empty()),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            max_results: config.max_results,
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    /// # Errors
    ///
    /// Returns [`ToolError`] when no key is configured, the request fails or the API
    /// answers with a non-success status.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ToolError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| ToolError::NoApiKey {
            provider: "tavily".into(),
        })?;

        let body = TavilyRequest {
            query,
            max_results: self.max_results,
        };

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ToolError::SearchApi {
                status: status.as_u16(),
                message,
            });
        }

        let data: TavilyResponse = response.json().await?;
        Ok(data
            .results
            .into_iter()
            .take(self.max_results)
            .map(|r| SearchHit {
                title: r.title,
                content: r.content,
                url: r.url,
            })
            .collect())
    }

    /// Like [`Self::search`], but any failure is logged and yields no hits.
    pub async fn search_or_empty(&self, query: &str) -> Vec<SearchHit> {
        match self.search(query).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!("web search failed: {e}");
                Vec::new()
            }
        }
    }
}

#[derive(Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: usize,
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    url: String,
}
