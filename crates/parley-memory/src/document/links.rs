//! URL and platform-mention extraction from loaded documents.

use std::sync::LazyLock;

use regex::Regex;

use super::types::Document;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:https?://|www\.)[^\s<>()"']+[^\s<>()"'.]"#).unwrap()
});

static PLATFORMS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("LinkedIn", r"(?i)linkedin\.com/|linkedin"),
        ("GitHub", r"(?i)github\.com/|github"),
        ("LeetCode", r"(?i)leetcode\.com/|leetcode"),
        ("Udemy", r"(?i)udemy\.com/|udemy"),
        ("Portfolio", r"(?i)portfolio|website"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).unwrap()))
    .collect()
});

const LINK_QUERY_KEYWORDS: &[&str] = &["link", "url", "http", "profile", "platform", "social media"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedLinks {
    /// Distinct URLs in first-seen order.
    pub urls: Vec<String>,
    /// Distinct platform names mentioned anywhere in the text.
    pub platforms: Vec<&'static str>,
}

impl ExtractedLinks {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty() && self.platforms.is_empty()
    }

    /// Numbered listing of URLs and platform mentions, suitable as a direct answer.
    #[must_use]
    pub fn render(&self) -> String {
        if self.is_empty() {
            return "No links or platform URLs were found in the uploaded documents.".to_owned();
        }
        let mut lines = Vec::new();
        if !self.urls.is_empty() {
            lines.push("URLs found in the documents:".to_owned());
            lines.extend(
                self.urls
                    .iter()
                    .enumerate()
                    .map(|(i, u)| format!("{}. {u}", i + 1)),
            );
        }
        if !self.platforms.is_empty() {
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.push("Platforms mentioned:".to_owned());
            lines.extend(
                self.platforms
                    .iter()
                    .enumerate()
                    .map(|(i, p)| format!("{}. {p}", i + 1)),
            );
        }
        lines.join("\n")
    }
}

/// Collect URLs and platform mentions across all documents, de-duplicated.
#[must_use]
pub fn extract_links(documents: &[Document]) -> ExtractedLinks {
    let mut out = ExtractedLinks::default();
    for doc in documents {
        for m in URL_RE.find_iter(&doc.content) {
            let url = m.as_str();
            if !out.urls.iter().any(|u| u == url) {
                out.urls.push(url.to_owned());
            }
        }
        for (name, re) in PLATFORMS.iter() {
            if re.is_match(&doc.content) && !out.platforms.contains(name) {
                out.platforms.push(*name);
            }
        }
    }
    out
}

/// Whether a question asks for the links found in the documents.
#[must_use]
pub fn is_link_query(query: &str) -> bool {
    let lower = query.to_lowercase();
    LINK_QUERY_KEYWORDS.iter().any(|k| lower.contains(k))
}
