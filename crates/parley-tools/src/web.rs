use std::time::Duration;

use parley_memory::document::{Document, DocumentMetadata, LoadError};
use url::Url;

use crate::config::WebConfig;

/// Elements whose text is kept when a page is fetched without the reader proxy.
/// Block elements whose text is kept. Nested matches are emitted once, by the outermost.
const TEXT_TAGS: &[&str] = &[
    "title", "h1", "h2", "h3", "h4", "h5", "h6", "p", "li", "pre", "blockquote", "td", "th",
];

/// Turns a URL into a text [`Document`].
///
/// With a reader proxy configured the page is requested as `{proxy}{url}` and the proxy's
/// plain-text rendering is used as is. Otherwise the HTML is fetched and its visible text is
/// extracted with `scrape-core`.
#[derive(Debug, Clone)]
pub struct WebPageLoader {
    client: reqwest::Client,
    reader_proxy: Option<String>,
    max_body_bytes: usize,
    allow_private_hosts: bool,
}

impl WebPageLoader {
    #[must_use]
    pub fn new(config: &WebConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .redirect(reqwest::redirect::Policy::limited(3))
            .build()
            .unwrap_or_default();

        Self {
            client,
            reader_proxy: config.reader_proxy.clone().filter(|p| !p.trim().is_empty()),
            max_body_bytes: config.max_body_bytes,
            allow_private_hosts: config.allow_private_hosts,
        }
    }

    /// # Errors
    ///
    /// Returns [`LoadError::InvalidUrl`] for non-http(s) or blocked hosts,
    /// [`LoadError::Fetch`] when the request fails, and [`LoadError::Empty`] for pages without text.
    pub async fn load(&self, url: &str) -> Result<Vec<Document>, LoadError> {
        validate_url(url, self.allow_private_hosts)?;

        let (content, content_type) = if let Some(proxy) = &self.reader_proxy {
            (self.fetch(url, &format!("{proxy}{url}")).await?, "text/plain")
        } else {
            let html = self.fetch(url, url).await?;
            let text = tokio::task::spawn_blocking(move || visible_text(&html))
                .await
                .map_err(|e| LoadError::Io(std::io::Error::other(e)))?;
            (text, "text/html")
        };

        if content.trim().is_empty() {
            return Err(LoadError::Empty {
                name: url.to_owned(),
            });
        }

        tracing::debug!(url, chars = content.chars().count(), "web page loaded");
        Ok(vec![Document {
            content,
            metadata: DocumentMetadata::new(url, content_type),
        }])
    }

    async fn fetch(&self, url: &str, request_url: &str) -> Result<String, LoadError> {
        let fetch_err = |reason: String| LoadError::Fetch {
            url: url.to_owned(),
            reason,
        };

        let resp = self
            .client
            .get(request_url)
            .send()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(fetch_err(format!("HTTP {}", resp.status())));
        }

        let bytes = resp.bytes().await.map_err(|e| fetch_err(e.to_string()))?;
        if bytes.len() > self.max_body_bytes {
            return Err(fetch_err(format!(
                "response too large: {} bytes (max: {})",
                bytes.len(),
                self.max_body_bytes,
            )));
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn validate_url(raw: &str, allow_private_hosts: bool) -> Result<(), LoadError> {
    let invalid = |reason: String| LoadError::InvalidUrl {
        url: raw.to_owned(),
        reason,
    };

    let parsed = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("scheme not allowed: {}", parsed.scheme())));
    }

    if !allow_private_hosts
        && let Some(host) = parsed.host()
        && is_private_host(&host)
    {
        return Err(invalid(format!(
            "private/local host blocked: {}",
            parsed.host_str().unwrap_or("")
        )));
    }

    Ok(())
}

fn is_private_host(host: &url::Host<&str>) -> bool {
    let v4_private = |v4: std::net::Ipv4Addr| {
        v4.is_loopback()
            || v4.is_private()
            || v4.is_link_local()
            || v4.is_unspecified()
            || v4.is_broadcast()
    };
    match host {
        url::Host::Domain(d) => *d == "localhost",
        url::Host::Ipv4(v4) => v4_private(*v4),
        url::Host::Ipv6(v6) => {
            if v6.is_loopback() || v6.is_unspecified() {
                return true;
            }
            let seg = v6.segments();
            // fe80::/10 link-local, fc00::/7 unique local
            if seg[0] & 0xffc0 == 0xfe80 || seg[0] & 0xfe00 == 0xfc00 {
                return true;
            }
            v6.to_ipv4_mapped().is_some_and(v4_private)
        }
    }
}

fn is_text_tag(tag: &scrape_core::Tag<'_>) -> bool {
    tag.name().is_some_and(|name| TEXT_TAGS.contains(&name))
}

/// Text of every outermost block element, one per line, in document order.
fn visible_text(html: &str) -> String {
    let soup = scrape_core::Soup::parse(html);
    let Some(root) = soup.root() else {
        return String::new();
    };

    let mut lines = Vec::new();
    for tag in std::iter::once(root).chain(root.descendants()) {
        if !is_text_tag(&tag) || tag.parents().any(|p| is_text_tag(&p)) {
            continue;
        }
        let text = tag.text();
        let text = text.trim();
        if !text.is_empty() {
            lines.push(text.to_owned());
        }
    }
    lines.join("\n")
}
