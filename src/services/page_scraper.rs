use std::time::Duration;

use fake_user_agent::get_rua;
use scraper::Html;

/// Scraped text is capped so one page cannot flood the embedding model.
pub const MAX_CONTENT_CHARS: usize = 5000;

#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Plain text of the page, bounded to `MAX_CONTENT_CHARS`; empty string
    /// on any failure.
    async fn fetch(&self, url: &str) -> String;
}

pub struct PageScraper {
    client: reqwest::Client,
}

impl PageScraper {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap();

        PageScraper { client }
    }
}

impl Default for PageScraper {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PageFetcher for PageScraper {
    async fn fetch(&self, url: &str) -> String {
        let request = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, get_rua());

        match request.send().await {
            Ok(response) => match response.text().await {
                Ok(body) => visible_text(&body),
                Err(e) => {
                    log::error!("Failed to read response body from {}: {:?}", url, e);
                    "".to_string()
                }
            },
            Err(e) => {
                log::error!("Failed to fetch {}: {:?}", url, e);
                "".to_string()
            }
        }
    }
}

/// Text content of the document with script/style blocks dropped and
/// whitespace collapsed, truncated to `MAX_CONTENT_CHARS`.
fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut chunks: Vec<&str> = vec![];
    for node in document.tree.nodes() {
        if let Some(text) = node.value().as_text() {
            let skipped = node
                .ancestors()
                .filter_map(|a| a.value().as_element())
                .any(|el| matches!(el.name(), "script" | "style" | "noscript"));
            if !skipped && !text.trim().is_empty() {
                chunks.push(text.trim());
            }
        }
    }

    let clean_text = chunks
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    clean_text.chars().take(MAX_CONTENT_CHARS).collect()
}
