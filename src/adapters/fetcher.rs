use crate::domain::ports::TextFetcher;
use crate::utils::error::{Result, VerifyError};
use async_trait::async_trait;
use reqwest::Client;
use scraper::node::Node;
use scraper::{ElementRef, Html};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// 不屬於正文的區塊
const SKIPPED_TAGS: [&str; 8] = [
    "script", "style", "noscript", "template", "nav", "header", "footer", "aside",
];

/// Fetches a page over HTTP and returns its visible text.
#[derive(Debug, Clone)]
pub struct HttpTextFetcher {
    client: Client,
}

impl HttpTextFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self { client })
    }

    async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(VerifyError::FetchError {
                url: url.to_string(),
                message: format!("HTTP {}", status),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl TextFetcher for HttpTextFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!(url = %url, "Fetching page");
        let html = self.fetch_html(url).await?;
        let text = extract_visible_text(&html);

        if text.is_empty() {
            return Err(VerifyError::FetchError {
                url: url.to_string(),
                message: "page has no visible text".to_string(),
            });
        }

        debug!(url = %url, chars = text.len(), "Page text extracted");
        Ok(text)
    }
}

/// Text content of an HTML document with scripts, styles and page chrome removed,
/// joined by single spaces.
pub fn extract_visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut pieces = Vec::new();
    collect_text(document.root_element(), &mut pieces);
    pieces.join(" ")
}

fn collect_text(element: ElementRef<'_>, pieces: &mut Vec<String>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let words: Vec<&str> = text.split_whitespace().collect();
                if !words.is_empty() {
                    pieces.push(words.join(" "));
                }
            }
            Node::Element(el) if SKIPPED_TAGS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, pieces);
                }
            }
            _ => {}
        }
    }
}
