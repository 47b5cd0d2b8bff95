//! Page fetching and text extraction
//!
//! A page is fetched once, asking for JSON. The body is then classified:
//! JSON passes through untouched, anything else is treated as HTML and
//! reduced to its headings and paragraphs.

use reqwest::header::ACCEPT;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::de::IgnoredAny;
use std::time::Duration;
use url::Url;

use crate::core::config::FetchConfig;
use crate::core::{Result, StewardError};

/// Elements whose text is kept from an HTML page
const TEXT_ELEMENTS: &str = "h1, h2, h3, h4, h5, h6, p";

/// What a fetched page turned into
#[derive(Debug, Clone, PartialEq)]
pub enum PageContent {
    /// Body that parsed as JSON, kept as the exact text received
    Structured(String),
    /// Text extracted from markup
    Text(String),
}

impl PageContent {
    /// Classify a response body and extract its content
    pub fn from_body(body: &str) -> Self {
        // Only validate; re-serializing would reorder keys and round big numbers
        match serde_json::from_str::<IgnoredAny>(body) {
            Ok(_) => PageContent::Structured(body.trim().to_string()),
            Err(_) => PageContent::Text(extract_text(body)),
        }
    }

    /// Text handed to the model
    pub fn render(&self) -> String {
        match self {
            PageContent::Structured(raw) => raw.clone(),
            PageContent::Text(text) if text.is_empty() => {
                "The page contained no heading or paragraph text.".to_string()
            }
            PageContent::Text(text) => text.clone(),
        }
    }
}

/// Text of every heading and paragraph in document order, one per line
pub fn extract_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let Ok(sel) = Selector::parse(TEXT_ELEMENTS) else {
        return String::new();
    };

    doc.select(&sel)
        .map(|el| el.text().map(str::trim).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fetches URLs for the agent
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Create a fetcher
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }

    /// Fetch a page; any failure comes back as `None`
    pub async fn fetch(&self, url: &str) -> Option<PageContent> {
        match self.try_fetch(url).await {
            Ok(content) => Some(content),
            Err(e) => {
                tracing::warn!(url, "request failed: {}", e);
                None
            }
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<PageContent> {
        let url = parse_absolute_url(url)?;

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        Ok(PageContent::from_body(&body))
    }
}

/// Accept only absolute http(s) URLs
pub fn parse_absolute_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| StewardError::fetch(format!("invalid URL '{}': {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(StewardError::fetch(format!(
            "unsupported URL scheme '{}'",
            other
        ))),
    }
}
