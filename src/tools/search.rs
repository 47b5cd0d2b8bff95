//! Web search through DuckDuckGo's HTML endpoint
//!
//! Returns a short ranked list of results for the model to pick URLs from.

use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::core::config::SearchConfig;
use crate::core::{Result, StewardError};

/// Upper bound on results regardless of what the model asks for
pub const MAX_RESULTS_CEILING: usize = 10;

/// One search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

/// Client for the search provider
pub struct SearchClient {
    client: Client,
    config: SearchConfig,
}

impl SearchClient {
    /// Create a search client
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0")
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Result count used when the caller does not ask for one
    pub fn default_max_results(&self) -> usize {
        self.config.max_results
    }

    /// Search and return at most `max_results` hits in provider order
    pub async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(StewardError::search("query must not be empty"));
        }
        if max_results == 0 {
            return Ok(Vec::new());
        }
        let max_results = max_results.min(MAX_RESULTS_CEILING);

        let safe_search = if self.config.safe_search { "1" } else { "-2" };
        let form = [
            ("q", query),
            ("kl", self.config.region.as_str()),
            ("kp", safe_search),
            ("df", self.config.time_limit.as_str()),
        ];

        let response = self
            .client
            .post(format!("{}/html/", self.config.base_url.trim_end_matches('/')))
            .form(&form)
            .header("Accept", "text/html")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StewardError::search(format!(
                "search provider returned {}",
                status
            )));
        }

        let body = response.text().await?;
        let results = parse_results(&body, max_results);
        tracing::debug!(query, count = results.len(), "search finished");

        Ok(results)
    }
}

fn selector(css: &str) -> Selector {
    // Only called with literal selectors below
    Selector::parse(css).unwrap_or_else(|e| panic!("bad selector {css:?}: {e}"))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pull results out of a DuckDuckGo HTML page; ads are skipped
pub fn parse_results(html: &str, max_results: usize) -> Vec<SearchResult> {
    let doc = Html::parse_document(html);
    let result_sel = selector(".result");
    let link_sel = selector("a.result__a");
    let snippet_sel = selector(".result__snippet");

    let mut results = Vec::new();
    for result in doc.select(&result_sel) {
        if results.len() >= max_results {
            break;
        }
        if result.value().classes().any(|c| c == "result--ad") {
            continue;
        }

        let Some(link) = result.select(&link_sel).next() else {
            continue;
        };
        let url = link
            .value()
            .attr("href")
            .map(resolve_result_url)
            .unwrap_or_default();

        results.push(SearchResult {
            title: element_text(link),
            snippet: result
                .select(&snippet_sel)
                .next()
                .map(element_text)
                .unwrap_or_default(),
            url,
        });
    }

    results
}

/// DuckDuckGo wraps result links in `/l/?uddg=` redirects; unwrap them
fn resolve_result_url(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{href}")
    } else {
        href.to_string()
    };

    match Url::parse(&absolute) {
        Ok(parsed) => parsed
            .query_pairs()
            .find(|(k, _)| k == "uddg")
            .map(|(_, v)| v.into_owned())
            .unwrap_or(absolute),
        Err(_) => href.to_string(),
    }
}
