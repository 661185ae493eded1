//! News vendor adapters.
//!
//! Each source returns a raw [`NewsPayload`]; parsing and window filtering
//! happen in the retriever so every vendor goes through the same rules.
//!
//! | Source | Endpoint | Role |
//! |---|---|---|
//! | [`GoogleNewsRssSource`] | `{base}/rss/search?q=<TICKER> stock` | primary |
//! | [`YahooNewsSource`] | `{base}/v1/finance/search?q=<TICKER>` | secondary |

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

use super::payload::NewsPayload;
use crate::request::NewsWindow;
use crate::source::{get_text, http_client, SourceError};

/// A vendor that returns raw news for a ticker and window.
#[async_trait]
pub trait NewsSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, ticker: &str, window: &NewsWindow) -> Result<NewsPayload, SourceError>;
}

// ============================================================================
// Syndicated feed (RSS)
// ============================================================================

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

/// Strip tags, decode entities, and collapse whitespace.
pub fn strip_html(raw: &str) -> String {
    let without_tags = HTML_TAG.replace_all(raw, " ");
    let decoded = html_escape::decode_html_entities(&without_tags);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Google News search feed.
pub struct GoogleNewsRssSource {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleNewsRssSource {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: http_client(timeout_secs),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

/// Convert an RSS document into a list payload of article objects.
pub fn parse_feed(xml: &str) -> Result<NewsPayload, SourceError> {
    let channel =
        rss::Channel::read_from(xml.as_bytes()).map_err(|e| SourceError::Decode(e.to_string()))?;

    let items: Vec<Value> = channel
        .items()
        .iter()
        .filter_map(|item| {
            let title = strip_html(item.title()?);
            if title.is_empty() {
                return None;
            }
            Some(json!({
                "title": title,
                "pubDate": item.pub_date(),
                "description": item.description().map(strip_html),
                "source": item.source().and_then(|s| s.title()),
                "link": item.link(),
            }))
        })
        .collect();

    Ok(NewsPayload::List(items))
}

#[async_trait]
impl NewsSource for GoogleNewsRssSource {
    fn name(&self) -> &'static str {
        "google_news_rss"
    }

    async fn fetch(&self, ticker: &str, _window: &NewsWindow) -> Result<NewsPayload, SourceError> {
        let url = format!("{}/rss/search", self.base_url);
        let query = format!("{ticker} stock");
        let body = get_text(
            &self.client,
            &url,
            &[("q", query.as_str()), ("hl", "en-US"), ("gl", "US"), ("ceid", "US:en")],
        )
        .await?;
        parse_feed(&body)
    }
}

// ============================================================================
// Vendor-native headlines (Yahoo Finance search)
// ============================================================================

/// Yahoo Finance search endpoint, `news` container.
pub struct YahooNewsSource {
    client: reqwest::Client,
    base_url: String,
}

impl YahooNewsSource {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: http_client(timeout_secs),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl NewsSource for YahooNewsSource {
    fn name(&self) -> &'static str {
        "yahoo_news"
    }

    async fn fetch(&self, ticker: &str, window: &NewsWindow) -> Result<NewsPayload, SourceError> {
        let url = format!("{}/v1/finance/search", self.base_url);
        // Over-fetch: the window filter runs after the vendor's own cut.
        let count = window.max_articles.saturating_mul(2).clamp(10, 50).to_string();
        let body = get_text(
            &self.client,
            &url,
            &[("q", ticker), ("newsCount", count.as_str()), ("quotesCount", "0")],
        )
        .await?;

        let value: Value =
            serde_json::from_str(&body).map_err(|e| SourceError::Decode(e.to_string()))?;
        match value.get("news") {
            Some(Value::Array(items)) => Ok(NewsPayload::Wrapped {
                key: "news".to_string(),
                items: items.clone(),
            }),
            _ => Ok(NewsPayload::Empty),
        }
    }
}
