//! Primary-then-secondary news retrieval.

use std::sync::Arc;

use tracing::{debug, warn};

use super::parser::NewsParser;
use super::source::{GoogleNewsRssSource, NewsSource, YahooNewsSource};
use super::types::NewsArticle;
use crate::request::NewsWindow;
use weight_common::NewsConfig;

/// Fetches from the primary source and falls back to the secondary when the
/// primary yields no articles inside the window.
#[derive(Clone)]
pub struct NewsRetriever {
    primary: Arc<dyn NewsSource>,
    secondary: Option<Arc<dyn NewsSource>>,
    parser: NewsParser,
}

impl NewsRetriever {
    pub fn new(primary: Arc<dyn NewsSource>) -> Self {
        Self {
            primary,
            secondary: None,
            parser: NewsParser::new(),
        }
    }

    pub fn with_secondary(mut self, secondary: Arc<dyn NewsSource>) -> Self {
        self.secondary = Some(secondary);
        self
    }

    /// Google News RSS first, Yahoo Finance headlines second.
    pub fn from_config(config: &NewsConfig) -> Self {
        Self::new(Arc::new(GoogleNewsRssSource::new(
            config.rss_base_url.clone(),
            config.timeout_secs,
        )))
        .with_secondary(Arc::new(YahooNewsSource::new(
            config.vendor_base_url.clone(),
            config.timeout_secs,
        )))
    }

    /// Parsed, deduplicated, in-window articles. Never fails.
    pub async fn retrieve(&self, ticker: &str, window: &NewsWindow) -> Vec<NewsArticle> {
        let primary = self.collect(self.primary.as_ref(), ticker, window).await;
        if !primary.is_empty() {
            return primary;
        }
        match &self.secondary {
            Some(secondary) => {
                debug!(
                    ticker,
                    primary = self.primary.name(),
                    secondary = secondary.name(),
                    "Primary news source empty, falling back"
                );
                self.collect(secondary.as_ref(), ticker, window).await
            }
            None => primary,
        }
    }

    async fn collect(&self, source: &dyn NewsSource, ticker: &str, window: &NewsWindow) -> Vec<NewsArticle> {
        match source.fetch(ticker, window).await {
            Ok(payload) => {
                let articles = self.parser.parse_in_window(payload, window);
                debug!(
                    ticker,
                    source = source.name(),
                    count = articles.len(),
                    start = %window.start,
                    end = %window.end,
                    "News fetched"
                );
                articles
            }
            Err(err) => {
                warn!(ticker, source = source.name(), error = %err, "News fetch failed");
                Vec::new()
            }
        }
    }
}
