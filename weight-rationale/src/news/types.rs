//! News article model.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use weight_common::util::normalize_whitespace_lower;

/// Tone assigned by the keyword scorer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    pub fn from_score(score: i32) -> Self {
        match score.signum() {
            1 => Self::Positive,
            -1 => Self::Negative,
            _ => Self::Neutral,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }

    /// Capitalised form used in citations and prompt digests.
    pub fn title(self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One headline from a news source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    /// Never empty.
    pub headline: String,
    pub published_at: Option<DateTime<Utc>>,
    pub summary: Option<String>,
    pub source: Option<String>,
    pub url: Option<String>,
    pub sentiment: Sentiment,
    /// Positive keyword hits minus negative keyword hits.
    pub sentiment_score: i32,
}

impl NewsArticle {
    /// An unscored article. Returns `None` for a blank headline.
    pub fn new(headline: impl AsRef<str>) -> Option<Self> {
        let headline = headline.as_ref().trim();
        if headline.is_empty() {
            return None;
        }
        Some(Self {
            headline: headline.to_string(),
            published_at: None,
            summary: None,
            source: None,
            url: None,
            sentiment: Sentiment::Neutral,
            sentiment_score: 0,
        })
    }

    pub fn published(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = Some(at);
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = non_blank(summary.into());
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = non_blank(source.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = non_blank(url.into());
        self
    }

    /// Identity key: lower-cased headline with whitespace runs collapsed.
    pub fn identity(&self) -> String {
        normalize_whitespace_lower(&self.headline)
    }

    pub fn published_date(&self) -> Option<NaiveDate> {
        self.published_at.map(|at| at.date_naive())
    }

    /// ISO-8601 timestamp, or `None` when undated.
    pub fn published_iso(&self) -> Option<String> {
        self.published_at
            .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, false))
    }

    /// Headline and summary joined, as fed to the scorer.
    pub fn scoring_text(&self) -> String {
        match &self.summary {
            Some(summary) => format!("{} {}", self.headline, summary),
            None => self.headline.clone(),
        }
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Keep the first article for each identity key.
pub fn dedup_articles(articles: Vec<NewsArticle>) -> Vec<NewsArticle> {
    let mut seen = HashSet::new();
    articles
        .into_iter()
        .filter(|article| seen.insert(article.identity()))
        .collect()
}
