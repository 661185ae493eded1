//! Payload to article conversion.
//!
//! One function per [`NewsPayload`] shape. Parsing never fails: anything
//! that cannot be read as an article is skipped.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use super::payload::NewsPayload;
use super::types::{dedup_articles, NewsArticle};
use crate::request::NewsWindow;
use weight_common::util::truncate_chars;

const HEADLINE_KEYS: &[&str] = &["headline", "title", "news_title", "name"];
const SUMMARY_KEYS: &[&str] = &["summary", "description", "content", "snippet"];
const DATE_KEYS: &[&str] = &[
    "datetime",
    "published_at",
    "publishedAt",
    "providerPublishTime",
    "time_published",
    "pubDate",
    "timestamp",
    "date",
    "time",
];
const SOURCE_KEYS: &[&str] = &["source", "publisher", "site", "author"];
const URL_KEYS: &[&str] = &["url", "link", "article_url"];

const MAX_HEADLINE_CHARS: usize = 200;
/// Epoch values above this are milliseconds.
const MILLIS_THRESHOLD: f64 = 1e12;

static BLOCK_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));
static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4}-\d{2}-\d{2})\b").expect("valid regex"));

/// Stateless payload parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewsParser;

impl NewsParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse any payload shape into deduplicated, unscored articles.
    pub fn parse(&self, payload: NewsPayload) -> Vec<NewsArticle> {
        let articles = match payload {
            NewsPayload::Empty => Vec::new(),
            NewsPayload::Article(map) => parse_article(&map).into_iter().collect(),
            NewsPayload::List(items) | NewsPayload::Wrapped { items, .. } => parse_list(items),
            NewsPayload::Text(text) => parse_text(&text),
        };
        dedup_articles(articles)
    }

    /// Parse, then keep only articles dated inside the window.
    pub fn parse_in_window(&self, payload: NewsPayload, window: &NewsWindow) -> Vec<NewsArticle> {
        filter_window(self.parse(payload), window)
    }
}

fn parse_list(items: Vec<Value>) -> Vec<NewsArticle> {
    items
        .into_iter()
        .flat_map(|item| match NewsPayload::from_value(item) {
            NewsPayload::Article(map) => parse_article(&map).into_iter().collect(),
            NewsPayload::List(nested) | NewsPayload::Wrapped { items: nested, .. } => {
                parse_list(nested)
            }
            NewsPayload::Text(text) => parse_text(&text),
            NewsPayload::Empty => Vec::new(),
        })
        .collect()
}

/// Read one article-like object. `None` when it has no usable headline.
pub fn parse_article(map: &Map<String, Value>) -> Option<NewsArticle> {
    let headline = first_text(map, HEADLINE_KEYS)?;
    let mut article = NewsArticle::new(headline)?;

    if let Some(summary) = first_text(map, SUMMARY_KEYS) {
        article = article.summary(summary);
    }
    if let Some(source) = first_source(map) {
        article = article.source(source);
    }
    if let Some(url) = first_text(map, URL_KEYS) {
        article = article.url(url);
    }
    article.published_at = DATE_KEYS
        .iter()
        .filter_map(|key| map.get(*key))
        .find_map(parse_timestamp);
    Some(article)
}

/// Split free text into blank-line blocks: first line is the headline, the
/// rest the summary. A `YYYY-MM-DD` anywhere in the block dates it.
pub fn parse_text(text: &str) -> Vec<NewsArticle> {
    BLOCK_SPLIT
        .split(text)
        .filter_map(|block| {
            let mut lines = block.lines().map(str::trim).filter(|l| !l.is_empty());
            let headline = truncate_chars(lines.next()?, MAX_HEADLINE_CHARS);
            let summary = lines.collect::<Vec<_>>().join(" ");
            let mut article = NewsArticle::new(headline)?.summary(summary);
            article.published_at = ISO_DATE
                .captures(block)
                .and_then(|caps| caps.get(1))
                .and_then(|m| NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok())
                .and_then(midnight_utc);
            Some(article)
        })
        .collect()
}

/// Drop undated articles and those outside `[start, end]`.
pub fn filter_window(articles: Vec<NewsArticle>, window: &NewsWindow) -> Vec<NewsArticle> {
    articles
        .into_iter()
        .filter(|a| a.published_date().is_some_and(|d| window.contains(d)))
        .collect()
}

fn first_text(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().filter_map(|key| map.get(*key)).find_map(scalar_text)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Sources are sometimes objects like `{"name": "Reuters"}`.
fn first_source(map: &Map<String, Value>) -> Option<String> {
    SOURCE_KEYS
        .iter()
        .filter_map(|key| map.get(*key))
        .find_map(|value| match value {
            Value::Object(inner) => ["name", "title"]
                .iter()
                .filter_map(|k| inner.get(*k))
                .find_map(scalar_text),
            other => scalar_text(other),
        })
}

/// Lenient timestamp reader: epoch seconds or millis, RFC 3339, RFC 2822,
/// naive date-times (assumed UTC), compact `20240301T120000`, or a bare date.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_f64().and_then(from_epoch),
        Value::String(s) => parse_timestamp_str(s.trim()),
        _ => None,
    }
}

fn parse_timestamp_str(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    if raw.bytes().all(|b| b.is_ascii_digit()) && raw.len() > 8 {
        return raw.parse::<f64>().ok().and_then(from_epoch);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y%m%dT%H%M%S",
        "%Y%m%dT%H%M",
    ];
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(Utc.from_utc_datetime(&naive));
    }
    ["%Y-%m-%d", "%Y%m%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .and_then(midnight_utc)
}

fn from_epoch(raw: f64) -> Option<DateTime<Utc>> {
    if !raw.is_finite() || raw < 0.0 {
        return None;
    }
    let secs = if raw > MILLIS_THRESHOLD { raw / 1000.0 } else { raw };
    DateTime::from_timestamp(secs.trunc() as i64, 0)
}

fn midnight_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn window() -> NewsWindow {
        NewsWindow::ending(NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(), 7, 8)
    }

    #[test]
    fn test_single_article_object() {
        let payload = NewsPayload::from_value(json!({
            "title": "  Apple beats estimates ",
            "description": "Record quarter",
            "source": {"id": "reuters", "name": "Reuters"},
            "link": "https://example.com/a",
            "publishedAt": "2024-03-05T10:00:00Z"
        }));
        let articles = NewsParser.parse(payload);
        assert_eq!(articles.len(), 1);
        let article = &articles[0];
        assert_eq!(article.headline, "Apple beats estimates");
        assert_eq!(article.summary.as_deref(), Some("Record quarter"));
        assert_eq!(article.source.as_deref(), Some("Reuters"));
        assert_eq!(article.url.as_deref(), Some("https://example.com/a"));
        assert_eq!(article.published_iso().as_deref(), Some("2024-03-05T10:00:00+00:00"));
    }

    #[test]
    fn test_wrapped_list_with_nested_shapes() {
        let payload = NewsPayload::from_value(json!({
            "feed": [
                {"title": "First", "time_published": "20240304T093000"},
                [{"headline": "Nested"}],
                {"summary": "no headline here"},
                "Plain text block\nwith summary",
                null
            ]
        }));
        let headlines: Vec<_> = NewsParser
            .parse(payload)
            .into_iter()
            .map(|a| a.headline)
            .collect();
        assert_eq!(headlines, vec!["First", "Nested", "Plain text block"]);
    }

    #[test]
    fn test_duplicate_headlines_collapse() {
        let payload = NewsPayload::from_value(json!([
            {"title": "Tesla Recall Widens"},
            {"title": "  tesla   recall widens"}
        ]));
        assert_eq!(NewsParser.parse(payload).len(), 1);
    }

    #[test]
    fn test_text_blocks() {
        let text = format!(
            "{}\nsecond line\n third line\n\n  \n2024-03-02 Microsoft expands partnership\n\n",
            "x".repeat(250)
        );
        let articles = parse_text(&text);
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].headline.chars().count(), MAX_HEADLINE_CHARS);
        assert_eq!(articles[0].summary.as_deref(), Some("second line third line"));
        assert!(articles[0].published_at.is_none());
        assert_eq!(
            articles[1].published_date(),
            NaiveDate::from_ymd_opt(2024, 3, 2)
        );
    }

    #[test_case(json!(1709294400), "2024-03-01T12:00:00+00:00" ; "epoch seconds")]
    #[test_case(json!(1709294400000_i64), "2024-03-01T12:00:00+00:00" ; "epoch millis")]
    #[test_case(json!("1709294400"), "2024-03-01T12:00:00+00:00" ; "epoch string")]
    #[test_case(json!("2024-03-01T12:00:00Z"), "2024-03-01T12:00:00+00:00" ; "rfc3339")]
    #[test_case(json!("Fri, 01 Mar 2024 12:00:00 GMT"), "2024-03-01T12:00:00+00:00" ; "rfc2822")]
    #[test_case(json!("2024-03-01 12:00:00"), "2024-03-01T12:00:00+00:00" ; "naive")]
    #[test_case(json!("20240301T120000"), "2024-03-01T12:00:00+00:00" ; "compact")]
    #[test_case(json!("2024-03-01"), "2024-03-01T00:00:00+00:00" ; "date only")]
    fn test_parse_timestamp(raw: Value, expected: &str) {
        let parsed = parse_timestamp(&raw).unwrap();
        assert_eq!(parsed.to_rfc3339(), expected);
    }

    #[test_case(json!("yesterday") ; "words")]
    #[test_case(json!(-5) ; "negative epoch")]
    #[test_case(json!(true) ; "bool")]
    fn test_unparseable_timestamp(raw: Value) {
        assert!(parse_timestamp(&raw).is_none());
    }

    #[test]
    fn test_window_filter_is_inclusive_and_drops_undated() {
        let payload = NewsPayload::from_value(json!([
            {"title": "On start", "date": "2024-03-01"},
            {"title": "Before", "date": "2024-02-29"},
            {"title": "On end", "date": "2024-03-08T23:59:00Z"},
            {"title": "After", "date": "2024-03-09"},
            {"title": "Undated"}
        ]));
        let headlines: Vec<_> = NewsParser
            .parse_in_window(payload, &window())
            .into_iter()
            .map(|a| a.headline)
            .collect();
        assert_eq!(headlines, vec!["On start", "On end"]);
    }
}
