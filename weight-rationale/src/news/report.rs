//! News weight report and its markdown rendering.

use chrono::NaiveDate;
use serde::Serialize;

use super::types::NewsArticle;
use crate::augment::AugmentationStatus;
use crate::render::{augmentation_note, bullet_list, format_weight, table_cell};

/// Output of the news entry point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsWeightReport {
    pub ticker: String,
    pub weight: f64,
    pub as_of: NaiveDate,
    pub lookback_days: i64,
    pub judgement: String,
    /// Judgement first, at most four entries.
    pub points: Vec<String>,
    /// Scored and ranked, at most `max_articles`.
    pub articles: Vec<NewsArticle>,
    pub augmentation: AugmentationStatus,
}

impl NewsWeightReport {
    pub fn generated_via_augmentation(&self) -> bool {
        self.augmentation.generated()
    }

    /// Positive, negative, and neutral article counts.
    pub fn tone_counts(&self) -> (usize, usize, usize) {
        tone_counts(&self.articles)
    }

    pub fn to_markdown(&self, include_articles: bool) -> String {
        let mut md = String::new();
        md.push_str(&format!("# News-Based Weight Review: {}\n\n", self.ticker));
        md.push_str(&format!("- **As of:** {}\n", self.as_of));
        md.push_str(&format!("- **Assigned Weight:** {}\n", format_weight(self.weight)));
        md.push_str(&format!("- **News Lookback:** {} day(s)\n\n", self.lookback_days));

        md.push_str("## Coverage Assessment\n\n");
        md.push_str(&bullet_list(&self.points));
        md.push('\n');

        if include_articles && !self.articles.is_empty() {
            md.push_str("\n## Notable Headlines\n\n");
            md.push_str(&headline_table(&self.articles));
            md.push('\n');
        }

        if let Some(note) = augmentation_note(&self.augmentation) {
            md.push_str(&format!("\n{note}\n"));
        }
        md
    }
}

pub fn tone_counts(articles: &[NewsArticle]) -> (usize, usize, usize) {
    articles
        .iter()
        .fold((0, 0, 0), |(pos, neg, neu), a| match a.sentiment_score.signum() {
            1 => (pos + 1, neg, neu),
            -1 => (pos, neg + 1, neu),
            _ => (pos, neg, neu + 1),
        })
}

/// Four-column Date/Source/Tone/Headline table.
pub fn headline_table(articles: &[NewsArticle]) -> String {
    let mut table = String::from("| Date | Source | Tone | Headline |\n| --- | --- | --- | --- |");
    for article in articles {
        let date = article
            .published_date()
            .map_or_else(|| "--".to_string(), |d| d.to_string());
        let source = article.source.as_deref().map_or_else(|| "--".to_string(), table_cell);
        table.push_str(&format!(
            "\n| {date} | {source} | {} | {} |",
            article.sentiment,
            table_cell(&article.headline)
        ));
    }
    table
}

/// One line per article for the news prompt.
pub fn prompt_digest(articles: &[NewsArticle]) -> String {
    articles
        .iter()
        .map(|a| {
            format!(
                "- {} | {} | {}: {} - {}",
                a.sentiment.title(),
                a.source.as_deref().unwrap_or("vendor"),
                a.published_iso().as_deref().unwrap_or("recent"),
                a.headline,
                a.summary.as_deref().unwrap_or("(no summary provided)")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
