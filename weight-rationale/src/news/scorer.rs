//! Keyword sentiment scoring, ranking, and the news opinion.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::types::{NewsArticle, Sentiment};

const POSITIVE_TERMS: &[&str] = &[
    "beat",
    "beats",
    "growth",
    "surge",
    "surges",
    "record",
    "bullish",
    "expansion",
    "strong",
    "outperform",
    "outperformance",
    "upgrade",
    "upgrades",
    "partnership",
    "approval",
    "profit",
    "profits",
    "profitability",
    "guidance raise",
    "exceeds",
    "strategic",
    "momentum",
];

const NEGATIVE_TERMS: &[&str] = &[
    "lawsuit",
    "lawsuits",
    "probe",
    "investigation",
    "downgrade",
    "downgrades",
    "decline",
    "declines",
    "miss",
    "misses",
    "loss",
    "losses",
    "recall",
    "cut",
    "cuts",
    "layoff",
    "layoffs",
    "slowdown",
    "headwind",
    "headwinds",
    "concern",
    "concerns",
    "slump",
    "slumps",
];

fn word_patterns(terms: &[&str]) -> Vec<Regex> {
    terms
        .iter()
        .map(|term| Regex::new(&format!(r"\b{}\b", regex::escape(term))).expect("valid regex"))
        .collect()
}

static POSITIVE: Lazy<Vec<Regex>> = Lazy::new(|| word_patterns(POSITIVE_TERMS));
static NEGATIVE: Lazy<Vec<Regex>> = Lazy::new(|| word_patterns(NEGATIVE_TERMS));

/// Points carried by a news opinion, judgement included.
pub const MAX_NEWS_POINTS: usize = 4;
/// Coverage tally plus at most two citations.
const MAX_SUPPORTING: usize = 3;

pub const NO_COVERAGE_JUDGEMENT: &str =
    "No recent vendor news was available; maintain the current allocation until coverage improves.";
pub const NO_COVERAGE_POINT: &str = "Absence of fresh headlines keeps the allocation decision data-light.";
const UPBEAT_FILLER: &str = "Coverage skews upbeat with no material red flags flagged by vendors.";
const RISK_FILLER: &str = "Flow is dominated by risk-oriented stories; watch for escalation.";

/// Count distinct positive and negative terms appearing as whole words.
pub fn score_text(text: &str) -> (Sentiment, i32) {
    let lowered = text.to_lowercase();
    let hits = |patterns: &[Regex]| patterns.iter().filter(|re| re.is_match(&lowered)).count() as i32;
    let score = hits(POSITIVE.as_slice()) - hits(NEGATIVE.as_slice());
    (Sentiment::from_score(score), score)
}

/// Judgement plus supporting points for a weight reviewed against coverage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsOpinion {
    pub judgement: String,
    /// Judgement first, at most [`MAX_NEWS_POINTS`] entries.
    pub points: Vec<String>,
}

/// Stateless news scorer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewsScorer;

impl NewsScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score each article, rank by `(score, lower-cased headline)` descending,
    /// and keep the first `max_articles`.
    pub fn score_and_rank(&self, articles: Vec<NewsArticle>, max_articles: usize) -> Vec<NewsArticle> {
        let mut scored: Vec<(String, NewsArticle)> = articles
            .into_iter()
            .map(|mut article| {
                let (sentiment, score) = score_text(&article.scoring_text());
                article.sentiment = sentiment;
                article.sentiment_score = score;
                (article.headline.to_lowercase(), article)
            })
            .collect();

        scored.sort_by(|(a_key, a), (b_key, b)| {
            b.sentiment_score
                .cmp(&a.sentiment_score)
                .then_with(|| b_key.cmp(a_key))
        });
        scored.truncate(max_articles);
        scored.into_iter().map(|(_, article)| article).collect()
    }

    /// Build the judgement and supporting points for scored articles.
    pub fn opinion(&self, weight: f64, articles: &[NewsArticle]) -> NewsOpinion {
        if articles.is_empty() {
            return NewsOpinion {
                judgement: NO_COVERAGE_JUDGEMENT.to_string(),
                points: vec![NO_COVERAGE_JUDGEMENT.to_string(), NO_COVERAGE_POINT.to_string()],
            };
        }

        let mut positives: Vec<&NewsArticle> =
            articles.iter().filter(|a| a.sentiment_score > 0).collect();
        let mut negatives: Vec<&NewsArticle> =
            articles.iter().filter(|a| a.sentiment_score < 0).collect();
        let net = net_sentiment(articles);

        let judgement = compose_judgement(weight, net, !positives.is_empty(), !negatives.is_empty());

        let mut supporting = vec![coverage_tally(positives.len(), negatives.len(), articles.len())];

        positives.sort_by(|a, b| b.sentiment_score.cmp(&a.sentiment_score));
        negatives.sort_by(|a, b| a.sentiment_score.cmp(&b.sentiment_score));
        for article in positives.iter().chain(negatives.iter()) {
            if supporting.len() >= MAX_SUPPORTING {
                break;
            }
            supporting.push(citation(article));
        }

        if supporting.len() < MAX_SUPPORTING && negatives.is_empty() && !positives.is_empty() {
            supporting.push(UPBEAT_FILLER.to_string());
        }
        if supporting.len() < MAX_SUPPORTING && positives.is_empty() && !negatives.is_empty() {
            supporting.push(RISK_FILLER.to_string());
        }

        let mut points = Vec::with_capacity(MAX_NEWS_POINTS);
        points.push(judgement.clone());
        points.extend(supporting);
        points.truncate(MAX_NEWS_POINTS);

        NewsOpinion { judgement, points }
    }
}

/// Sum of per-article sentiment scores.
pub fn net_sentiment(articles: &[NewsArticle]) -> i64 {
    articles.iter().map(|a| i64::from(a.sentiment_score)).sum()
}

fn compose_judgement(weight: f64, net: i64, has_positive: bool, has_negative: bool) -> String {
    let pct = weight * 100.0;
    if net >= 2 && pct < 8.0 {
        format!(
            "Coverage skews constructive while the position sits at {pct:.1}%; consider whether the weight is too light relative to sentiment."
        )
    } else if net >= 2 {
        format!(
            "Positive news flow backs the current {pct:.1}% allocation; staying the course is consistent with headlines."
        )
    } else if net <= -2 && pct > 12.0 {
        format!(
            "Risk-heavy coverage clashes with a {pct:.1}% stake; trim or hedge until the narrative stabilizes."
        )
    } else if net <= -2 {
        format!("Bearish news cadence argues for keeping exposure restrained at {pct:.1}% or lower.")
    } else if has_positive && has_negative {
        format!(
            "Mixed headlines (bulls vs bears split) suggest the {pct:.1}% weight is acceptable but needs monitoring."
        )
    } else {
        format!(
            "Muted or neutral coverage leaves the {pct:.1}% allocation as a discretionary call pending clearer catalysts."
        )
    }
}

fn coverage_tally(positive: usize, negative: usize, total: usize) -> String {
    let neutral = total.saturating_sub(positive + negative);
    format!(
        "News tone snapshot: {positive} positive, {negative} negative, {neutral} neutral items in the sample."
    )
}

fn citation(article: &NewsArticle) -> String {
    let tone = if article.sentiment_score > 0 {
        "Supportive"
    } else {
        "Cautionary"
    };
    format!(
        "{tone} headline from {} ({}): {}",
        article.source.as_deref().unwrap_or("vendor"),
        article.published_iso().as_deref().unwrap_or("recent"),
        article.headline
    )
}
