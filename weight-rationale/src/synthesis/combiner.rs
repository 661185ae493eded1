//! Merges fundamental and news points into one bounded summary.

use std::collections::HashSet;

use crate::fundamentals::{MetricKey, MetricMap};
use crate::news::report::tone_counts;
use crate::news::NewsArticle;
use weight_common::util::normalize_whitespace_lower;

pub const MIN_SUMMARY_POINTS: usize = 5;
pub const MAX_SUMMARY_POINTS: usize = 6;

/// Generic fillers, all distinct, used in order until the minimum is met.
const FILLERS: &[&str] = &[
    "Vendor data remains sparse; maintain close monitoring before resizing.",
    "Revisit the allocation once fresh filings or headlines arrive.",
    "Let the next earnings update confirm the sizing before adding or trimming.",
    "Cross-check the weight against portfolio risk limits before any change.",
    "Keep the current sizing under review as evidence accumulates.",
];

/// Ordered, de-duplicated point collector.
struct Summary {
    points: Vec<String>,
    seen: HashSet<String>,
}

impl Summary {
    fn new() -> Self {
        Self {
            points: Vec::with_capacity(MAX_SUMMARY_POINTS),
            seen: HashSet::new(),
        }
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    /// Add unless blank or already present after normalization.
    fn add(&mut self, point: &str) {
        let key = normalize_whitespace_lower(point);
        if key.is_empty() || !self.seen.insert(key) {
            return;
        }
        self.points.push(point.to_string());
    }
}

/// Stateless combiner.
#[derive(Debug, Clone, Copy, Default)]
pub struct SynthesisCombiner;

impl SynthesisCombiner {
    pub fn new() -> Self {
        Self
    }

    /// Five or six distinct bullets: lead fundamental point, lead news point,
    /// remaining fundamental points, remaining news points, then snapshots and
    /// fillers as needed.
    pub fn combine(
        &self,
        fundamental_points: &[String],
        news_points: &[String],
        metrics: &MetricMap,
        articles: &[NewsArticle],
    ) -> Vec<String> {
        let mut summary = Summary::new();

        if let Some(first) = fundamental_points.first() {
            summary.add(first);
        }
        if let Some(first) = news_points.first() {
            summary.add(first);
        }

        for point in fundamental_points.iter().skip(1) {
            if summary.len() >= MAX_SUMMARY_POINTS {
                break;
            }
            summary.add(point);
        }
        for point in news_points.iter().skip(1) {
            if summary.len() >= MAX_SUMMARY_POINTS {
                break;
            }
            summary.add(point);
        }

        if summary.len() < MIN_SUMMARY_POINTS {
            if let Some(snapshot) = metrics_snapshot(metrics) {
                summary.add(&snapshot);
            }
        }
        if summary.len() < MIN_SUMMARY_POINTS {
            if let Some(cadence) = news_cadence(articles) {
                summary.add(&cadence);
            }
        }

        let mut fillers = FILLERS.iter();
        let mut extra = 0;
        while summary.len() < MIN_SUMMARY_POINTS {
            match fillers.next() {
                Some(filler) => summary.add(filler),
                None => {
                    extra += 1;
                    summary.add(&format!(
                        "Additional review point {extra}: monitor for new evidence before resizing."
                    ));
                }
            }
        }

        let mut points = summary.points;
        points.truncate(MAX_SUMMARY_POINTS);
        points
    }
}

/// `Fundamentals check-in: P/E 15.0×, ROE 22.0%, ...` over the present ratios.
pub fn metrics_snapshot(metrics: &MetricMap) -> Option<String> {
    let fields: [(MetricKey, &str, fn(f64) -> String); 5] = [
        (MetricKey::PeRatio, "P/E", |v| format!("{v:.1}×")),
        (MetricKey::Roe, "ROE", |v| format!("{v:.1}%")),
        (MetricKey::ProfitMargin, "margin", |v| format!("{v:.1}%")),
        (MetricKey::RevenueGrowth, "growth", |v| format!("{v:.1}%")),
        (MetricKey::DebtToEquity, "D/E", |v| format!("{v:.2}×")),
    ];
    let parts: Vec<String> = fields
        .iter()
        .filter_map(|(key, label, render)| metrics.get(*key).map(|v| format!("{label} {}", render(v))))
        .collect();
    (!parts.is_empty()).then(|| format!("Fundamentals check-in: {}", parts.join(", ")))
}

/// Tone counts over the articles, `None` when there are none.
pub fn news_cadence(articles: &[NewsArticle]) -> Option<String> {
    if articles.is_empty() {
        return None;
    }
    let (positive, negative, neutral) = tone_counts(articles);
    Some(format!(
        "News cadence: {positive} positive / {negative} negative / {neutral} neutral headlines in scope."
    ))
}
