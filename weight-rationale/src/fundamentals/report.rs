//! Fundamentals report and its markdown rendering.

use chrono::NaiveDate;
use serde::Serialize;

use super::types::{MetricKind, MetricMap};
use crate::augment::AugmentationStatus;
use crate::render::{augmentation_note, bullet_list, format_weight};

const NO_RATIONALE: &str =
    "Unable to derive a data-backed rationale; please review the fundamentals manually.";
const NO_METRICS: &str = "No fundamentals were returned by the data vendor for this ticker.";

/// Output of the fundamentals entry point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundamentalReport {
    pub ticker: String,
    pub weight: f64,
    pub as_of: NaiveDate,
    /// Rule-based statements, or generated bullets when augmentation succeeded.
    pub rationale_points: Vec<String>,
    pub metrics: MetricMap,
    /// Conviction score from the rule engine, kept even when bullets were generated.
    pub score: f64,
    pub augmentation: AugmentationStatus,
}

impl FundamentalReport {
    pub fn generated_via_augmentation(&self) -> bool {
        self.augmentation.generated()
    }

    pub fn to_markdown(&self, include_metrics: bool) -> String {
        let mut md = String::new();
        md.push_str(&format!("# Portfolio Weight Rationale: {}\n\n", self.ticker));
        md.push_str(&format!("- **As of:** {}\n", self.as_of));
        md.push_str(&format!("- **Assigned Weight:** {}\n\n", format_weight(self.weight)));

        md.push_str("## Why This Weight\n\n");
        if self.rationale_points.is_empty() {
            md.push_str(&format!("- {NO_RATIONALE}\n"));
        } else {
            md.push_str(&bullet_list(&self.rationale_points));
            md.push('\n');
        }

        if include_metrics {
            md.push_str("\n## Key Fundamental Metrics\n\n");
            md.push_str(&metrics_table(&self.metrics));
            md.push('\n');
        }

        if let Some(note) = augmentation_note(&self.augmentation) {
            md.push_str(&format!("\n{note}\n"));
        }
        md
    }
}

/// Scale a dollar amount to T/B/M/K.
pub fn format_currency(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e12 {
        format!("${:.2}T", value / 1e12)
    } else if abs >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("${:.2}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("${:.0}K", value / 1e3)
    } else {
        format!("${value:.0}")
    }
}

fn format_metric(kind: MetricKind, value: f64) -> String {
    match kind {
        MetricKind::Currency => format_currency(value),
        MetricKind::Percent => format!("{value:.2}%"),
        MetricKind::Multiple => format!("{value:.2}"),
    }
}

/// Two-column Metric/Value table of the present metrics, in display order.
pub fn metrics_table(metrics: &MetricMap) -> String {
    let rows: Vec<String> = metrics
        .present()
        .map(|(key, value)| format!("| {} | {} |", key.label(), format_metric(key.kind(), value)))
        .collect();
    if rows.is_empty() {
        return NO_METRICS.to_string();
    }
    format!("| Metric | Value |\n| --- | --- |\n{}", rows.join("\n"))
}

/// `- Label: value` lines for prompts.
pub fn metrics_prompt_summary(metrics: &MetricMap) -> String {
    metrics
        .present()
        .map(|(key, value)| format!("- {}: {}", key.label(), format_metric(key.kind(), value)))
        .collect::<Vec<_>>()
        .join("\n")
}
