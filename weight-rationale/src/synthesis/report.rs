//! Combined weight review and its markdown rendering.

use chrono::NaiveDate;
use serde::Serialize;

use crate::augment::AugmentationStatus;
use crate::fundamentals::FundamentalReport;
use crate::news::NewsWeightReport;
use crate::render::{augmentation_note, bullet_list, format_weight, strip_top_heading};

/// Output of the combined entry point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightSynthesisReport {
    pub ticker: String,
    pub weight: f64,
    pub as_of: NaiveDate,
    pub lookback_days: i64,
    /// Five or six combined bullets, or the generated replacement.
    pub summary_points: Vec<String>,
    pub fundamental_report: FundamentalReport,
    pub news_report: NewsWeightReport,
    pub augmentation: AugmentationStatus,
}

impl WeightSynthesisReport {
    pub fn generated_via_augmentation(&self) -> bool {
        self.augmentation.generated()
    }

    pub fn to_markdown(&self, include_components: bool, include_metrics: bool, include_articles: bool) -> String {
        let mut md = String::new();
        md.push_str(&format!("# Combined Weight Review: {}\n\n", self.ticker));
        md.push_str(&format!("- **As of:** {}\n", self.as_of));
        md.push_str(&format!("- **Assigned Weight:** {}\n", format_weight(self.weight)));
        md.push_str(&format!("- **News Lookback:** {} day(s)\n\n", self.lookback_days));

        md.push_str("## Unified Summary\n\n");
        md.push_str(&bullet_list(&self.summary_points));
        md.push('\n');

        if include_components {
            let fundamentals = self.fundamental_report.to_markdown(include_metrics);
            md.push_str("\n## Fundamental Agent Detail\n\n");
            md.push_str(strip_top_heading(&fundamentals).trim_end());
            md.push('\n');

            let news = self.news_report.to_markdown(include_articles);
            md.push_str("\n## News Agent Detail\n\n");
            md.push_str(strip_top_heading(&news).trim_end());
            md.push('\n');
        }

        if let Some(note) = augmentation_note(&self.augmentation) {
            md.push_str(&format!("\n{note}\n"));
        }
        md
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fundamentals::{MetricKey, MetricMap};

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 8).unwrap()
    }

    fn report(augmentation: AugmentationStatus) -> WeightSynthesisReport {
        let fundamental_report = FundamentalReport {
            ticker: "MSFT".into(),
            weight: 0.08,
            as_of: as_of(),
            rationale_points: vec!["Fundamentals hold up.".into()],
            metrics: MetricMap::empty().with(MetricKey::PeRatio, 31.2),
            score: 1.0,
            augmentation: AugmentationStatus::NotRequested,
        };
        let news_report = NewsWeightReport {
            ticker: "MSFT".into(),
            weight: 0.08,
            as_of: as_of(),
            lookback_days: 5,
            judgement: "News is balanced.".into(),
            points: vec!["News is balanced.".into()],
            articles: Vec::new(),
            augmentation: AugmentationStatus::NotRequested,
        };
        WeightSynthesisReport {
            ticker: "MSFT".into(),
            weight: 0.08,
            as_of: as_of(),
            lookback_days: 5,
            summary_points: vec!["One".into(), "Two".into()],
            fundamental_report,
            news_report,
            augmentation,
        }
    }

    #[test]
    fn test_header_and_summary() {
        let md = report(AugmentationStatus::NotRequested).to_markdown(false, false, false);
        assert!(md.starts_with(
            "# Combined Weight Review: MSFT\n\n- **As of:** 2024-03-08\n- **Assigned Weight:** 8.00%\n- **News Lookback:** 5 day(s)\n\n"
        ));
        assert!(md.contains("## Unified Summary\n\n- One\n- Two\n"));
        assert!(!md.contains("Agent Detail"));
        assert!(!md.contains("_Generated without"));
    }

    #[test]
    fn test_components_without_their_titles() {
        let md = report(AugmentationStatus::NotRequested).to_markdown(true, true, true);
        let fundamentals = md.find("## Fundamental Agent Detail").unwrap();
        let news = md.find("## News Agent Detail").unwrap();
        assert!(fundamentals < news);
        assert!(!md.contains("# Portfolio Weight Rationale"));
        assert!(!md.contains("# News-Based Weight Review"));
        assert!(md.contains("## Key Fundamental Metrics"));
        assert!(md.contains("- Fundamentals hold up."));
        assert!(md.contains("- News is balanced."));
    }

    #[test]
    fn test_metrics_flag_passes_through() {
        let md = report(AugmentationStatus::NotRequested).to_markdown(true, false, false);
        assert!(!md.contains("## Key Fundamental Metrics"));
    }

    #[test]
    fn test_declined_footnote_is_last() {
        let md = report(AugmentationStatus::Declined {
            reason: "No model provided".into(),
        })
        .to_markdown(true, true, true);
        assert!(md.trim_end().ends_with("_Generated without language-model assistance: No model provided_"));
    }
}
