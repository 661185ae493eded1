//! Rule-based fundamental scoring.
//!
//! Each rule inspects one metric and, when a threshold is crossed, adjusts a
//! signed conviction score and contributes a supportive or cautionary
//! statement. The statements are then ordered behind an alignment statement
//! that relates the score to the assigned weight.

use serde::{Deserialize, Serialize};

use super::types::{MetricKey, MetricMap};

/// Hard cap on rationale statements, alignment included.
pub const MAX_STATEMENTS: usize = 4;
/// Below this many statements the insufficient-data filler is appended.
const MIN_BEFORE_FILLER: usize = 3;

pub const INSUFFICIENT_DATA: &str =
    "Limited fundamentals were available from the data vendor; hold sizing until more disclosures land.";

/// Which list a firing rule contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Polarity {
    Supportive,
    Cautionary,
}

/// One threshold rule. `delta` is applied to the score when it fires.
struct SignalRule {
    key: MetricKey,
    fires: fn(f64) -> bool,
    polarity: Polarity,
    delta: f64,
    render: fn(f64) -> String,
}

/// Rules in evaluation order. For each metric at most one of its pair fires.
static RULES: &[SignalRule] = &[
    SignalRule {
        key: MetricKey::PeRatio,
        fires: |v| v <= 18.0,
        polarity: Polarity::Supportive,
        delta: 1.5,
        render: |v| format!("Valuation at {v:.1}× earnings leaves room for multiple expansion."),
    },
    SignalRule {
        key: MetricKey::PeRatio,
        fires: |v| v >= 40.0,
        polarity: Polarity::Cautionary,
        delta: -1.5,
        render: |v| format!("Rich {v:.1}× P/E implies the weight leans on premium expectations."),
    },
    SignalRule {
        key: MetricKey::ProfitMargin,
        fires: |v| v >= 15.0,
        polarity: Polarity::Supportive,
        delta: 1.0,
        render: |v| format!("Net margin of {v:.1}% underscores durable profitability."),
    },
    SignalRule {
        key: MetricKey::ProfitMargin,
        fires: |v| v <= 5.0,
        polarity: Polarity::Cautionary,
        delta: -1.0,
        render: |v| format!("Margin at {v:.1}% compresses the earnings buffer behind the position."),
    },
    SignalRule {
        key: MetricKey::Roe,
        fires: |v| v >= 18.0,
        polarity: Polarity::Supportive,
        delta: 1.0,
        render: |v| format!("ROE of {v:.1}% signals efficient capital deployment."),
    },
    SignalRule {
        key: MetricKey::Roe,
        fires: |v| v <= 8.0,
        polarity: Polarity::Cautionary,
        delta: -0.5,
        render: |v| format!("ROE of {v:.1}% trails quality benchmarks, moderating conviction."),
    },
    SignalRule {
        key: MetricKey::RevenueGrowth,
        fires: |v| v >= 20.0,
        polarity: Polarity::Supportive,
        delta: 1.0,
        render: |v| format!("Revenue growth running {v:.1}% keeps the topline momentum supportive."),
    },
    SignalRule {
        key: MetricKey::RevenueGrowth,
        fires: |v| v <= 0.0,
        polarity: Polarity::Cautionary,
        delta: -1.0,
        render: |v| format!("Revenue growth at {v:.1}% points to a deceleration risk for sizing up."),
    },
    SignalRule {
        key: MetricKey::DebtToEquity,
        fires: |v| v <= 0.7,
        polarity: Polarity::Supportive,
        delta: 0.5,
        render: |v| format!("Balance sheet leverage at {v:.2}× keeps downside risk manageable."),
    },
    SignalRule {
        key: MetricKey::DebtToEquity,
        fires: |v| v >= 2.0,
        polarity: Polarity::Cautionary,
        delta: -1.0,
        render: |v| format!("Leverage of {v:.2}× nudges position sizing toward caution."),
    },
    // Dividend rules only colour the narrative; they never move the score.
    SignalRule {
        key: MetricKey::DividendYield,
        fires: |v| v >= 3.0,
        polarity: Polarity::Supportive,
        delta: 0.0,
        render: |v| format!("Dividend yield of {v:.1}% provides a steady carry component."),
    },
    SignalRule {
        key: MetricKey::DividendYield,
        fires: |v| v > 0.0 && v < 1.0,
        polarity: Polarity::Cautionary,
        delta: 0.0,
        render: |v| format!("Token yield of {v:.1}% keeps the case focused on growth delivery."),
    },
];

/// Score and statement lists before ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalTally {
    pub score: f64,
    pub supportive: Vec<String>,
    pub cautionary: Vec<String>,
}

/// Ordered rationale plus the conviction score behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalRationale {
    /// 1 to 4 statements; the first is always the alignment statement.
    pub points: Vec<String>,
    pub score: f64,
}

/// Stateless rule engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct FundamentalScorer;

impl FundamentalScorer {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate every rule against the metrics.
    pub fn tally(&self, metrics: &MetricMap) -> SignalTally {
        let mut tally = SignalTally::default();
        for rule in RULES {
            let Some(value) = metrics.get(rule.key) else {
                continue;
            };
            if !(rule.fires)(value) {
                continue;
            }
            tally.score += rule.delta;
            let statement = (rule.render)(value);
            match rule.polarity {
                Polarity::Supportive => tally.supportive.push(statement),
                Polarity::Cautionary => tally.cautionary.push(statement),
            }
        }
        tally
    }

    /// Build the ordered, bounded rationale for a ticker held at `weight`.
    pub fn score(&self, ticker: &str, weight: f64, metrics: &MetricMap) -> FundamentalRationale {
        let tally = self.tally(metrics);
        let mut points = vec![alignment_statement(ticker, weight, tally.score)];

        let (first, second) = if tally.score >= 0.0 {
            (&tally.supportive, &tally.cautionary)
        } else {
            (&tally.cautionary, &tally.supportive)
        };
        points.extend(
            first
                .iter()
                .chain(second.iter())
                .take(MAX_STATEMENTS - 1)
                .cloned(),
        );

        if points.len() < MAX_STATEMENTS {
            let summary = metric_summary(metrics);
            if !summary.is_empty() {
                points.push(format!("Key fundamentals in view: {summary}."));
            }
        }
        if points.len() < MIN_BEFORE_FILLER {
            points.push(INSUFFICIENT_DATA.to_string());
        }
        points.truncate(MAX_STATEMENTS);

        FundamentalRationale {
            points,
            score: tally.score,
        }
    }
}

/// Relate the conviction score to the assigned weight.
pub fn alignment_statement(ticker: &str, weight: f64, score: f64) -> String {
    let pct = weight * 100.0;
    if score >= 2.5 && weight < 0.15 {
        format!(
            "Fundamental scorecard tilts bullish, indicating capacity to scale beyond the current {pct:.2}% weight."
        )
    } else if score <= -1.5 && weight > 0.10 {
        format!(
            "Fundamental mix lands light, so the {pct:.2}% allocation should stay capped pending stronger data."
        )
    } else {
        format!("Assigned weight of {pct:.2}% aligns with the latest fundamental balance for {ticker}.")
    }
}

/// Compact one-line view of the headline ratios, empty when none are known.
pub fn metric_summary(metrics: &MetricMap) -> String {
    let mut pieces = Vec::new();
    if let Some(v) = metrics.get(MetricKey::PeRatio) {
        pieces.push(format!("P/E {v:.1}×"));
    }
    if let Some(v) = metrics.get(MetricKey::Roe) {
        pieces.push(format!("ROE {v:.1}%"));
    }
    if let Some(v) = metrics.get(MetricKey::ProfitMargin) {
        pieces.push(format!("Margin {v:.1}%"));
    }
    if let Some(v) = metrics.get(MetricKey::RevenueGrowth) {
        pieces.push(format!("Growth {v:.1}%"));
    }
    if let Some(v) = metrics.get(MetricKey::DebtToEquity) {
        pieces.push(format!("D/E {v:.2}×"));
    }
    pieces.join(", ")
}
