//! Prompt builders for the three augmentation tasks.

use chrono::NaiveDate;

use crate::render::format_weight;

/// Bullet cap for the fundamentals and news prompts.
pub const AGENT_MAX_POINTS: usize = 4;

const NONE: &str = "(none)";

fn or_placeholder<'a>(text: &'a str, placeholder: &'a str) -> &'a str {
    if text.trim().is_empty() {
        placeholder
    } else {
        text
    }
}

fn dashed(points: &[String]) -> String {
    points
        .iter()
        .map(|p| format!("- {p}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Inputs for the combined-summary prompt.
#[derive(Debug, Clone)]
pub struct SummaryPrompt<'a> {
    pub ticker: &'a str,
    pub weight: f64,
    pub as_of: NaiveDate,
    pub fundamental_points: &'a [String],
    pub news_points: &'a [String],
    pub metrics_table: &'a str,
    pub news_table: &'a str,
    pub max_points: usize,
}

impl SummaryPrompt<'_> {
    pub fn render(&self) -> String {
        let fundamental_text = dashed(self.fundamental_points);
        let news_text = dashed(self.news_points);
        format!(
            "You are assisting a portfolio manager. Produce up to {max} succinct bullet points\n\
             that justify the current weight for {ticker} as of {as_of}. Blend fundamentals and news insights. \
             You can either support or challenge the weight based on the data provided. \
             Try to provide unique points that do not overlap with each other.\n\
             \n\
             Current portfolio weight: {weight}\n\
             \n\
             Fundamental signals:\n\
             {fundamental}\n\
             \n\
             News signals:\n\
             {news}\n\
             \n\
             Fundamental metrics table (Markdown):\n\
             {metrics}\n\
             \n\
             News headlines table (Markdown):\n\
             {headlines}\n\
             \n\
             Output format: one bullet per line, concise, informative, no numbering, no preamble or postscript.",
            max = self.max_points,
            ticker = self.ticker,
            as_of = self.as_of,
            weight = format_weight(self.weight),
            fundamental = or_placeholder(&fundamental_text, NONE),
            news = or_placeholder(&news_text, NONE),
            metrics = or_placeholder(self.metrics_table, NONE).trim(),
            headlines = or_placeholder(self.news_table, NONE).trim(),
        )
    }
}

/// Prompt for the fundamentals analyst view.
pub fn fundamentals_prompt(
    ticker: &str,
    weight: f64,
    as_of: NaiveDate,
    metrics_summary: &str,
    metrics_table: &str,
) -> String {
    format!(
        "You are the fundamentals analyst on a portfolio desk. Review the metrics and craft up to {max} bullet points \
         that explain whether the current allocation for {ticker} at {weight} is justified as of {as_of}.\n\
         \n\
         Key metrics overview:\n\
         {summary}\n\
         \n\
         Detailed metrics (Markdown table):\n\
         {table}\n\
         \n\
         Output requirements:\n\
         - First bullet must state a clear action (maintain, increase, reduce, accumulate, watch) tied to fundamentals.\n\
         - Each bullet should reference specific metrics or trends.\n\
         - Keep bullets concise and avoid repeating facts.",
        max = AGENT_MAX_POINTS,
        weight = format_weight(weight),
        summary = or_placeholder(metrics_summary, "(no key metrics)"),
        table = or_placeholder(metrics_table, NONE).trim(),
    )
}

/// Prompt for the news-flow specialist view.
pub fn news_prompt(
    ticker: &str,
    weight: f64,
    as_of: NaiveDate,
    lookback_days: i64,
    net_sentiment: i64,
    digest: &str,
) -> String {
    format!(
        "You are the news-flow specialist on a portfolio team. Recent vendor headlines for {ticker} over the last \
         {lookback_days} day(s) carry a net sentiment score of {net_sentiment} (positives minus negatives).\n\
         \n\
         The portfolio holds a {weight} weight as of {as_of}. Produce up to {max} bullet points advising how to \
         manage this weight given the news.\n\
         \n\
         Headlines digest:\n\
         {digest}\n\
         \n\
         Output requirements:\n\
         - First bullet should be the recommendation (maintain, add, trim, hedge) referencing sentiment.\n\
         - Remaining bullets should cite specific headlines or themes and their expected impact.\n\
         - Keep bullets concise and avoid duplicating points.",
        max = AGENT_MAX_POINTS,
        weight = format_weight(weight),
        digest = or_placeholder(digest, "(no headlines in scope)"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_summary_prompt_placeholders() {
        let prompt = SummaryPrompt {
            ticker: "MSFT",
            weight: 0.0425,
            as_of: as_of(),
            fundamental_points: &["Margins are strong".to_string()],
            news_points: &[],
            metrics_table: "",
            news_table: "",
            max_points: 6,
        }
        .render();

        assert!(prompt.starts_with("You are assisting a portfolio manager. Produce up to 6 succinct"));
        assert!(prompt.contains("for MSFT as of 2024-03-01"));
        assert!(prompt.contains("Current portfolio weight: 4.25%"));
        assert!(prompt.contains("Fundamental signals:\n- Margins are strong\n"));
        assert!(prompt.contains("News signals:\n(none)\n"));
        assert!(prompt.ends_with("no preamble or postscript."));
    }

    #[test]
    fn test_fundamentals_prompt() {
        let prompt = fundamentals_prompt("AAPL", 0.05, as_of(), "", "| Metric | Value |");
        assert!(prompt.contains("up to 4 bullet points"));
        assert!(prompt.contains("for AAPL at 5.00% is justified as of 2024-03-01"));
        assert!(prompt.contains("Key metrics overview:\n(no key metrics)\n"));
        assert!(prompt.contains("Detailed metrics (Markdown table):\n| Metric | Value |\n"));
    }

    #[test]
    fn test_news_prompt() {
        let prompt = news_prompt("TSLA", 0.12, as_of(), 7, -2, "");
        assert!(prompt.contains("over the last 7 day(s) carry a net sentiment score of -2"));
        assert!(prompt.contains("holds a 12.00% weight as of 2024-03-01"));
        assert!(prompt.contains("Headlines digest:\n(no headlines in scope)\n"));
    }
}
