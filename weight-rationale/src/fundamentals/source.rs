//! Fundamentals vendor adapters.
//!
//! # Yahoo Finance quoteSummary
//! `GET {base}/v10/finance/quoteSummary/{ticker}?modules=...`
//!
//! Summary modules feed the ratio lookup; the three statement-history
//! modules become [`FinancialStatement`]s with the most recent period first.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::types::{labels, value_as_f64, FinancialStatement, FundamentalsBundle};
use crate::source::{get_text, http_client, SourceError};

/// A vendor that returns raw fundamentals for a ticker.
#[async_trait]
pub trait FundamentalsSource: Send + Sync {
    /// Vendor name used in logs and report attributions.
    fn name(&self) -> &'static str;

    /// Fetch the raw bundle for an upper-cased ticker.
    async fn fetch(&self, ticker: &str) -> Result<FundamentalsBundle, SourceError>;
}

const SUMMARY_MODULES: &[&str] = &["summaryDetail", "defaultKeyStatistics", "financialData"];

/// `(module, list field, [(vendor field, statement label)])`
type StatementSpec = (&'static str, &'static str, &'static [(&'static str, &'static str)]);

const INCOME_SPEC: StatementSpec = (
    "incomeStatementHistory",
    "incomeStatementHistory",
    &[
        ("totalRevenue", labels::TOTAL_REVENUE),
        ("netIncome", labels::NET_INCOME),
        ("operatingIncome", labels::OPERATING_INCOME),
        ("grossProfit", labels::GROSS_PROFIT),
    ],
);

const BALANCE_SPEC: StatementSpec = (
    "balanceSheetHistory",
    "balanceSheetStatements",
    &[
        ("totalStockholderEquity", labels::STOCKHOLDER_EQUITY),
        ("totalLiab", labels::TOTAL_LIABILITIES),
    ],
);

const CASH_FLOW_SPEC: StatementSpec = (
    "cashflowStatementHistory",
    "cashflowStatements",
    &[("totalCashFromOperatingActivities", labels::OPERATING_CASH_FLOW)],
);

/// Yahoo Finance quoteSummary adapter.
pub struct YahooFundamentalsSource {
    client: reqwest::Client,
    base_url: String,
}

impl YahooFundamentalsSource {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: http_client(timeout_secs),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &weight_common::FundamentalsConfig) -> Self {
        Self::new(config.base_url.clone(), config.timeout_secs)
    }

    fn modules() -> String {
        SUMMARY_MODULES
            .iter()
            .chain([INCOME_SPEC.0, BALANCE_SPEC.0, CASH_FLOW_SPEC.0].iter())
            .copied()
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[async_trait]
impl FundamentalsSource for YahooFundamentalsSource {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch(&self, ticker: &str) -> Result<FundamentalsBundle, SourceError> {
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, ticker);
        let modules = Self::modules();
        let body = get_text(&self.client, &url, &[("modules", modules.as_str())]).await?;
        let value: Value =
            serde_json::from_str(&body).map_err(|e| SourceError::Decode(e.to_string()))?;
        parse_quote_summary(&value)
    }
}

/// Turn a quoteSummary document into a bundle.
pub fn parse_quote_summary(value: &Value) -> Result<FundamentalsBundle, SourceError> {
    let summary = value
        .get("quoteSummary")
        .ok_or_else(|| SourceError::Decode("missing quoteSummary".into()))?;

    if let Some(err) = summary.get("error").filter(|e| !e.is_null()) {
        let description = err
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(SourceError::Unavailable(description.to_string()));
    }

    let Some(result) = summary
        .get("result")
        .and_then(Value::as_array)
        .and_then(|r| r.first())
        .and_then(Value::as_object)
    else {
        return Ok(FundamentalsBundle::default());
    };

    let mut bundle = FundamentalsBundle::default();
    for module in SUMMARY_MODULES {
        let Some(fields) = result.get(*module).and_then(Value::as_object) else {
            continue;
        };
        for (key, raw) in fields {
            if value_as_f64(raw).is_some() {
                bundle.info.entry(key.clone()).or_insert_with(|| raw.clone());
            }
        }
    }

    bundle.income = statement(result, INCOME_SPEC);
    bundle.balance_sheet = statement(result, BALANCE_SPEC);
    bundle.cash_flow = statement(result, CASH_FLOW_SPEC);
    Ok(bundle)
}

fn statement(result: &Map<String, Value>, spec: StatementSpec) -> Option<FinancialStatement> {
    let (module, list_field, fields) = spec;
    let periods = result
        .get(module)
        .and_then(|m| m.get(list_field))
        .and_then(Value::as_array)
        .filter(|p| !p.is_empty())?;

    let mut stmt = FinancialStatement::new();
    for (vendor_field, label) in fields {
        let values = periods
            .iter()
            .map(|period| period.get(*vendor_field).and_then(value_as_f64))
            .collect();
        stmt.insert_row(*label, values);
    }
    Some(stmt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fundamentals::types::info_keys;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "quoteSummary": {
                "result": [{
                    "summaryDetail": {
                        "trailingPE": {"raw": 28.4, "fmt": "28.40"},
                        "dividendYield": {"raw": 0.0052, "fmt": "0.52%"},
                        "currency": "USD"
                    },
                    "financialData": {
                        "profitMargins": {"raw": 0.253},
                        "returnOnEquity": {"raw": 1.47},
                        "revenueGrowth": {"raw": 0.061}
                    },
                    "incomeStatementHistory": {
                        "incomeStatementHistory": [
                            {"totalRevenue": {"raw": 383285000000.0}, "netIncome": {"raw": 96995000000.0}},
                            {"totalRevenue": {"raw": 394328000000.0}, "netIncome": {"raw": 99803000000.0}}
                        ]
                    },
                    "balanceSheetHistory": {
                        "balanceSheetStatements": [
                            {"totalStockholderEquity": {"raw": 62146000000.0}, "totalLiab": {}}
                        ]
                    }
                }],
                "error": null
            }
        })
    }

    #[test]
    fn test_parse_summary_modules() {
        let bundle = parse_quote_summary(&sample()).unwrap();
        assert_eq!(bundle.info_number(info_keys::TRAILING_PE), Some(28.4));
        assert_eq!(bundle.info_number(info_keys::RETURN_ON_EQUITY), Some(1.47));
        assert!(!bundle.info.contains_key("currency"));
    }

    #[test]
    fn test_parse_statements() {
        let bundle = parse_quote_summary(&sample()).unwrap();
        let income = bundle.income.unwrap();
        assert_eq!(income.latest(labels::TOTAL_REVENUE), Some(383285000000.0));
        assert_eq!(income.observations(labels::NET_INCOME).len(), 2);

        let balance = bundle.balance_sheet.unwrap();
        assert_eq!(balance.latest(labels::TOTAL_LIABILITIES), None);
        assert!(bundle.cash_flow.is_none());
    }

    #[test]
    fn test_vendor_error_is_unavailable() {
        let doc = json!({
            "quoteSummary": {"result": null, "error": {"code": "Not Found", "description": "No data found"}}
        });
        let err = parse_quote_summary(&doc).unwrap_err();
        assert!(matches!(err, SourceError::Unavailable(ref m) if m == "No data found"));
    }

    #[test]
    fn test_empty_result_is_empty_bundle() {
        let doc = json!({"quoteSummary": {"result": [], "error": null}});
        assert!(parse_quote_summary(&doc).unwrap().is_empty());
        assert!(parse_quote_summary(&json!({})).is_err());
    }

    #[test]
    fn test_modules_query() {
        let modules = YahooFundamentalsSource::modules();
        assert!(modules.starts_with("summaryDetail,defaultKeyStatistics,financialData"));
        assert!(modules.ends_with("cashflowStatementHistory"));
    }
}
