//! Fundamentals data types: the raw vendor bundle and the canonical metric map.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Metric Keys
// ============================================================================

/// How a metric is scaled and displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Absolute dollar amount
    Currency,
    /// Whole percentage points (12.3 means 12.3%)
    Percent,
    /// Plain ratio such as P/E
    Multiple,
}

/// The fixed set of canonical fundamentals, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    Revenue,
    NetIncome,
    OperatingIncome,
    OperatingCashFlow,
    GrossProfit,
    Equity,
    Liabilities,
    ProfitMargin,
    Roe,
    RevenueGrowth,
    PeRatio,
    DebtToEquity,
    DividendYield,
}

impl MetricKey {
    /// Every key, in display order.
    pub const ALL: [MetricKey; 13] = [
        MetricKey::Revenue,
        MetricKey::NetIncome,
        MetricKey::OperatingIncome,
        MetricKey::OperatingCashFlow,
        MetricKey::GrossProfit,
        MetricKey::Equity,
        MetricKey::Liabilities,
        MetricKey::ProfitMargin,
        MetricKey::Roe,
        MetricKey::RevenueGrowth,
        MetricKey::PeRatio,
        MetricKey::DebtToEquity,
        MetricKey::DividendYield,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::NetIncome => "net_income",
            Self::OperatingIncome => "operating_income",
            Self::OperatingCashFlow => "operating_cash_flow",
            Self::GrossProfit => "gross_profit",
            Self::Equity => "equity",
            Self::Liabilities => "liabilities",
            Self::ProfitMargin => "profit_margin",
            Self::Roe => "roe",
            Self::RevenueGrowth => "revenue_growth",
            Self::PeRatio => "pe_ratio",
            Self::DebtToEquity => "debt_to_equity",
            Self::DividendYield => "dividend_yield",
        }
    }

    /// Human label used in tables and prompts.
    pub fn label(self) -> &'static str {
        match self {
            Self::Revenue => "Total Revenue",
            Self::NetIncome => "Net Income",
            Self::OperatingIncome => "Operating Income",
            Self::OperatingCashFlow => "Operating Cash Flow",
            Self::GrossProfit => "Gross Profit",
            Self::Equity => "Stockholder Equity",
            Self::Liabilities => "Total Liabilities",
            Self::ProfitMargin => "Profit Margin",
            Self::Roe => "Return on Equity",
            Self::RevenueGrowth => "Revenue Growth",
            Self::PeRatio => "Price/Earnings",
            Self::DebtToEquity => "Debt/Equity",
            Self::DividendYield => "Dividend Yield",
        }
    }

    pub fn kind(self) -> MetricKind {
        match self {
            Self::Revenue
            | Self::NetIncome
            | Self::OperatingIncome
            | Self::OperatingCashFlow
            | Self::GrossProfit
            | Self::Equity
            | Self::Liabilities => MetricKind::Currency,
            Self::ProfitMargin | Self::Roe | Self::RevenueGrowth | Self::DividendYield => {
                MetricKind::Percent
            }
            Self::PeRatio | Self::DebtToEquity => MetricKind::Multiple,
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Metric Map
// ============================================================================

/// Canonical metrics. Every key is present; `None` means "metric unavailable".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricMap(BTreeMap<MetricKey, Option<f64>>);

impl Default for MetricMap {
    fn default() -> Self {
        Self(MetricKey::ALL.iter().map(|k| (*k, None)).collect())
    }
}

impl MetricMap {
    /// A map with every metric unavailable.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, key: MetricKey) -> Option<f64> {
        self.0.get(&key).copied().flatten()
    }

    /// Set a metric; non-finite values are stored as unavailable.
    pub fn set(&mut self, key: MetricKey, value: Option<f64>) {
        self.0.insert(key, value.filter(|v| v.is_finite()));
    }

    pub fn with(mut self, key: MetricKey, value: f64) -> Self {
        self.set(key, Some(value));
        self
    }

    /// Present metrics in display order.
    pub fn present(&self) -> impl Iterator<Item = (MetricKey, f64)> + '_ {
        MetricKey::ALL
            .iter()
            .filter_map(move |k| self.get(*k).map(|v| (*k, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.present().next().is_none()
    }
}

// ============================================================================
// Raw Vendor Bundle
// ============================================================================

/// One financial statement: row label → values, most recent period first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatement {
    rows: HashMap<String, Vec<Option<f64>>>,
}

impl FinancialStatement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_row(mut self, label: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        self.insert_row(label, values);
        self
    }

    pub fn insert_row(&mut self, label: impl Into<String>, values: Vec<Option<f64>>) {
        self.rows.insert(label.into(), values);
    }

    /// Non-null, finite values for a row, most recent first.
    pub fn observations(&self, label: &str) -> Vec<f64> {
        self.rows
            .get(label)
            .map(|values| values.iter().flatten().copied().filter(|v| v.is_finite()).collect())
            .unwrap_or_default()
    }

    /// Most recent non-null value for a row.
    pub fn latest(&self, label: &str) -> Option<f64> {
        self.observations(label).first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.values().all(|v| v.iter().all(Option::is_none))
    }
}

/// Statement row labels read by the normalizer.
pub mod labels {
    pub const TOTAL_REVENUE: &str = "Total Revenue";
    pub const NET_INCOME: &str = "Net Income";
    pub const OPERATING_INCOME: &str = "Operating Income";
    pub const GROSS_PROFIT: &str = "Gross Profit";
    pub const STOCKHOLDER_EQUITY: &str = "Total Stockholder Equity";
    pub const TOTAL_LIABILITIES: &str = "Total Liab";
    pub const OPERATING_CASH_FLOW: &str = "Operating Cash Flow";
}

/// Vendor info map keys read by the normalizer.
pub mod info_keys {
    pub const TRAILING_PE: &str = "trailingPE";
    pub const FORWARD_PE: &str = "forwardPE";
    pub const PROFIT_MARGINS: &str = "profitMargins";
    pub const RETURN_ON_EQUITY: &str = "returnOnEquity";
    pub const DIVIDEND_YIELD: &str = "dividendYield";
    pub const REVENUE_GROWTH: &str = "revenueGrowth";
}

/// Raw fundamentals as delivered by a vendor. Any part may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundamentalsBundle {
    /// Loosely typed key statistics (numbers or numeric strings).
    pub info: HashMap<String, Value>,
    pub income: Option<FinancialStatement>,
    pub balance_sheet: Option<FinancialStatement>,
    pub cash_flow: Option<FinancialStatement>,
}

impl FundamentalsBundle {
    pub fn with_info(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.info.insert(key.to_string(), value.into());
        self
    }

    /// Numeric view of an info entry; accepts numbers and numeric strings.
    pub fn info_number(&self, key: &str) -> Option<f64> {
        self.info.get(key).and_then(value_as_f64)
    }

    pub fn is_empty(&self) -> bool {
        self.info.is_empty()
            && self.income.as_ref().map_or(true, FinancialStatement::is_empty)
            && self.balance_sheet.as_ref().map_or(true, FinancialStatement::is_empty)
            && self.cash_flow.as_ref().map_or(true, FinancialStatement::is_empty)
    }
}

/// Lenient numeric coercion for vendor JSON.
pub fn value_as_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Object(map) => map.get("raw").and_then(value_as_f64),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}
