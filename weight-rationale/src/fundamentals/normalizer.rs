//! Converts a raw vendor bundle into a canonical [`MetricMap`].
//!
//! Vendors disagree on units: some ratios arrive as fractions (0.23), others
//! as percentages (23.0). The rescale rules below guess which one was meant.
//! They misread genuinely tiny percentages (a real 2% margin becomes 200%)
//! and are kept for compatibility with existing reports, not as a contract.

use super::types::{info_keys, labels, FinancialStatement, FundamentalsBundle, MetricKey, MetricMap};

/// Fractions at or below this magnitude are promoted to percentage points.
const PERCENT_FRACTION_CEILING: f64 = 5.0;
/// Percent metrics beyond this magnitude are treated as vendor noise.
const PERCENT_PLAUSIBLE_CEILING: f64 = 500.0;
const DIVIDEND_FRACTION_CEILING: f64 = 3.0;
const DIVIDEND_PLAUSIBLE_CEILING: f64 = 100.0;

/// Stateless metric normalizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricNormalizer;

impl MetricNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Build the canonical metric map. Never fails; missing inputs yield `None`.
    pub fn normalize(&self, bundle: &FundamentalsBundle) -> MetricMap {
        let latest = |stmt: &Option<FinancialStatement>, label: &str| {
            stmt.as_ref().and_then(|s| s.latest(label))
        };

        let revenue = latest(&bundle.income, labels::TOTAL_REVENUE);
        let net_income = latest(&bundle.income, labels::NET_INCOME);
        let operating_income = latest(&bundle.income, labels::OPERATING_INCOME);
        let gross_profit = latest(&bundle.income, labels::GROSS_PROFIT);
        let equity = latest(&bundle.balance_sheet, labels::STOCKHOLDER_EQUITY);
        let liabilities = latest(&bundle.balance_sheet, labels::TOTAL_LIABILITIES);
        let operating_cash_flow = latest(&bundle.cash_flow, labels::OPERATING_CASH_FLOW);

        let pe_ratio = bundle
            .info_number(info_keys::TRAILING_PE)
            .or_else(|| bundle.info_number(info_keys::FORWARD_PE));

        let profit_margin = bundle
            .info_number(info_keys::PROFIT_MARGINS)
            .or_else(|| ratio_percent(net_income, revenue));

        let roe = bundle
            .info_number(info_keys::RETURN_ON_EQUITY)
            .or_else(|| ratio_percent(net_income, equity));

        let revenue_growth = bundle.info_number(info_keys::REVENUE_GROWTH).or_else(|| {
            bundle
                .income
                .as_ref()
                .and_then(|s| period_growth(s, labels::TOTAL_REVENUE))
        });

        let debt_to_equity = match (liabilities, equity) {
            (Some(l), Some(e)) if e != 0.0 => Some(l / e),
            _ => None,
        };

        let dividend_yield = bundle
            .info_number(info_keys::DIVIDEND_YIELD)
            .and_then(rescale_dividend);

        let mut metrics = MetricMap::empty();
        metrics.set(MetricKey::Revenue, revenue);
        metrics.set(MetricKey::NetIncome, net_income);
        metrics.set(MetricKey::OperatingIncome, operating_income);
        metrics.set(MetricKey::OperatingCashFlow, operating_cash_flow);
        metrics.set(MetricKey::GrossProfit, gross_profit);
        metrics.set(MetricKey::Equity, equity);
        metrics.set(MetricKey::Liabilities, liabilities);
        metrics.set(MetricKey::PeRatio, pe_ratio);
        metrics.set(MetricKey::DebtToEquity, debt_to_equity);
        metrics.set(MetricKey::DividendYield, dividend_yield);
        metrics.set(MetricKey::ProfitMargin, profit_margin.and_then(rescale_percent));
        metrics.set(MetricKey::Roe, roe.and_then(rescale_percent));
        metrics.set(MetricKey::RevenueGrowth, revenue_growth.and_then(rescale_percent));
        metrics
    }
}

/// `numerator / denominator × 100`, or `None` on a missing operand or zero denominator.
fn ratio_percent(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d * 100.0),
        _ => None,
    }
}

/// Growth between the two most recent observations of a row, in percent.
pub fn period_growth(statement: &FinancialStatement, label: &str) -> Option<f64> {
    let observations = statement.observations(label);
    match observations.as_slice() {
        [latest, prior, ..] if *prior != 0.0 => Some((latest - prior) / prior * 100.0),
        _ => None,
    }
}

/// Promote fractions to percentage points and drop implausible magnitudes.
pub fn rescale_percent(value: f64) -> Option<f64> {
    let scaled = if value.abs() <= PERCENT_FRACTION_CEILING {
        value * 100.0
    } else {
        value
    };
    (scaled.abs() <= PERCENT_PLAUSIBLE_CEILING).then_some(scaled)
}

/// Dividend variant of [`rescale_percent`] with tighter bounds.
pub fn rescale_dividend(value: f64) -> Option<f64> {
    let scaled = if value.abs() <= DIVIDEND_FRACTION_CEILING {
        value * 100.0
    } else {
        value
    };
    (scaled.abs() <= DIVIDEND_PLAUSIBLE_CEILING).then_some(scaled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    fn income(revenue: Vec<Option<f64>>, net_income: Option<f64>) -> FinancialStatement {
        FinancialStatement::new()
            .with_row(labels::TOTAL_REVENUE, revenue)
            .with_row(labels::NET_INCOME, vec![net_income])
    }

    #[test]
    fn test_empty_bundle_yields_all_none() {
        let metrics = MetricNormalizer::new().normalize(&FundamentalsBundle::default());
        assert!(metrics.is_empty());
    }

    #[test]
    fn test_pe_prefers_trailing_then_forward() {
        let bundle = FundamentalsBundle::default()
            .with_info(info_keys::TRAILING_PE, 21.0)
            .with_info(info_keys::FORWARD_PE, 18.0);
        assert_eq!(MetricNormalizer.normalize(&bundle).get(MetricKey::PeRatio), Some(21.0));

        let bundle = FundamentalsBundle::default()
            .with_info(info_keys::TRAILING_PE, serde_json::Value::Null)
            .with_info(info_keys::FORWARD_PE, "18.5");
        assert_eq!(MetricNormalizer.normalize(&bundle).get(MetricKey::PeRatio), Some(18.5));
    }

    #[test]
    fn test_vendor_fraction_ratios_become_percent() {
        let bundle = FundamentalsBundle::default()
            .with_info(info_keys::PROFIT_MARGINS, 0.25)
            .with_info(info_keys::RETURN_ON_EQUITY, 1.47)
            .with_info(info_keys::REVENUE_GROWTH, -0.05);
        let metrics = MetricNormalizer.normalize(&bundle);
        assert!((metrics.get(MetricKey::ProfitMargin).unwrap() - 25.0).abs() < 1e-9);
        assert!((metrics.get(MetricKey::Roe).unwrap() - 147.0).abs() < 1e-9);
        assert!((metrics.get(MetricKey::RevenueGrowth).unwrap() + 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_margin_and_roe_derived_from_statements() {
        let bundle = FundamentalsBundle {
            income: Some(income(vec![Some(1000.0), Some(800.0)], Some(200.0))),
            balance_sheet: Some(
                FinancialStatement::new()
                    .with_row(labels::STOCKHOLDER_EQUITY, vec![Some(1000.0)])
                    .with_row(labels::TOTAL_LIABILITIES, vec![Some(1500.0)]),
            ),
            ..Default::default()
        };
        let metrics = MetricNormalizer.normalize(&bundle);
        assert_eq!(metrics.get(MetricKey::ProfitMargin), Some(20.0));
        assert_eq!(metrics.get(MetricKey::Roe), Some(20.0));
        assert_eq!(metrics.get(MetricKey::RevenueGrowth), Some(25.0));
        assert_eq!(metrics.get(MetricKey::DebtToEquity), Some(1.5));
        assert_eq!(metrics.get(MetricKey::Revenue), Some(1000.0));
        assert_eq!(metrics.get(MetricKey::Liabilities), Some(1500.0));
    }

    #[test]
    fn test_zero_denominators_yield_none() {
        let bundle = FundamentalsBundle {
            income: Some(income(vec![Some(0.0), Some(0.0)], Some(50.0))),
            balance_sheet: Some(
                FinancialStatement::new()
                    .with_row(labels::STOCKHOLDER_EQUITY, vec![Some(0.0)])
                    .with_row(labels::TOTAL_LIABILITIES, vec![Some(10.0)]),
            ),
            ..Default::default()
        };
        let metrics = MetricNormalizer.normalize(&bundle);
        assert_eq!(metrics.get(MetricKey::ProfitMargin), None);
        assert_eq!(metrics.get(MetricKey::Roe), None);
        assert_eq!(metrics.get(MetricKey::RevenueGrowth), None);
        assert_eq!(metrics.get(MetricKey::DebtToEquity), None);
    }

    #[test]
    fn test_growth_needs_two_periods() {
        let stmt = FinancialStatement::new().with_row(labels::TOTAL_REVENUE, vec![Some(10.0), None]);
        assert_eq!(period_growth(&stmt, labels::TOTAL_REVENUE), None);
    }

    #[test_case(0.02, Some(2.0) ; "fraction promoted")]
    #[test_case(3.0, None ; "ceiling promoted then dropped")]
    #[test_case(4.5, Some(4.5) ; "already percent")]
    #[test_case(150.0, None ; "implausible dropped")]
    #[test_case(-0.01, Some(-1.0) ; "negative fraction")]
    fn test_rescale_dividend(input: f64, expected: Option<f64>) {
        let out = rescale_dividend(input);
        match (out, expected) {
            (Some(a), Some(b)) => assert!((a - b).abs() < 1e-9, "{a} != {b}"),
            (a, b) => assert_eq!(a, b),
        }
    }

    #[test_case(0.12, Some(12.0) ; "fraction")]
    #[test_case(5.0, Some(500.0) ; "boundary promoted")]
    #[test_case(5.5, Some(5.5) ; "just above boundary")]
    #[test_case(501.0, None ; "too large")]
    #[test_case(-600.0, None ; "too negative")]
    fn test_rescale_percent(input: f64, expected: Option<f64>) {
        let out = rescale_percent(input);
        match (out, expected) {
            (Some(a), Some(b)) => assert!((a - b).abs() < 1e-9, "{a} != {b}"),
            (a, b) => assert_eq!(a, b),
        }
    }

    proptest! {
        #[test]
        fn prop_percent_metrics_stay_plausible(
            margin in -1e6f64..1e6,
            roe in -1e6f64..1e6,
            growth in -1e6f64..1e6,
            dividend in -1e4f64..1e4,
        ) {
            let bundle = FundamentalsBundle::default()
                .with_info(info_keys::PROFIT_MARGINS, margin)
                .with_info(info_keys::RETURN_ON_EQUITY, roe)
                .with_info(info_keys::REVENUE_GROWTH, growth)
                .with_info(info_keys::DIVIDEND_YIELD, dividend);
            let metrics = MetricNormalizer.normalize(&bundle);
            for key in [MetricKey::ProfitMargin, MetricKey::Roe, MetricKey::RevenueGrowth] {
                if let Some(v) = metrics.get(key) {
                    prop_assert!(v.abs() <= 500.0);
                }
            }
            if let Some(v) = metrics.get(MetricKey::DividendYield) {
                prop_assert!(v.abs() <= 100.0);
            }
        }
    }
}
