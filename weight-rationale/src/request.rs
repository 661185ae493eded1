//! Report requests and their validation.
//!
//! Every entry point validates its request here before touching the network.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{RationaleError, Result};

pub const DEFAULT_LOOKBACK_DAYS: i64 = 7;
pub const DEFAULT_MAX_ARTICLES: i64 = 8;

/// Augmentation switch carried by every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AugmentOptions {
    pub enabled: bool,
    /// Overrides the configured default model when set.
    pub model: Option<String>,
}

impl AugmentOptions {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn with_model(model: Option<String>) -> Self {
        Self {
            enabled: true,
            model,
        }
    }
}

/// Caller-facing request for any of the three reports.
///
/// The news fields are ignored by the fundamentals report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRequest {
    pub ticker: String,
    pub weight: f64,
    /// `YYYY-MM-DD`; defaults to the engine's reference date.
    pub as_of: Option<String>,
    pub lookback_days: i64,
    pub max_articles: i64,
    pub augment: AugmentOptions,
}

impl ReportRequest {
    pub fn new(ticker: impl Into<String>, weight: f64) -> Self {
        Self {
            ticker: ticker.into(),
            weight,
            as_of: None,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            max_articles: DEFAULT_MAX_ARTICLES,
            augment: AugmentOptions::disabled(),
        }
    }

    pub fn as_of(mut self, as_of: impl Into<String>) -> Self {
        self.as_of = Some(as_of.into());
        self
    }

    pub fn lookback_days(mut self, days: i64) -> Self {
        self.lookback_days = days;
        self
    }

    pub fn max_articles(mut self, max: i64) -> Self {
        self.max_articles = max;
        self
    }

    pub fn augment(mut self, model: Option<String>) -> Self {
        self.augment = AugmentOptions::with_model(model);
        self
    }

    /// Validate the fields shared by every report.
    pub fn validate_base(&self, default_as_of: NaiveDate) -> Result<ValidatedRequest> {
        let ticker = self.ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(RationaleError::EmptyTicker);
        }
        if !(0.0..=1.0).contains(&self.weight) {
            return Err(RationaleError::WeightOutOfRange(self.weight));
        }
        let as_of = match self.as_of.as_deref().map(str::trim) {
            None | Some("") => default_as_of,
            Some(raw) => parse_as_of(raw)?,
        };
        Ok(ValidatedRequest {
            ticker,
            weight: self.weight,
            as_of,
        })
    }

    /// Validate the shared fields plus the news window options.
    pub fn validate_news(&self, default_as_of: NaiveDate) -> Result<(ValidatedRequest, NewsWindow)> {
        let base = self.validate_base(default_as_of)?;
        if self.lookback_days <= 0 {
            return Err(RationaleError::NonPositiveLookback(self.lookback_days));
        }
        if self.max_articles <= 0 {
            return Err(RationaleError::NonPositiveMaxArticles(self.max_articles));
        }
        let start = Duration::try_days(self.lookback_days)
            .and_then(|span| base.as_of.checked_sub_signed(span))
            .ok_or(RationaleError::WindowOverflow {
                as_of: base.as_of,
                lookback_days: self.lookback_days,
            })?;
        let window = NewsWindow {
            start,
            end: base.as_of,
            lookback_days: self.lookback_days,
            max_articles: usize::try_from(self.max_articles).unwrap_or(usize::MAX),
        };
        Ok((base, window))
    }
}

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_as_of(raw: &str) -> Result<NaiveDate> {
    let looks_iso = raw.len() == 10
        && raw.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !looks_iso {
        return Err(RationaleError::InvalidAsOf(raw.to_string()));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| RationaleError::InvalidAsOf(raw.to_string()))
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    /// Trimmed, upper-cased symbol.
    pub ticker: String,
    pub weight: f64,
    pub as_of: NaiveDate,
}

/// Inclusive date window scanned for news, plus the article cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewsWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub lookback_days: i64,
    pub max_articles: usize,
}

impl NewsWindow {
    /// Window ending on `end` and reaching back `lookback_days`.
    pub fn ending(end: NaiveDate, lookback_days: i64, max_articles: usize) -> Self {
        let start = Duration::try_days(lookback_days)
            .and_then(|span| end.checked_sub_signed(span))
            .unwrap_or(NaiveDate::MIN);
        Self {
            start,
            end,
            lookback_days,
            max_articles,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    #[test]
    fn test_ticker_is_trimmed_and_uppercased() {
        let v = ReportRequest::new("  aapl ", 0.1).validate_base(today()).unwrap();
        assert_eq!(v.ticker, "AAPL");
        assert_eq!(v.as_of, today());
    }

    #[test_case("" ; "empty")]
    #[test_case("   " ; "spaces")]
    #[test_case("\t\n" ; "control whitespace")]
    fn test_blank_ticker_rejected(ticker: &str) {
        let err = ReportRequest::new(ticker, 0.1).validate_base(today()).unwrap_err();
        assert!(matches!(err, RationaleError::EmptyTicker));
    }

    #[test_case(-0.01 ; "negative")]
    #[test_case(1.0001 ; "above one")]
    #[test_case(f64::NAN ; "nan")]
    fn test_weight_out_of_range(weight: f64) {
        let err = ReportRequest::new("MSFT", weight).validate_base(today()).unwrap_err();
        assert!(matches!(err, RationaleError::WeightOutOfRange(_)));
    }

    #[test_case(0.0 ; "zero")]
    #[test_case(1.0 ; "one")]
    fn test_weight_bounds_inclusive(weight: f64) {
        assert!(ReportRequest::new("MSFT", weight).validate_base(today()).is_ok());
    }

    #[test_case("2024/05/01" ; "slashes")]
    #[test_case("2024-5-1" ; "unpadded")]
    #[test_case("2024-02-30" ; "impossible day")]
    #[test_case("yesterday" ; "word")]
    fn test_bad_as_of(raw: &str) {
        let err = ReportRequest::new("MSFT", 0.1)
            .as_of(raw)
            .validate_base(today())
            .unwrap_err();
        assert!(matches!(err, RationaleError::InvalidAsOf(_)));
    }

    #[test]
    fn test_explicit_as_of() {
        let v = ReportRequest::new("MSFT", 0.1)
            .as_of("2024-01-31")
            .validate_base(today())
            .unwrap();
        assert_eq!(v.as_of, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    }

    #[test]
    fn test_news_window() {
        let (base, window) = ReportRequest::new("nvda", 0.2)
            .as_of("2024-03-10")
            .lookback_days(3)
            .max_articles(5)
            .validate_news(today())
            .unwrap();
        assert_eq!(base.ticker, "NVDA");
        assert_eq!(window.start, NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
        assert_eq!(window.end, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(window.max_articles, 5);
        assert!(window.contains(window.start));
        assert!(window.contains(window.end));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()));
    }

    #[test_case(0, 8 ; "zero lookback")]
    #[test_case(-3, 8 ; "negative lookback")]
    #[test_case(7, 0 ; "zero articles")]
    fn test_non_positive_window(lookback: i64, max_articles: i64) {
        let err = ReportRequest::new("MSFT", 0.1)
            .lookback_days(lookback)
            .max_articles(max_articles)
            .validate_news(today())
            .unwrap_err();
        assert!(err.is_validation());
        assert!(matches!(
            err,
            RationaleError::NonPositiveLookback(_) | RationaleError::NonPositiveMaxArticles(_)
        ));
    }

    #[test]
    fn test_ticker_checked_before_window() {
        let err = ReportRequest::new(" ", 0.1)
            .lookback_days(0)
            .validate_news(today())
            .unwrap_err();
        assert!(matches!(err, RationaleError::EmptyTicker));
    }
}
