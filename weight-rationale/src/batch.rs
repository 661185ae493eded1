//! Explains a whole allocation step at once.
//!
//! Given the tickers and weights chosen at a decision step, the explainer
//! keeps the meaningful allocations, runs the combined report for each on a
//! bounded pool, and writes one markdown file per ticker:
//!
//! ```text
//! <report_dir>/step_000042_AAPL.md
//! ```
//!
//! A failing ticker is logged and recorded; it never aborts the batch.

use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate};
use futures::stream::{self, StreamExt};
use tracing::{error, info, warn};

use crate::agents::WeightRationaleEngine;
use crate::error::{RationaleError, Result};
use crate::request::{parse_as_of, AugmentOptions, ReportRequest};
use weight_common::Config;

const FALLBACK_BASE_DATE: (i32, u32, u32) = (2023, 1, 1);

/// One ticker that could not be explained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub ticker: String,
    pub reason: String,
}

/// What a batch produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub written: Vec<PathBuf>,
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Writes combined reports for the allocations of a decision step.
#[derive(Debug, Clone)]
pub struct BatchExplainer {
    engine: WeightRationaleEngine,
    report_dir: PathBuf,
    base_date: NaiveDate,
    min_weight: f64,
    top_k: Option<usize>,
    max_workers: usize,
    lookback_days: i64,
    max_articles: i64,
    augment: AugmentOptions,
}

impl BatchExplainer {
    pub fn new(engine: WeightRationaleEngine, report_dir: impl Into<PathBuf>, base_date: NaiveDate) -> Self {
        Self {
            engine,
            report_dir: report_dir.into(),
            base_date,
            min_weight: 0.01,
            top_k: None,
            max_workers: 3,
            lookback_days: crate::request::DEFAULT_LOOKBACK_DAYS,
            max_articles: crate::request::DEFAULT_MAX_ARTICLES,
            augment: AugmentOptions::disabled(),
        }
    }

    /// Batch and news settings from the config.
    ///
    /// A malformed `base_date` falls back to 2023-01-01 with a warning.
    pub fn from_config(engine: WeightRationaleEngine, config: &Config) -> Self {
        let base_date = parse_as_of(config.batch.base_date.trim()).unwrap_or_else(|err| {
            warn!(base_date = %config.batch.base_date, error = %err, "Invalid batch base date, using default");
            fallback_base_date()
        });
        let augment = if config.batch.augment {
            AugmentOptions::with_model(None)
        } else {
            AugmentOptions::disabled()
        };

        Self::new(engine, config.batch.report_dir.clone(), base_date)
            .min_weight(config.batch.min_weight)
            .top_k(config.batch.top_k)
            .max_workers(config.batch.max_workers)
            .window(config.news.lookback_days, config.news.max_articles)
            .augment(augment)
    }

    pub fn min_weight(mut self, min_weight: f64) -> Self {
        self.min_weight = min_weight;
        self
    }

    pub fn top_k(mut self, top_k: Option<usize>) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn window(mut self, lookback_days: i64, max_articles: i64) -> Self {
        self.lookback_days = lookback_days;
        self.max_articles = max_articles;
        self
    }

    pub fn augment(mut self, augment: AugmentOptions) -> Self {
        self.augment = augment;
        self
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }

    /// Allocations worth explaining: weight at or above the minimum, largest
    /// first, at most `top_k`.
    pub fn select(&self, allocations: &[(String, f64)]) -> Vec<(String, f64)> {
        let mut selected: Vec<(String, f64)> = allocations
            .iter()
            .filter(|(_, weight)| *weight >= self.min_weight)
            .cloned()
            .collect();
        if let Some(k) = self.top_k {
            selected.sort_by(|a, b| b.1.total_cmp(&a.1));
            selected.truncate(k);
        }
        selected
    }

    /// Calendar date for a decision step.
    pub fn step_date(&self, step: u64) -> Result<NaiveDate> {
        self.base_date
            .checked_add_days(Days::new(step))
            .ok_or(RationaleError::StepOutOfRange {
                step,
                base_date: self.base_date,
            })
    }

    /// Explain every selected allocation of `step`.
    ///
    /// Fails only when the step date or the report directory is unusable.
    pub async fn explain_step(&self, step: u64, allocations: &[(String, f64)]) -> Result<BatchOutcome> {
        let as_of = self.step_date(step)?;
        let selected = self.select(allocations);
        if selected.is_empty() {
            info!(step, "No allocations above the minimum weight");
            return Ok(BatchOutcome::default());
        }

        tokio::fs::create_dir_all(&self.report_dir)
            .await
            .map_err(|source| RationaleError::Io {
                path: self.report_dir.display().to_string(),
                source,
            })?;

        info!(
            step,
            %as_of,
            tickers = selected.len(),
            workers = self.max_workers,
            "Explaining allocation step"
        );

        let results: Vec<(String, Result<PathBuf>)> = stream::iter(selected)
            .map(|(ticker, weight)| async move {
                let result = self.explain_one(step, as_of, &ticker, weight).await;
                (ticker, result)
            })
            .buffer_unordered(self.max_workers)
            .collect()
            .await;

        let mut outcome = BatchOutcome::default();
        for (ticker, result) in results {
            match result {
                Ok(path) => outcome.written.push(path),
                Err(err) => {
                    error!(ticker = %ticker, error = %err, "Failed to explain allocation");
                    outcome.failures.push(BatchFailure {
                        ticker,
                        reason: err.to_string(),
                    });
                }
            }
        }
        outcome.written.sort();
        Ok(outcome)
    }

    async fn explain_one(&self, step: u64, as_of: NaiveDate, ticker: &str, weight: f64) -> Result<PathBuf> {
        let mut request = ReportRequest::new(ticker, weight)
            .as_of(as_of.format("%Y-%m-%d").to_string())
            .lookback_days(self.lookback_days)
            .max_articles(self.max_articles);
        request.augment = self.augment.clone();

        let report = self.engine.combined_report(&request).await?;
        let path = self.report_dir.join(report_file_name(step, &report.ticker));
        tokio::fs::write(&path, report.to_markdown(true, true, true))
            .await
            .map_err(|source| RationaleError::Io {
                path: path.display().to_string(),
                source,
            })?;

        info!(ticker = %report.ticker, path = %path.display(), "Saved report");
        Ok(path)
    }
}

/// `step_{step:06}_{TICKER}.md`, with path-hostile characters replaced.
pub fn report_file_name(step: u64, ticker: &str) -> String {
    let safe: String = ticker
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    format!("step_{step:06}_{safe}.md")
}

fn fallback_base_date() -> NaiveDate {
    let (y, m, d) = FALLBACK_BASE_DATE;
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}
