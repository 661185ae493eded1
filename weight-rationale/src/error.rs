//! Errors surfaced by the report pipeline.
//!
//! Only request validation and batch file I/O ever reach a caller. Vendor
//! failures degrade to empty evidence inside the retrieval stages and
//! augmentation failures become [`crate::augment::AugmentOutcome::Declined`].

use chrono::NaiveDate;
use thiserror::Error;

/// Result alias for report operations.
pub type Result<T> = std::result::Result<T, RationaleError>;

/// Error returned by the report entry points and the batch explainer.
#[derive(Debug, Error)]
pub enum RationaleError {
    #[error("Ticker symbol cannot be empty")]
    EmptyTicker,

    #[error("Weight must be between 0.0 and 1.0 inclusive, got {0}")]
    WeightOutOfRange(f64),

    #[error("Lookback window must be positive, got {0}")]
    NonPositiveLookback(i64),

    #[error("max_articles must be positive, got {0}")]
    NonPositiveMaxArticles(i64),

    #[error("as_of must be in YYYY-MM-DD format, got {0:?}")]
    InvalidAsOf(String),

    #[error("as_of {as_of} minus a {lookback_days}-day lookback falls outside the calendar")]
    WindowOverflow { as_of: NaiveDate, lookback_days: i64 },

    #[error("Decision step {step} is too far from base date {base_date}")]
    StepOutOfRange { step: u64, base_date: NaiveDate },

    #[error("Failed to write report {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl RationaleError {
    /// True for errors raised before any I/O because the request itself was malformed.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Io { .. })
    }
}

impl From<RationaleError> for weight_common::Error {
    fn from(err: RationaleError) -> Self {
        match err {
            RationaleError::Io { path, source } => weight_common::Error::Io(std::io::Error::new(
                source.kind(),
                format!("{path}: {source}"),
            )),
            other => weight_common::Error::InvalidRequest(other.to_string()),
        }
    }
}
