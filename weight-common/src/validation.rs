//! Configuration validation.
//!
//! Catches values that would otherwise surface as confusing runtime behavior
//! (zero timeouts, an empty worker pool, an unparseable batch base date).

use chrono::NaiveDate;
use thiserror::Error;

use crate::config::{BatchConfig, Config, FundamentalsConfig, LlmConfig, NewsConfig, ObservabilityConfig};

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

fn invalid(field: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        reason: reason.into(),
    }
}

impl Config {
    /// Validate the entire configuration.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors: Vec<ValidationError> = [
            self.llm.validate(),
            self.news.validate(),
            self.fundamentals.validate(),
            self.observability.validate(),
            self.batch.validate(),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();

        if errors.is_empty() {
            Ok(())
        } else if errors.len() == 1 {
            Err(errors.remove(0))
        } else {
            Err(ValidationError::Multiple(errors))
        }
    }

    /// Load (with env overrides) and validate configuration.
    pub fn load_and_validate() -> anyhow::Result<Self> {
        let config = Self::load_with_env()?;
        config.validate().map_err(|e| anyhow::anyhow!("{}", e))?;
        Ok(config)
    }
}

impl Validate for LlmConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.default_model.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "llm.default_model".into(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(invalid("llm.timeout_secs", "must be greater than 0"));
        }
        Ok(())
    }
}

impl Validate for NewsConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.lookback_days <= 0 {
            return Err(invalid("news.lookback_days", "must be positive"));
        }
        if self.max_articles <= 0 {
            return Err(invalid("news.max_articles", "must be positive"));
        }
        if self.timeout_secs == 0 {
            return Err(invalid("news.timeout_secs", "must be greater than 0"));
        }
        if url::Url::parse(&self.rss_base_url).is_err() {
            return Err(invalid("news.rss_base_url", "must be an absolute URL"));
        }
        Ok(())
    }
}

impl Validate for FundamentalsConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.timeout_secs == 0 {
            return Err(invalid("fundamentals.timeout_secs", "must be greater than 0"));
        }
        Ok(())
    }
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(invalid(
                "observability.log_level",
                "must be one of trace, debug, info, warn, error",
            ));
        }
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.log_format.to_lowercase().as_str()) {
            return Err(invalid("observability.log_format", "must be json or pretty"));
        }
        Ok(())
    }
}

impl Validate for BatchConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.max_workers == 0 {
            return Err(invalid("batch.max_workers", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.min_weight) {
            return Err(invalid("batch.min_weight", "must lie in [0, 1]"));
        }
        if self.top_k == Some(0) {
            return Err(invalid("batch.top_k", "must be at least 1 when set"));
        }
        if NaiveDate::parse_from_str(&self.base_date, "%Y-%m-%d").is_err() {
            return Err(invalid("batch.base_date", "must be in YYYY-MM-DD format"));
        }
        Ok(())
    }
}
