//! Configuration management for the weight rationale services.
//!
//! Configuration lives in a single file at `~/.weight-rationale/config.json`.
//! A missing file is not an error; defaults apply.
//!
//! # Configuration Priority
//!
//! 1. Environment variables
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `WEIGHT_RATIONALE_LLM_MODEL` → llm.default_model
//! - `OPENAI_API_KEY` → llm.openai_api_key
//! - `GOOGLE_API_KEY` / `GEMINI_API_KEY` → llm.google_api_key (GOOGLE wins)
//! - `WEIGHT_RATIONALE_LOG_LEVEL` → observability.log_level
//! - `WEIGHT_RATIONALE_LOG_FORMAT` → observability.log_format
//! - `WEIGHT_RATIONALE_REPORT_DIR` → batch.report_dir

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".weight-rationale"),
        |dirs| dirs.home_dir().join(".weight-rationale"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// LLM Configuration
// ============================================================================

/// Text-generation provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model used when a request does not name one.
    #[serde(default = "default_llm_model")]
    pub default_model: String,

    /// OpenAI API key. Usually supplied through `OPENAI_API_KEY`.
    #[serde(default, skip_serializing)]
    pub openai_api_key: Option<String>,

    /// Google AI Studio key for Gemini models.
    #[serde(default, skip_serializing)]
    pub google_api_key: Option<String>,

    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,

    /// Request timeout for a single generation call.
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            default_model: default_llm_model(),
            openai_api_key: None,
            google_api_key: None,
            openai_base_url: default_openai_base_url(),
            gemini_base_url: default_gemini_base_url(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

// ============================================================================
// Evidence Source Configuration
// ============================================================================

/// News retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    /// Default lookback window in days.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,

    /// Default cap on scored articles kept per report.
    #[serde(default = "default_max_articles")]
    pub max_articles: i64,

    /// Base URL of the syndicated RSS search feed.
    #[serde(default = "default_rss_base_url")]
    pub rss_base_url: String,

    /// Base URL of the vendor headline search endpoint.
    #[serde(default = "default_vendor_base_url")]
    pub vendor_base_url: String,

    #[serde(default = "default_news_timeout")]
    pub timeout_secs: u64,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            lookback_days: default_lookback_days(),
            max_articles: default_max_articles(),
            rss_base_url: default_rss_base_url(),
            vendor_base_url: default_vendor_base_url(),
            timeout_secs: default_news_timeout(),
        }
    }
}

/// Fundamentals vendor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundamentalsConfig {
    #[serde(default = "default_vendor_base_url")]
    pub base_url: String,

    #[serde(default = "default_fundamentals_timeout")]
    pub timeout_secs: u64,
}

impl Default for FundamentalsConfig {
    fn default() -> Self {
        Self {
            base_url: default_vendor_base_url(),
            timeout_secs: default_fundamentals_timeout(),
        }
    }
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,

    /// Additional module targets to hold at `warn`.
    #[serde(default)]
    pub excluded_targets: Vec<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            excluded_targets: Vec::new(),
        }
    }
}

// ============================================================================
// Batch Configuration
// ============================================================================

/// Settings for explaining a whole allocation step at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Upper bound on concurrently running report pipelines.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Allocations strictly below this weight are skipped.
    #[serde(default = "default_min_weight")]
    pub min_weight: f64,

    /// Keep only the `top_k` largest allocations when set.
    #[serde(default)]
    pub top_k: Option<usize>,

    /// Directory receiving `step_NNNNNN_TICKER.md` files.
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,

    /// Calendar date of step zero (YYYY-MM-DD).
    #[serde(default = "default_base_date")]
    pub base_date: String,

    /// Request augmentation for every batch report.
    #[serde(default)]
    pub augment: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            min_weight: default_min_weight(),
            top_k: None,
            report_dir: default_report_dir(),
            base_date: default_base_date(),
            augment: false,
        }
    }
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub news: NewsConfig,

    #[serde(default)]
    pub fundamentals: FundamentalsConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub batch: BatchConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration with environment variable overrides.
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply process environment overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Empty values are ignored so that `FOO=` does not blank out a file value.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(model) = var("WEIGHT_RATIONALE_LLM_MODEL") {
            self.llm.default_model = model.trim().to_string();
        }
        if let Some(key) = var("OPENAI_API_KEY") {
            self.llm.openai_api_key = Some(key);
        }
        if let Some(key) = var("GOOGLE_API_KEY").or_else(|| var("GEMINI_API_KEY")) {
            self.llm.google_api_key = Some(key);
        }
        if let Some(level) = var("WEIGHT_RATIONALE_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(format) = var("WEIGHT_RATIONALE_LOG_FORMAT") {
            self.observability.log_format = format;
        }
        if let Some(dir) = var("WEIGHT_RATIONALE_REPORT_DIR") {
            self.batch.report_dir = PathBuf::from(dir);
        }
    }

    /// Save the configuration to a specific path, creating parent directories.
    ///
    /// API keys are never written back.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }
}

// ============================================================================
// Defaults
// ============================================================================

fn default_llm_model() -> String {
    "gemini-2.0-flash".into()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com".into()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}

fn default_llm_timeout() -> u64 {
    60
}

fn default_lookback_days() -> i64 {
    7
}

fn default_max_articles() -> i64 {
    8
}

fn default_rss_base_url() -> String {
    "https://news.google.com".into()
}

fn default_vendor_base_url() -> String {
    "https://query1.finance.yahoo.com".into()
}

fn default_news_timeout() -> u64 {
    10
}

fn default_fundamentals_timeout() -> u64 {
    15
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

fn default_max_workers() -> usize {
    3
}

fn default_min_weight() -> f64 {
    0.01
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_base_date() -> String {
    "2023-01-01".into()
}
