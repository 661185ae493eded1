//! Shared plumbing for the weight rationale workspace.
//!
//! ```text
//! ~/.weight-rationale/config.json ──► Config ──► apply_env_overrides ──► validate
//!                                                                          │
//!                    init_logging ◄── observability section ◄──────────────┘
//! ```
//!
//! Also holds the exit-status [`Error`] taxonomy and the string helpers used
//! for headline dedup and log redaction.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;
pub mod util;
pub mod validation;

pub use config::{
    BatchConfig, Config, FundamentalsConfig, LlmConfig, NewsConfig, ObservabilityConfig,
};
pub use error::Error;
pub use validation::{Validate, ValidationError, ValidationResult};
