//! Weight Rationale Library
//!
//! Explains why a portfolio holds a ticker at a given weight, from two
//! independent evidence streams and an optional language-model pass.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                      WeightRationaleEngine                           │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │  FundamentalsSource ─► MetricNormalizer ─► FundamentalScorer ──┐     │
//! │                                                                ├─►  SynthesisCombiner
//! │  NewsRetriever ─► NewsParser ─► NewsScorer ────────────────────┘     │
//! │                                                                      │
//! │  AugmentationLayer (OpenAI / Gemini), optional, per report           │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Failure Model
//!
//! - Malformed requests fail before any network access.
//! - Vendor failures degrade to empty evidence and filler statements.
//! - Augmentation failures keep the rule-based bullets and are recorded on
//!   the report as [`AugmentationStatus::Declined`].

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod agents;
pub mod augment;
pub mod batch;
pub mod error;
pub mod fundamentals;
pub mod news;
pub mod render;
pub mod request;
pub mod source;
pub mod synthesis;

pub use agents::WeightRationaleEngine;
pub use augment::{AugmentationLayer, AugmentationStatus};
pub use batch::{BatchExplainer, BatchFailure, BatchOutcome};
pub use error::{RationaleError, Result};
pub use fundamentals::FundamentalReport;
pub use news::NewsWeightReport;
pub use request::{AugmentOptions, ReportRequest};
pub use source::SourceError;
pub use synthesis::WeightSynthesisReport;
