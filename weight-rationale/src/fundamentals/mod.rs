//! Fundamentals evidence stream.
//!
//! ```text
//! FundamentalsSource ──► FundamentalsBundle ──► MetricNormalizer ──► MetricMap
//!                                                                      │
//!                                  FundamentalRationale ◄── FundamentalScorer
//! ```

pub mod normalizer;
pub mod report;
pub mod scorer;
pub mod source;
pub mod types;

pub use normalizer::MetricNormalizer;
pub use report::{format_currency, metrics_prompt_summary, metrics_table, FundamentalReport};
pub use scorer::{FundamentalRationale, FundamentalScorer, SignalTally};
pub use source::{FundamentalsSource, YahooFundamentalsSource};
pub use types::{FinancialStatement, FundamentalsBundle, MetricKey, MetricKind, MetricMap};
