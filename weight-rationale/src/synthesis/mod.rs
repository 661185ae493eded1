//! Combined view over both evidence streams.

pub mod combiner;
pub mod report;

pub use combiner::{
    metrics_snapshot, news_cadence, SynthesisCombiner, MAX_SUMMARY_POINTS, MIN_SUMMARY_POINTS,
};
pub use report::WeightSynthesisReport;
