//! News evidence stream.
//!
//! ```text
//! NewsSource (primary, secondary) ──► NewsPayload ──► NewsParser ──► window filter
//!                                                                       │
//!                      NewsOpinion ◄── NewsScorer (score, rank, cap) ◄──┘
//! ```

pub mod parser;
pub mod payload;
pub mod report;
pub mod retriever;
pub mod scorer;
pub mod source;
pub mod types;

pub use parser::NewsParser;
pub use payload::NewsPayload;
pub use report::{headline_table, prompt_digest, NewsWeightReport};
pub use retriever::NewsRetriever;
pub use scorer::{net_sentiment, score_text, NewsOpinion, NewsScorer};
pub use source::{GoogleNewsRssSource, NewsSource, YahooNewsSource};
pub use types::{NewsArticle, Sentiment};
