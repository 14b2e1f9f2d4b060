pub mod lexicon;
pub mod sentiment;

pub use lexicon::{LexiconScorer, PolarityScorer};
pub use sentiment::{
    SentimentAnalysis, SentimentAnalyzer, SentimentConfig, SentimentError, SentimentLabel,
};
