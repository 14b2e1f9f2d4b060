//! 转写文本的情感分析：整体极性、语气词计数、消极句子标记

use super::lexicon::{LexiconScorer, PolarityScorer};
use crate::core::analysis::verdict::Verdict;
use indexmap::IndexMap;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    pub fillers: Vec<String>,
    /// 句子极性低于该值才会被标记
    pub flag_polarity: f64,
    /// 句子词数必须大于该值才会被标记
    pub flag_min_words: usize,
    pub positive_threshold: f64,
    pub negative_threshold: f64,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            fillers: ["uh", "um", "like", "you know", "so", "actually", "basically"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            flag_polarity: -0.3,
            flag_min_words: 3,
            positive_threshold: 0.1,
            negative_threshold: -0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    #[serde(rename = "No Speech")]
    NoSpeech,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::NoSpeech => "No Speech",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentAnalysis {
    pub label: SentimentLabel,
    pub polarity: f64,
    pub hesitation_count: usize,
    pub filler_counts: IndexMap<String, usize>,
    pub flagged_sentences: Vec<String>,
    pub word_count: usize,
}

impl SentimentAnalysis {
    fn no_speech() -> Self {
        Self {
            label: SentimentLabel::NoSpeech,
            polarity: 0.0,
            hesitation_count: 0,
            filler_counts: IndexMap::new(),
            flagged_sentences: Vec::new(),
            word_count: 0,
        }
    }
}

pub const REASON_NEGATIVE_SENTENCES: &str = "Negative Sentences";
pub const REASON_FILLER_WORDS: &str = "Filler Words";

pub struct SentimentAnalyzer {
    config: SentimentConfig,
    scorer: Arc<dyn PolarityScorer>,
    fillers: Vec<(String, Regex)>,
    sentence_re: Regex,
    word_re: Regex,
}

impl SentimentAnalyzer {
    pub fn new(config: SentimentConfig) -> Result<Self, SentimentError> {
        Self::with_scorer(config, Arc::new(LexiconScorer::new()))
    }

    pub fn with_scorer(
        config: SentimentConfig,
        scorer: Arc<dyn PolarityScorer>,
    ) -> Result<Self, SentimentError> {
        let fillers = config
            .fillers
            .iter()
            .map(|filler| {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(filler.trim()));
                Regex::new(&pattern).map(|re| (filler.clone(), re))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            config,
            scorer,
            fillers,
            sentence_re: Regex::new(r"[^.!?]+[.!?]*")?,
            word_re: Regex::new(r"[\p{L}\p{N}'’]+")?,
        })
    }

    pub fn config(&self) -> &SentimentConfig {
        &self.config
    }

    pub fn label_for(&self, polarity: f64) -> SentimentLabel {
        if polarity > self.config.positive_threshold {
            SentimentLabel::Positive
        } else if polarity < self.config.negative_threshold {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn count_words(&self, text: &str) -> usize {
        self.word_re.find_iter(text).count()
    }

    pub fn sentences<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.sentence_re
            .find_iter(text)
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn analyze(&self, transcript: &str) -> SentimentAnalysis {
        if transcript.trim().is_empty() {
            return SentimentAnalysis::no_speech();
        }

        let polarity = self.scorer.polarity(transcript).clamp(-1.0, 1.0);

        let filler_counts: IndexMap<String, usize> = self
            .fillers
            .iter()
            .map(|(filler, re)| (filler.clone(), re.find_iter(transcript).count()))
            .collect();
        let hesitation_count = filler_counts.values().sum();

        let flagged_sentences = self
            .sentences(transcript)
            .into_iter()
            .filter(|sentence| {
                self.scorer.polarity(sentence) < self.config.flag_polarity
                    && self.count_words(sentence) > self.config.flag_min_words
            })
            .map(str::to_string)
            .collect();

        let analysis = SentimentAnalysis {
            label: self.label_for(polarity),
            polarity,
            hesitation_count,
            filler_counts,
            flagged_sentences,
            word_count: self.count_words(transcript),
        };
        debug!(
            "🗣️ Sentiment {} ({:.3}), {} fillers, {} flagged sentences",
            analysis.label.as_str(),
            analysis.polarity,
            analysis.hesitation_count,
            analysis.flagged_sentences.len()
        );
        analysis
    }

    /// 把整段转写当作一“帧”交给 RunningTally
    pub fn to_verdict(&self, analysis: &SentimentAnalysis) -> Verdict {
        let mut reasons = Vec::new();
        if !analysis.flagged_sentences.is_empty() {
            reasons.push(REASON_NEGATIVE_SENTENCES);
        }
        if analysis.hesitation_count > 3 {
            reasons.push(REASON_FILLER_WORDS);
        }

        Verdict::new(
            analysis.label.as_str(),
            matches!(analysis.label, SentimentLabel::Positive | SentimentLabel::Neutral),
            analysis.label != SentimentLabel::NoSpeech,
        )
        .with_reasons(reasons)
    }
}
