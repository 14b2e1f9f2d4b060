//! 基于词典的极性打分

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// 文本极性，范围 [-1, 1]
pub trait PolarityScorer: Send + Sync {
    fn polarity(&self, text: &str) -> f64;
}

const NEGATION_FACTOR: f64 = -0.5;

const NEGATORS: [&str; 3] = ["not", "no", "never"];

const INTENSIFIERS: [(&str, f64); 5] = [
    ("very", 1.3),
    ("really", 1.3),
    ("extremely", 1.5),
    ("so", 1.2),
    ("too", 1.2),
];

const LEXICON_ENTRIES: &[(&str, f64)] = &[
    // positive
    ("good", 0.7),
    ("great", 0.8),
    ("excellent", 1.0),
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("wonderful", 1.0),
    ("fantastic", 0.4),
    ("best", 1.0),
    ("better", 0.5),
    ("nice", 0.6),
    ("happy", 0.8),
    ("glad", 0.5),
    ("love", 0.5),
    ("enjoy", 0.4),
    ("enjoyed", 0.4),
    ("excited", 0.4),
    ("exciting", 0.3),
    ("passionate", 0.5),
    ("confident", 0.5),
    ("successful", 0.75),
    ("success", 0.3),
    ("strong", 0.43),
    ("positive", 0.23),
    ("interesting", 0.5),
    ("impressive", 1.0),
    ("helpful", 0.5),
    ("perfect", 1.0),
    ("easy", 0.43),
    ("clear", 0.1),
    ("effective", 0.6),
    ("efficient", 0.5),
    ("creative", 0.5),
    ("proud", 0.8),
    ("grateful", 0.5),
    ("thankful", 0.5),
    ("fortunate", 0.4),
    ("motivated", 0.4),
    ("reliable", 0.5),
    ("valuable", 0.5),
    ("fun", 0.3),
    ("right", 0.29),
    ("well", 0.3),
    ("important", 0.4),
    ("improve", 0.2),
    ("improved", 0.3),
    ("achieve", 0.3),
    ("achieved", 0.4),
    ("learn", 0.2),
    ("growth", 0.3),
    ("opportunity", 0.4),
    // negative
    ("bad", -0.7),
    ("worse", -0.4),
    ("worst", -1.0),
    ("terrible", -1.0),
    ("awful", -1.0),
    ("horrible", -1.0),
    ("poor", -0.4),
    ("sad", -0.5),
    ("angry", -0.5),
    ("hate", -0.8),
    ("hated", -0.8),
    ("difficult", -0.5),
    ("hard", -0.29),
    ("problem", -0.3),
    ("problems", -0.3),
    ("fail", -0.5),
    ("failed", -0.5),
    ("failure", -0.5),
    ("wrong", -0.5),
    ("boring", -1.0),
    ("stupid", -0.8),
    ("annoying", -0.8),
    ("frustrating", -0.4),
    ("frustrated", -0.7),
    ("stressful", -0.4),
    ("stressed", -0.4),
    ("nervous", -0.2),
    ("worried", -0.4),
    ("afraid", -0.6),
    ("weak", -0.38),
    ("negative", -0.3),
    ("unfortunately", -0.5),
    ("disappointed", -0.75),
    ("disappointing", -0.6),
    ("confused", -0.4),
    ("confusing", -0.3),
    ("useless", -0.5),
    ("impossible", -0.67),
    ("mistake", -0.4),
    ("mistakes", -0.4),
    ("conflict", -0.3),
    ("quit", -0.3),
    ("fired", -0.4),
    ("unhappy", -0.6),
    ("lazy", -0.25),
    ("slow", -0.3),
];

static LEXICON: Lazy<HashMap<&'static str, f64>> =
    Lazy::new(|| LEXICON_ENTRIES.iter().copied().collect());

fn is_negator(word: &str) -> bool {
    NEGATORS.contains(&word) || word.ends_with("n't")
}

fn intensity(word: &str) -> Option<f64> {
    INTENSIFIERS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|(_, weight)| *weight)
}

pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '’'))
        .filter(|w| !w.is_empty())
        .map(|w| w.replace('’', "'").to_lowercase())
        .collect()
}

/// 词典平均分；前置否定词乘以 -0.5，前置程度副词乘以其权重
///
/// 词表与权重取自 TextBlob 模式词典的一小部分，分数只是近似值，
/// 和 TextBlob 的结果不完全一致。`flag_polarity` 等阈值按 TextBlob 的尺度设定，
/// 需要精确对齐时通过 `PolarityScorer` 接入外部打分器。
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }

    fn word_score(tokens: &[String], index: usize, base: f64) -> f64 {
        let mut score = base;
        let mut cursor = index;

        if cursor > 0 {
            if let Some(weight) = intensity(&tokens[cursor - 1]) {
                score *= weight;
                cursor -= 1;
            }
        }

        if cursor > 0 && is_negator(&tokens[cursor - 1]) {
            score *= NEGATION_FACTOR;
        }

        score
    }
}

impl PolarityScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> f64 {
        let tokens = tokenize(text);
        let scores: Vec<f64> = tokens
            .iter()
            .enumerate()
            .filter_map(|(i, token)| {
                LEXICON
                    .get(token.as_str())
                    .map(|base| Self::word_score(&tokens, i, *base))
            })
            .collect();

        if scores.is_empty() {
            return 0.0;
        }
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        mean.clamp(-1.0, 1.0)
    }
}
