use super::features::FeatureResult;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Posture,
    EyeContact,
    Gesture,
    Emotion,
    Sentiment,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::Posture => "posture",
            Axis::EyeContact => "eye contact",
            Axis::Gesture => "gesture",
            Axis::Emotion => "emotion",
            Axis::Sentiment => "sentiment",
        };
        f.write_str(name)
    }
}

/// 百分比的分母
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBasis {
    /// 只统计有信号的帧
    SignalPresent,
    /// 所有选中帧，`NotFound` 计为未通过
    AllSelected,
    /// 只输出标签分布，不计分
    NotScored,
}

/// 单帧单维度的判定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub label: Cow<'static, str>,
    pub passed: bool,
    pub signal_present: bool,
    pub reasons: Vec<&'static str>,
}

impl Verdict {
    pub fn new(label: impl Into<Cow<'static, str>>, passed: bool, signal_present: bool) -> Self {
        Self {
            label: label.into(),
            passed,
            signal_present,
            reasons: Vec::new(),
        }
    }

    pub fn with_reasons(mut self, reasons: Vec<&'static str>) -> Self {
        self.reasons = reasons;
        self
    }
}

/// 每个维度从 `FeatureResult` 到 `Verdict` 的纯函数映射，必须对 `NotFound` 完整定义
pub trait VerdictClassifier: Send + Sync {
    fn axis(&self) -> Axis;

    fn strategy(&self) -> &'static str;

    fn score_basis(&self) -> ScoreBasis;

    /// 预先放进标签直方图的标签，决定并列时的顺序
    fn labels(&self) -> &'static [&'static str] {
        &[]
    }

    fn classify(&self, feature: &FeatureResult) -> Verdict;
}

impl<C: VerdictClassifier + ?Sized> VerdictClassifier for Box<C> {
    fn axis(&self) -> Axis {
        (**self).axis()
    }

    fn strategy(&self) -> &'static str {
        (**self).strategy()
    }

    fn score_basis(&self) -> ScoreBasis {
        (**self).score_basis()
    }

    fn labels(&self) -> &'static [&'static str] {
        (**self).labels()
    }

    fn classify(&self, feature: &FeatureResult) -> Verdict {
        (**self).classify(feature)
    }
}
