use super::features::FeatureResult;
use super::verdict::{Axis, ScoreBasis, Verdict, VerdictClassifier};

pub const NO_FACE_LABEL: &str = "No Face Detected";

/// 直接透传外部分类器给出的主情绪标签
#[derive(Debug, Clone, Copy, Default)]
pub struct EmotionClassifier;

impl VerdictClassifier for EmotionClassifier {
    fn axis(&self) -> Axis {
        Axis::Emotion
    }

    fn strategy(&self) -> &'static str {
        "dominant_label"
    }

    fn score_basis(&self) -> ScoreBasis {
        ScoreBasis::NotScored
    }

    fn classify(&self, feature: &FeatureResult) -> Verdict {
        match feature {
            FeatureResult::Emotion(emotion) if !emotion.dominant_label.trim().is_empty() => {
                Verdict::new(emotion.dominant_label.trim().to_string(), true, true)
            }
            _ => Verdict::new(NO_FACE_LABEL, false, false),
        }
    }
}
