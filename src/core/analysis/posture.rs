//! 坐姿判定
//!
//! 两套独立的启发式规则，由调用方选择：
//! - `FullBody`：100 分起扣，肩部高度差、头肩距离、脊柱-肩距离三项独立扣分，>= 60 分为 good
//! - `Alignment`：只看左右肩、左右髋的高度差是否都小于 0.05

use super::features::{FeatureResult, PoseLandmarks};
use super::verdict::{Axis, ScoreBasis, Verdict, VerdictClassifier};
use serde::{Deserialize, Serialize};

pub const SHOULDER_MISALIGNMENT_THRESHOLD: f32 = 0.12;
pub const HEAD_TILT_THRESHOLD: f32 = 0.25;
pub const SPINE_BEND_THRESHOLD: f32 = 0.35;

pub const SHOULDER_MISALIGNMENT_PENALTY: i32 = 20;
pub const HEAD_TILT_PENALTY: i32 = 30;
pub const SPINE_BEND_PENALTY: i32 = 30;

pub const GOOD_POSTURE_MIN_SCORE: i32 = 60;

pub const ALIGNMENT_THRESHOLD: f32 = 0.05;

pub const LABEL_GOOD: &str = "good";
pub const LABEL_NOT_GOOD: &str = "not good";
pub const LABEL_STRAIGHT: &str = "straight";
pub const LABEL_SLOUCHED: &str = "slouched";
pub const LABEL_NO_POSE: &str = "No Pose Detected";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostureStrategy {
    #[default]
    FullBody,
    Alignment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostureReason {
    HeadTilt,
    ShoulderMisalignment,
    SpineBend,
}

impl PostureReason {
    pub fn tag(&self) -> &'static str {
        match self {
            PostureReason::HeadTilt => "Head Tilt",
            PostureReason::ShoulderMisalignment => "Shoulder Misalignment",
            PostureReason::SpineBend => "Spine Bend",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostureAssessment {
    pub score: i32,
    pub reasons: Vec<PostureReason>,
}

impl PostureAssessment {
    pub fn is_good(&self) -> bool {
        self.score >= GOOD_POSTURE_MIN_SCORE
    }
}

/// 三项扣分互相独立，可以叠加
pub fn assess_full_body(pose: &PoseLandmarks) -> PostureAssessment {
    let mut score = 100;
    let mut reasons = Vec::new();

    if (pose.left_shoulder_y - pose.right_shoulder_y).abs() > SHOULDER_MISALIGNMENT_THRESHOLD {
        score -= SHOULDER_MISALIGNMENT_PENALTY;
        reasons.push(PostureReason::ShoulderMisalignment);
    }

    if (pose.nose_y - pose.left_shoulder_y).abs() > HEAD_TILT_THRESHOLD {
        score -= HEAD_TILT_PENALTY;
        reasons.push(PostureReason::HeadTilt);
    }

    if (pose.spine_y() - pose.left_shoulder_y).abs() > SPINE_BEND_THRESHOLD {
        score -= SPINE_BEND_PENALTY;
        reasons.push(PostureReason::SpineBend);
    }

    PostureAssessment { score, reasons }
}

pub fn is_aligned(pose: &PoseLandmarks) -> bool {
    (pose.left_shoulder_y - pose.right_shoulder_y).abs() < ALIGNMENT_THRESHOLD
        && (pose.left_hip_y - pose.right_hip_y).abs() < ALIGNMENT_THRESHOLD
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PostureClassifier {
    strategy: PostureStrategy,
}

impl PostureClassifier {
    pub fn new(strategy: PostureStrategy) -> Self {
        Self { strategy }
    }
}

impl VerdictClassifier for PostureClassifier {
    fn axis(&self) -> Axis {
        Axis::Posture
    }

    fn strategy(&self) -> &'static str {
        match self.strategy {
            PostureStrategy::FullBody => "full_body",
            PostureStrategy::Alignment => "alignment",
        }
    }

    fn score_basis(&self) -> ScoreBasis {
        match self.strategy {
            PostureStrategy::FullBody => ScoreBasis::SignalPresent,
            PostureStrategy::Alignment => ScoreBasis::AllSelected,
        }
    }

    fn labels(&self) -> &'static [&'static str] {
        match self.strategy {
            PostureStrategy::FullBody => &[LABEL_GOOD, LABEL_NOT_GOOD],
            PostureStrategy::Alignment => &[LABEL_STRAIGHT, LABEL_SLOUCHED],
        }
    }

    fn classify(&self, feature: &FeatureResult) -> Verdict {
        let pose = match feature {
            FeatureResult::Pose(pose) => pose,
            _ => {
                let label = match self.strategy {
                    PostureStrategy::FullBody => LABEL_NO_POSE,
                    PostureStrategy::Alignment => LABEL_SLOUCHED,
                };
                return Verdict::new(label, false, false);
            }
        };

        match self.strategy {
            PostureStrategy::FullBody => {
                let assessment = assess_full_body(pose);
                let good = assessment.is_good();
                let label = if good { LABEL_GOOD } else { LABEL_NOT_GOOD };
                Verdict::new(label, good, true)
                    .with_reasons(assessment.reasons.iter().map(|r| r.tag()).collect())
            }
            PostureStrategy::Alignment => {
                let straight = is_aligned(pose);
                let label = if straight { LABEL_STRAIGHT } else { LABEL_SLOUCHED };
                Verdict::new(label, straight, true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upright_pose() -> PoseLandmarks {
        PoseLandmarks {
            nose_y: 0.20,
            left_shoulder_y: 0.40,
            right_shoulder_y: 0.41,
            left_hip_y: 0.70,
            right_hip_y: 0.70,
        }
    }

    #[test]
    fn test_upright_scores_full_marks() {
        let assessment = assess_full_body(&upright_pose());
        assert_eq!(assessment.score, 100);
        assert!(assessment.reasons.is_empty());
        assert!(assessment.is_good());
    }

    #[test]
    fn test_penalties_are_additive() {
        let pose = PoseLandmarks {
            nose_y: 0.05,
            left_shoulder_y: 0.40,
            right_shoulder_y: 0.60,
            left_hip_y: 0.90,
            right_hip_y: 0.90,
        };
        let assessment = assess_full_body(&pose);
        assert_eq!(assessment.score, 20);
        assert_eq!(
            assessment.reasons,
            vec![
                PostureReason::ShoulderMisalignment,
                PostureReason::HeadTilt,
                PostureReason::SpineBend
            ]
        );

        let verdict = PostureClassifier::new(PostureStrategy::FullBody)
            .classify(&FeatureResult::Pose(pose));
        assert_eq!(verdict.label, LABEL_NOT_GOOD);
        assert!(!verdict.passed);
        assert_eq!(verdict.reasons.len(), 3);
    }

    #[test]
    fn test_single_penalty_still_good() {
        let mut pose = upright_pose();
        pose.nose_y = 0.05;
        let assessment = assess_full_body(&pose);
        assert_eq!(assessment.score, 70);
        assert!(assessment.is_good());

        pose.right_shoulder_y = 0.60;
        let assessment = assess_full_body(&pose);
        assert_eq!(assessment.score, 50);
        assert!(!assessment.is_good());
    }

    #[test]
    fn test_alignment_strategy() {
        let classifier = PostureClassifier::new(PostureStrategy::Alignment);

        let verdict = classifier.classify(&FeatureResult::Pose(upright_pose()));
        assert_eq!(verdict.label, LABEL_STRAIGHT);
        assert!(verdict.passed);

        let mut tilted = upright_pose();
        tilted.left_hip_y = 0.76;
        let verdict = classifier.classify(&FeatureResult::Pose(tilted));
        assert_eq!(verdict.label, LABEL_SLOUCHED);
        assert!(verdict.signal_present);
    }

    #[test]
    fn test_strategies_disagree_on_same_pose() {
        // 肩部高度差 0.08：FullBody 不扣分，Alignment 判为 slouched
        let mut pose = upright_pose();
        pose.right_shoulder_y = 0.48;
        let feature = FeatureResult::Pose(pose);

        assert!(PostureClassifier::new(PostureStrategy::FullBody).classify(&feature).passed);
        assert!(!PostureClassifier::new(PostureStrategy::Alignment).classify(&feature).passed);
    }

    #[test]
    fn test_not_found() {
        let full = PostureClassifier::new(PostureStrategy::FullBody).classify(&FeatureResult::NotFound);
        assert_eq!(full.label, LABEL_NO_POSE);
        assert!(!full.signal_present);
        assert!(full.reasons.is_empty());

        let aligned =
            PostureClassifier::new(PostureStrategy::Alignment).classify(&FeatureResult::NotFound);
        assert_eq!(aligned.label, LABEL_SLOUCHED);
        assert!(!aligned.passed);
    }
}
