//! 手势判定：y 越小越靠上，按顺序匹配，第一条命中的规则生效

use super::features::{FeatureResult, HandLandmarks};
use super::verdict::{Axis, ScoreBasis, Verdict, VerdictClassifier};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gesture {
    #[serde(rename = "Open Palm")]
    OpenPalm,
    Fist,
    #[serde(rename = "Thumbs Up")]
    ThumbsUp,
    Victory,
    #[serde(rename = "No Hand")]
    NoHand,
}

impl Gesture {
    /// 直方图的初始顺序
    pub const ALL: [Gesture; 5] = [
        Gesture::OpenPalm,
        Gesture::Fist,
        Gesture::ThumbsUp,
        Gesture::Victory,
        Gesture::NoHand,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Gesture::OpenPalm => "Open Palm",
            Gesture::Fist => "Fist",
            Gesture::ThumbsUp => "Thumbs Up",
            Gesture::Victory => "Victory",
            Gesture::NoHand => "No Hand",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.label() == label)
    }
}

const GESTURE_LABELS: [&str; 5] = ["Open Palm", "Fist", "Thumbs Up", "Victory", "No Hand"];

pub fn classify_hand(hand: &HandLandmarks) -> Gesture {
    let wrist = hand.wrist_y;

    if hand.thumb_tip_y < wrist && hand.index_tip_y < wrist {
        Gesture::ThumbsUp
    } else if hand.index_tip_y < wrist && hand.pinky_tip_y < wrist {
        Gesture::Victory
    } else if [hand.thumb_tip_y, hand.index_tip_y, hand.pinky_tip_y]
        .iter()
        .all(|y| *y > wrist)
    {
        Gesture::OpenPalm
    } else if [hand.thumb_tip_y, hand.index_tip_y].iter().all(|y| *y < wrist) {
        // 与 Thumbs Up 条件相同，实际不会命中
        Gesture::Fist
    } else {
        Gesture::NoHand
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GestureClassifier;

impl VerdictClassifier for GestureClassifier {
    fn axis(&self) -> Axis {
        Axis::Gesture
    }

    fn strategy(&self) -> &'static str {
        "landmark_rules"
    }

    fn score_basis(&self) -> ScoreBasis {
        ScoreBasis::SignalPresent
    }

    fn labels(&self) -> &'static [&'static str] {
        &GESTURE_LABELS
    }

    fn classify(&self, feature: &FeatureResult) -> Verdict {
        match feature {
            FeatureResult::Hand(hand) => {
                let gesture = classify_hand(hand);
                Verdict::new(gesture.label(), gesture != Gesture::NoHand, true)
            }
            _ => Verdict::new(Gesture::NoHand.label(), false, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analysis::features::Handedness;

    fn hand(thumb: f32, index: f32, pinky: f32, wrist: f32) -> HandLandmarks {
        HandLandmarks {
            thumb_tip_y: thumb,
            index_tip_y: index,
            pinky_tip_y: pinky,
            wrist_y: wrist,
            handedness: Handedness::Right,
        }
    }

    #[test]
    fn test_thumbs_up_wins_first() {
        assert_eq!(classify_hand(&hand(0.1, 0.1, 0.9, 0.5)), Gesture::ThumbsUp);
        // 所有指尖都在手腕上方时也是 Thumbs Up，Victory 不会被检查
        assert_eq!(classify_hand(&hand(0.1, 0.1, 0.1, 0.5)), Gesture::ThumbsUp);
    }

    #[test]
    fn test_rule_order() {
        assert_eq!(classify_hand(&hand(0.9, 0.1, 0.1, 0.5)), Gesture::Victory);
        assert_eq!(classify_hand(&hand(0.9, 0.9, 0.9, 0.5)), Gesture::OpenPalm);
        assert_eq!(classify_hand(&hand(0.9, 0.1, 0.9, 0.5)), Gesture::NoHand);
        assert_eq!(classify_hand(&hand(0.5, 0.5, 0.5, 0.5)), Gesture::NoHand);
    }

    #[test]
    fn test_not_found_is_no_hand() {
        let verdict = GestureClassifier.classify(&FeatureResult::NotFound);
        assert_eq!(verdict.label, "No Hand");
        assert!(!verdict.signal_present);
    }

    #[test]
    fn test_unrecognized_hand_is_signal_present() {
        let verdict = GestureClassifier.classify(&FeatureResult::Hand(hand(0.9, 0.1, 0.9, 0.5)));
        assert_eq!(verdict.label, "No Hand");
        assert!(verdict.signal_present);
        assert!(!verdict.passed);
    }

    #[test]
    fn test_labels_round_trip() {
        for gesture in Gesture::ALL {
            assert_eq!(Gesture::from_label(gesture.label()), Some(gesture));
        }
        assert_eq!(GestureClassifier.labels().len(), Gesture::ALL.len());
    }
}
