//! 根据统计结果生成评级和改进建议

use super::gesture::Gesture;
use super::summary::Summary;
use super::verdict::Axis;
use crate::core::text::{SentimentAnalysis, SentimentLabel};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Great,
    Moderate,
    NeedsImprovement,
}

impl Rating {
    pub fn from_score(score_percent: f64) -> Self {
        if score_percent >= 80.0 {
            Rating::Great
        } else if score_percent >= 50.0 {
            Rating::Moderate
        } else {
            Rating::NeedsImprovement
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feedback {
    pub rating: Option<Rating>,
    pub headline: &'static str,
    pub tips: Vec<&'static str>,
    /// 附加说明，例如语气词数量
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remarks: Vec<&'static str>,
}

impl Feedback {
    fn new(rating: Option<Rating>, headline: &'static str, tips: &[&'static str]) -> Self {
        Self {
            rating,
            headline,
            tips: tips.to_vec(),
            remarks: Vec::new(),
        }
    }

    fn no_data(axis: Axis) -> Self {
        let headline = match axis {
            Axis::Posture => "No pose detected",
            Axis::EyeContact => "No face detected",
            Axis::Gesture => "No hands detected",
            Axis::Emotion => "No face detected",
            Axis::Sentiment => "No speech detected",
        };
        Self::new(
            None,
            headline,
            &["Make sure you are clearly visible and well lit in the recording."],
        )
    }

    pub fn for_axis(axis: Axis, summary: &Summary) -> Self {
        if summary.total_selected == 0 {
            return Self::no_data(axis);
        }
        match axis {
            Axis::Posture => Self::for_posture(summary),
            Axis::EyeContact => Self::for_eye_contact(summary),
            Axis::Gesture => Self::for_gesture(summary),
            Axis::Emotion => Self::for_emotion(summary),
            Axis::Sentiment => Self::no_data(axis),
        }
    }

    fn for_posture(summary: &Summary) -> Self {
        match summary.rating() {
            None => Self::no_data(Axis::Posture),
            Some(Rating::Great) => Self::new(
                Some(Rating::Great),
                "Great Job!",
                &[
                    "Maintain your current posture.",
                    "Practice mindfulness to stay aware of your posture.",
                    "Continue regular posture exercises.",
                ],
            ),
            Some(Rating::Moderate) => Self::new(
                Some(Rating::Moderate),
                "Moderate Posture",
                &[
                    "Practice standing and sitting straight.",
                    "Use ergonomic furniture to support your posture.",
                    "Perform posture-correcting exercises daily.",
                ],
            ),
            Some(Rating::NeedsImprovement) => Self::new(
                Some(Rating::NeedsImprovement),
                "Needs Improvement",
                &[
                    "Focus on aligning your shoulders and hips.",
                    "Use a posture corrector if necessary.",
                    "Consult a physiotherapist for personalized advice.",
                ],
            ),
        }
    }

    fn for_eye_contact(summary: &Summary) -> Self {
        match summary.rating() {
            None => Self::no_data(Axis::EyeContact),
            Some(Rating::Great) => Self::new(
                Some(Rating::Great),
                "Great Job!",
                &[
                    "Maintain consistent eye contact.",
                    "Practice looking directly at the camera.",
                    "Avoid looking away or down frequently.",
                ],
            ),
            Some(Rating::Moderate) => Self::new(
                Some(Rating::Moderate),
                "Moderate Eye Contact",
                &[
                    "Practice maintaining eye contact for longer periods.",
                    "Use a mirror to practice looking straight ahead.",
                    "Avoid distractions that cause you to look away.",
                ],
            ),
            Some(Rating::NeedsImprovement) => Self::new(
                Some(Rating::NeedsImprovement),
                "Needs Improvement",
                &[
                    "Focus on looking directly at the camera.",
                    "Practice with a friend or in front of a mirror.",
                    "Record yourself to identify areas for improvement.",
                ],
            ),
        }
    }

    fn for_gesture(summary: &Summary) -> Self {
        let dominant = summary
            .dominant_label
            .as_deref()
            .and_then(Gesture::from_label)
            .unwrap_or(Gesture::NoHand);

        match dominant {
            Gesture::OpenPalm => Self::new(
                Some(Rating::Great),
                "Great Job!",
                &[
                    "Maintain open and confident gestures.",
                    "Use open palms to emphasize points.",
                    "Avoid overusing the same gesture.",
                ],
            ),
            Gesture::Fist => Self::new(
                Some(Rating::Moderate),
                "Moderate Gesture Usage",
                &[
                    "Use fists sparingly to avoid appearing aggressive.",
                    "Combine with open palms for balanced gestures.",
                    "Practice varied hand movements.",
                ],
            ),
            Gesture::ThumbsUp => Self::new(
                Some(Rating::Great),
                "Positive Gesture!",
                &[
                    "Use thumbs up to show approval or agreement.",
                    "Avoid overusing to maintain impact.",
                    "Combine with other gestures for variety.",
                ],
            ),
            Gesture::Victory => Self::new(
                Some(Rating::Great),
                "Positive Gesture!",
                &[
                    "Use victory signs to express success or positivity.",
                    "Avoid overusing to maintain impact.",
                    "Combine with other gestures for variety.",
                ],
            ),
            Gesture::NoHand => Self::new(
                Some(Rating::NeedsImprovement),
                "Needs Improvement",
                &[
                    "Ensure hands are visible in the frame.",
                    "Practice using gestures to enhance communication.",
                    "Avoid keeping hands hidden or still.",
                ],
            ),
        }
    }

    /// 只要出现过 happy 就算好，其次看 neutral
    fn for_emotion(summary: &Summary) -> Self {
        if summary.label_count("happy") > 0 {
            Self::new(
                Some(Rating::Great),
                "Great Job!",
                &[
                    "Maintain positive facial expressions.",
                    "Smile naturally to convey confidence.",
                    "Avoid overexaggerating expressions.",
                ],
            )
        } else if summary.label_count("neutral") > 0 {
            Self::new(
                Some(Rating::Moderate),
                "Moderate Expressions",
                &[
                    "Practice showing more emotion in your expressions.",
                    "Use gestures to complement your facial expressions.",
                    "Record yourself to identify areas for improvement.",
                ],
            )
        } else {
            Self::new(
                Some(Rating::NeedsImprovement),
                "Needs Improvement",
                &[
                    "Focus on expressing emotions clearly.",
                    "Practice in front of a mirror to improve facial expressions.",
                    "Seek feedback from others to refine your expressions.",
                ],
            )
        }
    }

    pub fn for_speech(analysis: &SentimentAnalysis) -> Self {
        if analysis.label == SentimentLabel::NoSpeech {
            return Self::no_data(Axis::Sentiment);
        }

        let mut feedback = if analysis.label == SentimentLabel::Negative {
            Self::new(
                Some(Rating::NeedsImprovement),
                "Improvement Needed",
                &[
                    "Practice positive language framing.",
                    "Use more confident vocabulary.",
                    "Record practice sessions for review.",
                ],
            )
        } else if analysis.hesitation_count > 3 {
            Self::new(
                Some(Rating::Moderate),
                "Clarity Tips",
                &[
                    "Pause instead of using filler words.",
                    "Practice with a metronome.",
                    "Record and review your speech.",
                ],
            )
        } else {
            Self::new(
                Some(Rating::Great),
                "Great Job!",
                &[
                    "Maintain your speaking pace.",
                    "Continue practicing regularly.",
                    "Review advanced communication techniques.",
                ],
            )
        };

        feedback.remarks.push(filler_remark(analysis.hesitation_count));
        feedback
    }
}

pub fn filler_remark(hesitation_count: usize) -> &'static str {
    if hesitation_count > 5 {
        "Too many filler words! Practice speaking more deliberately."
    } else if hesitation_count > 0 {
        "Moderate filler words detected. Try to reduce them."
    } else {
        "Excellent speech clarity!"
    }
}
