pub mod detector;
pub mod emotion;
pub mod eye_contact;
pub mod features;
pub mod feedback;
pub mod gesture;
pub mod model_cache;
pub mod pipeline;
pub mod posture;
pub mod summary;
pub mod tally;
pub mod verdict;

pub use detector::{detect_or_absent, Detector, DetectorError, MockDetector};
pub use emotion::{EmotionClassifier, NO_FACE_LABEL};
pub use eye_contact::{EyeContactClassifier, EyeContactStrategy};
pub use features::{
    EmotionResult, FaceDetection, FaceMeshLandmarks, FeatureResult, HandLandmarks, Handedness,
    PoseLandmarks,
};
pub use feedback::{Feedback, Rating};
pub use gesture::{classify_hand, Gesture, GestureClassifier};
pub use model_cache::LazyModel;
pub use pipeline::{AxisRun, FramePipeline};
pub use posture::{assess_full_body, PostureClassifier, PostureReason, PostureStrategy};
pub use summary::Summary;
pub use tally::RunningTally;
pub use verdict::{Axis, ScoreBasis, Verdict, VerdictClassifier};
