use super::features::{FaceMeshLandmarks, FeatureResult};
use super::verdict::{Axis, ScoreBasis, Verdict, VerdictClassifier};
use serde::{Deserialize, Serialize};

/// 双眼中心与鼻尖的最大水平偏移
pub const EYE_CENTER_THRESHOLD: f32 = 0.05;

pub const LABEL_CONTACT: &str = "contact";
pub const LABEL_NO_CONTACT: &str = "no contact";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EyeContactStrategy {
    /// 根据网格关键点判断是否正视镜头
    #[default]
    FaceMesh,
    /// 只要检测到人脸就算眼神接触
    FaceDetector,
}

pub fn is_looking_at_camera(mesh: &FaceMeshLandmarks) -> bool {
    (mesh.left_eye_x - mesh.nose_x).abs() < EYE_CENTER_THRESHOLD
        && (mesh.right_eye_x - mesh.nose_x).abs() < EYE_CENTER_THRESHOLD
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EyeContactClassifier {
    strategy: EyeContactStrategy,
}

impl EyeContactClassifier {
    pub fn new(strategy: EyeContactStrategy) -> Self {
        Self { strategy }
    }
}

fn contact_verdict(contact: bool, signal_present: bool) -> Verdict {
    let label = if contact { LABEL_CONTACT } else { LABEL_NO_CONTACT };
    Verdict::new(label, contact, signal_present)
}

impl VerdictClassifier for EyeContactClassifier {
    fn axis(&self) -> Axis {
        Axis::EyeContact
    }

    fn strategy(&self) -> &'static str {
        match self.strategy {
            EyeContactStrategy::FaceMesh => "face_mesh",
            EyeContactStrategy::FaceDetector => "face_detector",
        }
    }

    fn score_basis(&self) -> ScoreBasis {
        ScoreBasis::AllSelected
    }

    fn labels(&self) -> &'static [&'static str] {
        &[LABEL_CONTACT, LABEL_NO_CONTACT]
    }

    fn classify(&self, feature: &FeatureResult) -> Verdict {
        match (self.strategy, feature) {
            (EyeContactStrategy::FaceMesh, FeatureResult::FaceMesh(mesh)) => {
                contact_verdict(is_looking_at_camera(mesh), true)
            }
            (EyeContactStrategy::FaceDetector, FeatureResult::Face(face)) => {
                contact_verdict(face.present, face.present)
            }
            _ => contact_verdict(false, false),
        }
    }
}
