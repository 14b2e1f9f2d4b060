//! 检测器输出的结构化特征
//!
//! 坐标均为归一化值（0.0-1.0），y 越小越靠近画面顶部。

use serde::{Deserialize, Serialize};

// MediaPipe Pose 关键点索引
const POSE_NOSE: usize = 0;
const POSE_LEFT_SHOULDER: usize = 11;
const POSE_RIGHT_SHOULDER: usize = 12;
const POSE_LEFT_HIP: usize = 23;
const POSE_RIGHT_HIP: usize = 24;

// MediaPipe Hands 关键点索引
const HAND_WRIST: usize = 0;
const HAND_THUMB_TIP: usize = 4;
const HAND_INDEX_TIP: usize = 8;
const HAND_PINKY_TIP: usize = 20;

// MediaPipe Face Mesh：眼角与鼻尖
const MESH_LEFT_EYE: [usize; 2] = [33, 133];
const MESH_RIGHT_EYE: [usize; 2] = [362, 263];
const MESH_NOSE_TIP: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseLandmarks {
    pub nose_y: f32,
    pub left_shoulder_y: f32,
    pub right_shoulder_y: f32,
    pub left_hip_y: f32,
    pub right_hip_y: f32,
}

impl PoseLandmarks {
    pub fn spine_y(&self) -> f32 {
        (self.left_hip_y + self.right_hip_y) / 2.0
    }

    /// 从 33 点 `[x, y, z]` 关键点数组构造
    pub fn from_keypoints(landmarks: &[[f32; 3]]) -> Option<Self> {
        Some(Self {
            nose_y: landmarks.get(POSE_NOSE)?[1],
            left_shoulder_y: landmarks.get(POSE_LEFT_SHOULDER)?[1],
            right_shoulder_y: landmarks.get(POSE_RIGHT_SHOULDER)?[1],
            left_hip_y: landmarks.get(POSE_LEFT_HIP)?[1],
            right_hip_y: landmarks.get(POSE_RIGHT_HIP)?[1],
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandLandmarks {
    pub thumb_tip_y: f32,
    pub index_tip_y: f32,
    pub pinky_tip_y: f32,
    pub wrist_y: f32,
    #[serde(default)]
    pub handedness: Handedness,
}

impl HandLandmarks {
    /// 从 21 点 `[x, y, z]` 关键点数组构造（只取第一只手）
    pub fn from_keypoints(landmarks: &[[f32; 3]], handedness: Handedness) -> Option<Self> {
        Some(Self {
            thumb_tip_y: landmarks.get(HAND_THUMB_TIP)?[1],
            index_tip_y: landmarks.get(HAND_INDEX_TIP)?[1],
            pinky_tip_y: landmarks.get(HAND_PINKY_TIP)?[1],
            wrist_y: landmarks.get(HAND_WRIST)?[1],
            handedness,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceMeshLandmarks {
    pub left_eye_x: f32,
    pub right_eye_x: f32,
    pub nose_x: f32,
}

impl FaceMeshLandmarks {
    /// 从 468 点网格构造；左右眼 x 取两个眼角的中点
    pub fn from_mesh(landmarks: &[[f32; 3]]) -> Option<Self> {
        let midpoint_x = |pair: [usize; 2]| -> Option<f32> {
            Some((landmarks.get(pair[0])?[0] + landmarks.get(pair[1])?[0]) / 2.0)
        };

        Some(Self {
            left_eye_x: midpoint_x(MESH_LEFT_EYE)?,
            right_eye_x: midpoint_x(MESH_RIGHT_EYE)?,
            nose_x: landmarks.get(MESH_NOSE_TIP)?[0],
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceDetection {
    pub present: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionResult {
    pub dominant_label: String,
}

/// 单帧检测结果；`NotFound` 是正常结果而不是错误
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureResult {
    Pose(PoseLandmarks),
    Hand(HandLandmarks),
    FaceMesh(FaceMeshLandmarks),
    Face(FaceDetection),
    Emotion(EmotionResult),
    NotFound,
}

impl FeatureResult {
    pub fn is_signal_present(&self) -> bool {
        match self {
            FeatureResult::NotFound => false,
            FeatureResult::Face(face) => face.present,
            FeatureResult::Emotion(emotion) => !emotion.dominant_label.trim().is_empty(),
            _ => true,
        }
    }
}
