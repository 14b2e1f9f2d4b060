use super::features::FeatureResult;
use crate::core::video::Frame;
use log::warn;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("Model load failed: {0}")]
    ModelLoad(String),
    #[error("Inference failed: {0}")]
    Inference(String),
}

/// 外部感知模型的适配层
///
/// 没有检测到人脸/手/姿态时返回 `Ok(FeatureResult::NotFound)`，
/// 只有调用本身失败才返回 `Err`。实现不得修改输入帧。
pub trait Detector: Send + Sync {
    fn name(&self) -> &str;

    fn detect(&self, frame: &Frame) -> Result<FeatureResult, DetectorError>;
}

impl<D: Detector + ?Sized> Detector for Arc<D> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn detect(&self, frame: &Frame) -> Result<FeatureResult, DetectorError> {
        (**self).detect(frame)
    }
}

impl<D: Detector + ?Sized> Detector for Box<D> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn detect(&self, frame: &Frame) -> Result<FeatureResult, DetectorError> {
        (**self).detect(frame)
    }
}

/// 检测失败按“无信号”处理，不中断整段分析
pub fn detect_or_absent(detector: &dyn Detector, frame: &Frame) -> FeatureResult {
    match detector.detect(frame) {
        Ok(result) => result,
        Err(e) => {
            warn!(
                "⚠️ Detector {} failed on frame {}: {}",
                detector.name(),
                frame.frame_number,
                e
            );
            FeatureResult::NotFound
        }
    }
}

type Responder = Box<dyn Fn(u64) -> Result<FeatureResult, DetectorError> + Send + Sync>;

/// 按帧号返回预设结果的检测器，用于测试和离线回放
pub struct MockDetector {
    name: String,
    responder: Responder,
}

impl MockDetector {
    pub fn new() -> Self {
        Self::with_responder(|_| Ok(FeatureResult::NotFound))
    }

    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(u64) -> Result<FeatureResult, DetectorError> + Send + Sync + 'static,
    {
        Self {
            name: "mock".to_string(),
            responder: Box::new(responder),
        }
    }

    pub fn with_pattern<F>(pattern: F) -> Self
    where
        F: Fn(u64) -> FeatureResult + Send + Sync + 'static,
    {
        Self::with_responder(move |frame_number| Ok(pattern(frame_number)))
    }

    /// 指定帧返回给定结果，其余帧返回 `NotFound`
    pub fn with_fixed_frames(frames: Vec<(u64, FeatureResult)>) -> Self {
        let frames: HashMap<u64, FeatureResult> = frames.into_iter().collect();
        Self::with_pattern(move |frame_number| {
            frames
                .get(&frame_number)
                .cloned()
                .unwrap_or(FeatureResult::NotFound)
        })
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Default for MockDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for MockDetector {
    fn name(&self) -> &str {
        &self.name
    }

    fn detect(&self, frame: &Frame) -> Result<FeatureResult, DetectorError> {
        (self.responder)(frame.frame_number)
    }
}
