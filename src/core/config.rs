//! 分析配置：默认值、预设，以及 JSON5 配置文件加载

use crate::core::analysis::{EyeContactStrategy, PostureStrategy};
use crate::core::text::SentimentConfig;
use crate::core::video::{FfmpegOptions, SamplerConfig, SamplingMode};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config parse error: {0}")]
    Parse(#[from] json5::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 各维度的抽帧方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisSampling {
    pub posture: SamplingMode,
    pub eye_contact: SamplingMode,
    pub gesture: SamplingMode,
    pub emotion: SamplingMode,
}

impl Default for AxisSampling {
    fn default() -> Self {
        Self {
            posture: SamplingMode::DurationAdaptive,
            eye_contact: SamplingMode::Fixed { stride: 5 },
            gesture: SamplingMode::Fixed { stride: 5 },
            emotion: SamplingMode::RateTargeted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub sampler: SamplerConfig,
    pub sampling: AxisSampling,
    pub posture_strategy: PostureStrategy,
    pub eye_contact_strategy: EyeContactStrategy,
    /// 并行情绪检测的线程数
    pub emotion_workers: usize,
    pub ffmpeg: FfmpegOptions,
    pub sentiment: SentimentConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sampler: SamplerConfig::default(),
            sampling: AxisSampling::default(),
            posture_strategy: PostureStrategy::FullBody,
            eye_contact_strategy: EyeContactStrategy::FaceMesh,
            emotion_workers: 4,
            ffmpeg: FfmpegOptions::default(),
            sentiment: SentimentConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// 粗略但快速：对齐检测 + 人脸检测，步长更大
    pub fn for_quick_scan() -> Self {
        Self {
            sampler: SamplerConfig {
                minimum_stride: 10,
                target_sample_budget: 100,
                target_samples_per_second: 2,
            },
            sampling: AxisSampling {
                posture: SamplingMode::DurationAdaptive,
                eye_contact: SamplingMode::Fixed { stride: 10 },
                gesture: SamplingMode::Fixed { stride: 10 },
                emotion: SamplingMode::RateTargeted,
            },
            posture_strategy: PostureStrategy::Alignment,
            eye_contact_strategy: EyeContactStrategy::FaceDetector,
            ..Self::default()
        }
    }

    /// 逐帧检查眼神、手势和坐姿
    pub fn for_thorough() -> Self {
        Self {
            sampling: AxisSampling {
                posture: SamplingMode::Fixed { stride: 1 },
                eye_contact: SamplingMode::Fixed { stride: 1 },
                gesture: SamplingMode::Fixed { stride: 1 },
                emotion: SamplingMode::RateTargeted,
            },
            ..Self::default()
        }
    }

    pub fn from_json5_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = json5::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!("⚙️ Loading analysis config from {:?}", path);
        let text = std::fs::read_to_string(path)?;
        Self::from_json5_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sampler.minimum_stride == 0 {
            return Err(ConfigError::Invalid("sampler.minimum_stride must be >= 1".into()));
        }
        if self.sampler.target_sample_budget == 0 {
            return Err(ConfigError::Invalid(
                "sampler.target_sample_budget must be >= 1".into(),
            ));
        }
        if self.sampler.target_samples_per_second == 0 {
            return Err(ConfigError::Invalid(
                "sampler.target_samples_per_second must be >= 1".into(),
            ));
        }

        let modes = [
            ("posture", self.sampling.posture),
            ("eye_contact", self.sampling.eye_contact),
            ("gesture", self.sampling.gesture),
            ("emotion", self.sampling.emotion),
        ];
        for (axis, mode) in modes {
            if let SamplingMode::Fixed { stride: 0 } = mode {
                return Err(ConfigError::Invalid(format!("sampling.{}: stride must be >= 1", axis)));
            }
        }

        if self.emotion_workers == 0 {
            return Err(ConfigError::Invalid("emotion_workers must be >= 1".into()));
        }
        if let Some((w, h)) = self.ffmpeg.scale {
            if w == 0 || h == 0 {
                return Err(ConfigError::Invalid(format!("ffmpeg.scale {}x{} is empty", w, h)));
            }
        }

        let sentiment = &self.sentiment;
        if sentiment.positive_threshold < sentiment.negative_threshold {
            return Err(ConfigError::Invalid(
                "sentiment.positive_threshold must not be below negative_threshold".into(),
            ));
        }
        if sentiment.fillers.iter().any(|f| f.trim().is_empty()) {
            return Err(ConfigError::Invalid("sentiment.fillers contains an empty entry".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.sampler.minimum_stride, 5);
        assert_eq!(config.sampler.target_sample_budget, 200);
        assert_eq!(config.emotion_workers, 4);
        assert_eq!(config.ffmpeg.scale, Some((320, 240)));
        assert_eq!(config.sentiment.fillers.len(), 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        let quick = AnalysisConfig::for_quick_scan();
        assert_eq!(quick.posture_strategy, PostureStrategy::Alignment);
        assert_eq!(quick.eye_contact_strategy, EyeContactStrategy::FaceDetector);
        assert!(quick.validate().is_ok());

        let thorough = AnalysisConfig::for_thorough();
        assert_eq!(thorough.sampling.eye_contact, SamplingMode::Fixed { stride: 1 });
        assert!(thorough.validate().is_ok());
    }

    #[test]
    fn test_json5_partial_override() {
        let text = r#"{
            // 更严格的眼神检测
            eye_contact_strategy: "face_detector",
            sampling: { gesture: { mode: "fixed", stride: 3 } },
            sentiment: { fillers: ["um", "uh"] },
        }"#;
        let config = AnalysisConfig::from_json5_str(text).unwrap();
        assert_eq!(config.eye_contact_strategy, EyeContactStrategy::FaceDetector);
        assert_eq!(config.sampling.gesture, SamplingMode::Fixed { stride: 3 });
        assert_eq!(config.sampling.posture, SamplingMode::DurationAdaptive);
        assert_eq!(config.sentiment.fillers, vec!["um".to_string(), "uh".to_string()]);
        assert_eq!(config.sentiment.flag_polarity, -0.3);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let zero_stride = r#"{ sampling: { posture: { mode: "fixed", stride: 0 } } }"#;
        assert!(matches!(
            AnalysisConfig::from_json5_str(zero_stride),
            Err(ConfigError::Invalid(_))
        ));

        let zero_workers = r#"{ emotion_workers: 0 }"#;
        assert!(matches!(
            AnalysisConfig::from_json5_str(zero_workers),
            Err(ConfigError::Invalid(_))
        ));

        assert!(matches!(
            AnalysisConfig::from_json5_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.json5");
        std::fs::write(&path, "{ posture_strategy: 'alignment' }").unwrap();

        let config = AnalysisConfig::from_file(&path).unwrap();
        assert_eq!(config.posture_strategy, PostureStrategy::Alignment);
        assert!(matches!(
            AnalysisConfig::from_file(&dir.path().join("missing.json5")),
            Err(ConfigError::Io(_))
        ));
    }
}
