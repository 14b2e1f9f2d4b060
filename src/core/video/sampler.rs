//! 抽帧计划
//!
//! 帧索引从 0 开始，每读一帧加一（无论是否被选中）；
//! 索引 `i` 被选中当且仅当 `i % stride == 0`。计划在迭代开始前确定，运行中不再修改。

use super::error::VideoError;
use super::frame::Frame;
use super::source::{FrameSource, VideoMetadata};
use crate::core::cancel::CancelFlag;
use log::info;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SamplingRationale {
    Fixed,
    DurationAdaptive,
    RateTargeted,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// 最小步长，也是时长/帧率未知时的回退步长
    pub minimum_stride: u64,
    /// 整段视频的目标“有效”采样数
    pub target_sample_budget: u64,
    /// 按帧率采样时每秒目标帧数
    pub target_samples_per_second: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            minimum_stride: 5,
            target_sample_budget: 200,
            target_samples_per_second: 5,
        }
    }
}

/// 每个分析维度使用的采样方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "mode")]
pub enum SamplingMode {
    Fixed { stride: u64 },
    DurationAdaptive,
    RateTargeted,
}

impl SamplingMode {
    pub fn plan(&self, metadata: &VideoMetadata, config: &SamplerConfig) -> SamplingPlan {
        match *self {
            SamplingMode::Fixed { stride } => SamplingPlan::fixed(stride),
            SamplingMode::DurationAdaptive => SamplingPlan::duration_adaptive(metadata, config),
            SamplingMode::RateTargeted => SamplingPlan::rate_targeted(metadata.fps, config),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SamplingPlan {
    stride: u64,
    rationale: SamplingRationale,
}

impl SamplingPlan {
    pub fn fixed(stride: u64) -> Self {
        Self {
            stride: stride.max(1),
            rationale: SamplingRationale::Fixed,
        }
    }

    /// stride = max(minimum_stride, floor(duration / budget))
    pub fn duration_adaptive(metadata: &VideoMetadata, config: &SamplerConfig) -> Self {
        let minimum = config.minimum_stride.max(1);
        match metadata.duration() {
            Some(duration) if config.target_sample_budget > 0 => {
                let adaptive = (duration / config.target_sample_budget as f64).floor() as u64;
                let plan = Self {
                    stride: adaptive.max(minimum),
                    rationale: SamplingRationale::DurationAdaptive,
                };
                info!(
                    "📐 Duration-adaptive plan: {:.2}s / {} -> stride {}",
                    duration, config.target_sample_budget, plan.stride
                );
                plan
            }
            _ => {
                info!("📐 Duration unknown, falling back to stride {}", minimum);
                Self::fixed(minimum)
            }
        }
    }

    /// stride = max(1, floor(fps) / samples_per_second)
    pub fn rate_targeted(fps: Option<f64>, config: &SamplerConfig) -> Self {
        match fps.filter(|fps| fps.is_finite() && *fps > 0.0) {
            Some(fps) => {
                let per_second = config.target_samples_per_second.max(1);
                Self {
                    stride: ((fps.floor() as u64) / per_second).max(1),
                    rationale: SamplingRationale::RateTargeted,
                }
            }
            None => Self::fixed(config.minimum_stride),
        }
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    pub fn rationale(&self) -> SamplingRationale {
        self.rationale
    }

    pub fn should_select(&self, frame_index: u64) -> bool {
        frame_index % self.stride == 0
    }

    /// 索引 0..frame_count 中被选中的帧数
    pub fn expected_selected(&self, frame_count: u64) -> u64 {
        frame_count.div_ceil(self.stride)
    }
}

/// 按计划过滤帧来源；计数器在所有读到的帧之间共享
pub struct SampledFrames<'a, S: FrameSource + ?Sized> {
    source: &'a mut S,
    plan: SamplingPlan,
    next_index: u64,
    cancel: Option<CancelFlag>,
    cancelled: bool,
}

impl<'a, S: FrameSource + ?Sized> SampledFrames<'a, S> {
    pub fn new(source: &'a mut S, plan: SamplingPlan) -> Self {
        Self {
            source,
            plan,
            next_index: 0,
            cancel: None,
            cancelled: false,
        }
    }

    pub fn with_cancel(mut self, cancel: Option<CancelFlag>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn frames_read(&self) -> u64 {
        self.next_index
    }

    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }
}

impl<S: FrameSource + ?Sized> Iterator for SampledFrames<'_, S> {
    type Item = Result<(u64, Frame), VideoError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
                self.cancelled = true;
                return None;
            }

            let item = self.source.next()?;
            let index = self.next_index;
            self.next_index += 1;

            match item {
                Err(e) => return Some(Err(e)),
                Ok(frame) if self.plan.should_select(index) => return Some(Ok((index, frame))),
                Ok(_) => continue,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::video::source::MemoryFrameSource;

    fn create_test_frames(count: u64) -> Vec<Frame> {
        (0..count)
            .map(|i| Frame::new(2, 2, vec![(i % 255) as u8; 12], i).unwrap())
            .collect()
    }

    #[test]
    fn test_selection_count_over_inclusive_range() {
        for stride in 1..=12u64 {
            let plan = SamplingPlan::fixed(stride);
            for n in 0..=100u64 {
                let selected = (0..=n).filter(|i| plan.should_select(*i)).count() as u64;
                assert_eq!(selected, n / stride + 1, "n={} stride={}", n, stride);
            }
        }
    }

    #[test]
    fn test_fixed_stride_clamped_to_one() {
        let plan = SamplingPlan::fixed(0);
        assert_eq!(plan.stride(), 1);
        assert!(plan.should_select(3));
    }

    #[test]
    fn test_duration_adaptive_uses_minimum_for_short_clips() {
        let meta = VideoMetadata {
            fps: Some(30.0),
            frame_count: Some(1800),
            ..Default::default()
        };
        let plan = SamplingPlan::duration_adaptive(&meta, &SamplerConfig::default());
        assert_eq!(plan.stride(), 5);
        assert_eq!(plan.rationale(), SamplingRationale::DurationAdaptive);
    }

    #[test]
    fn test_duration_adaptive_long_clip() {
        let meta = VideoMetadata {
            duration_secs: Some(2500.0),
            ..Default::default()
        };
        let plan = SamplingPlan::duration_adaptive(&meta, &SamplerConfig::default());
        assert_eq!(plan.stride(), 12);
    }

    #[test]
    fn test_duration_unknown_falls_back() {
        let meta = VideoMetadata {
            frame_count: Some(900),
            ..Default::default()
        };
        let plan = SamplingPlan::duration_adaptive(&meta, &SamplerConfig::default());
        assert_eq!(plan, SamplingPlan::fixed(5));
        assert_eq!(plan.rationale(), SamplingRationale::Fixed);
    }

    #[test]
    fn test_rate_targeted() {
        let config = SamplerConfig::default();
        assert_eq!(SamplingPlan::rate_targeted(Some(30.0), &config).stride(), 6);
        assert_eq!(SamplingPlan::rate_targeted(Some(29.97), &config).stride(), 5);
        assert_eq!(SamplingPlan::rate_targeted(Some(3.0), &config).stride(), 1);
        assert_eq!(SamplingPlan::rate_targeted(None, &config), SamplingPlan::fixed(5));
    }

    #[test]
    fn test_expected_selected() {
        let plan = SamplingPlan::fixed(5);
        assert_eq!(plan.expected_selected(0), 0);
        assert_eq!(plan.expected_selected(10), 2);
        assert_eq!(plan.expected_selected(11), 3);
    }

    #[test]
    fn test_sampled_frames_shares_counter() {
        let mut source = MemoryFrameSource::new(create_test_frames(12), None);
        let mut sampled = SampledFrames::new(&mut source, SamplingPlan::fixed(5));

        let indices: Vec<u64> = sampled.by_ref().map(|r| r.unwrap().0).collect();
        assert_eq!(indices, vec![0, 5, 10]);
        assert_eq!(sampled.frames_read(), 12);
        assert!(!sampled.was_cancelled());
    }

    #[test]
    fn test_sampled_frames_stops_on_cancel() {
        let cancel = CancelFlag::new();
        let mut source = MemoryFrameSource::new(create_test_frames(20), None);
        let mut sampled =
            SampledFrames::new(&mut source, SamplingPlan::fixed(1)).with_cancel(Some(cancel.clone()));

        assert!(sampled.next().is_some());
        cancel.cancel();
        assert!(sampled.next().is_none());
        assert!(sampled.was_cancelled());
        assert_eq!(sampled.frames_read(), 1);
    }
}
