//! 视频维度分析入口：坐姿、眼神、手势、情绪

use crate::core::analysis::{
    Axis, AxisRun, Detector, EmotionClassifier, EyeContactClassifier, EyeContactStrategy, Feedback,
    FramePipeline, GestureClassifier, PostureClassifier, RunningTally, Summary, VerdictClassifier,
};
use crate::core::cancel::CancelFlag;
use crate::core::config::AnalysisConfig;
use crate::core::video::{
    dump_sampled_frames, FfmpegFrameSource, FrameSource, SamplingMode, SamplingPlan,
};
use log::{error, info};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("No {0} detector configured")]
    MissingDetector(&'static str),
    #[error("Axis {0} is not a video axis")]
    UnsupportedAxis(Axis),
}

/// 外部感知模型，每个维度一个，缺失的维度在 `analyze_all` 中跳过
#[derive(Clone, Default)]
pub struct DetectorSet {
    pub pose: Option<Arc<dyn Detector>>,
    pub hand: Option<Arc<dyn Detector>>,
    pub face_mesh: Option<Arc<dyn Detector>>,
    pub face: Option<Arc<dyn Detector>>,
    pub emotion: Option<Arc<dyn Detector>>,
}

impl DetectorSet {
    pub fn with_pose(mut self, detector: Arc<dyn Detector>) -> Self {
        self.pose = Some(detector);
        self
    }

    pub fn with_hand(mut self, detector: Arc<dyn Detector>) -> Self {
        self.hand = Some(detector);
        self
    }

    pub fn with_face_mesh(mut self, detector: Arc<dyn Detector>) -> Self {
        self.face_mesh = Some(detector);
        self
    }

    pub fn with_face(mut self, detector: Arc<dyn Detector>) -> Self {
        self.face = Some(detector);
        self
    }

    pub fn with_emotion(mut self, detector: Arc<dyn Detector>) -> Self {
        self.emotion = Some(detector);
        self
    }
}

/// 单个维度的分析结果
#[derive(Debug, Clone, Serialize)]
pub struct AxisReport {
    pub axis: Axis,
    pub strategy: &'static str,
    pub plan: Option<SamplingPlan>,
    pub frames_read: u64,
    pub source_error: Option<String>,
    pub cancelled: bool,
    pub summary: Summary,
    pub feedback: Feedback,
}

impl AxisReport {
    fn from_run(classifier: &dyn VerdictClassifier, plan: SamplingPlan, run: AxisRun) -> Self {
        let summary = run.tally.summarize(classifier.score_basis());
        let feedback = Feedback::for_axis(classifier.axis(), &summary);
        info!(
            "📊 [{}] score {:?}, dominant {:?}, coverage {:.1}%",
            classifier.axis(),
            summary.score_percent,
            summary.dominant_label,
            summary.coverage_percent
        );
        Self {
            axis: classifier.axis(),
            strategy: classifier.strategy(),
            plan: Some(plan),
            frames_read: run.frames_read,
            source_error: run.source_error,
            cancelled: run.cancelled,
            summary,
            feedback,
        }
    }

    /// 视频打不开时的空报告
    fn unavailable(classifier: &dyn VerdictClassifier, source_error: String) -> Self {
        let summary = RunningTally::with_labels(classifier.labels()).summarize(classifier.score_basis());
        let feedback = Feedback::for_axis(classifier.axis(), &summary);
        Self {
            axis: classifier.axis(),
            strategy: classifier.strategy(),
            plan: None,
            frames_read: 0,
            source_error: Some(source_error),
            cancelled: false,
            summary,
            feedback,
        }
    }
}

/// 面试视频分析器
///
/// ```ignore
/// let analyzer = InterviewAnalyzer::new(AnalysisConfig::default(), detectors);
/// let posture = analyzer.analyze_posture(Path::new("interview.mp4"))?;
/// println!("{:?}", posture.summary.score_percent);
/// ```
pub struct InterviewAnalyzer {
    config: AnalysisConfig,
    detectors: DetectorSet,
    cancel: Option<CancelFlag>,
}

impl InterviewAnalyzer {
    pub fn new(config: AnalysisConfig, detectors: DetectorSet) -> Self {
        info!(
            "🎬 InterviewAnalyzer: created (posture {:?}, eye contact {:?})",
            config.posture_strategy, config.eye_contact_strategy
        );
        Self {
            config,
            detectors,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    fn axis_parts(
        &self,
        axis: Axis,
    ) -> Result<(Arc<dyn Detector>, Box<dyn VerdictClassifier>, SamplingMode), AnalyzerError> {
        let sampling = &self.config.sampling;
        match axis {
            Axis::Posture => Ok((
                self.detectors.pose.clone().ok_or(AnalyzerError::MissingDetector("pose"))?,
                Box::new(PostureClassifier::new(self.config.posture_strategy)),
                sampling.posture,
            )),
            Axis::EyeContact => {
                let strategy = self.config.eye_contact_strategy;
                let detector = match strategy {
                    EyeContactStrategy::FaceMesh => self
                        .detectors
                        .face_mesh
                        .clone()
                        .ok_or(AnalyzerError::MissingDetector("face mesh"))?,
                    EyeContactStrategy::FaceDetector => {
                        self.detectors.face.clone().ok_or(AnalyzerError::MissingDetector("face"))?
                    }
                };
                Ok((
                    detector,
                    Box::new(EyeContactClassifier::new(strategy)),
                    sampling.eye_contact,
                ))
            }
            Axis::Gesture => Ok((
                self.detectors.hand.clone().ok_or(AnalyzerError::MissingDetector("hand"))?,
                Box::new(GestureClassifier),
                sampling.gesture,
            )),
            Axis::Emotion => Ok((
                self.detectors
                    .emotion
                    .clone()
                    .ok_or(AnalyzerError::MissingDetector("emotion"))?,
                Box::new(EmotionClassifier),
                sampling.emotion,
            )),
            Axis::Sentiment => Err(AnalyzerError::UnsupportedAxis(axis)),
        }
    }

    /// 对已打开的帧来源做单维度分析；情绪维度走落盘 + 并行分类
    pub fn analyze_source<S: FrameSource + ?Sized>(
        &self,
        axis: Axis,
        source: &mut S,
    ) -> Result<AxisReport, AnalyzerError> {
        let (detector, classifier, mode) = self.axis_parts(axis)?;
        let plan = mode.plan(source.metadata(), &self.config.sampler);
        let pipeline =
            FramePipeline::new(detector.as_ref(), classifier.as_ref()).with_cancel(self.cancel.clone());

        if axis != Axis::Emotion {
            let run = pipeline.run(source, plan);
            return Ok(AxisReport::from_run(classifier.as_ref(), plan, run));
        }

        match dump_sampled_frames(source, plan, self.cancel.clone()) {
            Ok(frames) => {
                let run = pipeline.run_parallel(&frames, self.config.emotion_workers);
                Ok(AxisReport::from_run(classifier.as_ref(), plan, run))
            }
            Err(e) => {
                error!("❌ [{}] Frame dump failed: {}", axis, e);
                Ok(AxisReport::unavailable(classifier.as_ref(), e.to_string()))
            }
        }
    }

    /// 打开视频文件并分析单个维度，每个维度独立解码一遍
    pub fn analyze_axis(&self, axis: Axis, video: &Path) -> Result<AxisReport, AnalyzerError> {
        let (_, classifier, _) = self.axis_parts(axis)?;
        match FfmpegFrameSource::open(video, &self.config.ffmpeg) {
            Ok(mut source) => self.analyze_source(axis, &mut source),
            Err(e) => {
                error!("❌ [{}] Cannot open {:?}: {}", axis, video, e);
                Ok(AxisReport::unavailable(classifier.as_ref(), e.to_string()))
            }
        }
    }

    pub fn analyze_posture(&self, video: &Path) -> Result<AxisReport, AnalyzerError> {
        self.analyze_axis(Axis::Posture, video)
    }

    pub fn analyze_eye_contact(&self, video: &Path) -> Result<AxisReport, AnalyzerError> {
        self.analyze_axis(Axis::EyeContact, video)
    }

    pub fn analyze_gestures(&self, video: &Path) -> Result<AxisReport, AnalyzerError> {
        self.analyze_axis(Axis::Gesture, video)
    }

    pub fn analyze_emotion(&self, video: &Path) -> Result<AxisReport, AnalyzerError> {
        self.analyze_axis(Axis::Emotion, video)
    }

    fn available_axes(&self) -> Vec<Axis> {
        [Axis::Posture, Axis::EyeContact, Axis::Gesture, Axis::Emotion]
            .into_iter()
            .filter(|axis| self.axis_parts(*axis).is_ok())
            .collect()
    }

    /// 依次分析所有配置了检测器的维度
    pub fn analyze_all(&self, video: &Path) -> Vec<AxisReport> {
        self.available_axes()
            .into_iter()
            .filter_map(|axis| self.analyze_axis(axis, video).ok())
            .collect()
    }
}

impl Drop for InterviewAnalyzer {
    fn drop(&mut self) {
        info!("🗑️ InterviewAnalyzer: released");
    }
}
