//! 单维度分析流水线：FrameSource → 抽帧 → Detector → VerdictClassifier → RunningTally
//!
//! 默认顺序执行，每个选中帧分类并累加完之后才读下一帧；
//! 并行模式先把选中帧落盘，再由固定大小的线程池分块处理，最后按块顺序合并。

use super::detector::{detect_or_absent, Detector};
use super::features::FeatureResult;
use super::tally::RunningTally;
use super::verdict::{Verdict, VerdictClassifier};
use crate::core::cancel::CancelFlag;
use crate::core::video::{ExtractedFrame, ExtractedFrames, Frame, FrameSource, SampledFrames, SamplingPlan};
use log::{debug, error, info, warn};
use rayon::prelude::*;

#[derive(Debug, Clone)]
pub struct AxisRun {
    pub tally: RunningTally,
    pub frames_read: u64,
    /// 读帧中途失败时的错误，之前的帧仍然保留在 tally 中
    pub source_error: Option<String>,
    pub cancelled: bool,
}

pub struct FramePipeline<'a> {
    detector: &'a dyn Detector,
    classifier: &'a dyn VerdictClassifier,
    cancel: Option<CancelFlag>,
}

impl<'a> FramePipeline<'a> {
    pub fn new(detector: &'a dyn Detector, classifier: &'a dyn VerdictClassifier) -> Self {
        Self {
            detector,
            classifier,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: Option<CancelFlag>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn classify_frame(&self, frame: &Frame) -> Verdict {
        let feature = detect_or_absent(self.detector, frame);
        let verdict = self.classifier.classify(&feature);
        debug!(
            "🔍 [{}] frame {} -> {} (signal: {}, reasons: {:?})",
            self.classifier.axis(),
            frame.frame_number,
            verdict.label,
            verdict.signal_present,
            verdict.reasons
        );
        verdict
    }

    fn new_tally(&self) -> RunningTally {
        RunningTally::with_labels(self.classifier.labels())
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|c| c.is_cancelled())
    }

    pub fn run<S: FrameSource + ?Sized>(&self, source: &mut S, plan: SamplingPlan) -> AxisRun {
        info!(
            "▶️ [{}] Sequential run with {} (stride {}, {:?})",
            self.classifier.axis(),
            self.detector.name(),
            plan.stride(),
            plan.rationale()
        );

        let mut tally = self.new_tally();
        let mut source_error = None;

        let mut sampled = SampledFrames::new(source, plan).with_cancel(self.cancel.clone());
        for item in sampled.by_ref() {
            match item {
                Ok((_, frame)) => tally.accumulate(self.classify_frame(&frame)),
                Err(e) => {
                    error!("❌ [{}] Frame source failed: {}", self.classifier.axis(), e);
                    source_error = Some(e.to_string());
                    break;
                }
            }
        }

        let run = AxisRun {
            tally,
            frames_read: sampled.frames_read(),
            source_error,
            cancelled: sampled.was_cancelled(),
        };
        info!(
            "✅ [{}] Read {} frames, classified {} ({} with signal){}",
            self.classifier.axis(),
            run.frames_read,
            run.tally.total_selected(),
            run.tally.signal_present(),
            if run.cancelled { ", cancelled" } else { "" }
        );
        run
    }

    fn classify_extracted(&self, frames: &ExtractedFrames, entry: &ExtractedFrame) -> Verdict {
        match frames.load(entry) {
            Ok(frame) => self.classify_frame(&frame),
            Err(e) => {
                warn!("⚠️ Failed to load frame {}: {}", entry.frame_number, e);
                self.classifier.classify(&FeatureResult::NotFound)
            }
        }
    }

    fn classify_chunk(&self, frames: &ExtractedFrames, chunk: &[ExtractedFrame]) -> RunningTally {
        let mut tally = self.new_tally();
        for entry in chunk {
            if self.is_cancelled() {
                break;
            }
            tally.accumulate(self.classify_extracted(frames, entry));
        }
        tally
    }

    /// 分块并行分类，每个工作线程只写自己的 tally，全部完成后按块顺序合并
    pub fn run_parallel(&self, frames: &ExtractedFrames, workers: usize) -> AxisRun {
        let workers = workers.max(1);
        let chunk_size = frames.len().div_ceil(workers).max(1);
        info!(
            "▶️ [{}] Parallel run over {} frames with {} workers",
            self.classifier.axis(),
            frames.len(),
            workers
        );

        let partials: Vec<RunningTally> =
            match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
                Ok(pool) => pool.install(|| {
                    frames
                        .frames()
                        .par_chunks(chunk_size)
                        .map(|chunk| self.classify_chunk(frames, chunk))
                        .collect()
                }),
                Err(e) => {
                    warn!("⚠️ Failed to build worker pool ({}), classifying sequentially", e);
                    vec![self.classify_chunk(frames, frames.frames())]
                }
            };

        let mut tally = self.new_tally();
        for partial in partials {
            tally.merge(partial);
        }

        let run = AxisRun {
            tally,
            frames_read: frames.frames_read(),
            source_error: frames.source_error().map(str::to_string),
            cancelled: frames.was_cancelled() || self.is_cancelled(),
        };
        info!(
            "✅ [{}] Classified {} of {} dumped frames",
            self.classifier.axis(),
            run.tally.total_selected(),
            frames.len()
        );
        run
    }
}
