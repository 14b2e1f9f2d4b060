//! 抽帧落盘：并行检测前先把选中帧写成 JPEG，工作线程按需读取

use super::error::VideoError;
use super::frame::Frame;
use super::sampler::{SampledFrames, SamplingPlan};
use super::source::FrameSource;
use crate::core::cancel::CancelFlag;
use image::ImageFormat;
use log::{debug, error, info};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

#[derive(Debug, Clone)]
pub struct ExtractedFrame {
    pub frame_number: u64,
    pub timestamp: Option<Duration>,
    pub path: PathBuf,
}

/// 临时帧目录，Drop 时整体删除
pub struct ExtractedFrames {
    dir: TempDir,
    frames: Vec<ExtractedFrame>,
    frames_read: u64,
    /// 读帧中途失败时的错误，已落盘的帧仍然保留
    source_error: Option<String>,
    cancelled: bool,
}

impl ExtractedFrames {
    pub fn frames(&self) -> &[ExtractedFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    pub fn source_error(&self) -> Option<&str> {
        self.source_error.as_deref()
    }

    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn load(&self, entry: &ExtractedFrame) -> Result<Frame, VideoError> {
        let img = image::open(&entry.path)?;
        let mut frame = Frame::from_rgb_image(img.to_rgb8(), entry.frame_number);
        frame.timestamp = entry.timestamp;
        Ok(frame)
    }
}

impl Drop for ExtractedFrames {
    fn drop(&mut self) {
        debug!(
            "🗑️ ExtractedFrames: removing {} frames in {:?}",
            self.frames.len(),
            self.dir.path()
        );
    }
}

/// 只有临时目录或 JPEG 写入失败才返回 Err；来源读帧失败记录在 `source_error` 中
pub fn dump_sampled_frames<S: FrameSource + ?Sized>(
    source: &mut S,
    plan: SamplingPlan,
    cancel: Option<CancelFlag>,
) -> Result<ExtractedFrames, VideoError> {
    let dir = tempfile::Builder::new().prefix("interview-frames-").tempdir()?;
    let mut frames = Vec::new();
    let mut source_error = None;

    let mut sampled = SampledFrames::new(source, plan).with_cancel(cancel);
    for item in sampled.by_ref() {
        let (index, frame) = match item {
            Ok(item) => item,
            Err(e) => {
                error!("❌ Frame source failed after {} dumped frames: {}", frames.len(), e);
                source_error = Some(e.to_string());
                break;
            }
        };
        let image = frame.to_rgb_image().ok_or(VideoError::InvalidBuffer {
            expected: frame.pixel_count() * 3,
            actual: frame.data.len(),
        })?;

        let path = dir.path().join(format!("frame_{:06}.jpg", index));
        image.save_with_format(&path, ImageFormat::Jpeg)?;
        frames.push(ExtractedFrame {
            frame_number: index,
            timestamp: frame.timestamp,
            path,
        });
    }

    let frames_read = sampled.frames_read();
    let cancelled = sampled.was_cancelled();
    info!(
        "💾 Dumped {} of {} frames (stride {}) to {:?}{}",
        frames.len(),
        frames_read,
        plan.stride(),
        dir.path(),
        if cancelled { ", cancelled" } else { "" }
    );

    Ok(ExtractedFrames {
        dir,
        frames,
        frames_read,
        source_error,
        cancelled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::video::source::{MemoryFrameSource, VideoMetadata};

    fn create_test_frame(fill: u8, frame_number: u64) -> Frame {
        Frame::new(8, 8, vec![fill; 8 * 8 * 3], frame_number).unwrap()
    }

    #[test]
    fn test_dump_and_load() {
        let frames = (0..10).map(|i| create_test_frame(i as u8 * 20, i)).collect();
        let mut source = MemoryFrameSource::new(frames, Some(10.0));

        let dumped = dump_sampled_frames(&mut source, SamplingPlan::fixed(5), None).unwrap();
        assert_eq!(dumped.len(), 2);
        assert_eq!(dumped.frames_read(), 10);
        assert_eq!(dumped.frames()[1].frame_number, 5);

        let loaded = dumped.load(&dumped.frames()[1]).unwrap();
        assert_eq!(loaded.width, 8);
        assert_eq!(loaded.frame_number, 5);
    }

    #[test]
    fn test_temp_dir_removed_on_drop() {
        let frames = vec![create_test_frame(100, 0)];
        let mut source = MemoryFrameSource::new(frames, None);

        let dumped = dump_sampled_frames(&mut source, SamplingPlan::fixed(1), None).unwrap();
        let path = dumped.frames()[0].path.clone();
        assert!(path.exists());

        drop(dumped);
        assert!(!path.exists());
    }

    /// 先给出若干帧，然后一直返回解码错误
    struct BrokenTailSource {
        frames: std::vec::IntoIter<Frame>,
        metadata: VideoMetadata,
    }

    impl Iterator for BrokenTailSource {
        type Item = Result<Frame, VideoError>;

        fn next(&mut self) -> Option<Self::Item> {
            Some(
                self.frames
                    .next()
                    .ok_or_else(|| VideoError::Decode("corrupt".to_string())),
            )
        }
    }

    impl FrameSource for BrokenTailSource {
        fn metadata(&self) -> &VideoMetadata {
            &self.metadata
        }
    }

    #[test]
    fn test_read_failure_keeps_dumped_frames() {
        let mut source = BrokenTailSource {
            frames: (0..20)
                .map(|i| create_test_frame(0, i))
                .collect::<Vec<_>>()
                .into_iter(),
            metadata: VideoMetadata::default(),
        };

        let dumped = dump_sampled_frames(&mut source, SamplingPlan::fixed(5), None).unwrap();
        assert_eq!(dumped.len(), 4);
        // 失败的那次读取也计入帧索引
        assert_eq!(dumped.frames_read(), 21);
        assert!(dumped.source_error().unwrap().contains("corrupt"));
        assert!(!dumped.was_cancelled());
    }

    #[test]
    fn test_cancelled_dump_reads_nothing() {
        let cancel = CancelFlag::new();
        cancel.cancel();
        let frames = (0..50).map(|i| create_test_frame(0, i)).collect();
        let mut source = MemoryFrameSource::new(frames, Some(25.0));

        let dumped = dump_sampled_frames(&mut source, SamplingPlan::fixed(1), Some(cancel)).unwrap();
        assert!(dumped.is_empty());
        assert_eq!(dumped.frames_read(), 0);
        assert!(dumped.was_cancelled());
        assert!(dumped.source_error().is_none());
    }
}
