//! Silero VAD：把 16 kHz PCM 切成语音段

use super::error::AudioError;
use super::utils::TARGET_SAMPLE_RATE;
use log::{debug, info};
use sherpa_ncnn::{Vad, VadConfig};
use std::ops::Range;
use std::path::Path;

/// 每次喂给 VAD 一秒音频
const FEED_SAMPLES: usize = TARGET_SAMPLE_RATE as usize;
const BUFFER_SECONDS: f32 = 60.0;

/// 以样本下标表示的语音段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechSegment {
    pub samples: Range<usize>,
}

impl SpeechSegment {
    pub fn whole(len: usize) -> Self {
        Self { samples: 0..len }
    }

    pub fn start_secs(&self) -> f32 {
        self.samples.start as f32 / TARGET_SAMPLE_RATE as f32
    }

    pub fn end_secs(&self) -> f32 {
        self.samples.end as f32 / TARGET_SAMPLE_RATE as f32
    }

    /// 越界部分截掉
    pub fn slice<'a>(&self, pcm: &'a [f32]) -> &'a [f32] {
        let end = self.samples.end.min(pcm.len());
        let start = self.samples.start.min(end);
        &pcm[start..end]
    }
}

pub struct VadHandle {
    vad: Vad,
}

impl VadHandle {
    pub fn new(model_dir: &Path) -> Result<Self, AudioError> {
        info!("🔧 Loading Silero VAD from {:?}", model_dir);
        let dir = model_dir.to_string_lossy().to_string();
        let vad = Vad::new(VadConfig::new(&dir).with_num_threads(2), BUFFER_SECONDS)
            .map_err(|e| AudioError::ModelLoadFailed(format!("Silero VAD at {:?}: {}", model_dir, e)))?;
        Ok(Self { vad })
    }

    /// 没检测到语音时返回覆盖整段音频的一个片段
    pub fn segments(&mut self, pcm: &[f32]) -> Vec<SpeechSegment> {
        self.vad.reset();
        self.vad.clear();
        for chunk in pcm.chunks(FEED_SAMPLES) {
            self.vad.accept_waveform(chunk);
        }
        // flush 之后才能拿到最后一段
        self.vad.flush();

        let segments: Vec<SpeechSegment> = self
            .vad
            .get_all_segments()
            .into_iter()
            .filter_map(|seg| {
                let start = usize::try_from(seg.start).ok()?.min(pcm.len());
                let end = (start + seg.samples.len()).min(pcm.len());
                (end > start).then_some(SpeechSegment { samples: start..end })
            })
            .collect();

        info!(
            "🔍 Silero VAD: {} speech segments in {:.1}s of audio",
            segments.len(),
            pcm.len() as f32 / TARGET_SAMPLE_RATE as f32
        );
        for segment in &segments {
            debug!("   {:.2}s - {:.2}s", segment.start_secs(), segment.end_secs());
        }

        if segments.is_empty() {
            return vec![SpeechSegment::whole(pcm.len())];
        }
        segments
    }
}

impl Drop for VadHandle {
    fn drop(&mut self) {
        info!("🗑️ VadHandle: released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_slice_and_times() {
        let pcm = vec![0.0f32; 16_000];
        let segment = SpeechSegment { samples: 8_000..24_000 };

        assert_eq!(segment.start_secs(), 0.5);
        assert_eq!(segment.end_secs(), 1.5);
        assert_eq!(segment.slice(&pcm).len(), 8_000);

        let past_end = SpeechSegment { samples: 20_000..30_000 };
        assert!(past_end.slice(&pcm).is_empty());
        assert_eq!(SpeechSegment::whole(pcm.len()).slice(&pcm).len(), 16_000);
    }
}
