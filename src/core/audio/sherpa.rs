//! sherpa-ncnn 转写后端：Silero VAD 切分语音段，NCNN 逐段识别

use super::error::AudioError;
use super::handler::NcnnHandle;
use super::transcriber::{validate_pcm, TranscriptSegment, TranscriptSegments, Transcriber};
use super::vad::{SpeechSegment, VadHandle};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub struct SherpaTranscriber {
    models_dir: PathBuf,
    ncnn: Mutex<NcnnHandle>,
    vad: Mutex<VadHandle>,
}

impl SherpaTranscriber {
    /// models_dir 下需要包含：
    /// - sherpa-ncnn/ (ASR 模型)
    /// - silero-vad/ (VAD 模型)
    pub fn create(models_dir: &Path) -> Result<Self, AudioError> {
        info!("🎙️ SherpaTranscriber: initializing with models_dir: {:?}", models_dir);

        let sherpa_path = models_dir.join("sherpa-ncnn");
        if !sherpa_path.exists() {
            return Err(AudioError::ModelLoadFailed(format!(
                "sherpa-ncnn model not found at {:?}",
                sherpa_path
            )));
        }
        let ncnn = NcnnHandle::new(&sherpa_path)?;

        let vad_path = models_dir.join("silero-vad");
        if !vad_path.exists() {
            return Err(AudioError::ModelLoadFailed(format!(
                "silero-vad model not found at {:?}",
                vad_path
            )));
        }
        let vad = VadHandle::new(&vad_path)?;

        info!("✅ SherpaTranscriber initialized successfully");
        Ok(Self {
            models_dir: models_dir.to_path_buf(),
            ncnn: Mutex::new(ncnn),
            vad: Mutex::new(vad),
        })
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    fn speech_segments(&self, pcm: &[f32]) -> Result<Vec<SpeechSegment>, AudioError> {
        let mut vad = self
            .vad
            .lock()
            .map_err(|e| AudioError::Transcription(format!("VAD lock poisoned: {}", e)))?;
        Ok(vad.segments(pcm))
    }

    fn transcribe_segment(
        &self,
        pcm: &[f32],
        index: usize,
        segment: &SpeechSegment,
    ) -> Result<TranscriptSegment, AudioError> {
        debug!(
            "📦 Segment {}: {:.2}s - {:.2}s",
            index + 1,
            segment.start_secs(),
            segment.end_secs()
        );

        let ncnn = self
            .ncnn
            .lock()
            .map_err(|e| AudioError::Transcription(format!("recognizer lock poisoned: {}", e)))?;
        let text = ncnn.recognize(segment.slice(pcm))?;
        Ok(TranscriptSegment::new(segment.start_secs(), segment.end_secs(), text))
    }
}

impl Transcriber for SherpaTranscriber {
    fn name(&self) -> &str {
        "sherpa-ncnn"
    }

    fn transcribe<'a>(&'a self, pcm_16k_mono: &'a [f32]) -> Result<TranscriptSegments<'a>, AudioError> {
        validate_pcm(pcm_16k_mono)?;
        let segments = self.speech_segments(pcm_16k_mono)?;
        info!("🎙️ Running ASR lazily on {} speech segments", segments.len());

        Ok(Box::new(segments.into_iter().enumerate().map(
            move |(index, segment)| self.transcribe_segment(pcm_16k_mono, index, &segment),
        )))
    }
}

impl Drop for SherpaTranscriber {
    fn drop(&mut self) {
        info!("🗑️ SherpaTranscriber: releasing resources (NCNN + VAD)");
    }
}
