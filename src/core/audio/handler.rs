//! sherpa-ncnn 识别器的薄封装，输入固定为 16 kHz 单声道

use super::error::AudioError;
use super::utils::TARGET_SAMPLE_RATE;
use log::{debug, info};
use sherpa_ncnn::{Recognizer, RecognizerConfig};
use std::path::Path;

const MAX_RECOGNIZER_THREADS: usize = 4;

pub struct NcnnHandle {
    recognizer: Recognizer,
}

impl NcnnHandle {
    /// model_dir 下需要 encoder / decoder / joiner 的 `.ncnn.param` 与 `.ncnn.bin`，以及 tokens.txt
    pub fn new(model_dir: &Path) -> Result<Self, AudioError> {
        let threads = num_cpus::get().clamp(1, MAX_RECOGNIZER_THREADS) as i32;
        info!("🔧 Loading sherpa-ncnn recognizer from {:?} ({} threads)", model_dir, threads);

        let dir = model_dir.to_string_lossy().to_string();
        let recognizer = Recognizer::new(RecognizerConfig::new(&dir).with_num_threads(threads))
            .map_err(|e| {
                AudioError::ModelLoadFailed(format!("sherpa-ncnn recognizer at {:?}: {}", model_dir, e))
            })?;

        Ok(Self { recognizer })
    }

    pub fn recognize(&self, pcm: &[f32]) -> Result<String, AudioError> {
        if pcm.is_empty() {
            return Ok(String::new());
        }

        let text = self
            .recognizer
            .transcribe(pcm, TARGET_SAMPLE_RATE as f32)
            .map_err(|e| AudioError::Transcription(e.to_string()))?;
        debug!("🎤 {} samples -> {:?}", pcm.len(), text);
        Ok(text.trim().to_string())
    }
}

impl Drop for NcnnHandle {
    fn drop(&mut self) {
        info!("🗑️ NcnnHandle: released");
    }
}
