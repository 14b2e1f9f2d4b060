//! 用 ffmpeg 从视频中提取 16 kHz 单声道 WAV

use super::error::AudioError;
use super::utils::TARGET_SAMPLE_RATE;
use log::{debug, error, info};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

/// 临时 WAV 文件，Drop 时连同目录一起删除
pub struct ExtractedAudio {
    dir: TempDir,
    path: PathBuf,
}

impl ExtractedAudio {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ExtractedAudio {
    fn drop(&mut self) {
        debug!("🗑️ ExtractedAudio: removing {:?}", self.dir.path());
    }
}

pub fn extract_audio(video: &Path, ffmpeg_path: &str) -> Result<ExtractedAudio, AudioError> {
    if !video.exists() {
        return Err(AudioError::Extraction(format!("video not found: {:?}", video)));
    }

    let dir = tempfile::Builder::new().prefix("interview-audio-").tempdir()?;
    let path = dir.path().join("audio.wav");

    info!("🎬 Extracting audio from {:?}", video);
    let output = Command::new(ffmpeg_path)
        .args(["-v", "error", "-nostdin", "-y", "-i"])
        .arg(video)
        .args(["-vn", "-acodec", "pcm_s16le", "-ac", "1", "-ar"])
        .arg(TARGET_SAMPLE_RATE.to_string())
        .args(["-f", "wav"])
        .arg(&path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| {
            error!("❌ Failed to run {}: {}", ffmpeg_path, e);
            AudioError::Extraction(format!("failed to run {}: {}", ffmpeg_path, e))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!("❌ ffmpeg exited with {}: {}", output.status, stderr.trim());
        return Err(AudioError::Extraction(stderr.trim().to_string()));
    }

    ensure_audio_present(&path)?;
    info!("✅ Audio extracted to {:?}", path);
    Ok(ExtractedAudio { dir, path })
}

/// 没有音轨时 ffmpeg 可能不产出文件，或只写出 WAV 头
pub(crate) fn ensure_audio_present(path: &Path) -> Result<(), AudioError> {
    if !path.exists() {
        return Err(AudioError::EmptyAudio);
    }
    let reader = hound::WavReader::open(path)?;
    if reader.duration() == 0 {
        return Err(AudioError::EmptyAudio);
    }
    Ok(())
}
