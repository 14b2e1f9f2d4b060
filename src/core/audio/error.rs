use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WAV format error: {0}")]
    Wav(#[from] hound::Error),
    #[error("Resample error: {0}")]
    Resample(String),
    #[error("Audio extraction failed: {0}")]
    Extraction(String),
    #[error("Extracted audio contains no samples")]
    EmptyAudio,
    #[error("Transcription failed: {0}")]
    Transcription(String),
    #[error("Model load failed: {0}")]
    ModelLoadFailed(String),
}
