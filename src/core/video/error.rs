use thiserror::Error;

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Cannot open video source: {0}")]
    Open(String),
    #[error("Probe failed: {0}")]
    Probe(String),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Invalid frame buffer: expected {expected} bytes, got {actual}")]
    InvalidBuffer { expected: usize, actual: usize },
}
