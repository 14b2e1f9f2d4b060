//! 语音转写的外部接口
//!
//! 输入 16 kHz 单声道 PCM，输出按时间排序的惰性片段序列（只能遍历一次）。
//! 输入异常时必须返回错误，而不是返回空结果。

use super::error::AudioError;
use super::utils::format_timestamp;
use crate::core::analysis::LazyModel;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptSegment {
    /// 秒
    pub start: f32,
    pub end: f32,
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start: f32, end: f32, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// `HH:MM:SS:cc - HH:MM:SS:cc  --  text`
    pub fn timeline_line(&self) -> String {
        format!(
            "{} - {}  --  {}",
            format_timestamp(self.start),
            format_timestamp(self.end),
            self.text.trim()
        )
    }
}

pub type TranscriptSegments<'a> =
    Box<dyn Iterator<Item = Result<TranscriptSegment, AudioError>> + Send + 'a>;

pub trait Transcriber: Send + Sync {
    fn name(&self) -> &str;

    fn transcribe<'a>(&'a self, pcm_16k_mono: &'a [f32]) -> Result<TranscriptSegments<'a>, AudioError>;
}

impl<T: Transcriber> Transcriber for LazyModel<T> {
    fn name(&self) -> &str {
        LazyModel::name(self)
    }

    fn transcribe<'a>(&'a self, pcm_16k_mono: &'a [f32]) -> Result<TranscriptSegments<'a>, AudioError> {
        let model = self
            .get()
            .map_err(|e| AudioError::ModelLoadFailed(e.to_string()))?;
        model.transcribe(pcm_16k_mono)
    }
}

/// 非有限值说明解码出错，直接拒绝
pub fn validate_pcm(pcm: &[f32]) -> Result<(), AudioError> {
    match pcm.iter().position(|s| !s.is_finite()) {
        Some(index) => Err(AudioError::Transcription(format!(
            "malformed PCM: non-finite sample at {}",
            index
        ))),
        None => Ok(()),
    }
}

/// 拼接全部片段；任何一个片段出错都让整次转写失败
pub fn collect_transcript(
    segments: TranscriptSegments<'_>,
) -> Result<(String, Vec<TranscriptSegment>), AudioError> {
    let mut collected = Vec::new();
    for segment in segments {
        let segment = segment.map_err(|e| match e {
            AudioError::Transcription(msg) => AudioError::Transcription(msg),
            other => AudioError::Transcription(other.to_string()),
        })?;
        if !segment.text.trim().is_empty() {
            collected.push(segment);
        }
    }

    let transcript = collected
        .iter()
        .map(|s| s.text.trim())
        .collect::<Vec<_>>()
        .join(" ");
    Ok((transcript, collected))
}

type MockScript = Vec<Result<TranscriptSegment, String>>;

/// 按脚本返回片段的转写器，用于测试
pub struct MockTranscriber {
    script: MockScript,
    fail_on_call: Option<String>,
}

impl MockTranscriber {
    pub fn with_segments(segments: Vec<TranscriptSegment>) -> Self {
        Self {
            script: segments.into_iter().map(Ok).collect(),
            fail_on_call: None,
        }
    }

    pub fn with_text(text: &str) -> Self {
        Self::with_segments(vec![TranscriptSegment::new(0.0, 1.0, text)])
    }

    /// 第 `index` 个片段返回错误
    pub fn failing_at(mut self, index: usize, message: &str) -> Self {
        let error = Err(message.to_string());
        if index < self.script.len() {
            self.script[index] = error;
        } else {
            self.script.push(error);
        }
        self
    }

    /// 调用本身就失败
    pub fn unavailable(message: &str) -> Self {
        Self {
            script: Vec::new(),
            fail_on_call: Some(message.to_string()),
        }
    }
}

impl Transcriber for MockTranscriber {
    fn name(&self) -> &str {
        "mock"
    }

    fn transcribe<'a>(&'a self, pcm_16k_mono: &'a [f32]) -> Result<TranscriptSegments<'a>, AudioError> {
        if let Some(message) = &self.fail_on_call {
            return Err(AudioError::Transcription(message.clone()));
        }
        validate_pcm(pcm_16k_mono)?;

        Ok(Box::new(self.script.iter().map(|item| match item {
            Ok(segment) => Ok(segment.clone()),
            Err(message) => Err(AudioError::Transcription(message.clone())),
        })))
    }
}
