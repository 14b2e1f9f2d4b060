//! 汇总报告：所有维度的结果合成一个 JSON 文档

use super::video::AxisReport;
use crate::core::analysis::Axis;
use crate::core::audio::{AudioPipelineError, SpeechReport};
use log::{info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize)]
pub struct InterviewReport {
    pub video: PathBuf,
    pub axes: Vec<AxisReport>,
    pub speech: Option<SpeechReport>,
    /// 语音流水线失败时的错误信息，视频维度的结果仍然保留
    pub speech_failure: Option<String>,
}

impl InterviewReport {
    pub fn new(video: &Path, axes: Vec<AxisReport>) -> Self {
        Self {
            video: video.to_path_buf(),
            axes,
            speech: None,
            speech_failure: None,
        }
    }

    pub fn with_speech(mut self, result: Result<SpeechReport, AudioPipelineError>) -> Self {
        match result {
            Ok(report) => {
                self.speech = Some(report);
                self.speech_failure = None;
            }
            Err(e) => {
                warn!("⚠️ Speech analysis unavailable: {}", e);
                self.speech = None;
                self.speech_failure = Some(e.to_string());
            }
        }
        self
    }

    pub fn axis(&self, axis: Axis) -> Option<&AxisReport> {
        self.axes.iter().find(|report| report.axis == axis)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_json(&self, path: &Path) -> std::io::Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        info!("💾 Report written to {:?}", path);
        Ok(())
    }
}
