//! 语音维度的状态机
//!
//! Idle → AudioExtracted → Transcribed → Analyzed → Done，
//! 任何一步外部调用失败都进入 Failed 并停止，不做重试。

use super::error::AudioError;
use super::extract::{extract_audio, ExtractedAudio};
use super::transcriber::{collect_transcript, TranscriptSegment, Transcriber};
use super::utils::load_wav_mono_f32;
use crate::core::analysis::feedback::Feedback;
use crate::core::analysis::summary::Summary;
use crate::core::analysis::tally::RunningTally;
use crate::core::analysis::verdict::ScoreBasis;
use crate::core::text::{SentimentAnalysis, SentimentAnalyzer};
use log::{error, info};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioStage {
    Idle,
    AudioExtracted,
    Transcribed,
    Analyzed,
    Done,
    Failed,
}

impl fmt::Display for AudioStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AudioStage::Idle => "idle",
            AudioStage::AudioExtracted => "audio extracted",
            AudioStage::Transcribed => "transcribed",
            AudioStage::Analyzed => "analyzed",
            AudioStage::Done => "done",
            AudioStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCause {
    Extraction,
    EmptyAudio,
    Transcription,
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureCause::Extraction => "extraction failure",
            FailureCause::EmptyAudio => "empty audio",
            FailureCause::Transcription => "transcription failure",
        };
        f.write_str(name)
    }
}

/// `stage` 是失败发生时所处的状态
#[derive(Debug, Error)]
#[error("Audio pipeline failed at stage '{stage}' ({cause}): {source}")]
pub struct AudioPipelineError {
    pub stage: AudioStage,
    pub cause: FailureCause,
    #[source]
    pub source: AudioError,
}

impl AudioPipelineError {
    fn new(stage: AudioStage, cause: FailureCause, source: AudioError) -> Self {
        Self {
            stage,
            cause,
            source,
        }
    }
}

/// 语音输入：视频（需要先抽音轨）、WAV 文件或已解码的 16 kHz PCM
#[derive(Debug, Clone)]
pub enum AudioInput {
    Video(PathBuf),
    Wav(PathBuf),
    Pcm(Vec<f32>),
}

#[derive(Debug, Clone, Serialize)]
pub struct SpeechReport {
    pub transcript: String,
    pub segments: Vec<TranscriptSegment>,
    pub analysis: SentimentAnalysis,
    pub summary: Summary,
    pub feedback: Feedback,
}

impl SpeechReport {
    pub fn timeline(&self) -> Vec<String> {
        self.segments.iter().map(|s| s.timeline_line()).collect()
    }
}

enum PipelineState {
    Idle(AudioInput),
    AudioExtracted {
        // 临时 WAV 在转写完成前保留
        _audio: Option<ExtractedAudio>,
        pcm: Vec<f32>,
    },
    Transcribed {
        transcript: String,
        segments: Vec<TranscriptSegment>,
    },
    Analyzed {
        transcript: String,
        segments: Vec<TranscriptSegment>,
        analysis: SentimentAnalysis,
    },
    Done(Box<SpeechReport>),
    Failed(AudioPipelineError),
}

impl PipelineState {
    fn stage(&self) -> AudioStage {
        match self {
            PipelineState::Idle(_) => AudioStage::Idle,
            PipelineState::AudioExtracted { .. } => AudioStage::AudioExtracted,
            PipelineState::Transcribed { .. } => AudioStage::Transcribed,
            PipelineState::Analyzed { .. } => AudioStage::Analyzed,
            PipelineState::Done(_) => AudioStage::Done,
            PipelineState::Failed(_) => AudioStage::Failed,
        }
    }
}

fn extraction_cause(e: &AudioError) -> FailureCause {
    match e {
        AudioError::EmptyAudio => FailureCause::EmptyAudio,
        _ => FailureCause::Extraction,
    }
}

pub struct AudioPipeline {
    transcriber: Arc<dyn Transcriber>,
    analyzer: SentimentAnalyzer,
    ffmpeg_path: String,
}

impl AudioPipeline {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        analyzer: SentimentAnalyzer,
        ffmpeg_path: impl Into<String>,
    ) -> Self {
        Self {
            transcriber,
            analyzer,
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    pub fn run(&self, input: AudioInput) -> Result<SpeechReport, AudioPipelineError> {
        let mut state = PipelineState::Idle(input);
        loop {
            let from = state.stage();
            state = self.step(state);
            match state {
                PipelineState::Done(report) => {
                    info!("✅ Audio pipeline done");
                    return Ok(*report);
                }
                PipelineState::Failed(e) => {
                    error!("❌ Audio pipeline failed after {}: {}", from, e);
                    return Err(e);
                }
                ref next => info!("🔄 Audio pipeline: {} -> {}", from, next.stage()),
            }
        }
    }

    fn step(&self, state: PipelineState) -> PipelineState {
        match state {
            PipelineState::Idle(input) => self.extract(input),
            PipelineState::AudioExtracted { _audio, pcm } => self.transcribe(&pcm),
            PipelineState::Transcribed {
                transcript,
                segments,
            } => {
                let analysis = self.analyzer.analyze(&transcript);
                PipelineState::Analyzed {
                    transcript,
                    segments,
                    analysis,
                }
            }
            PipelineState::Analyzed {
                transcript,
                segments,
                analysis,
            } => {
                let mut tally = RunningTally::new();
                tally.accumulate(self.analyzer.to_verdict(&analysis));
                let summary = tally.summarize(ScoreBasis::NotScored);
                let feedback = Feedback::for_speech(&analysis);
                PipelineState::Done(Box::new(SpeechReport {
                    transcript,
                    segments,
                    analysis,
                    summary,
                    feedback,
                }))
            }
            terminal @ (PipelineState::Done(_) | PipelineState::Failed(_)) => terminal,
        }
    }

    fn extract(&self, input: AudioInput) -> PipelineState {
        let fail = |e: AudioError| {
            PipelineState::Failed(AudioPipelineError::new(AudioStage::Idle, extraction_cause(&e), e))
        };

        let (audio, pcm) = match input {
            AudioInput::Video(path) => {
                let audio = match extract_audio(&path, &self.ffmpeg_path) {
                    Ok(audio) => audio,
                    Err(e) => return fail(e),
                };
                match load_wav_mono_f32(audio.path()) {
                    Ok(pcm) => (Some(audio), pcm),
                    Err(e) => return fail(e),
                }
            }
            AudioInput::Wav(path) => match load_wav_mono_f32(&path) {
                Ok(pcm) => (None, pcm),
                Err(e) => return fail(e),
            },
            AudioInput::Pcm(pcm) => (None, pcm),
        };

        if pcm.is_empty() {
            return fail(AudioError::EmptyAudio);
        }

        info!("🎵 Audio ready: {} samples at 16 kHz", pcm.len());
        PipelineState::AudioExtracted { _audio: audio, pcm }
    }

    fn transcribe(&self, pcm: &[f32]) -> PipelineState {
        info!("📝 Transcribing with {}...", self.transcriber.name());
        let result = self
            .transcriber
            .transcribe(pcm)
            .and_then(collect_transcript);

        match result {
            Ok((transcript, segments)) => {
                info!(
                    "✅ Transcription complete: {} segments, {} chars",
                    segments.len(),
                    transcript.len()
                );
                PipelineState::Transcribed {
                    transcript,
                    segments,
                }
            }
            Err(e) => PipelineState::Failed(AudioPipelineError::new(
                AudioStage::AudioExtracted,
                FailureCause::Transcription,
                e,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::audio::transcriber::MockTranscriber;
    use crate::core::text::{SentimentConfig, SentimentLabel};
    use std::path::Path;

    fn create_pipeline(transcriber: MockTranscriber) -> AudioPipeline {
        let analyzer = SentimentAnalyzer::new(SentimentConfig::default()).unwrap();
        AudioPipeline::new(Arc::new(transcriber), analyzer, "ffmpeg")
    }

    fn write_test_wav(path: &Path, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for s in samples {
            writer.write_sample(*s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_wav_to_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answer.wav");
        write_test_wav(&path, &[100i16; 1600]);

        let pipeline = create_pipeline(MockTranscriber::with_segments(vec![
            TranscriptSegment::new(0.0, 2.0, "I really enjoyed this great project."),
            TranscriptSegment::new(2.0, 3.5, "Um, it was fun."),
        ]));
        let report = pipeline.run(AudioInput::Wav(path)).unwrap();

        assert_eq!(report.transcript, "I really enjoyed this great project. Um, it was fun.");
        assert_eq!(report.analysis.label, SentimentLabel::Positive);
        assert_eq!(report.analysis.hesitation_count, 1);
        assert_eq!(report.summary.dominant_label.as_deref(), Some("Positive"));
        assert_eq!(report.timeline().len(), 2);
    }

    #[test]
    fn test_silent_transcript_is_no_speech() {
        let pipeline = create_pipeline(MockTranscriber::with_segments(vec![]));
        let report = pipeline.run(AudioInput::Pcm(vec![0.0; 160])).unwrap();
        assert_eq!(report.analysis.label, SentimentLabel::NoSpeech);
        assert_eq!(report.feedback.rating, None);
    }

    #[test]
    fn test_empty_audio_fails() {
        let pipeline = create_pipeline(MockTranscriber::with_text("hello"));
        let err = pipeline.run(AudioInput::Pcm(Vec::new())).unwrap_err();
        assert_eq!(err.cause, FailureCause::EmptyAudio);
        assert_eq!(err.stage, AudioStage::Idle);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        write_test_wav(&path, &[]);
        let err = pipeline.run(AudioInput::Wav(path)).unwrap_err();
        assert_eq!(err.cause, FailureCause::EmptyAudio);
    }

    #[test]
    fn test_missing_video_is_extraction_failure() {
        let pipeline = create_pipeline(MockTranscriber::with_text("hello"));
        let err = pipeline
            .run(AudioInput::Video(PathBuf::from("/nonexistent/interview.mp4")))
            .unwrap_err();
        assert_eq!(err.cause, FailureCause::Extraction);
        assert_eq!(err.stage, AudioStage::Idle);
    }

    #[test]
    fn test_transcription_failure_halts() {
        let pipeline = create_pipeline(MockTranscriber::unavailable("model crashed"));
        let err = pipeline.run(AudioInput::Pcm(vec![0.0; 160])).unwrap_err();
        assert_eq!(err.cause, FailureCause::Transcription);
        assert_eq!(err.stage, AudioStage::AudioExtracted);
        assert!(err.to_string().contains("model crashed"));

        let pipeline = create_pipeline(
            MockTranscriber::with_text("first part").failing_at(1, "segment decode error"),
        );
        let err = pipeline.run(AudioInput::Pcm(vec![0.0; 160])).unwrap_err();
        assert_eq!(err.cause, FailureCause::Transcription);
    }
}
