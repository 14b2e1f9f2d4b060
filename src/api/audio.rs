//! 语音分析入口 - 抽音轨 + 转写 + 情感分析

use crate::core::audio::{AudioInput, AudioPipeline, AudioPipelineError, SpeechReport, Transcriber};
use crate::core::config::AnalysisConfig;
use crate::core::text::{PolarityScorer, SentimentAnalyzer, SentimentError};
use log::info;
use std::path::Path;
use std::sync::Arc;

/// 语音分析器 - 封装 AudioPipeline
///
/// ```ignore
/// let analyzer = SpeechAnalyzer::create(Path::new("/path/to/models"), &AnalysisConfig::default())?;
/// let report = analyzer.analyze_video(Path::new("interview.mp4"))?;
/// println!("{}", report.analysis.label.as_str());
/// ```
pub struct SpeechAnalyzer {
    pipeline: AudioPipeline,
}

impl SpeechAnalyzer {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        config: &AnalysisConfig,
    ) -> Result<Self, SentimentError> {
        let analyzer = SentimentAnalyzer::new(config.sentiment.clone())?;
        Ok(Self::from_parts(transcriber, analyzer, config))
    }

    /// 使用外部提供的文本极性打分器
    pub fn with_scorer(
        transcriber: Arc<dyn Transcriber>,
        scorer: Arc<dyn PolarityScorer>,
        config: &AnalysisConfig,
    ) -> Result<Self, SentimentError> {
        let analyzer = SentimentAnalyzer::with_scorer(config.sentiment.clone(), scorer)?;
        Ok(Self::from_parts(transcriber, analyzer, config))
    }

    fn from_parts(
        transcriber: Arc<dyn Transcriber>,
        analyzer: SentimentAnalyzer,
        config: &AnalysisConfig,
    ) -> Self {
        info!("🎙️ SpeechAnalyzer: created with transcriber {}", transcriber.name());
        Self {
            pipeline: AudioPipeline::new(transcriber, analyzer, config.ffmpeg.ffmpeg_path.clone()),
        }
    }

    /// models_dir 下需要包含：
    /// - sherpa-ncnn/ (ASR 模型)
    /// - silero-vad/ (VAD 模型)
    ///
    /// 模型在第一次转写时才加载
    #[cfg(feature = "sherpa")]
    pub fn create(models_dir: &Path, config: &AnalysisConfig) -> Result<Self, SentimentError> {
        use crate::core::analysis::LazyModel;
        use crate::core::audio::SherpaTranscriber;

        crate::init_logging();
        let dir = models_dir.to_path_buf();
        let transcriber = LazyModel::new("sherpa-ncnn", move || SherpaTranscriber::create(&dir));
        Self::new(Arc::new(transcriber), config)
    }

    pub fn analyze_video(&self, video: &Path) -> Result<SpeechReport, AudioPipelineError> {
        info!("🎬 Analyzing speech in {:?}", video);
        self.pipeline.run(AudioInput::Video(video.to_path_buf()))
    }

    pub fn analyze_wav(&self, wav: &Path) -> Result<SpeechReport, AudioPipelineError> {
        info!("🎵 Analyzing speech in {:?}", wav);
        self.pipeline.run(AudioInput::Wav(wav.to_path_buf()))
    }

    /// 已解码的 16 kHz 单声道 PCM
    pub fn analyze_pcm(&self, samples: Vec<f32>) -> Result<SpeechReport, AudioPipelineError> {
        self.pipeline.run(AudioInput::Pcm(samples))
    }
}

impl Drop for SpeechAnalyzer {
    fn drop(&mut self) {
        info!("🗑️ SpeechAnalyzer: released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analysis::Rating;
    use crate::core::audio::{FailureCause, MockTranscriber, TranscriptSegment};
    use crate::core::text::SentimentLabel;

    struct GloomyScorer;

    impl PolarityScorer for GloomyScorer {
        fn polarity(&self, _text: &str) -> f64 {
            -0.8
        }
    }

    #[test]
    fn test_pcm_report_uses_config_fillers() {
        let mut config = AnalysisConfig::default();
        config.sentiment.fillers = vec!["well".to_string()];
        let transcriber = MockTranscriber::with_segments(vec![
            TranscriptSegment::new(0.0, 2.0, "Well, well, I think it went well."),
            TranscriptSegment::new(2.0, 3.0, "Um, well."),
        ]);
        let analyzer = SpeechAnalyzer::new(Arc::new(transcriber), &config).unwrap();

        let report = analyzer.analyze_pcm(vec![0.1; 1600]).unwrap();
        assert_eq!(report.analysis.filler_counts.len(), 1);
        assert_eq!(report.analysis.hesitation_count, 4);
        assert_eq!(report.feedback.rating, Some(Rating::Moderate));
    }

    #[test]
    fn test_external_scorer() {
        let analyzer = SpeechAnalyzer::with_scorer(
            Arc::new(MockTranscriber::with_text("The team shipped on time.")),
            Arc::new(GloomyScorer),
            &AnalysisConfig::default(),
        )
        .unwrap();

        let report = analyzer.analyze_pcm(vec![0.1; 160]).unwrap();
        assert_eq!(report.analysis.label, SentimentLabel::Negative);
        assert_eq!(report.feedback.rating, Some(Rating::NeedsImprovement));
    }

    #[test]
    fn test_missing_video() {
        let analyzer =
            SpeechAnalyzer::new(Arc::new(MockTranscriber::with_text("hi")), &AnalysisConfig::default())
                .unwrap();
        let err = analyzer.analyze_video(Path::new("/nonexistent/interview.mp4")).unwrap_err();
        assert_eq!(err.cause, FailureCause::Extraction);
    }
}
