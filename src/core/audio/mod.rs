pub mod error;
pub mod extract;
pub mod pipeline;
pub mod transcriber;
pub mod utils;

#[cfg(feature = "sherpa")]
pub mod handler;
#[cfg(feature = "sherpa")]
pub mod sherpa;
#[cfg(feature = "sherpa")]
pub mod vad;

pub use error::AudioError;
pub use extract::{extract_audio, ExtractedAudio};
pub use pipeline::{
    AudioInput, AudioPipeline, AudioPipelineError, AudioStage, FailureCause, SpeechReport,
};
pub use transcriber::{
    collect_transcript, MockTranscriber, Transcriber, TranscriptSegment, TranscriptSegments,
};
pub use utils::{format_timestamp, load_wav_mono_f32, resample_to_16k_mono};

#[cfg(feature = "sherpa")]
pub use handler::NcnnHandle;
#[cfg(feature = "sherpa")]
pub use sherpa::SherpaTranscriber;
#[cfg(feature = "sherpa")]
pub use vad::{SpeechSegment, VadHandle};
