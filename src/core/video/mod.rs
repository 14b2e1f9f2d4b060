pub mod dump;
pub mod error;
pub mod frame;
pub mod sampler;
pub mod source;

pub use dump::{dump_sampled_frames, ExtractedFrame, ExtractedFrames};
pub use error::VideoError;
pub use frame::Frame;
pub use sampler::{SampledFrames, SamplerConfig, SamplingMode, SamplingPlan, SamplingRationale};
pub use source::{FfmpegFrameSource, FfmpegOptions, FrameSource, ImageDirSource, MemoryFrameSource, VideoMetadata};
